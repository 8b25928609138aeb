// src/services/buckets.rs
use chrono::Datelike;
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ProjectionError, Result};
use crate::models::{Instrument, Tenor};

/// Issued amount summed per tenor bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTotals {
    totals: BTreeMap<Tenor, f64>,
    /// Instruments with an unknown contract length; excluded from every total.
    pub no_data: usize,
}

impl BucketTotals {
    pub fn get(&self, tenor: Tenor) -> f64 {
        self.totals.get(&tenor).copied().unwrap_or(0.0)
    }

    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tenor, f64)> + '_ {
        self.totals.iter().map(|(t, v)| (*t, *v))
    }
}

/// Share of historical issuance per tenor. Applied unchanged to every year's
/// new debt during a projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReissuanceMix {
    shares: BTreeMap<Tenor, f64>,
}

impl ReissuanceMix {
    pub fn share(&self, tenor: Tenor) -> Result<f64> {
        self.shares
            .get(&tenor)
            .copied()
            .ok_or(ProjectionError::MissingMixShare { tenor })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tenor, f64)> + '_ {
        self.shares.iter().map(|(t, v)| (*t, *v))
    }
}

/// Sums issued amount per tenor bucket.
///
/// Negative contract lengths count toward the 30-year bucket. Instruments
/// missing a date are tallied in `no_data`; instruments with a length but no
/// amount contribute nothing.
pub fn differing_bond_lengths(instruments: &[Instrument]) -> Result<BucketTotals> {
    if instruments.is_empty() {
        return Err(ProjectionError::EmptyInput {
            context: "bucketing issued amounts",
        });
    }

    let mut totals: BTreeMap<Tenor, f64> = Tenor::ALL.iter().map(|t| (*t, 0.0)).collect();
    let mut no_data = 0;
    let mut negative = 0;

    for inst in instruments {
        let Some(length) = inst.contract_length() else {
            no_data += 1;
            continue;
        };
        if length < 0 {
            negative += 1;
        }
        if let Some(amount) = inst.issued_amount {
            *totals.entry(Tenor::classify(length)).or_insert(0.0) += amount;
        }
    }

    if negative > 0 {
        warn!("{} instruments mature before issue; counted as 30-year", negative);
    }
    if no_data > 0 {
        warn!("{} instruments have no contract length", no_data);
    }

    Ok(BucketTotals { totals, no_data })
}

/// Normalises bucket totals into fractions of total issuance.
pub fn debt_percentages(totals: &BucketTotals) -> Result<ReissuanceMix> {
    let total = totals.grand_total();
    if total == 0.0 || !total.is_finite() {
        return Err(ProjectionError::EmptyDistribution);
    }

    let shares = Tenor::ALL
        .iter()
        .map(|t| (*t, totals.get(*t) / total))
        .collect();
    Ok(ReissuanceMix { shares })
}

/// Bucket totals and the mix derived from them, in one call.
pub fn reissuance_mix(instruments: &[Instrument]) -> Result<(BucketTotals, ReissuanceMix)> {
    let totals = differing_bond_lengths(instruments)?;
    let mix = debt_percentages(&totals)?;
    info!(
        "Reissuance mix: {}",
        mix.iter()
            .map(|(t, s)| format!("{}={:.4}", t, s))
            .collect::<Vec<_>>()
            .join(" ")
    );
    Ok((totals, mix))
}

/// Issued amount by (maturity year, tenor bucket).
pub fn maturity_schedule(instruments: &[Instrument]) -> BTreeMap<(i32, Tenor), f64> {
    let mut schedule = BTreeMap::new();
    for inst in instruments {
        let (Some(length), Some(matures), Some(amount)) =
            (inst.contract_length(), inst.maturity_date, inst.issued_amount)
        else {
            continue;
        };
        *schedule
            .entry((matures.year(), Tenor::classify(length)))
            .or_insert(0.0) += amount;
    }
    schedule
}
