// src/services/projection.rs
use log::{info, warn};
use serde::Serialize;

use crate::config::ProjectionConfig;
use crate::error::Result;
use crate::models::{Instrument, RawSecurityRecord, YearlyProjection};
use crate::services::buckets::{self, BucketTotals, ReissuanceMix};
use crate::services::{dedup, ingest, simulation};

/// Everything a projection run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub config: ProjectionConfig,
    pub years: Vec<YearlyProjection>,
    pub mix: ReissuanceMix,
    pub final_total_debt: f64,
    pub final_instrument_count: usize,
    #[serde(skip)]
    pub final_instruments: Vec<Instrument>,
}

/// Historical issuance broken down by tenor.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub totals: BucketTotals,
    pub mix: ReissuanceMix,
    pub instrument_count: usize,
}

/// Raw extract rows to the canonical set: class filter, totals removed,
/// thinned and deduplicated. Broken identifier runs are logged, not fatal;
/// call `dedup::check_contiguous_runs` directly to reject them.
pub fn prepare_instruments(rows: Vec<RawSecurityRecord>, config: &ProjectionConfig) -> Result<Vec<Instrument>> {
    let rows = ingest::retain_security_classes(rows, &config.security_classes)?;
    let rows = ingest::drop_total_rows(rows);
    if let Err(e) = dedup::check_contiguous_runs(&rows) {
        warn!("Extract ordering breaks thinning: {}", e);
    }
    let canonical = dedup::canonicalize(&rows);
    info!("{} canonical instruments", canonical.len());
    Ok(canonical)
}

/// Multiplies every issued amount by `factor`.
pub fn scale_amounts(instruments: Vec<Instrument>, factor: f64) -> Vec<Instrument> {
    instruments
        .into_iter()
        .map(|mut inst| {
            inst.issued_amount = inst.issued_amount.map(|a| a * factor);
            inst
        })
        .collect()
}

pub fn distribution(instruments: &[Instrument]) -> Result<DistributionReport> {
    let (totals, mix) = buckets::reissuance_mix(instruments)?;
    Ok(DistributionReport {
        totals,
        mix,
        instrument_count: instruments.len(),
    })
}

/// Scales the canonical set, derives the reissuance mix from it as it
/// stands, and simulates through the horizon.
pub fn project(canonical: &[Instrument], config: &ProjectionConfig) -> Result<ProjectionReport> {
    config.validate()?;
    let scaled = scale_amounts(canonical.to_vec(), config.amount_scale);
    let (_, mix) = buckets::reissuance_mix(&scaled)?;

    info!(
        "Projecting {} instruments from {} through {}",
        scaled.len(),
        config.start_year,
        config.horizon_year
    );
    let (years, end) = simulation::run(scaled, config, &mix)?;

    Ok(ProjectionReport {
        config: config.clone(),
        years,
        mix,
        final_total_debt: simulation::total_debt(&end.instruments),
        final_instrument_count: end.instruments.len(),
        final_instruments: end.instruments,
    })
}
