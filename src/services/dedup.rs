// src/services/dedup.rs
//
// Turns the append-only extract (one row per record date per security)
// into one canonical instrument per issuance.
//
// Thinning depends on the extract's ordering: every run of rows for the same
// identifier must be contiguous. The ingestion side is responsible for that;
// nothing here re-sorts or groups.
use log::{debug, info};
use std::collections::HashSet;

use crate::error::{ProjectionError, Result};
use crate::models::{Instrument, RawSecurityRecord};

/// Fails on the first identifier that shows up again after a different
/// identifier has interrupted its run. Comparison ignores ASCII case.
pub fn check_contiguous_runs(rows: &[RawSecurityRecord]) -> Result<()> {
    let mut closed = HashSet::new();
    let mut current: Option<String> = None;
    for row in rows {
        let id = row.identifier.to_ascii_lowercase();
        if current.as_deref() == Some(id.as_str()) {
            continue;
        }
        if closed.contains(&id) {
            return Err(ProjectionError::NonContiguousRun {
                identifier: row.identifier.clone(),
            });
        }
        if let Some(prev) = current.replace(id) {
            closed.insert(prev);
        }
    }
    Ok(())
}

/// Keeps the first row of each contiguous identifier run.
///
/// The very first row is always kept. After that a row is kept only when its
/// identifier differs (ignoring case) from the last kept identifier and it
/// carries issue date, yield, maturity date and issued amount. Kept rows store
/// the coupon rate in place of the yield when one is present.
pub fn thin_reissued(rows: &[RawSecurityRecord]) -> Vec<Instrument> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut thinned = vec![Instrument::new(
        first.identifier.clone(),
        first.issued_date,
        first.maturity_date,
        first.issued_amount,
        first.yield_pct,
    )];
    let mut current = first.identifier.as_str();

    for row in &rows[1..] {
        if row.identifier.eq_ignore_ascii_case(current) || !row.has_required_terms() {
            continue;
        }
        thinned.push(Instrument::new(
            row.identifier.clone(),
            row.issued_date,
            row.maturity_date,
            row.issued_amount,
            row.preferred_rate(),
        ));
        current = row.identifier.as_str();
    }

    info!("Thinned {} rows to {} instruments", rows.len(), thinned.len());
    thinned
}

/// Drops instruments whose (issue date, amount, yield) was already seen, and
/// any without a yield. First occurrence wins; order is preserved.
pub fn delete_duplicates(instruments: Vec<Instrument>) -> Vec<Instrument> {
    let before = instruments.len();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(instruments.len());
    for inst in instruments {
        if inst.yield_pct.is_none() {
            continue;
        }
        let key = inst.duplicate_key();
        if seen.insert(key) {
            kept.push(inst);
        } else {
            debug!("Dropping {} as a duplicate of issuance {}", inst.identifier, key);
        }
    }

    info!("Removed {} duplicate or unpriced instruments", before - kept.len());
    kept
}

/// Both passes: raw extract rows to the canonical instrument set.
pub fn canonicalize(rows: &[RawSecurityRecord]) -> Vec<Instrument> {
    delete_duplicates(thin_reissued(rows))
}

/// Re-runs thinning over already-canonical instruments. Used to check that
/// a set is stable under another pass.
pub fn rethin(instruments: &[Instrument]) -> Vec<Instrument> {
    let rows: Vec<RawSecurityRecord> = instruments
        .iter()
        .map(|inst| RawSecurityRecord {
            identifier: inst.identifier.clone(),
            issued_date: inst.issued_date,
            maturity_date: inst.maturity_date,
            issued_amount: inst.issued_amount,
            yield_pct: inst.yield_pct,
            ..Default::default()
        })
        .collect();
    delete_duplicates(thin_reissued(&rows))
}
