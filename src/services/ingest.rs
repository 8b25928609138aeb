// src/services/ingest.rs
use chrono::NaiveDate;
use csv::{Reader, StringRecord};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{ProjectionError, Result};
use crate::models::RawSecurityRecord;

const RECORD_DATE: &str = "Record Date";
const SECURITY_TYPE: &str = "Security Type Description";
const SECURITY_CLASS: &str = "Security Class 1 Description";
const IDENTIFIER: &str = "Security Class 2 Description";
const INTEREST_RATE: &str = "Interest Rate";
const YIELD: &str = "Yield";
const ISSUE_DATE: &str = "Issue Date";
const MATURITY_DATE: &str = "Maturity Date";
const ISSUED_AMOUNT: &str = "Issued Amount (in Millions)";
const INFLATION_ADJUSTMENT: &str = "Inflation Adjustment (in Millions)";
const REDEEMED_AMOUNT: &str = "Redeemed Amount (in Millions)";
const OUTSTANDING_AMOUNT: &str = "Outstanding Amount (in Millions)";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%y"];

/// Column positions resolved from the header row.
struct Columns {
    record_date: Option<usize>,
    security_type: Option<usize>,
    security_class: Option<usize>,
    identifier: usize,
    interest_rate: Option<usize>,
    yield_pct: usize,
    issued_date: usize,
    maturity_date: usize,
    issued_amount: usize,
    inflation_adjustment: Option<usize>,
    redeemed_amount: Option<usize>,
    outstanding_amount: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| ProjectionError::Ingest(format!("No '{}' column in extract", name)))
        };

        Ok(Columns {
            record_date: find(RECORD_DATE),
            security_type: find(SECURITY_TYPE),
            security_class: find(SECURITY_CLASS),
            identifier: require(IDENTIFIER)?,
            interest_rate: find(INTEREST_RATE),
            yield_pct: require(YIELD)?,
            issued_date: require(ISSUE_DATE)?,
            maturity_date: require(MATURITY_DATE)?,
            issued_amount: require(ISSUED_AMOUNT)?,
            inflation_adjustment: find(INFLATION_ADJUSTMENT),
            redeemed_amount: find(REDEEMED_AMOUNT),
            outstanding_amount: find(OUTSTANDING_AMOUNT),
        })
    }
}

fn cell<'a>(row: &'a StringRecord, idx: Option<usize>) -> Option<&'a str> {
    let value = row.get(idx?)?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") || value == "*" {
        None
    } else {
        Some(value)
    }
}

fn parse_date(row: &StringRecord, idx: Option<usize>, line: u64) -> Option<NaiveDate> {
    let raw = cell(row, idx)?;
    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok());
    if parsed.is_none() {
        debug!("Line {}: unparseable date '{}'", line, raw);
    }
    parsed
}

fn parse_amount(row: &StringRecord, idx: Option<usize>, line: u64) -> Option<f64> {
    let raw = cell(row, idx)?;
    match raw.replace(',', "").parse::<f64>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!("Line {}: unparseable number '{}'", line, raw);
            None
        }
    }
}

fn parse_text(row: &StringRecord, idx: Option<usize>) -> String {
    cell(row, idx).unwrap_or_default().to_string()
}

/// Reads the debt extract in file order. Malformed cells become `None`;
/// only a missing required column or an unreadable file is an error.
pub fn read_securities<R: Read>(reader: R) -> Result<Vec<RawSecurityRecord>> {
    let mut rdr = Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let cols = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        rows.push(RawSecurityRecord {
            record_date: parse_date(&row, cols.record_date, line),
            security_type: parse_text(&row, cols.security_type),
            security_class: parse_text(&row, cols.security_class),
            identifier: parse_text(&row, Some(cols.identifier)),
            interest_rate: parse_amount(&row, cols.interest_rate, line),
            yield_pct: parse_amount(&row, Some(cols.yield_pct), line),
            issued_date: parse_date(&row, Some(cols.issued_date), line),
            maturity_date: parse_date(&row, Some(cols.maturity_date), line),
            issued_amount: parse_amount(&row, Some(cols.issued_amount), line),
            amount_adjusted_for_inflation: parse_amount(&row, cols.inflation_adjustment, line),
            redeemed_amount: parse_amount(&row, cols.redeemed_amount, line),
            outstanding_amount: parse_amount(&row, cols.outstanding_amount, line),
        });
    }

    info!("Read {} rows from debt extract", rows.len());
    Ok(rows)
}

pub fn read_securities_from_path(path: impl AsRef<Path>) -> Result<Vec<RawSecurityRecord>> {
    let path = path.as_ref();
    info!("Opening debt extract at {}", path.display());
    let file = File::open(path)
        .map_err(|e| ProjectionError::Ingest(format!("cannot open {}: {}", path.display(), e)))?;
    read_securities(file)
}

/// Keeps rows whose class-1 description is listed. An empty list keeps everything.
///
/// Every listed class must occur somewhere in the extract; a class that
/// matches no row is reported rather than filtering the extract to nothing.
pub fn retain_security_classes(rows: Vec<RawSecurityRecord>, classes: &[String]) -> Result<Vec<RawSecurityRecord>> {
    if classes.is_empty() {
        return Ok(rows);
    }
    let unknown: Vec<&str> = classes
        .iter()
        .filter(|c| !rows.iter().any(|r| c.eq_ignore_ascii_case(&r.security_class)))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(ProjectionError::InvalidConfig(format!(
            "security classes not present in extract: {}",
            unknown.join(", ")
        )));
    }

    let before = rows.len();
    let kept: Vec<_> = rows
        .into_iter()
        .filter(|r| classes.iter().any(|c| c.eq_ignore_ascii_case(&r.security_class)))
        .collect();
    info!("Filtered to security classes {:?}: {} -> {} rows", classes, before, kept.len());
    Ok(kept)
}

/// Removes aggregate rows ("Total Marketable", ...) that are not individual securities.
pub fn drop_total_rows(rows: Vec<RawSecurityRecord>) -> Vec<RawSecurityRecord> {
    let before = rows.len();
    let kept: Vec<_> = rows
        .into_iter()
        .filter(|r| !r.identifier.contains("Total"))
        .collect();
    info!("Removed {} total rows", before - kept.len());
    kept
}
