// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days per year used for every tenor threshold and date shift.
pub const DAYS_PER_YEAR: i64 = 365;

/// One row of the public debt extract, as ingested. Absent or malformed
/// cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSecurityRecord {
    pub record_date: Option<NaiveDate>,
    pub security_type: String,
    pub security_class: String,
    pub identifier: String,
    pub interest_rate: Option<f64>,
    pub yield_pct: Option<f64>,
    pub issued_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub issued_amount: Option<f64>,
    pub amount_adjusted_for_inflation: Option<f64>,
    pub redeemed_amount: Option<f64>,
    pub outstanding_amount: Option<f64>,
}

impl RawSecurityRecord {
    /// True when every field the thinning pass needs is present.
    pub fn has_required_terms(&self) -> bool {
        self.issued_date.is_some()
            && self.yield_pct.is_some()
            && self.maturity_date.is_some()
            && self.issued_amount.is_some()
    }

    /// Coupon rate when the row carries one, otherwise the yield.
    pub fn preferred_rate(&self) -> Option<f64> {
        self.interest_rate.or(self.yield_pct)
    }
}

/// A canonical debt instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub identifier: String,
    pub issued_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub issued_amount: Option<f64>,
    pub yield_pct: Option<f64>,
}

impl Instrument {
    pub fn new(
        identifier: impl Into<String>,
        issued_date: Option<NaiveDate>,
        maturity_date: Option<NaiveDate>,
        issued_amount: Option<f64>,
        yield_pct: Option<f64>,
    ) -> Self {
        Instrument {
            identifier: identifier.into(),
            issued_date,
            maturity_date,
            issued_amount,
            yield_pct,
        }
    }

    /// Whole days from issue to maturity. Negative lengths come straight
    /// from the data and are left for callers to classify.
    pub fn contract_length(&self) -> Option<i64> {
        match (self.issued_date, self.maturity_date) {
            (Some(issued), Some(matures)) => Some((matures - issued).num_days()),
            _ => None,
        }
    }

    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(self.issued_date, self.issued_amount, self.yield_pct)
    }

    /// Annual interest carried by this instrument, if both amount and yield are known.
    pub fn annual_interest(&self) -> Option<f64> {
        Some(self.issued_amount? * self.yield_pct? / 100.0)
    }
}

/// Identity of one issuance event: (issue date, issued amount, yield).
///
/// Floats are held by bit pattern so the key can be hashed; two records
/// with identical values always produce equal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    issued_date: Option<NaiveDate>,
    issued_amount_bits: Option<u64>,
    yield_bits: Option<u64>,
}

impl DuplicateKey {
    pub fn new(issued_date: Option<NaiveDate>, issued_amount: Option<f64>, yield_pct: Option<f64>) -> Self {
        DuplicateKey {
            issued_date,
            issued_amount_bits: issued_amount.map(f64::to_bits),
            yield_bits: yield_pct.map(f64::to_bits),
        }
    }
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn or_null<T: fmt::Display>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string())
        }
        write!(
            f,
            "{}:{}:{}",
            or_null(self.issued_date),
            or_null(self.issued_amount_bits.map(f64::from_bits)),
            or_null(self.yield_bits.map(f64::from_bits))
        )
    }
}

/// The eight contract-length classes used for bucketing, rates and reissuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tenor {
    #[serde(rename = "1")]
    OneYear,
    #[serde(rename = "2")]
    TwoYear,
    #[serde(rename = "3")]
    ThreeYear,
    #[serde(rename = "5")]
    FiveYear,
    #[serde(rename = "7")]
    SevenYear,
    #[serde(rename = "10")]
    TenYear,
    #[serde(rename = "20")]
    TwentyYear,
    #[serde(rename = "30")]
    ThirtyYear,
}

impl Tenor {
    pub const ALL: [Tenor; 8] = [
        Tenor::OneYear,
        Tenor::TwoYear,
        Tenor::ThreeYear,
        Tenor::FiveYear,
        Tenor::SevenYear,
        Tenor::TenYear,
        Tenor::TwentyYear,
        Tenor::ThirtyYear,
    ];

    pub fn years(self) -> u32 {
        match self {
            Tenor::OneYear => 1,
            Tenor::TwoYear => 2,
            Tenor::ThreeYear => 3,
            Tenor::FiveYear => 5,
            Tenor::SevenYear => 7,
            Tenor::TenYear => 10,
            Tenor::TwentyYear => 20,
            Tenor::ThirtyYear => 30,
        }
    }

    pub fn from_years(years: u32) -> Option<Tenor> {
        Tenor::ALL.iter().copied().find(|t| t.years() == years)
    }

    /// Upper bound of the bucket in days (inclusive). The 30-year bucket is open-ended.
    pub fn max_days(self) -> Option<i64> {
        match self {
            Tenor::ThirtyYear => None,
            other => Some(other.years() as i64 * DAYS_PER_YEAR),
        }
    }

    /// Bucket for a contract length in days. Negative lengths are a data
    /// artifact and land in the 30-year bucket.
    pub fn classify(contract_length_days: i64) -> Tenor {
        if contract_length_days < 0 {
            return Tenor::ThirtyYear;
        }
        Tenor::ALL
            .iter()
            .copied()
            .find(|t| t.max_days().map_or(true, |max| contract_length_days <= max))
            .unwrap_or(Tenor::ThirtyYear)
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}y", self.years())
    }
}

/// Outcome of one simulated year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProjection {
    pub year: i32,
    pub gdp: f64,
    pub total_debt: f64,
    pub total_interest: f64,
    pub interest_pct_gdp: f64,
    /// Outstanding debt over GDP as a ratio, before this year's issuance.
    pub debt_to_gdp: f64,
    pub new_debt: f64,
    pub primary_deficit_pct_gdp: f64,
    pub matured_count: usize,
    pub instrument_count: usize,
}
