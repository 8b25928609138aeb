// src/config.rs
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use crate::error::{ProjectionError, Result};
use crate::models::Tenor;

/// Fixed annual rate (percent) per tenor, used for rollovers and new issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<u32, f64>", into = "BTreeMap<u32, f64>")]
pub struct TenorRates {
    rates: BTreeMap<Tenor, f64>,
}

impl TenorRates {
    pub fn new(rates: BTreeMap<Tenor, f64>) -> Self {
        TenorRates { rates }
    }

    /// Same rate for every tenor.
    pub fn flat(rate: f64) -> Self {
        TenorRates {
            rates: Tenor::ALL.iter().map(|t| (*t, rate)).collect(),
        }
    }

    pub fn with_rate(mut self, tenor: Tenor, rate: f64) -> Self {
        self.rates.insert(tenor, rate);
        self
    }

    pub fn rate_for(&self, tenor: Tenor) -> Result<f64> {
        self.rates
            .get(&tenor)
            .copied()
            .ok_or(ProjectionError::MissingTenorRate { tenor })
    }

    pub fn missing(&self) -> Vec<Tenor> {
        Tenor::ALL
            .iter()
            .copied()
            .filter(|t| !self.rates.contains_key(t))
            .collect()
    }

    /// Parses `"1=5.0,2=4.8,30=4.5"`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut rates = BTreeMap::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (years, rate) = pair
                .split_once('=')
                .ok_or_else(|| ProjectionError::InvalidConfig(format!("expected years=rate, got '{}'", pair)))?;
            let years: u32 = years
                .trim()
                .parse()
                .map_err(|_| ProjectionError::InvalidConfig(format!("bad tenor '{}'", years)))?;
            let tenor = Tenor::from_years(years)
                .ok_or_else(|| ProjectionError::InvalidConfig(format!("unknown tenor {}y", years)))?;
            let rate: f64 = rate
                .trim()
                .parse()
                .map_err(|_| ProjectionError::InvalidConfig(format!("bad rate '{}'", rate)))?;
            if rates.insert(tenor, rate).is_some() {
                return Err(ProjectionError::InvalidConfig(format!("rate for {} given twice", tenor)));
            }
        }
        Ok(TenorRates { rates })
    }
}

impl TryFrom<BTreeMap<u32, f64>> for TenorRates {
    type Error = ProjectionError;

    fn try_from(by_years: BTreeMap<u32, f64>) -> Result<Self> {
        let mut rates = BTreeMap::new();
        for (years, rate) in by_years {
            let tenor = Tenor::from_years(years)
                .ok_or_else(|| ProjectionError::InvalidConfig(format!("unknown tenor {}y", years)))?;
            rates.insert(tenor, rate);
        }
        Ok(TenorRates { rates })
    }
}

impl From<TenorRates> for BTreeMap<u32, f64> {
    fn from(rates: TenorRates) -> Self {
        rates.rates.into_iter().map(|(t, r)| (t.years(), r)).collect()
    }
}

/// Scenario parameters for one projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub start_year: i32,
    /// Last simulated year, inclusive.
    pub horizon_year: i32,
    pub gdp_growth_pct: f64,
    pub deficit_pct_gdp: f64,
    pub initial_gdp: f64,
    pub tenor_rates: TenorRates,
    /// Multiplier applied to every canonical issued amount before simulating.
    #[serde(default = "default_amount_scale")]
    pub amount_scale: f64,
    /// Class-1 descriptions kept at ingestion; empty keeps everything.
    #[serde(default)]
    pub security_classes: Vec<String>,
}

fn default_amount_scale() -> f64 {
    1.0
}

impl ProjectionConfig {
    /// The 2023-2050 scenario the reference tool shipped with. Illustrative only.
    pub fn reference_scenario() -> Self {
        ProjectionConfig {
            start_year: 2023,
            horizon_year: 2050,
            gdp_growth_pct: 6.0,
            deficit_pct_gdp: 6.0,
            initial_gdp: 26_835_000.0,
            tenor_rates: TenorRates::flat(5.0),
            amount_scale: 26_938_517_614_684.59 / 100_000.0,
            security_classes: vec![
                "Notes".to_string(),
                "Bonds".to_string(),
                "Bills Maturity Value".to_string(),
            ],
        }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.horizon_year
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon_year < self.start_year {
            return Err(ProjectionError::InvalidHorizon {
                start_year: self.start_year,
                horizon_year: self.horizon_year,
            });
        }
        let scalars = [
            ("gdp_growth_pct", self.gdp_growth_pct),
            ("deficit_pct_gdp", self.deficit_pct_gdp),
            ("initial_gdp", self.initial_gdp),
            ("amount_scale", self.amount_scale),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ProjectionError::InvalidConfig(format!("{} must be finite", name)));
            }
        }
        if self.initial_gdp <= 0.0 {
            return Err(ProjectionError::InvalidConfig(format!(
                "initial_gdp must be positive, got {}",
                self.initial_gdp
            )));
        }
        if self.gdp_growth_pct <= -100.0 {
            return Err(ProjectionError::InvalidConfig(format!(
                "gdp_growth_pct must be above -100, got {}",
                self.gdp_growth_pct
            )));
        }
        if let Some(tenor) = self.tenor_rates.missing().first() {
            return Err(ProjectionError::MissingTenorRate { tenor: *tenor });
        }
        Ok(())
    }

    /// Reads the scenario from the environment. Call `dotenv().ok()` first
    /// to pick up a `.env` file. Unset variables fall back to the reference
    /// scenario; set but unparseable ones are errors.
    pub fn from_env() -> Result<Self> {
        let defaults = ProjectionConfig::reference_scenario();

        let tenor_rates = match env::var("TENOR_RATES") {
            Ok(spec) => TenorRates::parse(&spec)?,
            Err(_) => {
                warn!("TENOR_RATES not set, using flat 5% rates");
                defaults.tenor_rates
            }
        };

        let security_classes = match env::var("SECURITY_CLASSES") {
            Ok(list) => list
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => defaults.security_classes,
        };

        let config = ProjectionConfig {
            start_year: env_or("PROJECTION_START_YEAR", defaults.start_year)?,
            horizon_year: env_or("PROJECTION_HORIZON_YEAR", defaults.horizon_year)?,
            gdp_growth_pct: env_or("GDP_GROWTH_PCT", defaults.gdp_growth_pct)?,
            deficit_pct_gdp: env_or("DEFICIT_PCT_GDP", defaults.deficit_pct_gdp)?,
            initial_gdp: env_or("INITIAL_GDP", defaults.initial_gdp)?,
            tenor_rates,
            amount_scale: env_or("AMOUNT_SCALE", defaults.amount_scale)?,
            security_classes,
        };
        config.validate()?;
        Ok(config)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ProjectionError::InvalidConfig(format!("{} is not a valid value: '{}'", key, raw))),
        Err(_) => {
            warn!("{} not set, defaulting to {}", key, default);
            Ok(default)
        }
    }
}
