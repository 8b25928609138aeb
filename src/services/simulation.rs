// src/services/simulation.rs
//
// Year-by-year rollover model. Each tick reports the interest carried by the
// live set, re-dates and re-rates everything maturing before next January 1,
// then issues the year's deficit as eight new instruments split by the fixed
// reissuance mix. Matured instruments are re-dated in place; nothing is
// ever removed.
use chrono::{Duration, NaiveDate};
use log::{debug, info, warn};

use crate::config::{ProjectionConfig, TenorRates};
use crate::error::{ProjectionError, Result};
use crate::models::{Instrument, Tenor, YearlyProjection, DAYS_PER_YEAR};
use crate::services::buckets::ReissuanceMix;

/// Everything carried from one tick to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// The year the next tick will simulate.
    pub year: i32,
    pub gdp: f64,
    pub instruments: Vec<Instrument>,
}

impl SimulationState {
    pub fn new(year: i32, gdp: f64, instruments: Vec<Instrument>) -> Self {
        SimulationState { year, gdp, instruments }
    }
}

/// Sum of `issued_amount * yield / 100` over the set. Records missing either
/// value contribute nothing.
pub fn total_outstanding_interest(instruments: &[Instrument]) -> f64 {
    instruments.iter().filter_map(Instrument::annual_interest).sum()
}

/// Sum of issued amounts over the set.
pub fn total_debt(instruments: &[Instrument]) -> f64 {
    instruments.iter().filter_map(|i| i.issued_amount).sum()
}

fn jan_first(year: i32, identifier: &str) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| ProjectionError::DateOutOfRange {
        identifier: identifier.to_string(),
    })
}

fn shift(date: NaiveDate, days: i64, identifier: &str) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| ProjectionError::DateOutOfRange {
            identifier: identifier.to_string(),
        })
}

/// Re-dates one matured instrument as if reissued at its original tenor.
///
/// Issue date moves forward one year; maturity moves forward by the
/// instrument's own contract length (30 years when that length is negative).
/// The new rate comes from the bucket of the length *before* the shift.
fn roll_over(inst: &mut Instrument, issued: NaiveDate, matures: NaiveDate, rates: &TenorRates) -> Result<()> {
    let mut length = (matures - issued).num_days();
    if length < 0 {
        length = 30 * DAYS_PER_YEAR;
    }
    let rate = rates.rate_for(Tenor::classify(length))?;

    inst.issued_date = Some(shift(issued, DAYS_PER_YEAR, &inst.identifier)?);
    inst.maturity_date = Some(shift(matures, length, &inst.identifier)?);
    inst.yield_pct = Some(rate);
    debug!(
        "Rolled {} to {:?}..{:?} at {}%",
        inst.identifier, inst.issued_date, inst.maturity_date, rate
    );
    Ok(())
}

/// The eight instruments that carry one year's new borrowing.
fn issue_new_debt(year: i32, new_debt: f64, mix: &ReissuanceMix, rates: &TenorRates) -> Result<Vec<Instrument>> {
    Tenor::ALL
        .iter()
        .map(|&tenor| {
            let identifier = format!("NEW-{}-{}", year + 1, tenor);
            let issued = jan_first(year + 1, &identifier)?;
            let matures = jan_first(year + 1 + tenor.years() as i32, &identifier)?;
            Ok(Instrument::new(
                identifier,
                Some(issued),
                Some(matures),
                Some(new_debt * mix.share(tenor)?),
                Some(rates.rate_for(tenor)?),
            ))
        })
        .collect()
}

/// One simulated year. Consumes the prior state and returns the next one
/// along with what was observed during the year.
pub fn advance(
    state: SimulationState,
    config: &ProjectionConfig,
    mix: &ReissuanceMix,
) -> Result<(SimulationState, YearlyProjection)> {
    let SimulationState { year, gdp, mut instruments } = state;
    if !(gdp > 0.0 && gdp.is_finite()) {
        return Err(ProjectionError::InvalidConfig(format!(
            "GDP for {} must be positive, got {}",
            year, gdp
        )));
    }

    let total_interest = total_outstanding_interest(&instruments);
    let debt = total_debt(&instruments);
    let instrument_count = instruments.len();

    let cutoff = jan_first(year + 1, "rollover cutoff")?;
    let mut matured_count = 0;
    let mut undated = 0;
    for inst in instruments.iter_mut() {
        let Some(matures) = inst.maturity_date else {
            undated += 1;
            continue;
        };
        if matures >= cutoff {
            continue;
        }
        let Some(issued) = inst.issued_date else {
            undated += 1;
            continue;
        };
        roll_over(inst, issued, matures, &config.tenor_rates)?;
        matured_count += 1;
    }
    if undated > 0 {
        warn!("{}: {} instruments lack dates and were not rolled over", year, undated);
    }

    let new_debt = gdp * config.deficit_pct_gdp / 100.0;
    let next_gdp = gdp * (1.0 + config.gdp_growth_pct / 100.0);
    instruments.extend(issue_new_debt(year, new_debt, mix, &config.tenor_rates)?);

    let projection = YearlyProjection {
        year,
        gdp,
        total_debt: debt,
        total_interest,
        interest_pct_gdp: total_interest / gdp * 100.0,
        debt_to_gdp: debt / gdp,
        new_debt,
        primary_deficit_pct_gdp: new_debt / gdp * 100.0,
        matured_count,
        instrument_count,
    };
    info!(
        "{}: interest {:.2}, debt {:.2}, {} rolled over, {} live",
        year, total_interest, debt, matured_count, instrument_count
    );

    Ok((SimulationState::new(year + 1, next_gdp, instruments), projection))
}

/// Runs every year from `start_year` through `horizon_year` inclusive.
pub fn run(
    instruments: Vec<Instrument>,
    config: &ProjectionConfig,
    mix: &ReissuanceMix,
) -> Result<(Vec<YearlyProjection>, SimulationState)> {
    config.validate()?;
    if instruments.is_empty() {
        return Err(ProjectionError::EmptyInput {
            context: "running the rollover simulation",
        });
    }

    let mut state = SimulationState::new(config.start_year, config.initial_gdp, instruments);
    let mut years = Vec::new();
    for _ in config.years() {
        let (next, projection) = advance(state, config, mix)?;
        years.push(projection);
        state = next;
    }
    Ok((years, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::buckets::reissuance_mix;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn config(start: i32, horizon: i32) -> ProjectionConfig {
        ProjectionConfig {
            start_year: start,
            horizon_year: horizon,
            gdp_growth_pct: 5.0,
            deficit_pct_gdp: 4.0,
            initial_gdp: 1000.0,
            tenor_rates: TenorRates::flat(5.0)
                .with_rate(Tenor::OneYear, 3.0)
                .with_rate(Tenor::TwoYear, 3.5)
                .with_rate(Tenor::ThirtyYear, 4.5),
            amount_scale: 1.0,
            security_classes: Vec::new(),
        }
    }

    fn sample() -> Vec<Instrument> {
        vec![
            Instrument::new("A", date(2020, 1, 1), date(2021, 1, 1), Some(100.0), Some(2.0)),
            Instrument::new("B", date(2020, 1, 1), date(2022, 1, 1), Some(200.0), Some(3.0)),
        ]
    }

    #[test]
    fn one_year_interest() {
        assert_relative_eq!(total_outstanding_interest(&sample()), 8.0);
    }

    #[test]
    fn interest_skips_incomplete_records() {
        let mut instruments = sample();
        instruments.push(Instrument::new("C", None, None, None, Some(9.0)));
        assert_relative_eq!(total_outstanding_interest(&instruments), 8.0);
        assert_relative_eq!(total_debt(&instruments), 300.0);
    }

    #[test]
    fn matured_instrument_is_redated_and_rerated() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let state = SimulationState::new(2020, 1000.0, instruments);
        let (next, year) = advance(state, &config(2020, 2020), &mix).unwrap();

        // A matures 2021-01-01, which is not before the 2021 cutoff.
        assert_eq!(year.matured_count, 0);

        let (next, year) = advance(next, &config(2020, 2021), &mix).unwrap();
        assert_eq!(year.year, 2021);
        assert_eq!(year.matured_count, 1);
        let a = &next.instruments[0];
        // 366 days (leap year) lands in the 2-year bucket.
        assert_eq!(a.issued_date, date(2020, 12, 31));
        assert_eq!(a.maturity_date, date(2022, 1, 2));
        assert_eq!(a.yield_pct, Some(3.5));
        assert_eq!(a.issued_amount, Some(100.0));
    }

    #[test]
    fn negative_length_rolls_thirty_years() {
        let instruments = vec![Instrument::new("N", date(2020, 6, 11), date(2020, 6, 1), Some(10.0), Some(1.0))];
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let state = SimulationState::new(2020, 1000.0, instruments);
        let (next, _) = advance(state, &config(2020, 2020), &mix).unwrap();
        let n = &next.instruments[0];
        assert_eq!(n.maturity_date, date(2020, 6, 1).map(|d| d + Duration::days(10950)));
        assert_eq!(n.yield_pct, Some(4.5));
    }

    #[test]
    fn each_tick_adds_eight_instruments() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let cfg = config(2021, 2025);
        let mut state = SimulationState::new(2021, 1000.0, instruments);
        for _ in cfg.years() {
            let before = state.instruments.len();
            let (next, _) = advance(state, &cfg, &mix).unwrap();
            assert_eq!(next.instruments.len(), before + 8);
            state = next;
        }
    }

    #[test]
    fn new_debt_follows_gdp_and_mix() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let state = SimulationState::new(2021, 1000.0, instruments);
        let (next, year) = advance(state, &config(2021, 2021), &mix).unwrap();

        assert_relative_eq!(year.new_debt, 40.0);
        assert_relative_eq!(next.gdp, 1050.0);

        let issued: Vec<_> = next.instruments[2..].to_vec();
        assert_eq!(issued.len(), 8);
        let one_year = &issued[0];
        assert_eq!(one_year.issued_date, date(2022, 1, 1));
        assert_eq!(one_year.maturity_date, date(2023, 1, 1));
        assert_eq!(one_year.yield_pct, Some(3.0));
        let thirty = &issued[7];
        assert_eq!(thirty.maturity_date, date(2052, 1, 1));
        assert_relative_eq!(issued.iter().filter_map(|i| i.issued_amount).sum::<f64>(), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn reports_ratios_to_gdp() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let state = SimulationState::new(2021, 1000.0, instruments);
        let (next, year) = advance(state, &config(2021, 2022), &mix).unwrap();

        assert_relative_eq!(year.debt_to_gdp, 0.3, epsilon = 1e-12);
        assert_relative_eq!(year.interest_pct_gdp, 0.8, epsilon = 1e-12);
        assert_relative_eq!(year.primary_deficit_pct_gdp, 4.0, epsilon = 1e-12);

        // Next year carries this year's 40 of new debt over 1050 of GDP.
        let (_, year) = advance(next, &config(2021, 2022), &mix).unwrap();
        assert_relative_eq!(year.debt_to_gdp, 340.0 / 1050.0, epsilon = 1e-12);
    }

    #[test]
    fn non_positive_gdp_fails_the_tick() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let state = SimulationState::new(2021, 0.0, instruments);
        assert!(matches!(
            advance(state, &config(2021, 2021), &mix),
            Err(ProjectionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn gdp_grows_every_tick() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let (years, end) = run(instruments, &config(2021, 2030), &mix).unwrap();
        assert_eq!(years.len(), 10);
        for pair in years.windows(2) {
            assert!(pair[1].gdp > pair[0].gdp);
        }
        assert!(end.gdp > years.last().unwrap().gdp);
        assert_eq!(end.year, 2031);
    }

    #[test]
    fn missing_rate_fails_the_tick() {
        let instruments = sample();
        let (_, mix) = reissuance_mix(&instruments).unwrap();
        let mut cfg = config(2021, 2021);
        cfg.tenor_rates = TenorRates::parse("1=5.0").unwrap();
        let state = SimulationState::new(2021, 1000.0, instruments);
        assert!(matches!(
            advance(state, &cfg, &mix),
            Err(ProjectionError::MissingTenorRate { .. })
        ));
    }

    #[test]
    fn empty_set_is_rejected() {
        let (_, mix) = reissuance_mix(&sample()).unwrap();
        assert!(matches!(
            run(Vec::new(), &config(2021, 2022), &mix),
            Err(ProjectionError::EmptyInput { .. })
        ));
    }

    #[test]
    fn runs_are_deterministic() {
        let (_, mix) = reissuance_mix(&sample()).unwrap();
        let first = run(sample(), &config(2021, 2040), &mix).unwrap();
        let second = run(sample(), &config(2021, 2040), &mix).unwrap();
        assert_eq!(first, second);
    }
}
