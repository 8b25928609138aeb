// src/bin/run_projection.rs
use anyhow::Context;
use dotenv::dotenv;
use log::info;
use std::env;

use treasury_debt_projection::config::ProjectionConfig;
use treasury_debt_projection::services::{ingest, projection};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("TREASURY_DATA_PATH").ok())
        .context("usage: run_projection <extract.csv> (or set TREASURY_DATA_PATH)")?;

    let config = ProjectionConfig::from_env()?;
    let rows = ingest::read_securities_from_path(&path)?;
    let instruments = projection::prepare_instruments(rows, &config)?;
    info!("Running projection over {} instruments", instruments.len());

    let report = projection::project(&instruments, &config)?;

    println!(
        "{:>6} {:>18} {:>20} {:>10} {:>18} {:>8}",
        "Year", "GDP", "Debt", "Debt/GDP", "Interest", "% GDP"
    );
    for year in &report.years {
        println!(
            "{:>6} {:>18.2} {:>20.2} {:>10.3} {:>18.2} {:>8.3}",
            year.year, year.gdp, year.total_debt, year.debt_to_gdp, year.total_interest, year.interest_pct_gdp
        );
    }
    println!(
        "Debt at end of {}: {:.2} across {} instruments",
        config.horizon_year, report.final_total_debt, report.final_instrument_count
    );
    Ok(())
}
