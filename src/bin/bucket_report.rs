// src/bin/bucket_report.rs
use anyhow::Context;
use dotenv::dotenv;
use std::env;

use treasury_debt_projection::config::ProjectionConfig;
use treasury_debt_projection::models::Tenor;
use treasury_debt_projection::services::{buckets, ingest, projection};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("TREASURY_DATA_PATH").ok())
        .context("usage: bucket_report <extract.csv> (or set TREASURY_DATA_PATH)")?;

    let config = ProjectionConfig::from_env()?;
    let rows = ingest::read_securities_from_path(&path)?;
    let instruments = projection::prepare_instruments(rows, &config)?;
    let report = projection::distribution(&instruments)?;

    println!("Tenor distribution of {} instruments", report.instrument_count);
    for (tenor, total) in report.totals.iter() {
        println!("{:>4} {:>18.2} {:>8.4}", tenor.to_string(), total, report.mix.share(tenor)?);
    }
    println!("no data: {}", report.totals.no_data);

    println!();
    println!("Maturing amount by year");
    let schedule = buckets::maturity_schedule(&instruments);
    let mut years: Vec<i32> = schedule.keys().map(|(year, _)| *year).collect();
    years.dedup();
    print!("{:>6}", "Year");
    for tenor in Tenor::ALL {
        print!(" {:>12}", tenor.to_string());
    }
    println!();
    for year in years {
        print!("{:>6}", year);
        for tenor in Tenor::ALL {
            print!(" {:>12.2}", schedule.get(&(year, tenor)).copied().unwrap_or(0.0));
        }
        println!();
    }
    Ok(())
}
