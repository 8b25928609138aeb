use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use treasury_debt_projection::config::ProjectionConfig;
use treasury_debt_projection::handlers::AppState;
use treasury_debt_projection::routes;
use treasury_debt_projection::services::{ingest, projection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = ProjectionConfig::from_env().context("loading projection config")?;

    let data_path = env::var("TREASURY_DATA_PATH").unwrap_or_else(|_| {
        warn!("$TREASURY_DATA_PATH not set, defaulting to data/mspd.csv");
        "data/mspd.csv".to_string()
    });
    let rows = ingest::read_securities_from_path(&data_path)
        .with_context(|| format!("reading debt extract {}", data_path))?;
    let instruments = projection::prepare_instruments(rows, &config)?;

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str.parse().context("PORT must be a number")?;
    info!("Using PORT: {}", port);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let state = Arc::new(AppState { instruments, config });
    let api = routes::routes(state).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
