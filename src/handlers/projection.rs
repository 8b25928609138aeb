// src/handlers/projection.rs
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::AppState;
use crate::config::ProjectionConfig;
use crate::models::Instrument;
use crate::services::projection::{distribution, project, scale_amounts};
use crate::services::simulation::{total_debt, total_outstanding_interest};

#[derive(Serialize)]
struct SummaryResponse {
    instrument_count: usize,
    total_debt: f64,
    one_year_interest: f64,
}

/// The canonical set in the same units `project` reports in.
fn scaled_instruments(state: &AppState) -> Vec<Instrument> {
    scale_amounts(state.instruments.clone(), state.config.amount_scale)
}

fn run_projection(state: &AppState, config: &ProjectionConfig) -> Result<Json, Rejection> {
    let report = project(&state.instruments, config).map_err(|e| {
        error!("Projection failed: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;
    Ok(warp::reply::json(&report))
}

pub async fn get_projection(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request for projection with the configured scenario");
    run_projection(&state, &state.config)
}

pub async fn post_projection(config: ProjectionConfig, state: Arc<AppState>) -> Result<Json, Rejection> {
    info!(
        "Handling projection request for {}-{} at {}% growth, {}% deficit",
        config.start_year, config.horizon_year, config.gdp_growth_pct, config.deficit_pct_gdp
    );
    run_projection(&state, &config)
}

pub async fn get_distribution(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request for tenor distribution");

    let report = distribution(&scaled_instruments(&state)).map_err(|e| {
        error!("Distribution failed: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;

    Ok(warp::reply::json(&report))
}

pub async fn get_summary(state: Arc<AppState>) -> Result<Json, Rejection> {
    info!("Handling request for instrument summary");

    let instruments = scaled_instruments(&state);
    let response = SummaryResponse {
        instrument_count: instruments.len(),
        total_debt: total_debt(&instruments),
        one_year_interest: total_outstanding_interest(&instruments),
    };

    Ok(warp::reply::json(&response))
}
