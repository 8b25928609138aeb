//! HTTP surface tests driven through `warp::test`.

use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

use treasury_debt_projection::handlers::AppState;
use treasury_debt_projection::routes::routes;
use treasury_debt_projection::{Instrument, ProjectionConfig, TenorRates};

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn scenario() -> ProjectionConfig {
    ProjectionConfig {
        start_year: 2023,
        horizon_year: 2025,
        gdp_growth_pct: 6.0,
        deficit_pct_gdp: 6.0,
        initial_gdp: 1000.0,
        tenor_rates: TenorRates::flat(5.0),
        amount_scale: 1.0,
        security_classes: Vec::new(),
    }
}

fn state(instruments: Vec<Instrument>) -> Arc<AppState> {
    Arc::new(AppState {
        instruments,
        config: scenario(),
    })
}

fn sample() -> Vec<Instrument> {
    vec![
        Instrument::new("A", date(2020, 1, 1), date(2021, 1, 1), Some(100.0), Some(2.0)),
        Instrument::new("B", date(2020, 1, 1), date(2022, 1, 1), Some(200.0), Some(3.0)),
    ]
}

#[tokio::test]
async fn projection_uses_configured_scenario() {
    let api = routes(state(sample()));
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/projection")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 200);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    let years = body["years"].as_array().unwrap();
    assert_eq!(years.len(), 3);
    assert_eq!(years[0]["year"], 2023);
    assert_eq!(years[0]["total_interest"], 8.0);
    assert_eq!(body["final_instrument_count"], 2 + 3 * 8);
}

#[tokio::test]
async fn posted_config_overrides_scenario() {
    let api = routes(state(sample()));
    let mut config = scenario();
    config.horizon_year = 2030;

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/projection")
        .json(&config)
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 200);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["years"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn inverted_horizon_is_unprocessable() {
    let api = routes(state(sample()));
    let mut config = scenario();
    config.horizon_year = 2000;

    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/projection")
        .json(&config)
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 422);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("horizon year 2000"));
}

#[tokio::test]
async fn distribution_on_empty_set_is_unprocessable() {
    let api = routes(state(Vec::new()));
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/distribution")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 422);
}

#[tokio::test]
async fn distribution_reports_shares() {
    let api = routes(state(sample()));
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/distribution")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 200);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["instrument_count"], 2);
    assert_eq!(body["totals"]["no_data"], 0);
}

#[tokio::test]
async fn summary_reports_current_interest() {
    let api = routes(state(sample()));
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/instruments/summary")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 200);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["instrument_count"], 2);
    assert_eq!(body["total_debt"], 300.0);
    assert_eq!(body["one_year_interest"], 8.0);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let api = routes(state(sample()));
    let resp = warp::test::request()
        .method("GET")
        .path("/api/v1/nothing")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn summary_and_projection_share_units() {
    let mut config = scenario();
    config.amount_scale = 10.0;
    let api = routes(Arc::new(AppState {
        instruments: sample(),
        config,
    }));

    let summary = warp::test::request()
        .method("GET")
        .path("/api/v1/instruments/summary")
        .reply(&api)
        .await;
    let summary: Value = serde_json::from_slice(summary.body()).unwrap();

    let projection = warp::test::request()
        .method("GET")
        .path("/api/v1/projection")
        .reply(&api)
        .await;
    let projection: Value = serde_json::from_slice(projection.body()).unwrap();
    let first_year = &projection["years"][0];

    assert_eq!(summary["one_year_interest"], 80.0);
    assert_eq!(summary["one_year_interest"], first_year["total_interest"]);
    assert_eq!(summary["total_debt"], first_year["total_debt"]);

    let distribution = warp::test::request()
        .method("GET")
        .path("/api/v1/distribution")
        .reply(&api)
        .await;
    let distribution: Value = serde_json::from_slice(distribution.body()).unwrap();
    assert_eq!(distribution["mix"], projection["mix"]);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let api = routes(state(sample()));
    let resp = warp::test::request()
        .method("POST")
        .path("/api/v1/projection")
        .header("content-type", "application/json")
        .body("{\"start_year\": \"soon\"")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 400);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let api = routes(state(sample()));
    let resp = warp::test::request()
        .method("DELETE")
        .path("/api/v1/projection")
        .reply(&api)
        .await;

    assert_eq!(resp.status(), 405);
    let body: Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(body["error"], "Method Not Allowed");
}
