// src/routes.rs
use std::sync::Arc;
use warp::reject::Rejection;
use crate::handlers::projection::{get_distribution, get_projection, get_summary, post_projection};
use crate::handlers::AppState;
use log::info;

use std::convert::Infallible;
use warp::{Filter, Reply};
use crate::handlers::error::ApiError;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(body_error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = body_error.to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(state: Arc<AppState>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let projection_route = warp::path!("api" / "v1" / "projection")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_projection);

    let projection_override_route = warp::path!("api" / "v1" / "projection")
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(post_projection);

    let distribution_route = warp::path!("api" / "v1" / "distribution")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_distribution);

    let summary_route = warp::path!("api" / "v1" / "instruments" / "summary")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(get_summary);

    info!("All routes configured successfully.");

    projection_route
        .or(projection_override_route)
        .or(distribution_route)
        .or(summary_route)
        .recover(handle_rejection)
}
