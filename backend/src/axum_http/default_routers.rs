use axum::{http::StatusCode, response::IntoResponse};
use tracing::debug;

use crate::axum_http::error_responses::ErrorResponse;

pub async fn not_found() -> impl IntoResponse {
    debug!("backend router: not_found handler invoked");
    ErrorResponse::new(StatusCode::NOT_FOUND, "NOT_FOUND")
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK").into_response()
}
