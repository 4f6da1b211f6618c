use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    axum_http::error_responses::ErrorResponse,
    dashboard::{change_feed::DatabaseChange, store::DashboardStore},
};

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

// Configure in Supabase: Database -> Webhooks, HTTP POST to
//   <backend>/api/v1/webhooks/database
// with header `x-webhook-secret: $DATABASE_WEBHOOK_SECRET` for the
// `applicants` and `members` tables.

pub struct WebhookRouteState {
    secret: Option<String>,
    store: Arc<DashboardStore>,
}

pub fn routes(secret: Option<String>, store: Arc<DashboardStore>) -> Router {
    Router::new()
        .route("/database", post(database_change))
        .with_state(Arc::new(WebhookRouteState { secret, store }))
}

pub async fn database_change(
    State(state): State<Arc<WebhookRouteState>>,
    headers: HeaderMap,
    Json(change): Json<DatabaseChange>,
) -> Response {
    let Some(expected) = state.secret.as_deref() else {
        return ErrorResponse::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "database webhook secret is not configured",
        )
        .into_response();
    };

    let authorized = headers
        .get(WEBHOOK_SECRET_HEADER)
        .is_some_and(|provided| secrets_match(provided.as_bytes(), expected.as_bytes()));
    if !authorized {
        warn!("webhooks: rejected database change with bad secret");
        return ErrorResponse::new(StatusCode::UNAUTHORIZED, "unauthorized").into_response();
    }

    let table = change.table.clone();
    match change.into_event() {
        Ok(Some(event)) => {
            info!(%table, kind = event.kind(), "webhooks: database change applied");
            state.store.apply(event).await;
            Json(json!({ "applied": true })).into_response()
        }
        Ok(None) => {
            debug!(%table, "webhooks: change ignored");
            Json(json!({ "applied": false })).into_response()
        }
        Err(err) => {
            warn!(%table, error = %err, "webhooks: malformed database change");
            ErrorResponse::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
        }
    }
}

// Runs in time independent of where the inputs differ.
fn secrets_match(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
