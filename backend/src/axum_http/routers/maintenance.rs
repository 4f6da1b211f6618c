use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::{Duration, NaiveDate};
use crates::domain::repositories::{
    admin_settings::AdminSettingsRepository, member_activity::MemberActivityRepository,
    members::MemberRepository,
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    axum_http::{
        error_responses::{ErrorResponse, error_response},
        routers::today,
    },
    dashboard::{events::DashboardEvent, store::DashboardStore},
    usecases::inactivity_sweep::RecordedInactivitySweep,
};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_BACKEND/api/v1/maintenance/inactivity-sweep" \
//     -H "Authorization: Bearer $ACCESS_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"date":"2024-09-10","confirm":true}'

pub struct MaintenanceRouteState<M, A, S>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    sweep: Arc<RecordedInactivitySweep<M, A, S>>,
    store: Arc<DashboardStore>,
}

pub fn routes<M, A, S>(
    sweep: Arc<RecordedInactivitySweep<M, A, S>>,
    store: Arc<DashboardStore>,
) -> Router
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/inactivity-sweep", post(inactivity_sweep::<M, A, S>))
        .with_state(Arc::new(MaintenanceRouteState { sweep, store }))
}

#[derive(Debug, Deserialize)]
pub struct InactivitySweepRequest {
    /// Day to check; yesterday when omitted.
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub confirm: bool,
}

pub async fn inactivity_sweep<M, A, S>(
    State(state): State<Arc<MaintenanceRouteState<M, A, S>>>,
    _auth: AuthUser,
    Json(request): Json<InactivitySweepRequest>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    if !request.confirm {
        return ErrorResponse::confirmation_required().into_response();
    }

    let date = request.date.unwrap_or_else(|| today() - Duration::days(1));
    match state.sweep.run(date).await {
        Ok(result) => {
            state
                .store
                .apply_all(
                    result
                        .dropped
                        .iter()
                        .cloned()
                        .map(DashboardEvent::MemberUpserted),
                )
                .await;
            Json(result).into_response()
        }
        Err(err) => error_response("maintenance", err),
    }
}
