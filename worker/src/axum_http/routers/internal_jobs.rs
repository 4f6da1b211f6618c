use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use backend::usecases::{
    daily_links::DailyLinkUseCase,
    inactivity_sweep::{InactivitySweepResult, RecordedInactivitySweep},
};
use chrono::{Days, Local, NaiveDate};
use crates::domain::repositories::{
    admin_settings::AdminSettingsRepository,
    member_activity::MemberActivityRepository,
    members::MemberRepository,
    zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/jobs/inactivity-sweep" \
//     -H "Authorization: Bearer $INTERNAL_WORKER_TOKEN" \
//     -H "Content-Type: application/json" \
//     -d '{"date":"2024-09-09"}'

pub struct InternalJobsState<M, A, S, Z, D>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    token: Option<String>,
    sweep: Arc<RecordedInactivitySweep<M, A, S>>,
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
}

pub fn routes<M, A, S, Z, D>(
    token: Option<String>,
    sweep: Arc<RecordedInactivitySweep<M, A, S>>,
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
) -> Router
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/inactivity-sweep", post(inactivity_sweep::<M, A, S, Z, D>))
        .route("/daily-link", post(ensure_daily_link::<M, A, S, Z, D>))
        .with_state(Arc::new(InternalJobsState {
            token,
            sweep,
            daily_links,
        }))
}

#[derive(Debug, Default, Deserialize)]
pub struct InactivitySweepRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct InactivitySweepResponse {
    pub date: NaiveDate,
    pub scanned: usize,
    pub already_dropped: usize,
    pub not_started: usize,
    pub active: usize,
    pub dropped_ids: Vec<Uuid>,
    pub failed_ids: Vec<Uuid>,
}

impl From<InactivitySweepResult> for InactivitySweepResponse {
    fn from(result: InactivitySweepResult) -> Self {
        Self {
            date: result.date,
            scanned: result.scanned,
            already_dropped: result.already_dropped,
            not_started: result.not_started,
            active: result.active,
            dropped_ids: result.dropped.iter().map(|member| member.id).collect(),
            failed_ids: result.failed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyLinkRequest {
    pub date: Option<NaiveDate>,
}

pub async fn inactivity_sweep<M, A, S, Z, D>(
    State(state): State<Arc<InternalJobsState<M, A, S, Z, D>>>,
    headers: HeaderMap,
    payload: Option<Json<InactivitySweepRequest>>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    if let Err(status) = check_token(&headers, state.token.as_deref()) {
        return status.into_response();
    }

    let today = Local::now().date_naive();
    let date = payload
        .and_then(|Json(request)| request.date)
        .or_else(|| today.checked_sub_days(Days::new(1)))
        .unwrap_or(today);

    match state.sweep.run(date).await {
        Ok(result) => Json(InactivitySweepResponse::from(result)).into_response(),
        Err(err) => {
            error!(sweep_date = %date, error = ?err, "internal_jobs: inactivity sweep failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "inactivity sweep failed").into_response()
        }
    }
}

pub async fn ensure_daily_link<M, A, S, Z, D>(
    State(state): State<Arc<InternalJobsState<M, A, S, Z, D>>>,
    headers: HeaderMap,
    payload: Option<Json<DailyLinkRequest>>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    if let Err(status) = check_token(&headers, state.token.as_deref()) {
        return status.into_response();
    }

    let date = payload
        .and_then(|Json(request)| request.date)
        .unwrap_or_else(|| Local::now().date_naive());

    match state.daily_links.ensure_for_date(date).await {
        Ok(details) => Json(details).into_response(),
        Err(err) => {
            error!(scheduled_for = %date, error = ?err, "internal_jobs: ensure daily link failed");
            (err.status_code(), err.to_string()).into_response()
        }
    }
}

fn check_token(headers: &HeaderMap, expected: Option<&str>) -> Result<(), StatusCode> {
    let expected = expected.ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    authorize_bearer(headers, expected)
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{HeaderValue, Request},
    };
    use backend::usecases::{
        admin_settings::SettingsUseCase, inactivity_sweep::InactivitySweepUseCase,
    };
    use crates::domain::{
        repositories::{
            admin_settings::MockAdminSettingsRepository,
            member_activity::MockMemberActivityRepository,
            members::MockMemberRepository,
            zoom_links::{MockDailyZoomLinkRepository, MockZoomLinkRepository},
        },
        value_objects::{
            admin_settings::INACTIVITY_SWEEP_LAST_DATE_KEY, capabilities::SchemaCapabilities,
        },
    };
    use tower::ServiceExt;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_must_match() {
        assert!(authorize_bearer(&headers("Bearer s3cret"), "s3cret").is_ok());
        assert_eq!(
            authorize_bearer(&headers("Bearer nope"), "s3cret"),
            Err(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            authorize_bearer(&headers("s3cret"), "s3cret"),
            Err(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            authorize_bearer(&HeaderMap::new(), "s3cret"),
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[test]
    fn unconfigured_token_disables_the_routes() {
        assert_eq!(
            check_token(&headers("Bearer anything"), None),
            Err(StatusCode::SERVICE_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn manual_sweep_records_the_marker() {
        let mut members = MockMemberRepository::new();
        members.expect_list().times(1).returning(|_| Ok(Vec::new()));
        let mut settings_repo = MockAdminSettingsRepository::new();
        settings_repo.expect_list().returning(|_| Ok(Vec::new()));
        settings_repo
            .expect_upsert()
            .withf(|rows| {
                rows.len() == 1
                    && rows[0].key == INACTIVITY_SWEEP_LAST_DATE_KEY
                    && rows[0].value == "2024-09-09"
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let sweep = RecordedInactivitySweep::new(
            Arc::new(InactivitySweepUseCase::new(
                Arc::new(members),
                Arc::new(MockMemberActivityRepository::new()),
            )),
            Arc::new(SettingsUseCase::new(
                Arc::new(settings_repo),
                SchemaCapabilities::full(),
                "07:00".to_string(),
            )),
        );
        let daily_links = DailyLinkUseCase::new(
            Arc::new(MockZoomLinkRepository::new()),
            Arc::new(MockDailyZoomLinkRepository::new()),
            SchemaCapabilities::full(),
        );
        let app = routes(
            Some("s3cret".to_string()),
            Arc::new(sweep),
            Arc::new(daily_links),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/inactivity-sweep")
                    .header(AUTHORIZATION, "Bearer s3cret")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"date":"2024-09-09"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
