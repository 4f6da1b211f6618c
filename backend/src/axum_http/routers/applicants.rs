use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            applicants::ApplicantRepository, identity::IdentityProvider,
            members::MemberRepository,
        },
        value_objects::{
            capabilities::SchemaCapabilities, enums::applicant_statuses::ApplicantStatus,
            members::ConfirmModel,
        },
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{applicants::ApplicantPostgres, members::MemberPostgres},
        },
        identity::supabase_auth::SupabaseAuthClient,
    },
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{ErrorResponse, error_response},
    dashboard::{events::DashboardEvent, store::DashboardStore},
    usecases::applicants::ApplicantUseCase,
};

pub struct ApplicantRouteState<A, M, I>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    usecase: Arc<ApplicantUseCase<A, M, I>>,
    store: Arc<DashboardStore>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    capabilities: SchemaCapabilities,
    identity: Arc<SupabaseAuthClient>,
    password_reset_redirect: Option<String>,
    store: Arc<DashboardStore>,
) -> Router {
    let applicant_repository = ApplicantPostgres::new(Arc::clone(&db_pool), capabilities);
    let member_repository = MemberPostgres::new(Arc::clone(&db_pool), capabilities);
    let applicant_usecase = ApplicantUseCase::new(
        Arc::new(applicant_repository),
        Arc::new(member_repository),
        identity,
        password_reset_redirect,
    );

    router(Arc::new(applicant_usecase), store)
}

pub fn router<A, M, I>(usecase: Arc<ApplicantUseCase<A, M, I>>, store: Arc<DashboardStore>) -> Router
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<A, M, I>))
        .route("/bulk-approve", post(bulk_approve::<A, M, I>))
        .route("/:applicant_id/approve", post(approve::<A, M, I>))
        .route("/:applicant_id/reject", post(reject::<A, M, I>))
        .with_state(Arc::new(ApplicantRouteState { usecase, store }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListApplicantsQuery {
    #[serde(default)]
    pub status: ApplicantStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkApproveRequest {
    pub applicant_ids: Vec<Uuid>,
}

pub async fn list<A, M, I>(
    State(state): State<Arc<ApplicantRouteState<A, M, I>>>,
    _auth: AuthUser,
    Query(query): Query<ListApplicantsQuery>,
) -> Response
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    match state.usecase.list(query.status).await {
        Ok(applicants) => Json(applicants).into_response(),
        Err(err) => error_response("applicants", err),
    }
}

pub async fn approve<A, M, I>(
    State(state): State<Arc<ApplicantRouteState<A, M, I>>>,
    _auth: AuthUser,
    Path(applicant_id): Path<Uuid>,
) -> Response
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    match state.usecase.approve(applicant_id).await {
        Ok(member) => {
            state
                .store
                .apply(DashboardEvent::ApplicantsApproved {
                    applicant_ids: vec![applicant_id],
                    members: vec![member.clone()],
                })
                .await;
            Json(member).into_response()
        }
        Err(err) => error_response("applicants", err),
    }
}

pub async fn bulk_approve<A, M, I>(
    State(state): State<Arc<ApplicantRouteState<A, M, I>>>,
    _auth: AuthUser,
    Json(request): Json<BulkApproveRequest>,
) -> Response
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    let result = state.usecase.bulk_approve(request.applicant_ids).await;

    if !result.succeeded.is_empty() {
        state
            .store
            .apply(DashboardEvent::ApplicantsApproved {
                applicant_ids: result.succeeded.iter().map(|item| item.applicant_id).collect(),
                members: result.succeeded.iter().map(|item| item.member.clone()).collect(),
            })
            .await;
    }

    Json(result).into_response()
}

pub async fn reject<A, M, I>(
    State(state): State<Arc<ApplicantRouteState<A, M, I>>>,
    _auth: AuthUser,
    Path(applicant_id): Path<Uuid>,
    Json(request): Json<ConfirmModel>,
) -> Response
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    I: IdentityProvider + Send + Sync + 'static,
{
    if !request.confirm {
        return ErrorResponse::confirmation_required().into_response();
    }

    match state.usecase.reject(applicant_id).await {
        Ok(applicant) => {
            state
                .store
                .apply(DashboardEvent::ApplicantUpdated(applicant.clone()))
                .await;
            Json(applicant).into_response()
        }
        Err(err) => error_response("applicants", err),
    }
}
