use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{member_activity::MemberActivityRepository, members::MemberRepository},
        value_objects::{
            capabilities::SchemaCapabilities,
            members::{ConfirmModel, DropMemberModel, ListMembersQuery},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{member_activity::MemberActivityPostgres, members::MemberPostgres},
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::{
        error_responses::{ErrorResponse, error_response},
        routers::today,
    },
    dashboard::{events::DashboardEvent, store::DashboardStore},
    usecases::{member_activity::MemberActivityUseCase, members::MemberUseCase},
};

pub struct MemberRouteState<M, A>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    members: Arc<MemberUseCase<M>>,
    activity: Arc<MemberActivityUseCase<M, A>>,
    store: Arc<DashboardStore>,
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    capabilities: SchemaCapabilities,
    store: Arc<DashboardStore>,
) -> Router {
    let member_repository = Arc::new(MemberPostgres::new(Arc::clone(&db_pool), capabilities));
    let activity_repository = Arc::new(MemberActivityPostgres::new(Arc::clone(&db_pool)));

    router(
        Arc::new(MemberUseCase::new(Arc::clone(&member_repository))),
        Arc::new(MemberActivityUseCase::new(
            member_repository,
            activity_repository,
        )),
        store,
    )
}

pub fn router<M, A>(
    members: Arc<MemberUseCase<M>>,
    activity: Arc<MemberActivityUseCase<M, A>>,
    store: Arc<DashboardStore>,
) -> Router
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list::<M, A>))
        .route("/:member_id/activity", get(activity_view::<M, A>))
        .route("/:member_id/drop", post(drop_member::<M, A>))
        .route("/:member_id/restore", post(restore::<M, A>))
        .with_state(Arc::new(MemberRouteState {
            members,
            activity,
            store,
        }))
}

pub async fn list<M, A>(
    State(state): State<Arc<MemberRouteState<M, A>>>,
    _auth: AuthUser,
    Query(query): Query<ListMembersQuery>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    match state.members.list(&query).await {
        Ok(members) => Json(members).into_response(),
        Err(err) => error_response("members", err),
    }
}

pub async fn activity_view<M, A>(
    State(state): State<Arc<MemberRouteState<M, A>>>,
    _auth: AuthUser,
    Path(member_id): Path<Uuid>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    match state.activity.view(member_id, today()).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => error_response("members", err),
    }
}

pub async fn drop_member<M, A>(
    State(state): State<Arc<MemberRouteState<M, A>>>,
    _auth: AuthUser,
    Path(member_id): Path<Uuid>,
    Json(request): Json<DropMemberModel>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    if !request.confirm {
        return ErrorResponse::confirmation_required().into_response();
    }

    match state.members.drop_member(member_id, &request.reason).await {
        Ok(member) => {
            state
                .store
                .apply(DashboardEvent::MemberUpserted(member.clone()))
                .await;
            Json(member).into_response()
        }
        Err(err) => error_response("members", err),
    }
}

pub async fn restore<M, A>(
    State(state): State<Arc<MemberRouteState<M, A>>>,
    _auth: AuthUser,
    Path(member_id): Path<Uuid>,
    Json(request): Json<ConfirmModel>,
) -> Response
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
{
    if !request.confirm {
        return ErrorResponse::confirmation_required().into_response();
    }

    match state.members.restore(member_id).await {
        Ok(member) => {
            state
                .store
                .apply(DashboardEvent::MemberUpserted(member.clone()))
                .await;
            Json(member).into_response()
        }
        Err(err) => error_response("members", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use crates::domain::repositories::{
        member_activity::MockMemberActivityRepository, members::MockMemberRepository,
    };
    use serde_json::json;

    use crate::axum_http::routers::test_support::{assert_needs_confirmation, send_json};

    fn untouched_router() -> Router {
        let mut member_repo = MockMemberRepository::new();
        member_repo.expect_update_status().never();
        member_repo.expect_find_by_id().never();
        let member_repo = Arc::new(member_repo);

        router(
            Arc::new(MemberUseCase::new(Arc::clone(&member_repo))),
            Arc::new(MemberActivityUseCase::new(
                member_repo,
                Arc::new(MockMemberActivityRepository::new()),
            )),
            Arc::new(DashboardStore::new()),
        )
    }

    #[tokio::test]
    async fn drop_without_confirm_is_refused() {
        let uri = format!("/{}/drop", Uuid::new_v4());

        let response = send_json(
            untouched_router(),
            Method::POST,
            &uri,
            json!({ "reason": "Bo cuoc", "confirm": false }),
        )
        .await;

        assert_needs_confirmation(&response);
    }

    #[tokio::test]
    async fn restore_without_confirm_is_refused() {
        let uri = format!("/{}/restore", Uuid::new_v4());

        let response = send_json(untouched_router(), Method::POST, &uri, json!({})).await;

        assert_needs_confirmation(&response);
    }
}
