use std::{convert::Infallible, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use crates::domain::{
    repositories::{
        admin_settings::AdminSettingsRepository,
        applicants::ApplicantRepository,
        members::MemberRepository,
        zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
    },
    value_objects::members::ListMembersQuery,
};
use futures_util::{Stream, stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::error_response, routers::today},
    dashboard::{events::DashboardEvent, store::DashboardStore},
    usecases::dashboard::DashboardUseCase,
};

pub struct DashboardRouteState<A, M, Z, D, S>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    usecase: Arc<DashboardUseCase<A, M, Z, D, S>>,
    store: Arc<DashboardStore>,
}

pub fn routes<A, M, Z, D, S>(
    usecase: Arc<DashboardUseCase<A, M, Z, D, S>>,
    store: Arc<DashboardStore>,
) -> Router
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(load::<A, M, Z, D, S>))
        .route("/events", get(events::<A, M, Z, D, S>))
        .with_state(Arc::new(DashboardRouteState { usecase, store }))
}

/// Reloads everything from the database, then answers from the store.
pub async fn load<A, M, Z, D, S>(
    State(state): State<Arc<DashboardRouteState<A, M, Z, D, S>>>,
    _auth: AuthUser,
    Query(query): Query<ListMembersQuery>,
) -> Response
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    match state.usecase.load(today()).await {
        Ok(loaded) => {
            state
                .store
                .apply(DashboardEvent::Loaded(Box::new(loaded)))
                .await;
            Json(state.store.snapshot(&query).await).into_response()
        }
        Err(err) => error_response("dashboard", err),
    }
}

pub async fn events<A, M, Z, D, S>(
    State(state): State<Arc<DashboardRouteState<A, M, Z, D, S>>>,
    auth: AuthUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    A: ApplicantRepository + Send + Sync + 'static,
    M: MemberRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    info!(user_id = %auth.user_id, "dashboard: event stream opened");
    Sse::new(event_stream(state.store.subscribe())).keep_alive(KeepAlive::default())
}

/// Slow clients that fall behind skip ahead instead of closing.
pub fn event_stream(
    receiver: broadcast::Receiver<DashboardEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = match Event::default().event(event.kind()).json_data(&event) {
                        Ok(sse) => sse,
                        Err(err) => {
                            warn!(kind = event.kind(), error = %err, "dashboard: failed to encode event");
                            continue;
                        }
                    };
                    return Some((Ok(sse), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "dashboard: event stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn stream_yields_events_applied_after_subscribing() {
        let store = DashboardStore::new();
        let stream = event_stream(store.subscribe());
        tokio::pin!(stream);

        store
            .apply(DashboardEvent::ApplicantDeleted { id: Uuid::new_v4() })
            .await;

        let next = stream.next().await;
        assert!(matches!(next, Some(Ok(_))));
    }
}
