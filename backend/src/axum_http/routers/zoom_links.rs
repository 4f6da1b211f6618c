use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use crates::{
    domain::{
        repositories::{
            messaging::MessageSender,
            zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
        },
        value_objects::zoom_links::{AssignDailyLinkModel, SyncZoomLinksModel},
    },
    infra::{
        db::repositories::zoom_links::{DailyZoomLinkPostgres, ZoomLinkPostgres},
        messaging::telegram_bot::TelegramBotClient,
    },
};
use serde::Deserialize;
use tracing::warn;

use crate::{
    auth::AuthUser,
    axum_http::{error_responses::error_response, routers::today},
    dashboard::{events::DashboardEvent, store::DashboardStore},
    usecases::{
        daily_links::DailyLinkUseCase,
        telegram_send::{TelegramSendOutcome, TelegramSendUseCase},
    },
};

pub type PostgresDailyLinks = DailyLinkUseCase<ZoomLinkPostgres, DailyZoomLinkPostgres>;
pub type PostgresTelegramSend =
    TelegramSendUseCase<ZoomLinkPostgres, DailyZoomLinkPostgres, TelegramBotClient>;

pub struct ZoomLinkRouteState<Z, D, S>
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
    telegram: Arc<TelegramSendUseCase<Z, D, S>>,
    store: Arc<DashboardStore>,
}

pub fn routes(
    daily_links: Arc<PostgresDailyLinks>,
    telegram: Arc<PostgresTelegramSend>,
    store: Arc<DashboardStore>,
) -> Router {
    router(daily_links, telegram, store)
}

/// The manual Telegram route only exists while auto-send is enabled.
pub fn router<Z, D, S>(
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
    telegram: Arc<TelegramSendUseCase<Z, D, S>>,
    store: Arc<DashboardStore>,
) -> Router
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    let telegram_enabled = telegram.is_enabled();
    let mut router = Router::new()
        .route("/", get(list_pool::<Z, D, S>).put(sync_pool::<Z, D, S>))
        .route(
            "/daily",
            get(daily_link::<Z, D, S>).put(assign_daily_link::<Z, D, S>),
        );

    if telegram_enabled {
        router = router.route("/daily/telegram", post(send_telegram::<Z, D, S>));
    }

    router.with_state(Arc::new(ZoomLinkRouteState {
        daily_links,
        telegram,
        store,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

pub async fn list_pool<Z, D, S>(
    State(state): State<Arc<ZoomLinkRouteState<Z, D, S>>>,
    _auth: AuthUser,
) -> Response
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    match state.daily_links.list_pool().await {
        Ok(links) => Json(links).into_response(),
        Err(err) => error_response("zoom_links", err),
    }
}

pub async fn sync_pool<Z, D, S>(
    State(state): State<Arc<ZoomLinkRouteState<Z, D, S>>>,
    _auth: AuthUser,
    Json(request): Json<SyncZoomLinksModel>,
) -> Response
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    let links = match state.daily_links.sync_pool(&request.links).await {
        Ok(links) => links,
        Err(err) => return error_response("zoom_links", err),
    };

    state
        .store
        .apply(DashboardEvent::ZoomLinksReplaced(links.clone()))
        .await;

    let today = today();
    match state.daily_links.ensure_with_pool(today, &links).await {
        Ok(daily_link) => {
            state
                .store
                .apply(DashboardEvent::DailyLinkResolved(daily_link))
                .await
        }
        Err(err) => warn!(scheduled_for = %today, error = %err, "zoom_links: could not refresh today's link"),
    }

    Json(links).into_response()
}

pub async fn daily_link<Z, D, S>(
    State(state): State<Arc<ZoomLinkRouteState<Z, D, S>>>,
    _auth: AuthUser,
    Query(query): Query<DateQuery>,
) -> Response
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    let today = today();
    let date = query.date.unwrap_or(today);
    match state.daily_links.ensure_for_date(date).await {
        Ok(daily_link) => {
            if date == today {
                state
                    .store
                    .apply(DashboardEvent::DailyLinkResolved(daily_link.clone()))
                    .await;
            }
            Json(daily_link).into_response()
        }
        Err(err) => error_response("zoom_links", err),
    }
}

pub async fn assign_daily_link<Z, D, S>(
    State(state): State<Arc<ZoomLinkRouteState<Z, D, S>>>,
    _auth: AuthUser,
    Json(request): Json<AssignDailyLinkModel>,
) -> Response
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    let today = today();
    let date = request.date.unwrap_or(today);
    match state
        .daily_links
        .assign_for_date(request.zoom_link_id, date)
        .await
    {
        Ok(details) => {
            if date == today {
                state
                    .store
                    .apply(DashboardEvent::DailyLinkResolved(Some(details.clone())))
                    .await;
            }
            Json(details).into_response()
        }
        Err(err) => error_response("zoom_links", err),
    }
}

pub async fn send_telegram<Z, D, S>(
    State(state): State<Arc<ZoomLinkRouteState<Z, D, S>>>,
    _auth: AuthUser,
    Query(query): Query<DateQuery>,
) -> Response
where
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
    S: MessageSender + Send + Sync + 'static,
{
    let today = today();
    let date = query.date.unwrap_or(today);
    match state.telegram.send_daily_link(date).await {
        Ok(outcome) => {
            if let (TelegramSendOutcome::Sent(details), true) = (&outcome, date == today) {
                state
                    .store
                    .apply(DashboardEvent::DailyLinkResolved(Some(details.clone())))
                    .await;
            }
            Json(outcome).into_response()
        }
        Err(err) => error_response("zoom_links", err),
    }
}
