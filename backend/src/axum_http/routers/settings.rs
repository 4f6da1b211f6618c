use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use crates::domain::{
    entities::admin_settings::AdminSettingEntity,
    repositories::admin_settings::AdminSettingsRepository,
    value_objects::admin_settings::UpdateSettingsModel,
};
use serde::Serialize;
use tracing::warn;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{ErrorResponse, error_response},
    dashboard::{events::DashboardEvent, store::DashboardStore},
    usecases::admin_settings::{DashboardSettings, SettingsUseCase},
};

pub struct SettingsRouteState<S>
where
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    usecase: Arc<SettingsUseCase<S>>,
    store: Arc<DashboardStore>,
}

pub fn routes<S>(usecase: Arc<SettingsUseCase<S>>, store: Arc<DashboardStore>) -> Router
where
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(get_settings::<S>).put(update_settings::<S>))
        .with_state(Arc::new(SettingsRouteState { usecase, store }))
}

#[derive(Debug, Serialize)]
pub struct UpdateSettingsResponse {
    pub saved: Vec<AdminSettingEntity>,
    pub settings: DashboardSettings,
}

pub async fn get_settings<S>(
    State(state): State<Arc<SettingsRouteState<S>>>,
    _auth: AuthUser,
) -> Response
where
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    match state.usecase.dashboard_settings().await {
        Ok(settings) => Json(settings).into_response(),
        Err(err) => error_response("settings", err),
    }
}

pub async fn update_settings<S>(
    State(state): State<Arc<SettingsRouteState<S>>>,
    _auth: AuthUser,
    Json(request): Json<UpdateSettingsModel>,
) -> Response
where
    S: AdminSettingsRepository + Send + Sync + 'static,
{
    let request = request.normalize();
    if request.changes_program_start_date() && !request.confirm {
        return ErrorResponse::confirmation_required().into_response();
    }

    let saved = match state.usecase.update(request.settings).await {
        Ok(saved) => saved,
        Err(err) => return error_response("settings", err),
    };

    let settings = match state.usecase.dashboard_settings().await {
        Ok(settings) => settings,
        Err(err) => {
            warn!(error = %err, "settings: saved but could not reload");
            return error_response("settings", err);
        }
    };
    state
        .store
        .apply(DashboardEvent::SettingsUpdated(settings.clone()))
        .await;

    Json(UpdateSettingsResponse { saved, settings }).into_response()
}
