use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use backend::usecases::{daily_links::DailyLinkUseCase, inactivity_sweep::RecordedInactivitySweep};
use crates::domain::repositories::{
    admin_settings::AdminSettingsRepository,
    member_activity::MemberActivityRepository,
    members::MemberRepository,
    zoom_links::{DailyZoomLinkRepository, ZoomLinkRepository},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{info, warn};

pub async fn start<M, A, S, Z, D>(
    config: Arc<DotEnvyConfig>,
    sweep: Arc<RecordedInactivitySweep<M, A, S>>,
    daily_links: Arc<DailyLinkUseCase<Z, D>>,
) -> Result<()>
where
    M: MemberRepository + Send + Sync + 'static,
    A: MemberActivityRepository + Send + Sync + 'static,
    S: AdminSettingsRepository + Send + Sync + 'static,
    Z: ZoomLinkRepository + Send + Sync + 'static,
    D: DailyZoomLinkRepository + Send + Sync + 'static,
{
    let allowed_origins = vec![
        "http://localhost".parse()?,
        "http://127.0.0.1".parse()?,
        "http://localhost:3000".parse()?,
        "http://127.0.0.1:3000".parse()?,
    ];

    if config.internal.token.is_none() {
        warn!("INTERNAL_WORKER_TOKEN is not set; internal job routes will answer 503");
    }

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/internal/v1/jobs",
            routers::internal_jobs::routes(config.internal.token.clone(), sweep, daily_links),
        )
        .route("/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.worker_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.worker_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::POST])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(allowed_origins),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.worker_server.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Worker HTTP server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
