use crate::{
    auth::SupabaseJwtValidator,
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    dashboard::store::DashboardStore,
    usecases::{
        admin_settings::SettingsUseCase, auth::AuthUseCase, daily_links::DailyLinkUseCase,
        dashboard::DashboardUseCase,
        inactivity_sweep::{InactivitySweepUseCase, RecordedInactivitySweep},
        telegram_send::TelegramSendUseCase,
    },
};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::{
    domain::value_objects::capabilities::SchemaCapabilities,
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                admin_settings::AdminSettingsPostgres,
                applicants::ApplicantPostgres,
                member_activity::MemberActivityPostgres,
                members::MemberPostgres,
                zoom_links::{DailyZoomLinkPostgres, ZoomLinkPostgres},
            },
        },
        identity::supabase_auth::{SupabaseAuthClient, SupabaseAuthConfig},
        messaging::telegram_bot::{TelegramBotClient, TelegramBotConfig},
    },
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

pub async fn start(
    config: Arc<DotEnvyConfig>,
    db_pool: Arc<PgPoolSquad>,
    capabilities: SchemaCapabilities,
) -> Result<()> {
    let app = build_app(&config, db_pool, capabilities)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn build_app(
    config: &DotEnvyConfig,
    db_pool: Arc<PgPoolSquad>,
    capabilities: SchemaCapabilities,
) -> Result<Router> {
    let store = Arc::new(DashboardStore::new());
    let validator = Arc::new(SupabaseJwtValidator::new(&config.supabase.jwt_secret));

    let identity = Arc::new(SupabaseAuthClient::new(SupabaseAuthConfig {
        project_url: config.supabase.project_url.clone(),
        anon_key: config.supabase.anon_key.clone(),
        service_role_key: config.supabase.service_role_key.clone(),
    })?);
    let telegram_client = Arc::new(TelegramBotClient::new(TelegramBotConfig {
        bot_token: config.telegram.bot_token.clone(),
        chat_id: config.telegram.chat_id.clone(),
    })?);

    let applicant_repository = Arc::new(ApplicantPostgres::new(Arc::clone(&db_pool), capabilities));
    let member_repository = Arc::new(MemberPostgres::new(Arc::clone(&db_pool), capabilities));
    let activity_repository = Arc::new(MemberActivityPostgres::new(Arc::clone(&db_pool)));
    let zoom_link_repository = Arc::new(ZoomLinkPostgres::new(Arc::clone(&db_pool)));
    let daily_link_repository = Arc::new(DailyZoomLinkPostgres::new(Arc::clone(&db_pool)));
    let settings_repository = Arc::new(AdminSettingsPostgres::new(Arc::clone(&db_pool)));

    let daily_links = Arc::new(DailyLinkUseCase::new(
        zoom_link_repository,
        daily_link_repository,
        capabilities,
    ));
    let settings = Arc::new(SettingsUseCase::new(
        settings_repository,
        capabilities,
        config.telegram.default_send_time.clone(),
    ));
    let telegram = Arc::new(TelegramSendUseCase::new(
        Arc::clone(&daily_links),
        telegram_client,
        config.telegram.autosend_enabled,
    ));
    let dashboard = Arc::new(DashboardUseCase::new(
        applicant_repository,
        Arc::clone(&member_repository),
        Arc::clone(&daily_links),
        Arc::clone(&settings),
    ));
    let sweep = Arc::new(RecordedInactivitySweep::new(
        Arc::new(InactivitySweepUseCase::new(
            Arc::clone(&member_repository),
            activity_repository,
        )),
        Arc::clone(&settings),
    ));

    if config.database_webhook.secret.is_none() {
        warn!("DATABASE_WEBHOOK_SECRET is not set; database change webhook is disabled");
    }

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/auth",
            routers::auth::routes(Arc::new(AuthUseCase::new(Arc::clone(&identity)))),
        )
        .nest(
            "/api/v1/applicants",
            routers::applicants::routes(
                Arc::clone(&db_pool),
                capabilities,
                identity,
                config.member_app.password_reset_redirect(),
                Arc::clone(&store),
            ),
        )
        .nest(
            "/api/v1/members",
            routers::members::routes(Arc::clone(&db_pool), capabilities, Arc::clone(&store)),
        )
        .nest(
            "/api/v1/zoom-links",
            routers::zoom_links::routes(daily_links, telegram, Arc::clone(&store)),
        )
        .nest(
            "/api/v1/settings",
            routers::settings::routes(settings, Arc::clone(&store)),
        )
        .nest(
            "/api/v1/dashboard",
            routers::dashboard::routes(dashboard, Arc::clone(&store)),
        )
        .nest(
            "/api/v1/maintenance",
            routers::maintenance::routes(sweep, Arc::clone(&store)),
        )
        .nest(
            "/api/v1/webhooks",
            routers::webhooks::routes(config.database_webhook.secret.clone(), store),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(validator))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static(routers::webhooks::WEBHOOK_SECRET_HEADER),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
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
