use anyhow::Result;
use backend::usecases::{
    admin_settings::SettingsUseCase, daily_links::DailyLinkUseCase,
    inactivity_sweep::{InactivitySweepUseCase, RecordedInactivitySweep},
    telegram_send::TelegramSendUseCase,
};
use crates::domain::value_objects::capabilities::SchemaCapabilities;
use crates::infra::{
    db::{
        postgres::{capabilities::probe_capabilities, postgres_connection},
        repositories::{
            admin_settings::AdminSettingsPostgres,
            member_activity::MemberActivityPostgres,
            members::MemberPostgres,
            zoom_links::{DailyZoomLinkPostgres, ZoomLinkPostgres},
        },
    },
    messaging::telegram_bot::{TelegramBotClient, TelegramBotConfig},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use worker::{
    axum_http, config,
    services::{
        daily_link_loop::{self, DailyLinkJob},
        inactivity_sweep_loop::{self, InactivitySweepJob},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let db_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
    )?);
    info!("Postgres connection has been established");

    let probe_pool = Arc::clone(&db_pool);
    let capabilities =
        match tokio::task::spawn_blocking(move || probe_capabilities(probe_pool)).await? {
            Ok(capabilities) => capabilities,
            Err(err) => {
                warn!(error = ?err, "Schema probe failed; assuming a fully migrated schema");
                SchemaCapabilities::full()
            }
        };

    let telegram_config = TelegramBotConfig {
        bot_token: dotenvy_env.telegram.bot_token.clone(),
        chat_id: dotenvy_env.telegram.chat_id.clone(),
    };
    if dotenvy_env.telegram.autosend_enabled && !telegram_config.is_complete() {
        warn!("TELEGRAM_AUTOSEND_ENABLED is on but the bot token or chat id is missing");
    }

    let daily_links = Arc::new(DailyLinkUseCase::new(
        Arc::new(ZoomLinkPostgres::new(Arc::clone(&db_pool))),
        Arc::new(DailyZoomLinkPostgres::new(Arc::clone(&db_pool))),
        capabilities,
    ));
    let settings = Arc::new(SettingsUseCase::new(
        Arc::new(AdminSettingsPostgres::new(Arc::clone(&db_pool))),
        capabilities,
        dotenvy_env.telegram.default_send_time.clone(),
    ));
    let telegram = Arc::new(TelegramSendUseCase::new(
        Arc::clone(&daily_links),
        Arc::new(TelegramBotClient::new(telegram_config)?),
        dotenvy_env.telegram.autosend_enabled,
    ));
    let sweep = Arc::new(RecordedInactivitySweep::new(
        Arc::new(InactivitySweepUseCase::new(
            Arc::new(MemberPostgres::new(Arc::clone(&db_pool), capabilities)),
            Arc::new(MemberActivityPostgres::new(Arc::clone(&db_pool))),
        )),
        Arc::clone(&settings),
    ));

    let poll = Duration::from_secs(dotenvy_env.schedule.poll_seconds);

    let daily_link_job = DailyLinkJob {
        daily_links: Arc::clone(&daily_links),
        telegram,
        settings: Arc::clone(&settings),
        default_send_time: dotenvy_env.telegram.default_send_time.clone(),
        poll,
    };
    let daily_link_loop = tokio::spawn(daily_link_loop::run(daily_link_job));

    let sweep_loop = if dotenvy_env.schedule.inactivity_sweep_enabled {
        let job = InactivitySweepJob::new(Arc::clone(&sweep));
        tokio::spawn(inactivity_sweep_loop::run(job, poll))
    } else {
        info!("Inactivity sweep loop is disabled");
        tokio::spawn(std::future::pending::<Result<()>>())
    };

    let server_config = Arc::clone(&dotenvy_env);
    let internal_server =
        tokio::spawn(async move { axum_http::http_serve::start(server_config, sweep, daily_links).await });

    info!("Worker started");

    tokio::select! {
        result = daily_link_loop => result??,
        result = sweep_loop => result??,
        result = internal_server => result??,
    };
    Ok(())
}
