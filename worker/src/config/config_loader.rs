use anyhow::{Context, Result, bail};
use crates::{
    domain::value_objects::{admin_settings::DEFAULT_SEND_TIME, zoom_links::parse_send_time},
    observability::parse_bool,
};

use super::config_model::{Database, DotEnvyConfig, Internal, Schedule, Telegram, WorkerServer};

pub const DEFAULT_POLL_SECONDS: u64 = 60;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| -> Result<String> {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .with_context(|| format!("{key} is invalid"))
    };
    let optional = |key: &str| -> Option<String> {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let flag = |key: &str| optional(key).and_then(|raw| parse_bool(&raw)).unwrap_or(false);

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is not a port")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is not a number")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is not a number")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let default_send_time =
        optional("TELEGRAM_SEND_TIME").unwrap_or_else(|| DEFAULT_SEND_TIME.to_string());
    if parse_send_time(&default_send_time).is_none() {
        bail!("TELEGRAM_SEND_TIME must be HH:MM, got {default_send_time}");
    }

    let telegram = Telegram {
        bot_token: optional("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
        chat_id: optional("TELEGRAM_CHAT_ID").unwrap_or_default(),
        default_send_time,
        autosend_enabled: flag("TELEGRAM_AUTOSEND_ENABLED"),
    };

    let poll_seconds = match optional("WORKER_POLL_SECONDS") {
        Some(raw) => raw
            .parse::<u64>()
            .context("WORKER_POLL_SECONDS is not a number")?,
        None => DEFAULT_POLL_SECONDS,
    };
    if poll_seconds == 0 {
        bail!("WORKER_POLL_SECONDS must be greater than zero");
    }

    let schedule = Schedule {
        poll_seconds,
        inactivity_sweep_enabled: flag("INACTIVITY_SWEEP_ENABLED"),
    };

    let internal = Internal {
        token: optional("INTERNAL_WORKER_TOKEN"),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        telegram,
        schedule,
        internal,
    })
}
