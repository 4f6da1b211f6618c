use anyhow::{Context, Result};
use crates::{
    domain::value_objects::{admin_settings::DEFAULT_SEND_TIME, zoom_links::parse_send_time},
    observability::parse_bool,
};

use super::config_model::{
    BackendServer, Database, DatabaseWebhook, DotEnvyConfig, MemberApp, Supabase, Telegram,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();
    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup; `load` passes the process env.
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

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is not a port")?,
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

    let supabase = Supabase {
        project_url: required("SUPABASE_PROJECT_URL")?
            .parse()
            .context("SUPABASE_PROJECT_URL is not a url")?,
        anon_key: required("SUPABASE_ANON_KEY")?,
        service_role_key: optional("SUPABASE_SERVICE_ROLE_KEY"),
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let member_app = MemberApp {
        base_url: optional("MEMBER_APP_URL"),
    };

    let default_send_time =
        optional("TELEGRAM_SEND_TIME").unwrap_or_else(|| DEFAULT_SEND_TIME.to_string());
    if parse_send_time(&default_send_time).is_none() {
        anyhow::bail!("TELEGRAM_SEND_TIME must be HH:MM, got {default_send_time}");
    }

    let telegram = Telegram {
        bot_token: optional("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
        chat_id: optional("TELEGRAM_CHAT_ID").unwrap_or_default(),
        default_send_time,
        autosend_enabled: optional("TELEGRAM_AUTOSEND_ENABLED")
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(false),
    };

    let database_webhook = DatabaseWebhook {
        secret: optional("DATABASE_WEBHOOK_SECRET"),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        member_app,
        telegram,
        database_webhook,
    })
}
