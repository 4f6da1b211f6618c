use std::env;
use tracing::Level;

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct OpsTelegramConfig {
    pub(crate) bot_token: String,
    pub(crate) chat_id: String,
    pub(crate) min_level: Level,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) ops_telegram: Option<OpsTelegramConfig>,
    /// Collected before tracing is up and logged right after.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(component: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let component = component.trim().to_string();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let service_context = ServiceContext {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| component.clone()),
            environment: non_empty("STAGE").unwrap_or_else(|| "unknown".to_string()),
            component,
        };

        let mut warnings = Vec::new();

        let enabled = match non_empty("OPS_NOTIFY_ENABLED") {
            None => true,
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                warnings.push(format!("OPS_NOTIFY_ENABLED is invalid (value: {raw}); treating as enabled"));
                true
            }),
        };

        let token = non_empty("OPS_TELEGRAM_BOT_TOKEN");
        let chat_id = non_empty("OPS_TELEGRAM_CHAT_ID");

        let ops_telegram = match (enabled, token, chat_id) {
            (false, _, _) => None,
            (true, Some(bot_token), Some(chat_id)) => {
                let min_level = match non_empty("OPS_NOTIFY_LEVEL") {
                    None => Level::ERROR,
                    Some(raw) => parse_level(&raw).unwrap_or_else(|| {
                        warnings.push(format!(
                            "OPS_NOTIFY_LEVEL is invalid (value: {raw}); defaulting to ERROR"
                        ));
                        Level::ERROR
                    }),
                };
                Some(OpsTelegramConfig {
                    bot_token,
                    chat_id,
                    min_level,
                })
            }
            (true, Some(_), None) | (true, None, Some(_)) => {
                warnings.push(
                    "only one of OPS_TELEGRAM_BOT_TOKEN / OPS_TELEGRAM_CHAT_ID is set; ops alerts disabled"
                        .to_string(),
                );
                None
            }
            (true, None, None) => None,
        };

        Self {
            service_context,
            ops_telegram,
            warnings,
        }
    }
}

fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
