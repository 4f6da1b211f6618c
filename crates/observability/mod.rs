mod config;
mod layer;
mod notifier;
mod telegram;

use anyhow::Result;
use config::ObservabilityConfig;
use layer::AlertLayer;
use notifier::{AlertDispatcher, AlertSink};
use std::sync::Arc;
use telegram::TelegramAlertSink;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

pub use config::parse_bool;

/// Installs the global subscriber: local-time fmt output filtered by
/// `RUST_LOG` (default `info`), plus optional ops alerts to Telegram.
///
/// Must run inside a tokio runtime when alerts are enabled.
pub fn init_observability(component: &str) -> Result<()> {
    let config = ObservabilityConfig::from_env(component);
    let mut warnings = config.warnings.clone();

    let alert_layer = match config.ops_telegram.as_ref() {
        Some(ops) => match TelegramAlertSink::new(ops.bot_token.clone(), ops.chat_id.clone()) {
            Ok(sink) => {
                let sinks: Vec<Arc<dyn AlertSink>> = vec![Arc::new(sink)];
                Some(
                    AlertLayer::new(
                        AlertDispatcher::spawn(sinks),
                        config.service_context.clone(),
                        ops.min_level,
                    )
                    .with_filter(LevelFilter::from_level(ops.min_level)),
                )
            }
            Err(err) => {
                warnings.push(format!("ops alert sink could not be built: {err}"));
                None
            }
        },
        None => None,
    };
    let alerts_enabled = alert_layer.is_some();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(alert_layer)
        .with(env_filter)
        .try_init()?;

    let service = &config.service_context;
    for warning in &warnings {
        warn!(
            service = %service.service_name,
            environment = %service.environment,
            component = %service.component,
            warning = %warning,
            "observability config warning"
        );
    }

    info!(
        service = %service.service_name,
        environment = %service.environment,
        component = %service.component,
        alerts_enabled,
        "observability initialised"
    );

    Ok(())
}
