use chrono::Utc;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use super::config::ServiceContext;
use super::notifier::{AlertDispatcher, AlertEvent};

/// Turns log events at or above `min_level` into ops alerts.
pub(crate) struct AlertLayer {
    dispatcher: AlertDispatcher,
    service: ServiceContext,
    min_level: Level,
}

impl AlertLayer {
    pub(crate) fn new(dispatcher: AlertDispatcher, service: ServiceContext, min_level: Level) -> Self {
        Self {
            dispatcher,
            service,
            min_level,
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    values: BTreeMap<String, String>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        let name = field.name();
        let value = if is_sensitive_field(name) {
            "[REDACTED]".to_string()
        } else {
            value
        };
        self.values.insert(name.to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // Level ordering is by verbosity: ERROR < WARN < ... < TRACE.
        if *metadata.level() > self.min_level {
            return;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let message = collector.values.remove("message");

        let spans = ctx
            .event_span(event)
            .map(|span| {
                span.scope()
                    .from_root()
                    .map(|s| s.metadata().name().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let location = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => Some(format!("{file}:{line}")),
            _ => None,
        };

        self.dispatcher.dispatch(AlertEvent {
            level: *metadata.level(),
            timestamp: Utc::now(),
            service: self.service.clone(),
            target: metadata.target().to_string(),
            location,
            message,
            fields: collector.values,
            spans,
        });
    }
}

pub(crate) fn is_sensitive_field(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    ["secret", "password", "token", "authorization", "apikey", "api_key"]
        .iter()
        .any(|needle| name.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credentials_but_not_ids() {
        assert!(is_sensitive_field("access_token"));
        assert!(is_sensitive_field("SUPABASE_JWT_SECRET"));
        assert!(is_sensitive_field("password"));
        assert!(!is_sensitive_field("member_id"));
        assert!(!is_sensitive_field("scheduled_for"));
    }
}
