use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, warn};

use super::config::ServiceContext;

const QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub(crate) struct AlertEvent {
    pub(crate) level: Level,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) service: ServiceContext,
    pub(crate) target: String,
    pub(crate) location: Option<String>,
    pub(crate) message: Option<String>,
    pub(crate) fields: BTreeMap<String, String>,
    /// Enclosing span names, outermost first.
    pub(crate) spans: Vec<String>,
}

#[async_trait]
pub(crate) trait AlertSink: Send + Sync {
    async fn deliver(&self, event: &AlertEvent) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fans alerts out to every sink from a background task.
///
/// Logging must never block on the network, so events are queued with
/// `try_send` and dropped when the queue is full.
#[derive(Clone)]
pub(crate) struct AlertDispatcher {
    tx: mpsc::Sender<AlertEvent>,
}

impl AlertDispatcher {
    pub(crate) fn spawn(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertEvent>(QUEUE_CAPACITY);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for sink in &sinks {
                    if let Err(error) = sink.deliver(&event).await {
                        // Logged below ERROR so a failing sink cannot feed itself.
                        warn!(sink = sink.name(), error = %error, "alert sink failed");
                    }
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn dispatch(&self, event: AlertEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("alert queue full; dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("alert queue closed; dropping event");
            }
        }
    }
}
