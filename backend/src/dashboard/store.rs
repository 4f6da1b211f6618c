use crates::domain::value_objects::members::ListMembersQuery;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

use crate::dashboard::{
    events::DashboardEvent,
    state::{DashboardSnapshot, DashboardState},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared dashboard state plus a fan-out of every event applied to it.
pub struct DashboardStore {
    state: RwLock<DashboardState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(DashboardState::default()),
            events,
        }
    }

    pub async fn apply(&self, event: DashboardEvent) {
        let kind = event.kind();
        {
            let mut state = self.state.write().await;
            state.apply(event.clone());
        }

        // No subscribers is not an error.
        let receivers = self.events.send(event).unwrap_or(0);
        debug!(kind, receivers, "dashboard: event applied");
    }

    pub async fn apply_all(&self, events: impl IntoIterator<Item = DashboardEvent>) {
        for event in events {
            self.apply(event).await;
        }
    }

    pub async fn snapshot(&self, query: &ListMembersQuery) -> DashboardSnapshot {
        self.state.read().await.snapshot(query)
    }

    pub async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }
}
