//! Change notifications published to the shell

use tokio::sync::broadcast;
use tracing::trace;

use crate::session::state::SessionState;

const EVENT_CAPACITY: usize = 64;

/// User-facing message raised by a failed generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Base URL the failing request was sent to
    pub endpoint: String,
    pub message: String,
}

/// Something the shell may want to re-render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioEvent {
    SessionChanged(SessionState),
    DisplayChanged(Option<String>),
    HistoryReplaced { len: usize },
    Notify(Notification),
}

/// Broadcast channel for studio events
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; dropped silently when nobody listens
    pub fn publish(&self, event: StudioEvent) {
        if self.tx.send(event).is_err() {
            trace!("No event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
