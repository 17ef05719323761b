//! Cache of previously generated images

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::ImageBackend;
use crate::endpoint::EndpointResolver;
use crate::error::{AppError, Result};
use crate::session::events::{EventBus, StudioEvent};
use crate::session::state::SharedState;

/// History cache backed by the server's `/history` route.
///
/// The list is always replaced wholesale with what the server reports, in
/// server order. A failed refresh keeps the previous list.
#[derive(Clone)]
pub struct HistoryCache {
    backend: Arc<dyn ImageBackend>,
    resolver: Arc<EndpointResolver>,
    state: SharedState,
    events: EventBus,
    timeout: Duration,
}

impl HistoryCache {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        resolver: Arc<EndpointResolver>,
        state: SharedState,
        events: EventBus,
        timeout_ms: u64,
    ) -> Self {
        Self {
            backend,
            resolver,
            state,
            events,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// Refresh the list, logging and swallowing any failure
    pub async fn refresh(&self) {
        if let Err(e) = self.try_refresh().await {
            warn!(error = %e, "History refresh failed, keeping previous entries");
        }
    }

    /// Refresh the list, returning the new entry count
    pub async fn try_refresh(&self) -> Result<usize> {
        let endpoint = self.resolver.resolve();

        let entries = match tokio::time::timeout(self.timeout, self.backend.history(&endpoint))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::HistoryUnavailable(format!(
                    "{} did not answer within {}ms",
                    endpoint,
                    self.timeout.as_millis()
                )))
            }
        };

        let len = entries.len();
        self.state.write().history = entries;
        self.events.publish(StudioEvent::HistoryReplaced { len });

        debug!(endpoint = %endpoint, entries = len, "History refreshed");
        Ok(len)
    }

    /// Refresh in a detached task
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move { cache.refresh().await })
    }

    /// Display a history entry without touching the network
    pub fn select(&self, entry: &str) -> Result<()> {
        {
            let mut state = self.state.write();
            if !state.history.iter().any(|e| e == entry) {
                return Err(AppError::UnknownHistoryEntry(entry.to_string()));
            }
            state.displayed_image = Some(entry.to_string());
        }

        info!(image = %entry, "Selected history entry");
        self.events
            .publish(StudioEvent::DisplayChanged(Some(entry.to_string())));
        Ok(())
    }

    /// Display the entry at `index`
    pub fn select_index(&self, index: usize) -> Result<String> {
        let entry = self
            .state
            .read()
            .history
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::UnknownHistoryEntry(format!("index {}", index)))?;

        self.select(&entry)?;
        Ok(entry)
    }

    /// Current entries in server order
    pub fn entries(&self) -> Vec<String> {
        self.state.read().history.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
