//! Imagen client
//!
//! Client-side orchestration for a local image generation backend: resolves
//! where the backend lives, drives generation requests through their
//! lifecycle, and keeps a cache of previously generated images.

pub mod backend;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod session;

pub use error::{AppError, Result};

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use backend::{HttpBackend, ImageBackend};
use endpoint::{DeploymentContext, EndpointConfig, EndpointResolver};
use session::{
    state::new_shared_state, EventBus, GenerationController, HistoryCache, SharedState,
    StudioEvent, StudioState,
};

/// Composition root shared by every shell
pub struct Studio {
    pub settings: config::Settings,
    pub resolver: Arc<EndpointResolver>,
    pub history: HistoryCache,
    pub controller: GenerationController,
    state: SharedState,
    events: EventBus,
}

impl Studio {
    /// Build a studio talking to the HTTP backend
    pub fn new(settings: config::Settings, context: DeploymentContext) -> Result<Self> {
        let backend = Arc::new(HttpBackend::new(&settings.backend)?);
        Ok(Self::with_backend(settings, context, backend))
    }

    /// Build a studio around any backend implementation
    pub fn with_backend(
        settings: config::Settings,
        context: DeploymentContext,
        backend: Arc<dyn ImageBackend>,
    ) -> Self {
        let resolver = Arc::new(EndpointResolver::new(context, &settings.backend));
        let state = new_shared_state();
        let events = EventBus::new();

        let history = HistoryCache::new(
            backend.clone(),
            resolver.clone(),
            state.clone(),
            events.clone(),
            settings.history.timeout_ms,
        );
        let controller = GenerationController::new(
            backend,
            resolver.clone(),
            history.clone(),
            state.clone(),
            events.clone(),
            settings.generation.timeout_ms,
        );

        Self {
            settings,
            resolver,
            history,
            controller,
            state,
            events,
        }
    }

    /// Initial history load, run once when the shell becomes active
    pub async fn activate(&self) {
        info!(endpoint = %self.endpoint(), "Activating studio");
        self.history.refresh().await;
    }

    /// Refresh the history and return the cached entries.
    ///
    /// A failed refresh is logged and the previous list is returned.
    pub async fn history_listing(&self) -> Vec<String> {
        self.history.refresh().await;
        self.history.entries()
    }

    /// Submit using the configured default mood
    pub async fn submit_with_default_mood(&self, subject: &str) -> Result<session::SessionState> {
        let mood = self.settings.generation.default_mood.clone();
        self.controller.submit(subject, &mood).await
    }

    pub fn endpoint(&self) -> EndpointConfig {
        self.resolver.resolve()
    }

    /// Consistent copy of session, displayed image and history
    pub fn snapshot(&self) -> StudioState {
        self.state.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.events.subscribe()
    }
}
