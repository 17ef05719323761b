//! Generation controller driving one request end-to-end

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::{GenerationRequest, ImageBackend};
use crate::endpoint::{EndpointConfig, EndpointResolver};
use crate::error::{AppError, Result};
use crate::session::events::{EventBus, Notification, StudioEvent};
use crate::session::history::HistoryCache;
use crate::session::state::{FailureReason, GenerationResult, SessionState, SharedState};

/// Owns the lifecycle of the current generation request
#[derive(Clone)]
pub struct GenerationController {
    backend: Arc<dyn ImageBackend>,
    resolver: Arc<EndpointResolver>,
    history: HistoryCache,
    state: SharedState,
    events: EventBus,
    timeout_ms: u64,
}

impl GenerationController {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        resolver: Arc<EndpointResolver>,
        history: HistoryCache,
        state: SharedState,
        events: EventBus,
        timeout_ms: u64,
    ) -> Self {
        Self {
            backend,
            resolver,
            history,
            state,
            events,
            timeout_ms,
        }
    }

    /// Submit a generation and wait for its outcome.
    ///
    /// An empty subject is a no-op and returns the unchanged state. Fails with
    /// [`AppError::Busy`] while another request is in flight. Backend failures
    /// are not errors here: they end in [`SessionState::Failed`].
    pub async fn submit(&self, subject: &str, mood: &str) -> Result<SessionState> {
        match self.start(subject, mood)? {
            Some(handle) => match handle.await {
                Ok(session) => Ok(session),
                // The task's guard has already committed the failure
                Err(e) => {
                    warn!(error = %e, "Generation task ended abnormally");
                    Ok(self.session())
                }
            },
            None => Ok(self.session()),
        }
    }

    /// Accept a submission and run it in a background task.
    ///
    /// Returns `None` when the subject is empty. The state has already moved
    /// to `InFlight` when this returns a handle, so dropping the handle does
    /// not abandon the request. If the task panics or is aborted the state
    /// still leaves `InFlight`, as `Failed(Interrupted)`.
    pub fn start(&self, subject: &str, mood: &str) -> Result<Option<JoinHandle<SessionState>>> {
        let request = match GenerationRequest::compose(subject, mood) {
            Ok(request) => request,
            Err(AppError::EmptySubject) => {
                debug!("Ignoring submission with empty subject");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        {
            let mut state = self.state.write();
            if state.session.is_in_flight() {
                return Err(AppError::Busy);
            }
            state.session = SessionState::InFlight;
        }
        self.events
            .publish(StudioEvent::SessionChanged(SessionState::InFlight));

        // Owned by the task future so an abort before the first poll drops it too
        let mut guard = InFlightGuard {
            controller: self.clone(),
            endpoint: self.resolver.resolve(),
            request_id: Uuid::new_v4(),
            armed: true,
        };
        Ok(Some(tokio::spawn(async move {
            let session = guard
                .controller
                .run(&guard.endpoint, guard.request_id, request)
                .await;
            guard.armed = false;
            session
        })))
    }

    async fn run(
        &self,
        endpoint: &EndpointConfig,
        request_id: Uuid,
        request: GenerationRequest,
    ) -> SessionState {
        info!(
            request_id = %request_id,
            endpoint = %endpoint,
            prompt = %request.prompt,
            "Submitting generation request"
        );

        let timeout = Duration::from_millis(self.timeout_ms);
        let outcome = match tokio::time::timeout(timeout, self.backend.generate(endpoint, &request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout {
                endpoint: endpoint.base_url.clone(),
                after_ms: self.timeout_ms,
            }),
        };

        match outcome {
            Ok(image) => self.succeed(GenerationResult {
                image_url: image.url,
                request_id,
                completed_at: Utc::now(),
            }),
            Err(e) => self.fail(endpoint, request_id, e),
        }
    }

    fn succeed(&self, result: GenerationResult) -> SessionState {
        let image_url = result.image_url.clone();
        let session = SessionState::Succeeded(result);

        {
            let mut state = self.state.write();
            state.session = session.clone();
            state.displayed_image = Some(image_url.clone());

            self.events.publish(StudioEvent::SessionChanged(session.clone()));
            self.events
                .publish(StudioEvent::DisplayChanged(Some(image_url.clone())));
            // Spawned under the lock so a concurrent select cannot interleave
            self.history.spawn_refresh();
        }

        info!(image = %image_url, "Generation succeeded");
        session
    }

    fn fail(&self, endpoint: &EndpointConfig, request_id: Uuid, error: AppError) -> SessionState {
        let reason = FailureReason::from(&error);
        let session = SessionState::Failed(reason.clone());
        self.state.write().session = session.clone();

        warn!(
            request_id = %request_id,
            endpoint = %endpoint,
            error = %error,
            "Generation failed"
        );

        self.events.publish(StudioEvent::SessionChanged(session.clone()));
        self.events.publish(StudioEvent::Notify(Notification {
            endpoint: endpoint.base_url.clone(),
            message: reason.notification(&endpoint.base_url),
        }));
        session
    }

    /// Current session state
    pub fn session(&self) -> SessionState {
        self.state.read().session.clone()
    }

    /// Image currently shown to the user
    pub fn displayed_image(&self) -> Option<String> {
        self.state.read().displayed_image.clone()
    }
}

/// Commits a failure if the request task ends without reaching an outcome
struct InFlightGuard {
    controller: GenerationController,
    endpoint: EndpointConfig,
    request_id: Uuid,
    armed: bool,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reason = if std::thread::panicking() {
            "generation task panicked"
        } else {
            "generation task was cancelled"
        };
        self.controller.fail(
            &self.endpoint,
            self.request_id,
            AppError::Internal(reason.to_string()),
        );
    }
}
