//! Session state shared by the generation controller and history cache

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;

/// Outcome of a successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_url: String,
    pub request_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

/// Why a generation failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// No response within the configured bound
    Timeout { after_ms: u64 },
    /// Non-success status or malformed body
    Rejected { status: Option<u16>, message: String },
    /// Connection or transport failure
    Unreachable { message: String },
    /// The request task ended before the backend answered
    Interrupted { message: String },
}

impl FailureReason {
    /// User-facing notification text naming the backend at `endpoint`
    pub fn notification(&self, endpoint: &str) -> String {
        match self {
            FailureReason::Timeout { after_ms } => format!(
                "The image generation backend at {} did not respond within {}ms",
                endpoint, after_ms
            ),
            FailureReason::Rejected { message, .. } => format!(
                "The image generation backend at {} rejected the request: {}",
                endpoint, message
            ),
            FailureReason::Unreachable { .. } => format!(
                "Failed to reach the image generation backend. Please ensure it is running at {}",
                endpoint
            ),
            FailureReason::Interrupted { .. } => format!(
                "Generation was interrupted before the backend at {} answered",
                endpoint
            ),
        }
    }
}

impl From<&AppError> for FailureReason {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::Timeout { after_ms, .. } => Self::Timeout {
                after_ms: *after_ms,
            },
            AppError::RequestRejected { status, reason, .. } => Self::Rejected {
                status: *status,
                message: reason.clone(),
            },
            AppError::Unreachable { reason, .. } => Self::Unreachable {
                message: reason.clone(),
            },
            AppError::Internal(reason) => Self::Interrupted {
                message: reason.clone(),
            },
            other => Self::Unreachable {
                message: other.to_string(),
            },
        }
    }
}

/// Lifecycle of the current generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    InFlight,
    Succeeded(GenerationResult),
    Failed(FailureReason),
}

impl SessionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionState::InFlight)
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        match self {
            SessionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }
}

/// The state unit rendered by the shell.
///
/// Session, displayed image and history are always mutated together under
/// one write lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioState {
    pub session: SessionState,
    pub displayed_image: Option<String>,
    pub history: Vec<String>,
}

/// Handle to the state unit shared across components
pub type SharedState = Arc<RwLock<StudioState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(RwLock::new(StudioState::default()))
}
