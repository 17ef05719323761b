//! Session module - Generation lifecycle, history cache and shared state

pub mod controller;
pub mod events;
pub mod history;
pub mod state;

pub use controller::GenerationController;
pub use events::{EventBus, Notification, StudioEvent};
pub use history::HistoryCache;
pub use state::{FailureReason, GenerationResult, SessionState, SharedState, StudioState};
