//! Backend module - Trait and HTTP client for the generation service

pub mod http_backend;
pub mod traits;

pub use http_backend::HttpBackend;
pub use traits::{GeneratedImage, GenerationRequest, ImageBackend, NEGATIVE_PROMPT};
