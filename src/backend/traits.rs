//! Common traits and types for the image generation backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointConfig;
use crate::error::{AppError, Result};

/// Negative prompt sent with every generation request
pub const NEGATIVE_PROMPT: &str = "low quality, blurry, distorted, bad formatting";

/// Request to generate an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The prompt to generate an image from
    pub prompt: String,

    /// Negative prompt (things to avoid)
    pub negative_prompt: String,
}

impl GenerationRequest {
    /// Compose a request from the subject and mood fields.
    ///
    /// Fields are joined as entered, with no trimming. An empty subject is
    /// rejected.
    pub fn compose(subject: &str, mood: &str) -> Result<Self> {
        if subject.is_empty() {
            return Err(AppError::EmptySubject);
        }

        Ok(Self {
            prompt: format!("{}, {}", subject, mood),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
        })
    }
}

/// Image reference returned by a successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// URL serving the image, usable both for display and download
    pub url: String,
}

/// Trait for image generation backends
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Generate an image from a request
    async fn generate(
        &self,
        endpoint: &EndpointConfig,
        request: &GenerationRequest,
    ) -> Result<GeneratedImage>;

    /// Fetch the list of previously generated image references
    async fn history(&self, endpoint: &EndpointConfig) -> Result<Vec<String>>;
}
