//! HTTP backend client implementation

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::backend::traits::{GeneratedImage, GenerationRequest, ImageBackend};
use crate::config::{BackendConfig, RequestMethod};
use crate::endpoint::EndpointConfig;
use crate::error::{AppError, Result};

/// HTTP-based image generation backend
pub struct HttpBackend {
    client: Client,
    method: RequestMethod,
    timeout_ms: u64,
}

/// Body of a successful `/generate` call
#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    image: String,
}

/// Body of a successful `/history` call
#[derive(Debug, Deserialize)]
struct ApiHistoryResponse {
    #[serde(default)]
    history: Option<Vec<String>>,
}

impl HttpBackend {
    /// Create a new HTTP backend from configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            method: config.request_method,
            timeout_ms: config.timeout_ms,
        })
    }

    async fn send_generate(
        &self,
        url: &str,
        request: &GenerationRequest,
    ) -> reqwest::Result<Response> {
        match self.method {
            RequestMethod::Post => self.client.post(url).json(request).send().await,
            RequestMethod::Get => {
                self.client
                    .get(url)
                    .query(&[
                        ("prompt", request.prompt.as_str()),
                        ("negative_prompt", request.negative_prompt.as_str()),
                    ])
                    .send()
                    .await
            }
        }
    }

    /// Map a transport failure onto the error taxonomy
    fn transport_error(&self, endpoint: &EndpointConfig, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout {
                endpoint: endpoint.base_url.clone(),
                after_ms: self.timeout_ms,
            }
        } else if e.is_connect() || e.is_request() {
            AppError::Unreachable {
                endpoint: endpoint.base_url.clone(),
                reason: e.to_string(),
            }
        } else {
            AppError::HttpClient(e)
        }
    }
}

#[async_trait]
impl ImageBackend for HttpBackend {
    async fn generate(
        &self,
        endpoint: &EndpointConfig,
        request: &GenerationRequest,
    ) -> Result<GeneratedImage> {
        let url = endpoint.url_for("/generate");

        debug!(url = %url, method = ?self.method, "Sending generate request");

        let response = self
            .send_generate(&url, request)
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::RequestRejected {
                endpoint: endpoint.base_url.clone(),
                status: Some(status.as_u16()),
                reason: format!("Backend returned {}: {}", status, body),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let api_response: ApiGenerateResponse =
            serde_json::from_slice(&body).map_err(|e| AppError::RequestRejected {
                endpoint: endpoint.base_url.clone(),
                status: Some(status.as_u16()),
                reason: format!("Failed to parse response: {}", e),
            })?;

        if api_response.image.is_empty() {
            return Err(AppError::RequestRejected {
                endpoint: endpoint.base_url.clone(),
                status: Some(status.as_u16()),
                reason: "Response contained an empty image reference".to_string(),
            });
        }

        Ok(GeneratedImage {
            url: api_response.image,
        })
    }

    async fn history(&self, endpoint: &EndpointConfig) -> Result<Vec<String>> {
        let url = endpoint.url_for("/history");

        debug!(url = %url, "Fetching history");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::HistoryUnavailable(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HistoryUnavailable(format!(
                "{} returned {}",
                url, status
            )));
        }

        let api_response: ApiHistoryResponse = response
            .json()
            .await
            .map_err(|e| AppError::HistoryUnavailable(format!("Failed to parse history: {}", e)))?;

        Ok(api_response.history.unwrap_or_default())
    }
}
