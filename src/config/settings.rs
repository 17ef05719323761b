//! Client settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub backend: BackendConfig,
    pub generation: GenerationConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

/// How the generation backend is located and called
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host used when the page is served from a static hosting platform
    #[serde(default = "default_loopback_host")]
    pub loopback_host: String,
    /// Host substrings identifying a static hosting deployment
    #[serde(default = "default_static_host_markers")]
    pub static_host_markers: Vec<String>,
    #[serde(default)]
    pub request_method: RequestMethod,
    /// Transport-level timeout for every backend call
    #[serde(default = "default_backend_timeout")]
    pub timeout_ms: u64,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_loopback_host() -> String {
    "localhost".to_string()
}

fn default_static_host_markers() -> Vec<String> {
    vec!["vercel.app".to_string()]
}

fn default_backend_timeout() -> u64 {
    120000
}

/// Form used for `/generate` calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    /// JSON body
    #[default]
    Post,
    /// URL query parameters
    Get,
}

/// Generation lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Upper bound on how long a submission may stay in flight
    #[serde(default = "default_generation_timeout")]
    pub timeout_ms: u64,
    #[serde(default = "default_mood")]
    pub default_mood: String,
}

fn default_generation_timeout() -> u64 {
    120000
}

fn default_mood() -> String {
    "photorealistic, 8k, highly detailed".to_string()
}

/// History refresh configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_timeout")]
    pub timeout_ms: u64,
}

fn default_history_timeout() -> u64 {
    10000
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .set_default("backend.scheme", default_scheme())?
            .set_default("backend.port", default_port() as i64)?
            .set_default("backend.loopback_host", default_loopback_host())?
            .set_default("backend.static_host_markers", default_static_host_markers())?
            .set_default("backend.request_method", "post")?
            .set_default("backend.timeout_ms", default_backend_timeout() as i64)?
            .set_default("generation.timeout_ms", default_generation_timeout() as i64)?
            .set_default("generation.default_mood", default_mood())?
            .set_default("history.timeout_ms", default_history_timeout() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(false),
            )
            // Override with environment variables (prefixed with IMAGEN_CLIENT__)
            .add_source(
                Environment::with_prefix("IMAGEN_CLIENT")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("backend.static_host_markers"),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.backend.port == 0 {
            return Err(invalid("Backend port cannot be 0"));
        }
        if self.backend.scheme.is_empty() {
            return Err(invalid("Backend scheme cannot be empty"));
        }
        if self.backend.loopback_host.is_empty() {
            return Err(invalid("Backend loopback_host cannot be empty"));
        }
        if self.backend.static_host_markers.iter().any(|m| m.is_empty()) {
            return Err(invalid("Static host markers cannot be empty strings"));
        }
        if self.backend.timeout_ms == 0
            || self.generation.timeout_ms == 0
            || self.history.timeout_ms == 0
        {
            return Err(invalid("Timeouts must be greater than 0"));
        }
        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "Invalid logging format '{}'. Must be 'json' or 'pretty'",
                self.logging.format
            ))));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                scheme: default_scheme(),
                port: default_port(),
                loopback_host: default_loopback_host(),
                static_host_markers: default_static_host_markers(),
                request_method: RequestMethod::default(),
                timeout_ms: default_backend_timeout(),
            },
            generation: GenerationConfig {
                timeout_ms: default_generation_timeout(),
                default_mood: default_mood(),
            },
            history: HistoryConfig {
                timeout_ms: default_history_timeout(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
