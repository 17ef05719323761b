//! Runtime resolution of the backend base URL

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::BackendConfig;

/// Where the client is running, as seen by the shell hosting it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    /// Host name of the page or process driving the client
    pub host: String,
}

impl DeploymentContext {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

/// Resolved location of the generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
}

impl EndpointConfig {
    /// Join a route onto the base URL
    pub fn url_for(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Resolves the backend base URL from the deployment context.
///
/// Rules, first match wins:
/// 1. a host containing any static-hosting marker resolves to the loopback host
/// 2. any other host is used verbatim
///
/// Both cases use the configured scheme and port. Resolution never fails and
/// never checks reachability.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    context: DeploymentContext,
    scheme: String,
    port: u16,
    loopback_host: String,
    static_host_markers: Vec<String>,
}

impl EndpointResolver {
    pub fn new(context: DeploymentContext, config: &BackendConfig) -> Self {
        Self {
            context,
            scheme: config.scheme.clone(),
            port: config.port,
            loopback_host: config.loopback_host.clone(),
            static_host_markers: config.static_host_markers.clone(),
        }
    }

    pub fn context(&self) -> &DeploymentContext {
        &self.context
    }

    /// Resolve against the context this resolver was built with
    pub fn resolve(&self) -> EndpointConfig {
        self.resolve_host(&self.context.host)
    }

    /// Resolve against an arbitrary host
    pub fn resolve_host(&self, current_host: &str) -> EndpointConfig {
        let host = if self.is_static_host(current_host) {
            self.loopback_host.as_str()
        } else {
            current_host
        };

        EndpointConfig {
            base_url: format!("{}://{}:{}", self.scheme, host, self.port),
        }
    }

    fn is_static_host(&self, host: &str) -> bool {
        self.static_host_markers
            .iter()
            .any(|marker| host.contains(marker.as_str()))
    }
}
