//! Endpoint module - Deployment context and backend URL resolution

pub mod resolver;

pub use resolver::{DeploymentContext, EndpointConfig, EndpointResolver};
