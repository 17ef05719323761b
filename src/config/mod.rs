//! Configuration module

pub mod settings;

pub use settings::{
    BackendConfig, GenerationConfig, HistoryConfig, LoggingConfig, RequestMethod, Settings,
};
