//! Error types for Chitra

use thiserror::Error;

/// Chitra error type
#[derive(Error, Debug)]
pub enum ChitraError {
    /// A fetched texture broke a raster layout invariant (stride or length).
    /// Never recoverable: the batch is aborted.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Thread error: {0}")]
    Thread(String),
}

impl From<toml::de::Error> for ChitraError {
    fn from(e: toml::de::Error) -> Self {
        ChitraError::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for ChitraError {
    fn from(e: serde_yaml::Error) -> Self {
        ChitraError::Yaml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChitraError>;
