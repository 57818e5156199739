use thiserror::Error;

use crate::config::ValidationError;

/// Errors that can occur while serving the demo API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to read request body: {0}")]
    RequestBodyError(String),

    #[error("Failed to build response: {0}")]
    ResponseBuild(#[from] http::Error),

    #[error("Response serialization error: {0}")]
    ResponseSerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("Hyper error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
