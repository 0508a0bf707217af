//! Error handling for the Karnue admin client

use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Unified error type for the Karnue admin client
///
/// Errors are `Clone` so a single failed request can be handed to every
/// caller that joined it.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Transport failure, no response was received
    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The server answered with a non-success status
    #[error("API error (Status: {status}): {data}")]
    Api {
        /// HTTP status returned by the server
        status: StatusCode,
        /// Parsed JSON body, or the raw body as a JSON string
        data: Value,
    },

    /// The caller passed parameters that cannot be sent
    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(Arc<serde_json::Error>),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable state could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A background fetch task ended without producing a result
    #[error("Task error: {0}")]
    Task(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(Arc::new(err))
    }
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new persistence error
    pub fn persistence<T: fmt::Display>(msg: T) -> Self {
        Error::Persistence(msg.to_string())
    }

    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the request as unauthenticated
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Human readable reason, preferring the server-provided `message`
    pub fn reason(&self) -> String {
        match self {
            Error::Api { data, status } => data
                .get("message")
                .or_else(|| data.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| data.as_str().filter(|s| !s.is_empty()).map(str::to_string))
                .unwrap_or_else(|| format!("Request failed with status {}", status)),
            other => other.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
