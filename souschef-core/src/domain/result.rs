//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// An operation that needs a signed-in user ran without one
    #[error("Not signed in")]
    NotAuthenticated,

    /// The remote store rejected the request or could not be reached
    #[error("Remote store error: {0}")]
    RemoteFailure(String),

    /// The completion service rejected the request or could not be reached
    #[error("Completion error: {0}")]
    CompletionFailure(String),

    #[error("A recipe is already being generated")]
    GenerationInProgress,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a remote store error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteFailure(msg.into())
    }

    /// Create a completion error
    pub fn completion(msg: impl Into<String>) -> Self {
        Self::CompletionFailure(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable kind, used for log events and JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotAuthenticated => "not_authenticated",
            Error::RemoteFailure(_) => "remote_failure",
            Error::CompletionFailure(_) => "completion_failure",
            Error::GenerationInProgress => "generation_in_progress",
            Error::Validation(_) => "validation",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("kind".to_string(), serde_json::json!(e.kind()));
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}
