//! Completion client port - hosted text generation

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{CompletionRequest, CompletionResponse};

/// Text-generation service abstraction
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and wait for the full response.
    ///
    /// Transport and API failures are reported as `Error::CompletionFailure`.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}
