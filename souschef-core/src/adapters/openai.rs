//! OpenAI chat-completions client
//!
//! Implements the completion port against `POST {base}/chat/completions`.
//! Any OpenAI-compatible endpoint works by pointing `OPENAI_BASE_URL` at it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::result::{Error, Result};
use crate::domain::{CompletionRequest, CompletionResponse};
use crate::ports::CompletionClient;

/// Default production API URL
const OPENAI_PRODUCTION_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable to override the API base URL
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Get the OpenAI base URL, checking environment variable first
pub fn get_base_url() -> String {
    std::env::var(OPENAI_BASE_URL_ENV).unwrap_or_else(|_| OPENAI_PRODUCTION_URL.to_string())
}

/// OpenAI API client
#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client with the given API key.
    ///
    /// Uses the `OPENAI_BASE_URL` environment variable if set,
    /// otherwise defaults to the production API.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::new_with_base_url(api_key, &get_base_url())
    }

    /// Create a client with a custom base URL
    pub fn new_with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::config("OpenAI API key cannot be empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::completion("Connection timed out after 120 seconds")
        } else if error.is_connect() {
            Error::completion("Unable to connect to the completion service")
        } else {
            Error::completion(format!("Completion request failed: {}", error))
        }
    }

    /// Check response status and return appropriate errors
    fn check_status(&self, status: u16) -> Result<()> {
        match status {
            200..=299 => Ok(()),
            401 => Err(Error::completion(
                "Authentication failed. Your OpenAI API key may be invalid or revoked.",
            )),
            403 => Err(Error::completion("Access denied for this API key or model.")),
            404 => Err(Error::completion("Model or endpoint not found.")),
            429 => Err(Error::completion(
                "Rate limit or quota exceeded. Please wait a moment and try again.",
            )),
            code => Err(Error::completion(format!("OpenAI API error: HTTP {}", code))),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.check_status(response.status().as_u16())?;

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| Error::completion(format!("Failed to parse completion response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockHttpServer, MockRoute};
    use crate::domain::ChatMessage;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("eggs, rice")],
            max_tokens: 700,
            temperature: 0.7,
        }
    }

    #[test]
    fn test_reject_empty_api_key() {
        let result = OpenAiClient::new_with_base_url("  ", "http://localhost");
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = OpenAiClient::new_with_base_url("sk-test", "http://localhost/v1/").unwrap();
        assert_eq!(client.base_url, "http://localhost/v1");
    }

    #[tokio::test]
    async fn test_complete_posts_request() {
        let server = MockHttpServer::start(vec![MockRoute::new(
            "POST",
            "/chat/completions",
            200,
            json!({
                "id": "chatcmpl-1",
                "choices": [{ "index": 0, "message": { "role": "assistant", "content": "  Fried rice  " } }]
            })
            .to_string(),
        )])
        .unwrap();
        let client = OpenAiClient::new_with_base_url("sk-test", &server.base_url()).unwrap();

        let response = client.complete(&request()).await.unwrap();
        assert_eq!(response.first_text().as_deref(), Some("Fried rice"));

        let recorded = &server.requests()[0];
        assert_eq!(recorded.header("authorization"), Some("Bearer sk-test"));
        let body = recorded.json();
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 700);
        assert_eq!(body["messages"][1]["content"], "eggs, rice");
    }

    #[tokio::test]
    async fn test_null_content_is_not_an_error() {
        let server = MockHttpServer::start(vec![MockRoute::new(
            "POST",
            "/chat/completions",
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
        )])
        .unwrap();
        let client = OpenAiClient::new_with_base_url("sk-test", &server.base_url()).unwrap();

        let response = client.complete(&request()).await.unwrap();
        assert_eq!(response.first_text(), None);
    }

    #[tokio::test]
    async fn test_unauthorized_is_completion_failure() {
        let server = MockHttpServer::start(vec![MockRoute::new(
            "POST",
            "/chat/completions",
            401,
            r#"{"error":{"message":"Incorrect API key provided"}}"#,
        )])
        .unwrap();
        let client = OpenAiClient::new_with_base_url("sk-bad", &server.base_url()).unwrap();

        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, Error::CompletionFailure(ref m) if m.contains("Authentication failed")));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_completion_failure() {
        // Bind then drop to get a port nobody is listening on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client =
            OpenAiClient::new_with_base_url("sk-test", &format!("http://127.0.0.1:{}", port)).unwrap();

        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, Error::CompletionFailure(_)));
    }
}
