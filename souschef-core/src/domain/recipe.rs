//! Recipe and chat-completion domain models
//!
//! The request/response shapes follow the chat-completions wire format, so the
//! HTTP adapter can serialize them directly.

use serde::{Deserialize, Serialize};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Completion response; everything but `choices` is ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Build a response with one choice, mostly useful for fakes
    pub fn with_content(content: Option<&str>) -> Self {
        Self {
            choices: vec![Choice {
                message: ChoiceMessage {
                    content: content.map(str::to_string),
                },
            }],
        }
    }

    /// Trimmed text of the first choice.
    ///
    /// A missing choice, null content or whitespace-only content all yield `None`.
    pub fn first_text(&self) -> Option<String> {
        let content = self.choices.first()?.message.content.as_deref()?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Generated recipe text that has not been saved yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub text: String,
}

impl RecipeDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
