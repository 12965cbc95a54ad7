//! Chat completion backends used to expand searches and refill the queue.

pub mod openai;
pub mod prompts;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Assistant,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
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

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub message: Message,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The backend asked us to slow down; try again later.
    #[error("chat backend is rate limited")]
    RateLimited,

    #[error("chat backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chat backend returned no choices")]
    EmptyResponse,

    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A stateless completion backend. Implementations must be safe to call
/// from several tasks at once.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError>;
}
