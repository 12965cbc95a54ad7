use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatClient, ChatError, ChatRequest, ChatResponse, Message};
use crate::configs::{API_KEY_ENV, LlmConfig};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Message,
}

/// Client for `/chat/completions` on OpenAI or any compatible server.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key(),
        })
    }

    /// Builds the chat backend for an `[llm]` section, if there is one.
    ///
    /// A missing key is only worth a warning against hosted OpenAI; local
    /// servers run without one.
    pub fn from_config(config: Option<&LlmConfig>) -> Option<Arc<dyn ChatClient>> {
        let config = config?;
        if config.api_key().is_none() && config.needs_api_key() {
            warn!(
                "llm: no api key for {} (set {}); requests will likely be rejected",
                config.base_url, API_KEY_ENV
            );
        }

        match Self::new(config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("llm: failed to build chat client: {}", e);
                None
            }
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: 1.0,
            stream: false,
        };

        debug!("llm: requesting completion from {} ({} messages)", self.model, request.messages.len());

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("llm: rate limited by {}", self.base_url);
            return Err(ChatError::RateLimited);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| ChatResponse {
                message: choice.message,
            })
            .ok_or(ChatError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_request_body_shape() {
        let messages = vec![Message::system("be brief"), Message::user("hi")];
        let body = CompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 1.0,
            stream: false,
        };

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "1. Song"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
        }"#;

        let parsed: CompletionResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(parsed.choices[0].message.role, Role::Assistant);
        assert_eq!(parsed.choices[0].message.content, "1. Song");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:8080/v1/".into(),
            api_key: Some("key".into()),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::new(&config).expect("client");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_keyless_local_backend_is_enabled() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/v1".into(),
            model: "llama3".into(),
            api_key: None,
            ..LlmConfig::default()
        };
        assert!(OpenAiClient::from_config(Some(&config)).is_some());
        assert!(OpenAiClient::from_config(None).is_none());
    }
}
