use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{CortexError, Result};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role/content pair of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request to send to a completion provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Single user-message request with temperature 0
    pub fn user_prompt(model: &str, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message::user(prompt)],
            temperature: 0.0,
            max_tokens,
        }
    }

    /// Check the request before it goes over the wire
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(CortexError::InvalidRequest("model must not be empty".into()));
        }
        if self.messages.is_empty() {
            return Err(CortexError::InvalidRequest(
                "at least one message is required".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(CortexError::InvalidRequest(format!(
                "temperature {} outside [0, 1]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(CortexError::InvalidRequest(
                "max_tokens must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Generated text returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Trait for completion providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Execute a completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<P: CompletionProvider + ?Sized> CompletionProvider for Arc<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
