//! Snowflake Cortex inference provider
//!
//! Posts to the account's `inference:complete` endpoint and reads the
//! answer as a Server-Sent Events stream.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthStrategy, TOKEN_TYPE_HEADER};
use crate::config::CortexConfig;
use crate::error::{CortexError, Result};
use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse, Message};
use crate::sse::SseDecoder;

/// Provider for the Cortex REST inference API
pub struct CortexProvider {
    url: String,
    auth: Arc<dyn AuthStrategy>,
    client: Client,
}

impl CortexProvider {
    /// Create a provider for the account described by `config`
    pub fn new(config: &CortexConfig, auth: Arc<dyn AuthStrategy>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| CortexError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: config.inference_url()?,
            auth,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[async_trait]
impl CompletionProvider for CortexProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        request.validate()?;

        let body = InferenceRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
        };

        log::debug!("POST {} (model: {})", self.url, request.model);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.auth.credential()?)
            .header(TOKEN_TYPE_HEADER, self.auth.token_type())
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| CortexError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::debug!("{} answered HTTP {}: {}", request.model, status, error_text);
            return Err(CortexError::from_status(status.as_u16(), &error_text));
        }

        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CortexError::Stream(e.to_string()))?;
            decoder.feed(&chunk);
        }

        Ok(CompletionResponse {
            content: decoder.finish(),
            model: request.model,
        })
    }

    fn name(&self) -> &'static str {
        "Snowflake Cortex"
    }
}
