//! Mock completion provider for testing
//!
//! Answers per model with scripted text or a scripted failure, and records
//! every request it receives in call order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{CortexError, Result};
use crate::provider::{CompletionProvider, CompletionRequest, CompletionResponse};

/// A mock provider with per-model behavior
pub struct MockProvider {
    /// Text returned for models without a specific script
    default_response: String,
    /// Model -> response content
    responses: HashMap<String, String>,
    /// Model -> error returned instead of a response
    failures: HashMap<String, CortexError>,
    /// Every request received, in order
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Create a provider that answers every model with `response`
    pub fn always_succeeds(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            responses: HashMap::new(),
            failures: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script the answer for one model
    pub fn with_response(mut self, model: &str, response: &str) -> Self {
        self.responses
            .insert(model.to_string(), response.to_string());
        self
    }

    /// Make every call to `model` fail with `error`
    pub fn with_failure(mut self, model: &str, error: CortexError) -> Self {
        self.failures.insert(model.to_string(), error);
        self
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Requests received so far, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Models called so far, in call order
    pub fn called_models(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.model).collect()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(error) = self.failures.get(&request.model) {
            return Err(clone_error(error));
        }

        let content = self
            .responses
            .get(&request.model)
            .unwrap_or(&self.default_response)
            .clone();

        Ok(CompletionResponse {
            content,
            model: request.model,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Clone a CortexError (needed because CortexError doesn't implement Clone)
fn clone_error(err: &CortexError) -> CortexError {
    match err {
        CortexError::MissingCredential { field, env_var } => CortexError::MissingCredential {
            field: field.clone(),
            env_var: env_var.clone(),
        },
        CortexError::InvalidRequest(s) => CortexError::InvalidRequest(s.clone()),
        CortexError::RegionUnavailable { message } => CortexError::RegionUnavailable {
            message: message.clone(),
        },
        CortexError::BadRequest { message } => CortexError::BadRequest {
            message: message.clone(),
        },
        CortexError::Unauthorized => CortexError::Unauthorized,
        CortexError::Forbidden => CortexError::Forbidden,
        CortexError::NotFound => CortexError::NotFound,
        CortexError::ServerError { message } => CortexError::ServerError {
            message: message.clone(),
        },
        CortexError::ServiceUnavailable => CortexError::ServiceUnavailable,
        CortexError::Http { status, message } => CortexError::Http {
            status: *status,
            message: message.clone(),
        },
        CortexError::Transport(s) => CortexError::Transport(s.clone()),
        CortexError::Stream(s) => CortexError::Stream(s.clone()),
        CortexError::ConfigError(s) => CortexError::ConfigError(s.clone()),
        // For Io and Toml errors, we create a generic error since they can't be cloned
        CortexError::Io(_) => CortexError::ConfigError("IO error (mock)".to_string()),
        CortexError::TomlParse(_) => CortexError::ConfigError("TOML parse error (mock)".to_string()),
        CortexError::TomlSerialize(_) => {
            CortexError::ConfigError("TOML serialize error (mock)".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds("success");
        let request = CompletionRequest::user_prompt("any-model", "test", 16);

        let result = provider.complete(request).await;
        assert_eq!(result.unwrap().content, "success");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_per_model_scripts() {
        let provider = MockProvider::always_succeeds("default")
            .with_response("a", "from a")
            .with_failure("b", CortexError::NotFound);

        let a = provider
            .complete(CompletionRequest::user_prompt("a", "p", 16))
            .await
            .unwrap();
        let b = provider
            .complete(CompletionRequest::user_prompt("b", "p", 16))
            .await
            .unwrap_err();
        let c = provider
            .complete(CompletionRequest::user_prompt("c", "p", 16))
            .await
            .unwrap();

        assert_eq!(a.content, "from a");
        assert_eq!(b.kind(), ErrorKind::NotFound);
        assert_eq!(c.content, "default");
        assert_eq!(provider.called_models(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_failures_repeat() {
        let provider = MockProvider::always_succeeds("")
            .with_failure("m", CortexError::Transport("connection reset".into()));

        for _ in 0..3 {
            let request = CompletionRequest::user_prompt("m", "p", 16);
            assert!(provider.complete(request).await.is_err());
        }
        assert_eq!(provider.call_count(), 3);
    }
}
