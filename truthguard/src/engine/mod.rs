//! Multi-model verification: query every model configured for a category,
//! then ask one model for a consensus verdict.

mod categories;
mod error;
mod prompt;
mod types;

pub use categories::{CategorySpec, CategoryTable, normalize_category};
pub use error::{EngineError, Result};
pub use types::{CompletionOutcome, ModelResponse, VerificationResult};

use cortex_client::{CompletionProvider, CompletionRequest};
use std::time::Duration;

pub const DEFAULT_CONSENSUS_MODEL: &str = "claude-3-5-sonnet";
pub const DEFAULT_MODEL_MAX_TOKENS: u32 = 512;
pub const DEFAULT_CONSENSUS_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_millis(500);

/// Knobs for a verification run.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub consensus_model: String,
    pub model_max_tokens: u32,
    pub consensus_max_tokens: u32,
    /// Pause after each per-model call
    pub call_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            consensus_model: DEFAULT_CONSENSUS_MODEL.to_string(),
            model_max_tokens: DEFAULT_MODEL_MAX_TOKENS,
            consensus_max_tokens: DEFAULT_CONSENSUS_MAX_TOKENS,
            call_delay: DEFAULT_CALL_DELAY,
        }
    }
}

pub struct VerificationEngine {
    provider: Box<dyn CompletionProvider>,
    table: CategoryTable,
    settings: EngineSettings,
}

impl VerificationEngine {
    pub fn new(
        provider: Box<dyn CompletionProvider>,
        table: CategoryTable,
        settings: EngineSettings,
    ) -> Self {
        Self {
            provider,
            table,
            settings,
        }
    }

    /// Run every model for `category` over `content`, then the consensus pass.
    ///
    /// Only an unknown category is an error. Failed model or consensus calls
    /// are reported as [`CompletionOutcome::Failure`] inside the result.
    pub async fn verify(&self, category: &str, content: &str) -> Result<VerificationResult> {
        let (category, models) = self.table.models_for(category)?;

        let mut responses = Vec::with_capacity(models.len());
        for model in models {
            log::info!("Querying {}...", model);
            let request = CompletionRequest::user_prompt(
                model,
                prompt::analysis_prompt(category, content),
                self.settings.model_max_tokens,
            );

            let outcome = match self.provider.complete(request).await {
                Ok(response) => CompletionOutcome::Success {
                    text: response.content,
                },
                Err(e) => {
                    log::warn!("{} failed: {}", model, e);
                    CompletionOutcome::failure(&e)
                }
            };
            responses.push(ModelResponse {
                model: model.clone(),
                outcome,
            });

            if !self.settings.call_delay.is_zero() {
                tokio::time::sleep(self.settings.call_delay).await;
            }
        }

        let consensus = self.consensus(category, &responses).await;

        Ok(VerificationResult {
            category: category.to_string(),
            responses,
            consensus,
        })
    }

    async fn consensus(&self, category: &str, responses: &[ModelResponse]) -> CompletionOutcome {
        log::info!("Building consensus with {}...", self.settings.consensus_model);
        let request = CompletionRequest::user_prompt(
            &self.settings.consensus_model,
            prompt::consensus_prompt(category, responses),
            self.settings.consensus_max_tokens,
        );

        match self.provider.complete(request).await {
            Ok(response) => CompletionOutcome::Success {
                text: response.content,
            },
            Err(e) => {
                log::warn!("Consensus failed: {}", e);
                CompletionOutcome::Failure {
                    kind: e.kind(),
                    message: format!("consensus generation failed: {}", e),
                }
            }
        }
    }
}
