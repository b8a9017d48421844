//! Verification result types.

use cortex_client::{CortexError, ErrorKind};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// What one completion call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Success { text: String },
    Failure { kind: ErrorKind, message: String },
}

impl CompletionOutcome {
    pub fn failure(error: &CortexError) -> Self {
        Self::Failure {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// Renders the generated text, or `Error: <message>` for failures.
impl fmt::Display for CompletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { text } => f.write_str(text),
            Self::Failure { message, .. } => write!(f, "Error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub model: String,
    pub outcome: CompletionOutcome,
}

/// Per-model outcomes plus the consensus verdict for one `verify` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub category: String,
    /// In the category's configured model order
    pub responses: Vec<ModelResponse>,
    pub consensus: CompletionOutcome,
}

impl VerificationResult {
    pub fn models(&self) -> Vec<&str> {
        self.responses.iter().map(|r| r.model.as_str()).collect()
    }

    #[cfg(test)]
    pub fn outcome(&self, model: &str) -> Option<&CompletionOutcome> {
        self.responses
            .iter()
            .find(|r| r.model == model)
            .map(|r| &r.outcome)
    }

    pub fn failed_models(&self) -> Vec<&str> {
        self.responses
            .iter()
            .filter(|r| !r.outcome.is_success())
            .map(|r| r.model.as_str())
            .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.consensus.is_success() && self.responses.iter().all(|r| r.outcome.is_success())
    }
}

/// Serializes model responses as an ordered `{model: text}` JSON object.
pub(crate) struct ResponseTexts<'a>(pub &'a [ModelResponse]);

impl Serialize for ResponseTexts<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for response in self.0 {
            map.serialize_entry(&response.model, &response.outcome.to_string())?;
        }
        map.end()
    }
}
