//! Prompt text sent to the models.

use super::types::{ModelResponse, ResponseTexts};

/// Prompt asking a single model to score `content`.
pub fn analysis_prompt(category: &str, content: &str) -> String {
    format!(
        "Analyze this {category} content for misinformation. \
         Give a credibility score (0-100) and brief reasoning.\n\n\
         Content: {content}"
    )
}

/// Prompt asking the consensus model to reconcile every model's answer.
pub fn consensus_prompt(category: &str, responses: &[ModelResponse]) -> String {
    let rendered = serde_json::to_string_pretty(&ResponseTexts(responses))
        .unwrap_or_else(|_| "{}".to_string());
    format!(
        "Given these model responses analyzing {category} content:\n\
         {rendered}\n\n\
         Provide a summary of agreement level and final credibility verdict."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::CompletionOutcome;

    #[test]
    fn test_analysis_prompt_embeds_category_and_content() {
        let prompt = analysis_prompt("climate", "Glaciers are growing everywhere.");
        assert!(prompt.starts_with("Analyze this climate content for misinformation."));
        assert!(prompt.contains("credibility score (0-100)"));
        assert!(prompt.ends_with("Content: Glaciers are growing everywhere."));
    }

    #[test]
    fn test_consensus_prompt_embeds_all_responses() {
        let responses = vec![
            ModelResponse {
                model: "m1".into(),
                outcome: CompletionOutcome::Success {
                    text: "Score: 10".into(),
                },
            },
            ModelResponse {
                model: "m2".into(),
                outcome: CompletionOutcome::Failure {
                    kind: cortex_client::ErrorKind::Transport,
                    message: "Request failed: timeout".into(),
                },
            },
        ];
        let prompt = consensus_prompt("news", &responses);
        assert!(prompt.starts_with("Given these model responses analyzing news content:\n{"));
        assert!(prompt.contains("\"m1\": \"Score: 10\""));
        assert!(prompt.contains("\"m2\": \"Error: Request failed: timeout\""));
        assert!(prompt.ends_with("final credibility verdict."));
    }
}
