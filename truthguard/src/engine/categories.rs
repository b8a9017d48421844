//! Category -> model dispatch table.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// One row of the dispatch table as it appears in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    pub models: Vec<String>,
}

impl CategorySpec {
    fn new(name: &str, models: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            models: models.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Built-in categories and the models consulted for each, in call order.
pub fn default_categories() -> Vec<CategorySpec> {
    vec![
        CategorySpec::new("news", &["mistral-large2", "llama3.1-70b"]),
        CategorySpec::new("deepfake", &["claude-3-5-sonnet", "llama3.1-70b"]),
        CategorySpec::new("election", &["mistral-large2", "claude-3-5-sonnet"]),
        CategorySpec::new("climate", &["llama3.1-70b", "claude-3-5-sonnet"]),
        CategorySpec::new("viral", &["mistral-large2", "llama3.1-70b"]),
        CategorySpec::new("mental health", &["llama3.1-70b", "mistral-large2"]),
    ]
}

/// Normalize a user-supplied category name.
///
/// Trims, lower-cases, and treats `-`, `_` and runs of whitespace as a
/// single space, so `Mental-Health` and `mental health` are the same key.
pub fn normalize_category(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read-only, ordered mapping of category to model identifiers.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<CategorySpec>,
}

impl CategoryTable {
    /// Build a table, normalizing names and rejecting empty or duplicate rows.
    pub fn new(specs: Vec<CategorySpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(EngineError::InvalidTable(
                "at least one category is required".into(),
            ));
        }

        let mut entries: Vec<CategorySpec> = Vec::with_capacity(specs.len());
        for spec in specs {
            let name = normalize_category(&spec.name);
            if name.is_empty() {
                return Err(EngineError::InvalidTable("category name is empty".into()));
            }
            if entries.iter().any(|e| e.name == name) {
                return Err(EngineError::InvalidTable(format!(
                    "duplicate category: {}",
                    name
                )));
            }
            let models: Vec<String> = spec
                .models
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if let Some(model) = models
                .iter()
                .enumerate()
                .find_map(|(i, m)| models[..i].contains(m).then_some(m))
            {
                return Err(EngineError::InvalidTable(format!(
                    "category {} lists model {} more than once",
                    name, model
                )));
            }
            if models.is_empty() {
                return Err(EngineError::InvalidTable(format!(
                    "category {} has no models",
                    name
                )));
            }
            entries.push(CategorySpec { name, models });
        }

        Ok(Self { entries })
    }

    /// Models for a category, or an error listing the known categories.
    pub fn models_for(&self, category: &str) -> Result<(&str, &[String])> {
        let key = normalize_category(category);
        self.entries
            .iter()
            .find(|e| e.name == key)
            .map(|e| (e.name.as_str(), e.models.as_slice()))
            .ok_or_else(|| EngineError::InvalidCategory {
                category: key,
                valid: self.names(),
            })
    }

    /// Category names in table order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpec> {
        self.entries.iter()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            entries: default_categories(),
        }
    }
}
