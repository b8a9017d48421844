//! truthguard configuration: verification knobs and the analysis log location.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::{
    CategorySpec, CategoryTable, DEFAULT_CALL_DELAY, DEFAULT_CONSENSUS_MAX_TOKENS,
    DEFAULT_CONSENSUS_MODEL, DEFAULT_MODEL_MAX_TOKENS, EngineSettings,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthGuardConfig {
    /// JSONL analysis log. None means the default under the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Mirror analysis log entries to Snowflake
    #[serde(default)]
    pub remote_logging: bool,

    /// Pause between per-model calls, in milliseconds
    #[serde(default = "default_call_delay_ms")]
    pub call_delay_ms: u64,

    /// Model that writes the consensus verdict
    #[serde(default = "default_consensus_model")]
    pub consensus_model: String,

    /// Token budget for each per-model analysis
    #[serde(default = "default_model_max_tokens")]
    pub model_max_tokens: u32,

    /// Token budget for the consensus call
    #[serde(default = "default_consensus_max_tokens")]
    pub consensus_max_tokens: u32,

    /// Replaces the built-in category table when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategorySpec>>,
}

fn default_call_delay_ms() -> u64 {
    DEFAULT_CALL_DELAY.as_millis() as u64
}

fn default_consensus_model() -> String {
    DEFAULT_CONSENSUS_MODEL.to_string()
}

fn default_model_max_tokens() -> u32 {
    DEFAULT_MODEL_MAX_TOKENS
}

fn default_consensus_max_tokens() -> u32 {
    DEFAULT_CONSENSUS_MAX_TOKENS
}

impl Default for TruthGuardConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            remote_logging: false,
            call_delay_ms: default_call_delay_ms(),
            consensus_model: default_consensus_model(),
            model_max_tokens: default_model_max_tokens(),
            consensus_max_tokens: default_consensus_max_tokens(),
            categories: None,
        }
    }
}

impl TruthGuardConfig {
    /// Get the config file path: ~/.config/truthguard/truthguard.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("truthguard")
            .join("truthguard.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: TruthGuardConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Resolved analysis log path
    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|d| d.join("truthguard"))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(data_dir.join("logs").join("analysis_logs.jsonl"))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            consensus_model: self.consensus_model.clone(),
            model_max_tokens: self.model_max_tokens,
            consensus_max_tokens: self.consensus_max_tokens,
            call_delay: Duration::from_millis(self.call_delay_ms),
        }
    }

    pub fn category_table(&self) -> Result<CategoryTable> {
        match &self.categories {
            Some(specs) => Ok(CategoryTable::new(specs.clone())?),
            None => Ok(CategoryTable::default()),
        }
    }
}
