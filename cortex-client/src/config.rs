use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CortexError, Result};

pub const ACCOUNT_ENV: &str = "SNOWFLAKE_ACCOUNT";
pub const USER_ENV: &str = "SNOWFLAKE_USER";
pub const TOKEN_ENV: &str = "PERSONAL_ACCESS_TOKEN";
pub const BASE_URL_ENV: &str = "CORTEX_BASE_URL";

const HOST_DOMAIN: &str = "snowflakecomputing.com";
const INFERENCE_PATH: &str = "/api/v2/cortex/inference:complete";
const STATEMENTS_PATH: &str = "/api/v2/statements";

/// Connection settings for a Snowflake account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CortexConfig {
    /// Account identifier (e.g. `myorg-myaccount`)
    #[serde(default)]
    pub account: String,

    /// Login name of the user the token belongs to
    #[serde(default)]
    pub user: String,

    /// Programmatic access token (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Custom base URL, replaces `https://{account}.snowflakecomputing.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Connect timeout in seconds for inference calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
}

impl CortexConfig {
    /// Build a config for an account, normalizing the identifier
    pub fn new(account: &str, user: &str) -> Self {
        Self {
            account: normalize_account(account),
            user: user.to_string(),
            ..Self::default()
        }
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load only what the config file says, ignoring the environment
    pub fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: CortexConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home =
            std::env::var("HOME").map_err(|_| CortexError::ConfigError("HOME not set".into()))?;
        Ok(PathBuf::from(home).join(".config/truthguard/cortex.toml"))
    }

    /// Overlay values from the environment on top of the file values.
    ///
    /// Takes a lookup function so callers (and tests) control where values
    /// come from.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(account) = lookup(ACCOUNT_ENV).filter(|v| !v.trim().is_empty()) {
            self.account = normalize_account(&account);
        } else {
            self.account = normalize_account(&self.account);
        }
        if let Some(user) = lookup(USER_ENV).filter(|v| !v.is_empty()) {
            self.user = user;
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = Some(base_url);
        }
    }

    /// Root URL for the account's REST endpoints, without trailing slash
    pub fn base_url(&self) -> Result<String> {
        if let Some(url) = &self.base_url {
            return Ok(url.trim_end_matches('/').to_string());
        }
        if self.account.is_empty() {
            return Err(CortexError::ConfigError(format!(
                "Snowflake account not set. Set {} or add `account` to config.",
                ACCOUNT_ENV
            )));
        }
        Ok(format!("https://{}.{}", self.account, HOST_DOMAIN))
    }

    pub fn inference_url(&self) -> Result<String> {
        Ok(format!("{}{}", self.base_url()?, INFERENCE_PATH))
    }

    pub fn statements_url(&self) -> Result<String> {
        Ok(format!("{}{}", self.base_url()?, STATEMENTS_PATH))
    }

    /// The configured token, or an error naming where to put one
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CortexError::MissingCredential {
                field: "token".to_string(),
                env_var: TOKEN_ENV.to_string(),
            })
    }
}

fn normalize_account(account: &str) -> String {
    account.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_account_is_normalized() {
        let config = CortexConfig::new("  MyOrg-Acct ", "ALICE");
        assert_eq!(config.account, "myorg-acct");
        assert_eq!(
            config.base_url().unwrap(),
            "https://myorg-acct.snowflakecomputing.com"
        );
    }

    #[test]
    fn test_endpoint_urls() {
        let config = CortexConfig::new("acct", "user");
        assert_eq!(
            config.inference_url().unwrap(),
            "https://acct.snowflakecomputing.com/api/v2/cortex/inference:complete"
        );
        assert_eq!(
            config.statements_url().unwrap(),
            "https://acct.snowflakecomputing.com/api/v2/statements"
        );
    }

    #[test]
    fn test_base_url_override() {
        let mut config = CortexConfig::new("acct", "user");
        config.base_url = Some("http://127.0.0.1:8080/".to_string());
        assert_eq!(
            config.inference_url().unwrap(),
            "http://127.0.0.1:8080/api/v2/cortex/inference:complete"
        );
    }

    #[test]
    fn test_missing_account() {
        let config = CortexConfig::default();
        assert!(config.base_url().is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: CortexConfig = toml::from_str(
            r#"
account = "file-acct"
user = "file-user"
token = "file-token"
"#,
        )
        .unwrap();

        config.apply_env(env(&[
            (ACCOUNT_ENV, " ENV-ACCT "),
            (TOKEN_ENV, "env-token"),
        ]));

        assert_eq!(config.account, "env-acct");
        assert_eq!(config.user, "file-user");
        assert_eq!(config.token.as_deref(), Some("env-token"));
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_require_token() {
        let mut config = CortexConfig::new("acct", "user");
        let err = config.require_token().unwrap_err();
        assert!(err.to_string().contains(TOKEN_ENV));

        config.token = Some("pat".to_string());
        assert_eq!(config.require_token().unwrap(), "pat");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = CortexConfig::new("acct", "user");
        config.connect_timeout_secs = Some(5);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: CortexConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_path() {
        let path = CortexConfig::config_path().unwrap();
        assert!(path.to_string_lossy().contains(".config/truthguard/cortex.toml"));
    }
}
