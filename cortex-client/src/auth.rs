//! Authentication strategies for Snowflake REST endpoints
//!
//! Every request carries `Authorization: Bearer <credential>` plus a header
//! telling Snowflake what kind of token it is looking at.

use crate::config::CortexConfig;
use crate::error::Result;

pub const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Produces the bearer credential for a request
pub trait AuthStrategy: Send + Sync {
    /// Credential placed after `Bearer ` in the Authorization header
    fn credential(&self) -> Result<String>;

    /// Value of the token-type header
    fn token_type(&self) -> &'static str;
}

/// Long-lived programmatic access token
pub struct ProgrammaticAccessToken {
    token: String,
}

impl ProgrammaticAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Take the token from a config, failing if none is set
    pub fn from_config(config: &CortexConfig) -> Result<Self> {
        Ok(Self::new(config.require_token()?))
    }
}

impl AuthStrategy for ProgrammaticAccessToken {
    fn credential(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    fn token_type(&self) -> &'static str {
        "PROGRAMMATIC_ACCESS_TOKEN"
    }
}

impl std::fmt::Debug for ProgrammaticAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgrammaticAccessToken")
            .field("token", &"<redacted>")
            .finish()
    }
}
