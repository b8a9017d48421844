//! Completion provider implementations

mod cortex;
pub mod mock;

pub use cortex::CortexProvider;
pub use mock::MockProvider;

use std::sync::Arc;

use crate::auth::ProgrammaticAccessToken;
use crate::config::CortexConfig;
use crate::error::Result;
use crate::provider::CompletionProvider;

/// Create the Cortex provider for a config, authenticating with its token
pub fn get_provider(config: &CortexConfig) -> Result<Box<dyn CompletionProvider>> {
    let auth = Arc::new(ProgrammaticAccessToken::from_config(config)?);
    Ok(Box::new(CortexProvider::new(config, auth)?))
}
