//! Client library for Snowflake Cortex LLM inference
//!
//! Provides:
//! - Account configuration (file + environment)
//! - Pluggable authentication strategies
//! - A provider trait with the Cortex REST implementation (SSE streaming)
//! - A scripted mock provider for tests

pub mod auth;
pub mod config;
pub mod error;
pub mod provider;
pub mod providers;
pub mod sse;

pub use auth::{AuthStrategy, ProgrammaticAccessToken};
pub use config::CortexConfig;
pub use error::{CortexError, ErrorKind, Result};
pub use provider::{CompletionProvider, CompletionRequest, CompletionResponse, Message, Role};
pub use providers::{CortexProvider, MockProvider, get_provider};
