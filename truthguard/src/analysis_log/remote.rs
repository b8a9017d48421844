//! Mirrors analysis log entries into a Snowflake table through the SQL API.
//!
//! Values are always sent as statement bindings, never spliced into the SQL
//! text.

use super::types::LogEntry;
use anyhow::{Context, Result};
use cortex_client::auth::TOKEN_TYPE_HEADER;
use cortex_client::{AuthStrategy, CortexConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

const INSERT_STATEMENT: &str = "INSERT INTO TRUTHGUARD_DB.VERIFICATION_ENGINE.CONTENT_ANALYSIS \
     (analysis_id, content_type, submission_time, verification_status, analysis_details) \
     SELECT UUID_STRING(), ?, CURRENT_TIMESTAMP(), ?, PARSE_JSON(?)";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const STATEMENT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

impl Binding {
    fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "TEXT",
            value: value.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatementRequest {
    statement: &'static str,
    timeout: u64,
    bindings: BTreeMap<String, Binding>,
}

impl StatementRequest {
    fn insert(entry: &LogEntry) -> Result<Self> {
        let details = serde_json::to_string(entry).context("Failed to serialize log entry")?;

        let mut bindings = BTreeMap::new();
        bindings.insert("1".to_string(), Binding::text(&entry.category));
        bindings.insert("2".to_string(), Binding::text(entry.level.as_str()));
        bindings.insert("3".to_string(), Binding::text(details));

        Ok(Self {
            statement: INSERT_STATEMENT,
            timeout: STATEMENT_TIMEOUT_SECS,
            bindings,
        })
    }
}

/// Sends log entries to the statements endpoint of an account.
pub struct StatementSink {
    url: String,
    auth: Arc<dyn AuthStrategy>,
    client: reqwest::Client,
}

impl StatementSink {
    pub fn new(config: &CortexConfig, auth: Arc<dyn AuthStrategy>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: config.statements_url()?,
            auth,
            client,
        })
    }

    /// Insert one entry.
    pub async fn insert(&self, entry: &LogEntry) -> Result<()> {
        let request = StatementRequest::insert(entry)?;

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.auth.credential()?)
            .header(TOKEN_TYPE_HEADER, self.auth.token_type())
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .context("Snowflake logging failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Snowflake logging failed: HTTP {}: {}", status, body);
        }

        Ok(())
    }
}
