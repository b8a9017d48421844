//! Analysis activity log: a local JSONL file, optionally mirrored to Snowflake.

mod export;
mod remote;
mod store;
mod types;

pub use export::ExportFormat;
pub use remote::StatementSink;
pub use types::{AnalysisStats, LogEntry, LogLevel};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// How many recent entries `stats` looks at.
pub const STATS_WINDOW: usize = 1000;
/// How many recent entries `export` writes.
pub const EXPORT_WINDOW: usize = 500;

pub struct AnalysisLog {
    path: PathBuf,
    remote: Option<StatementSink>,
}

impl AnalysisLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote: None,
        }
    }

    /// Mirror every recorded entry to `sink` as well.
    pub fn with_remote(mut self, sink: StatementSink) -> Self {
        self.remote = Some(sink);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry to the file, then mirror it remotely.
    ///
    /// Only the file write can fail; remote errors are logged and dropped.
    pub async fn record(
        &self,
        category: &str,
        message: &str,
        level: LogLevel,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<LogEntry> {
        let entry = LogEntry::new(category, message, level, metadata);
        store::append_entry(&self.path, &entry)?;

        if let Some(remote) = &self.remote {
            if let Err(e) = remote.insert(&entry).await {
                log::warn!("Could not log to Snowflake: {:#}", e);
            }
        }

        Ok(entry)
    }

    /// The last `limit` entries, optionally for one category, oldest first.
    pub fn entries(&self, category: Option<&str>, limit: usize) -> Result<Vec<LogEntry>> {
        let mut entries = store::read_entries(&self.path)?;
        if let Some(category) = category {
            entries.retain(|e| e.category == category);
        }
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }

    pub fn stats(&self) -> Result<AnalysisStats> {
        let entries = self.entries(None, STATS_WINDOW)?;
        Ok(AnalysisStats::from_entries(&entries))
    }

    pub fn export(&self, format: ExportFormat, category: Option<&str>) -> Result<String> {
        let entries = self.entries(category, EXPORT_WINDOW)?;
        export::render(&entries, format)
    }

    /// Delete the log file. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        store::clear(&self.path)
    }
}
