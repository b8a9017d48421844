//! Analysis log record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Severity of an analysis log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the analysis log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub category: String,
    pub message: String,
    #[serde(rename = "log_type")]
    pub level: LogLevel,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(
        category: &str,
        message: &str,
        level: LogLevel,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            category: category.to_string(),
            message: message.to_string(),
            level,
            metadata,
        }
    }
}

/// Counts over a window of log entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisStats {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_level: BTreeMap<LogLevel, usize>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl AnalysisStats {
    /// Aggregate entries given in insertion order.
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut stats = Self {
            total: entries.len(),
            earliest: entries.first().map(|e| e.timestamp),
            latest: entries.last().map(|e| e.timestamp),
            ..Self::default()
        };

        for entry in entries {
            *stats.by_category.entry(entry.category.clone()).or_insert(0) += 1;
            *stats.by_level.entry(entry.level).or_insert(0) += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_json_shape() {
        let mut metadata = serde_json::Map::new();
        metadata.insert("models".into(), serde_json::json!(2));
        let entry = LogEntry::new("news", "done", LogLevel::Success, metadata);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["category"], "news");
        assert_eq!(json["log_type"], "success");
        assert_eq!(json["metadata"]["models"], 2);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_entry_without_metadata_parses() {
        let line = r#"{"timestamp":"2025-01-02T03:04:05Z","category":"viral","message":"m","log_type":"info"}"#;
        let entry: LogEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.level, LogLevel::Info);
        assert!(entry.metadata.is_empty());
    }

    #[test]
    fn test_stats_from_entries() {
        let entries = vec![
            LogEntry::new("news", "a", LogLevel::Info, Default::default()),
            LogEntry::new("news", "b", LogLevel::Success, Default::default()),
            LogEntry::new("climate", "c", LogLevel::Info, Default::default()),
        ];

        let stats = AnalysisStats::from_entries(&entries);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category["news"], 2);
        assert_eq!(stats.by_category["climate"], 1);
        assert_eq!(stats.by_level[&LogLevel::Info], 2);
        assert_eq!(stats.earliest, Some(entries[0].timestamp));
        assert_eq!(stats.latest, Some(entries[2].timestamp));
    }

    #[test]
    fn test_stats_empty() {
        let stats = AnalysisStats::from_entries(&[]);
        assert_eq!(stats, AnalysisStats::default());
    }
}
