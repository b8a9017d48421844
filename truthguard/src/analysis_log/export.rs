//! Rendering log entries for export.

use super::types::LogEntry;
use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

const CSV_HEADER: [&str; 5] = ["timestamp", "category", "message", "log_type", "metadata"];

pub fn render(entries: &[LogEntry], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(entries).context("Failed to serialize log entries")
        }
        ExportFormat::Csv => to_csv(entries),
    }
}

fn to_csv(entries: &[LogEntry]) -> Result<String> {
    if entries.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(vec![]);
    writer
        .write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for entry in entries {
        let metadata =
            serde_json::to_string(&entry.metadata).context("Failed to serialize metadata")?;
        writer
            .write_record([
                entry.timestamp.to_rfc3339(),
                entry.category.clone(),
                entry.message.clone(),
                entry.level.to_string(),
                metadata,
            ])
            .context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis_log::types::LogLevel;

    fn entry(message: &str) -> LogEntry {
        let mut metadata = serde_json::Map::new();
        metadata.insert("models".into(), serde_json::json!(["a", "b"]));
        LogEntry::new("news", message, LogLevel::Success, metadata)
    }

    #[test]
    fn test_json_export_round_trips() {
        let entries = vec![entry("one"), entry("two")];
        let rendered = render(&entries, ExportFormat::Json).unwrap();
        let parsed: Vec<LogEntry> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_csv_export() {
        let rendered = render(&[entry("plain")], ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = rendered.split("\r\n").collect();
        assert_eq!(lines[0], "timestamp,category,message,log_type,metadata");
        assert!(lines[1].contains(",news,plain,success,"));
        assert!(lines[1].ends_with(r#""{""models"":[""a"",""b""]}""#));
    }

    #[test]
    fn test_csv_quoting() {
        let rendered = render(
            &[entry("a,b"), entry("say \"hi\""), entry("two\nlines")],
            ExportFormat::Csv,
        )
        .unwrap();
        assert!(rendered.contains(",news,\"a,b\",success,"));
        assert!(rendered.contains(",news,\"say \"\"hi\"\"\",success,"));
        assert!(rendered.contains(",news,\"two\nlines\",success,"));

        let mut reader = csv::Reader::from_reader(rendered.as_bytes());
        let messages: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[2].to_string())
            .collect();
        assert_eq!(messages, vec!["a,b", "say \"hi\"", "two\nlines"]);
    }

    #[test]
    fn test_csv_empty() {
        assert_eq!(render(&[], ExportFormat::Csv).unwrap(), "");
    }
}
