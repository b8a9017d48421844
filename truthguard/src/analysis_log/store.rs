//! Append-only JSONL storage for analysis log entries.

use super::types::LogEntry;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Append one entry as a single JSON line, creating the file if needed.
pub fn append_entry(path: &Path, entry: &LogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let line = serde_json::to_string(entry).context("Failed to serialize log entry")?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    writeln!(file, "{}", line).context("Failed to write log entry")?;

    Ok(())
}

/// Read every parseable entry in insertion order.
///
/// A missing file is an empty log. Lines that are not valid entries are
/// skipped.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (number, line) in reader.split(b'\n').enumerate() {
        let line = line.context("Failed to read log file")?;
        if line.trim_ascii().is_empty() {
            continue;
        }
        match serde_json::from_slice::<LogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::debug!("Skipping malformed log line {}: {}", number + 1, e),
        }
    }

    Ok(entries)
}

/// Remove the log file. Returns whether there was one.
pub fn clear(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).context("Failed to remove log file")?;
    Ok(true)
}
