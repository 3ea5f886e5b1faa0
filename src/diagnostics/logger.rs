use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;

// ---------------------------------------------------------------------------
// Request log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the request log (`~/.carbonwise/request-log.jsonl`).
///
/// One line per backend call, written by the API client. Read back by
/// `carbonwise log` for per-endpoint failure and latency summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: String,
    pub method: String,
    pub endpoint: String,
    /// HTTP status when one was received. Transport failures have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub duration_ms: u64,
    pub success: bool,
    /// Error class (`transport`, `status`, `backend`, `decode`, `input`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RequestLogEntry {
    /// Build an entry from the outcome of one request.
    pub fn from_outcome(
        method: &str,
        endpoint: &str,
        outcome: &Result<Value, ApiError>,
        duration_ms: u64,
    ) -> Self {
        let (status, success, error_kind, error) = match outcome {
            Ok(_) => (Some(200), true, None, None),
            Err(e) => (
                e.status().or(match e {
                    // The backend reports logical errors with a 200.
                    ApiError::Backend(_) | ApiError::Decode { .. } => Some(200),
                    _ => None,
                }),
                false,
                Some(e.kind().to_string()),
                Some(e.to_string()),
            ),
        };

        Self {
            timestamp: Utc::now().to_rfc3339(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status,
            duration_ms,
            success,
            error_kind,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Record one backend call. Best-effort: failures are ignored so a broken
/// log file never breaks a request.
pub fn log_request(
    method: &str,
    endpoint: &str,
    outcome: &Result<Value, ApiError>,
    duration_ms: u64,
) {
    let entry = RequestLogEntry::from_outcome(method, endpoint, outcome, duration_ms);
    if let Some(path) = request_log_path() {
        let _ = append_entry(&path, &entry);
    }
}

fn append_entry(path: &Path, entry: &RequestLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all entries from a log file, skipping malformed lines.
/// A missing file reads as empty.
pub fn read_entries(path: &Path) -> Vec<RequestLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<RequestLogEntry>(&line).ok())
        .collect()
}

/// Read entries from the default log, limited to the last `days` days.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<RequestLogEntry> {
    let Some(path) = request_log_path() else {
        return Vec::new();
    };
    filter_since_days(read_entries(&path), days)
}

/// Keep entries newer than `days` days. `None` keeps everything.
pub fn filter_since_days(entries: Vec<RequestLogEntry>, days: Option<u32>) -> Vec<RequestLogEntry> {
    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

/// `~/.carbonwise/request-log.jsonl`
pub fn request_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".carbonwise").join("request-log.jsonl"))
}
