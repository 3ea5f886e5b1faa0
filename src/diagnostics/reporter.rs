//! Request log reporter: per-endpoint call counts, failure rates and
//! latency, plus the most recent failures.

use std::collections::HashMap;

use serde::Serialize;

use crate::diagnostics::logger::{self, RequestLogEntry};

/// Summary for `carbonwise log`.
#[derive(Debug, Default, Serialize)]
pub struct RequestReport {
    pub total_requests: usize,
    pub failed_requests: usize,
    pub endpoints: Vec<EndpointStat>,
    /// Newest first.
    pub recent_failures: Vec<RequestLogEntry>,
}

impl RequestReport {
    pub fn failure_pct(&self) -> f64 {
        pct(self.failed_requests, self.total_requests)
    }
}

/// Aggregated numbers for one `METHOD /endpoint` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStat {
    pub method: String,
    pub endpoint: String,
    pub count: usize,
    pub failures: usize,
    pub avg_duration_ms: f64,
    pub max_duration_ms: u64,
}

impl EndpointStat {
    pub fn failure_pct(&self) -> f64 {
        pct(self.failures, self.count)
    }
}

/// How many recent failures the report keeps.
const RECENT_FAILURES: usize = 10;

/// Build a report from the default log, optionally limited to `days`.
pub fn compute_report(days: Option<u32>) -> RequestReport {
    build_report(&logger::read_entries_since_days(days))
}

/// Build a report from in-memory entries (oldest first, as logged).
pub fn build_report(entries: &[RequestLogEntry]) -> RequestReport {
    let mut by_endpoint: HashMap<(&str, &str), Vec<&RequestLogEntry>> = HashMap::new();
    for entry in entries {
        by_endpoint
            .entry((entry.method.as_str(), entry.endpoint.as_str()))
            .or_default()
            .push(entry);
    }

    let mut endpoints: Vec<EndpointStat> = by_endpoint
        .into_iter()
        .map(|((method, endpoint), group)| {
            let total_ms: u64 = group.iter().map(|e| e.duration_ms).sum();
            EndpointStat {
                method: method.to_string(),
                endpoint: endpoint.to_string(),
                count: group.len(),
                failures: group.iter().filter(|e| !e.success).count(),
                avg_duration_ms: total_ms as f64 / group.len() as f64,
                max_duration_ms: group.iter().map(|e| e.duration_ms).max().unwrap_or(0),
            }
        })
        .collect();

    endpoints.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.endpoint.cmp(&b.endpoint))
            .then_with(|| a.method.cmp(&b.method))
    });

    let recent_failures = entries
        .iter()
        .rev()
        .filter(|e| !e.success)
        .take(RECENT_FAILURES)
        .cloned()
        .collect();

    RequestReport {
        total_requests: entries.len(),
        failed_requests: entries.iter().filter(|e| !e.success).count(),
        endpoints,
        recent_failures,
    }
}

fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(method: &str, endpoint: &str, ms: u64, success: bool) -> RequestLogEntry {
        RequestLogEntry {
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status: Some(if success { 200 } else { 500 }),
            duration_ms: ms,
            success,
            error_kind: (!success).then(|| "status".to_string()),
            error: (!success).then(|| format!("HTTP error! status: 500 at {ms}")),
        }
    }

    #[test]
    fn empty_log_gives_empty_report() {
        let report = build_report(&[]);
        assert_eq!(report.total_requests, 0);
        assert_eq!(report.failure_pct(), 0.0);
        assert!(report.endpoints.is_empty());
    }

    #[test]
    fn groups_by_method_and_endpoint() {
        let entries = vec![
            entry("POST", "/lifecycle", 100, true),
            entry("POST", "/lifecycle", 300, false),
            entry("GET", "/vehicles", 50, true),
            entry("POST", "/lifecycle", 200, true),
        ];
        let report = build_report(&entries);

        assert_eq!(report.total_requests, 4);
        assert_eq!(report.failed_requests, 1);
        assert!((report.failure_pct() - 25.0).abs() < 1e-9);

        let lifecycle = &report.endpoints[0];
        assert_eq!(lifecycle.endpoint, "/lifecycle");
        assert_eq!(lifecycle.count, 3);
        assert_eq!(lifecycle.failures, 1);
        assert!((lifecycle.avg_duration_ms - 200.0).abs() < 1e-9);
        assert_eq!(lifecycle.max_duration_ms, 300);
        assert_eq!(report.endpoints[1].endpoint, "/vehicles");
    }

    #[test]
    fn recent_failures_are_newest_first_and_capped() {
        let entries: Vec<_> = (0..15).map(|i| entry("GET", "/", i, false)).collect();
        let report = build_report(&entries);
        assert_eq!(report.recent_failures.len(), RECENT_FAILURES);
        assert_eq!(report.recent_failures[0].duration_ms, 14);
    }
}
