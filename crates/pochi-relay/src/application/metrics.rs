//! Per-command success/failure counters and the parse-failure counter.
//!
//! Counters are independent atomics indexed by [`CommandType::index`], so
//! sessions record outcomes without taking any lock.  Only monotonic
//! increments are exposed.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use pochi_core::CommandType;
use serde::Serialize;

/// Process-wide command counters, shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct CommandMetrics {
    success: [AtomicU64; CommandType::COUNT],
    failure: [AtomicU64; CommandType::COUNT],
    parse_failures: AtomicU64,
}

impl CommandMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one successfully dispatched `command`.
    pub fn record_success(&self, command: CommandType) {
        self.success[command.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one failed dispatch of `command`.
    pub fn record_failure(&self, command: CommandType) {
        self.failure[command.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one frame rejected by the parser.
    pub fn record_parse_failure(&self) {
        self.parse_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn success_count(&self, command: CommandType) -> u64 {
        self.success[command.index()].load(Ordering::Relaxed)
    }

    pub fn failure_count(&self, command: CommandType) -> u64 {
        self.failure[command.index()].load(Ordering::Relaxed)
    }

    pub fn parse_failure_count(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter.
    ///
    /// The maps only contain commands whose count is non-zero.  Counters are
    /// read one at a time, so a snapshot taken under load is not atomic
    /// across commands.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            success_counts: non_zero(&self.success),
            failure_counts: non_zero(&self.failure),
            parse_failures: self.parse_failure_count(),
        }
    }
}

fn non_zero(counters: &[AtomicU64; CommandType::COUNT]) -> BTreeMap<CommandType, u64> {
    CommandType::ALL
        .into_iter()
        .map(|c| (c, counters[c.index()].load(Ordering::Relaxed)))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// The body of `GET /metrics`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub success_counts: BTreeMap<CommandType, u64>,
    pub failure_counts: BTreeMap<CommandType, u64>,
    pub parse_failures: u64,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_metrics_snapshot_is_empty() {
        let snapshot = CommandMetrics::new().snapshot();
        assert!(snapshot.success_counts.is_empty());
        assert!(snapshot.failure_counts.is_empty());
        assert_eq!(snapshot.parse_failures, 0);
    }

    #[test]
    fn test_counters_are_per_command() {
        // Arrange
        let metrics = CommandMetrics::new();

        // Act
        metrics.record_success(CommandType::Next);
        metrics.record_success(CommandType::Next);
        metrics.record_failure(CommandType::Blackout);
        metrics.record_parse_failure();

        // Assert
        assert_eq!(metrics.success_count(CommandType::Next), 2);
        assert_eq!(metrics.success_count(CommandType::Prev), 0);
        assert_eq!(metrics.failure_count(CommandType::Blackout), 1);
        assert_eq!(metrics.failure_count(CommandType::Next), 0);
        assert_eq!(metrics.parse_failure_count(), 1);
    }

    #[test]
    fn test_snapshot_omits_zero_entries() {
        let metrics = CommandMetrics::new();
        metrics.record_success(CommandType::Whiteout);

        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.success_counts.len(), 1);
        assert_eq!(snapshot.success_counts[&CommandType::Whiteout], 1);
        assert!(snapshot.failure_counts.is_empty());
    }

    #[test]
    fn test_snapshot_serializes_with_camel_case_keys() {
        // Arrange
        let metrics = CommandMetrics::new();
        metrics.record_success(CommandType::Next);
        metrics.record_failure(CommandType::Blackout);
        metrics.record_parse_failure();

        // Act
        let json = serde_json::to_value(metrics.snapshot()).unwrap();

        // Assert
        assert_eq!(
            json,
            serde_json::json!({
                "successCounts": { "Next": 1 },
                "failureCounts": { "Blackout": 1 },
                "parseFailures": 1
            })
        );
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let metrics = Arc::new(CommandMetrics::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_success(CommandType::Prev);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.success_count(CommandType::Prev), 8000);
    }
}
