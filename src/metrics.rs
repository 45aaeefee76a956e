use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing assistant usage since startup.
#[derive(Default)]
pub struct UsageMetrics {
    questions_answered: AtomicU64,
    summaries_generated: AtomicU64,
    blank_submissions: AtomicU64,
}

impl UsageMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a question that produced an answer.
    pub fn record_answer(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a report that produced a summary.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a blank question or report that was turned away before any model call.
    pub fn record_blank(&self) {
        self.blank_submissions.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            blank_submissions: self.blank_submissions.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of usage counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Questions answered since startup.
    pub questions_answered: u64,
    /// Summaries generated since startup.
    pub summaries_generated: u64,
    /// Blank submissions ignored since startup.
    pub blank_submissions: u64,
}
