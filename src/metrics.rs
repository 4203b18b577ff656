use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Default)]
pub struct IngestMetrics {
    runs_completed: AtomicU64,
    specialties_created: AtomicU64,
    specialists_created: AtomicU64,
    specialists_skipped: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed ingestion run.
    pub fn record_run(
        &self,
        specialties_created: u64,
        specialists_created: u64,
        specialists_skipped: u64,
    ) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.specialties_created
            .fetch_add(specialties_created, Ordering::Relaxed);
        self.specialists_created
            .fetch_add(specialists_created, Ordering::Relaxed);
        self.specialists_skipped
            .fetch_add(specialists_skipped, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            runs_completed: self.runs_completed.load(Ordering::Relaxed),
            specialties_created: self.specialties_created.load(Ordering::Relaxed),
            specialists_created: self.specialists_created.load(Ordering::Relaxed),
            specialists_skipped: self.specialists_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of ingestion runs that finished without error.
    pub runs_completed: u64,
    /// Specialties inserted across all runs.
    pub specialties_created: u64,
    /// Specialists inserted across all runs.
    pub specialists_created: u64,
    /// Specialists skipped because they were already catalogued.
    pub specialists_skipped: u64,
}
