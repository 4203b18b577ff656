//! End-to-end ingestion run: fetch, then reconcile.

use crate::{
    catalog::CatalogStore,
    ingest::{
        reconcile::Reconciler,
        types::{IngestError, ReconcileOutcome},
    },
    metrics::{IngestMetrics, MetricsSnapshot},
    source::RecordSource,
};
use std::sync::Arc;
use std::time::Instant;

/// Runs one ingestion pass per call.
///
/// Holds the source, the reconciler over the shared store, and run counters. Construct it
/// once and call [`IngestionService::run`] for each pass; a failed pass leaves the counters
/// untouched.
pub struct IngestionService {
    source: Box<dyn RecordSource>,
    reconciler: Reconciler,
    metrics: Arc<IngestMetrics>,
}

impl IngestionService {
    /// Assemble a service over the given source and store.
    pub fn new(source: Box<dyn RecordSource>, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            source,
            reconciler: Reconciler::new(store),
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Fetch the current feed and reconcile it into the catalog.
    ///
    /// Nothing touches the store when the fetch fails.
    #[tracing::instrument(name = "ingest_run", skip(self))]
    pub async fn run(&self) -> Result<ReconcileOutcome, IngestError> {
        let started = Instant::now();
        let records = self.source.fetch().await.map_err(|error| {
            tracing::error!(error = %error, retryable = error.is_retryable(), "Fetch failed");
            error
        })?;

        let outcome = self
            .reconciler
            .reconcile(&records)
            .await
            .map_err(|error| {
                tracing::error!(
                    error = %error,
                    retryable = error.is_retryable(),
                    "Reconciliation failed"
                );
                error
            })?;

        self.metrics.record_run(
            outcome.specialties_created as u64,
            outcome.specialists_created as u64,
            outcome.specialists_skipped as u64,
        );
        tracing::info!(
            records = records.len(),
            specialties_created = outcome.specialties_created,
            specialties_existing = outcome.specialties_existing,
            specialists_created = outcome.specialists_created,
            specialists_skipped = outcome.specialists_skipped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ingestion run complete"
        );
        Ok(outcome)
    }

    /// Counters accumulated across completed runs.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::source::RawSourceRecord;
    use async_trait::async_trait;
    use reqwest::StatusCode;

    struct StaticSource(Vec<RawSourceRecord>);

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<RawSourceRecord>, IngestError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<RawSourceRecord>, IngestError> {
            Err(IngestError::SourceUnavailable {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream".into(),
            })
        }
    }

    fn record(name: &str, specialization: &str) -> RawSourceRecord {
        RawSourceRecord {
            name: name.into(),
            specialization: specialization.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn run_accumulates_metrics_across_passes() {
        let catalog = Arc::new(MemoryCatalog::new());
        let service = IngestionService::new(
            Box::new(StaticSource(vec![
                record("Ambulancia A", "ortoped"),
                record("Ambulancia B", "ortoped"),
            ])),
            catalog.clone(),
        );

        let first = service.run().await.expect("first run");
        assert_eq!(first.specialists_created, 2);
        let second = service.run().await.expect("second run");
        assert_eq!(second.specialists_skipped, 2);

        let snapshot = service.metrics_snapshot();
        assert_eq!(
            snapshot,
            MetricsSnapshot {
                runs_completed: 2,
                specialties_created: 1,
                specialists_created: 2,
                specialists_skipped: 2,
            }
        );
    }

    #[tokio::test]
    async fn failed_fetch_leaves_catalog_and_metrics_untouched() {
        let catalog = Arc::new(MemoryCatalog::new());
        let service = IngestionService::new(Box::new(FailingSource), catalog.clone());

        let error = service.run().await.expect_err("fetch failure");
        assert!(matches!(error, IngestError::SourceUnavailable { .. }));
        assert!(catalog.all_specialties().expect("list").is_empty());
        assert_eq!(service.metrics_snapshot(), MetricsSnapshot::default());
    }
}
