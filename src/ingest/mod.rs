//! Ingestion pipeline: normalization, reconciliation, and the end-to-end run.

pub mod normalize;
mod reconcile;
mod service;
pub mod types;

pub use normalize::{InsurerAffiliations, NormalizedRecord, normalize};
pub use reconcile::Reconciler;
pub use service::IngestionService;
pub use types::{IngestError, ReconcileOutcome};
