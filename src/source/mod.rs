//! Retrieval of raw specialist records from the open-data endpoint.

pub mod fetcher;
pub mod types;

pub use fetcher::{SourceFetcher, build_http_client};
pub use types::{RawSourceRecord, SourceDocument, SourceFeature};

use crate::ingest::IngestError;
use async_trait::async_trait;

/// Anything that can produce one batch of raw records per call.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Retrieve the current batch in feed order.
    async fn fetch(&self) -> Result<Vec<RawSourceRecord>, IngestError>;
}
