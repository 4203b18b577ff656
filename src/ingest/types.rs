//! Core data types and error definitions for the ingestion pipeline.

use crate::{catalog::StoreError, config::ConfigError, wkt::WktError};
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Errors that abort an ingestion run.
///
/// Every stage fails fast: the first error ends the run and is returned as-is.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The source endpoint could not be reached.
    #[error("Source request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The source answered with something other than `200 OK`.
    #[error("Source unavailable ({status}): {body}")]
    SourceUnavailable {
        /// HTTP status returned by the source.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The source body was not a decodable feature collection.
    #[error("Failed to decode source payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// A location literal failed to parse.
    #[error("Malformed location: {0}")]
    MalformedWkt(#[from] WktError),
    /// A catalog lookup or insert failed.
    #[error("Catalog store failed: {0}")]
    Store(#[from] StoreError),
    /// A record referenced a specialty that the catalog does not hold.
    #[error("Specialty {specialty:?} not found for specialist {specialist:?}")]
    SpecialtyNotFound {
        /// Specialty name carried by the record.
        specialty: String,
        /// Specialist name of the record being inserted.
        specialist: String,
    },
}

impl IngestError {
    /// Whether a later run may succeed without operator intervention.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::SourceUnavailable { .. } => true,
            Self::Store(error) => error.is_transient(),
            Self::Config(_) | Self::Decode(_) | Self::MalformedWkt(_) => false,
            Self::SpecialtyNotFound { .. } => false,
        }
    }
}

/// Summary of a completed reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Distinct specialty names that were newly inserted.
    pub specialties_created: usize,
    /// Distinct specialty names that were already catalogued.
    pub specialties_existing: usize,
    /// Specialists newly inserted.
    pub specialists_created: usize,
    /// Records skipped because the specialist name was already catalogued.
    pub specialists_skipped: usize,
}
