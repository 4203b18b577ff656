#![deny(missing_docs)]

//! Core library for ingesting open-data healthcare specialists into a catalog.

/// Specialty and specialist storage.
pub mod catalog;
/// Environment-driven configuration management.
pub mod config;
/// Normalization, reconciliation, and the ingestion run.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Open-data feed retrieval.
pub mod source;
/// Well-Known Text point encoding.
pub mod wkt;
