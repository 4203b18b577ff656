//! Store abstraction consumed by the reconciler.

use crate::catalog::types::{Insertion, NewSpecialist, NewSpecialty, Specialist, Specialty, StoreError};
use async_trait::async_trait;

/// Point lookups and insert-if-absent writes over the two catalog entities.
///
/// Lookups return `Ok(None)` when no row carries the name; `Err` always means the query
/// itself failed. Inserts are atomic on the natural key: a concurrent writer that got there
/// first yields [`Insertion::Existing`] instead of a duplicate row.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up a specialty by its name.
    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<Specialty>, StoreError>;

    /// Insert a specialty unless one with the same name exists.
    async fn insert_specialty(&self, specialty: &NewSpecialty) -> Result<Insertion, StoreError>;

    /// Look up a specialist by its name.
    async fn find_specialist_by_name(&self, name: &str)
    -> Result<Option<Specialist>, StoreError>;

    /// Insert a specialist unless one with the same name exists.
    ///
    /// The referenced specialty must already be present.
    async fn insert_specialist(&self, specialist: &NewSpecialist)
    -> Result<Insertion, StoreError>;
}
