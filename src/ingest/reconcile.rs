//! Natural-key reconciliation of a fetched batch against the catalog.

use crate::{
    catalog::{CatalogStore, NewSpecialty},
    ingest::{
        normalize::normalize,
        types::{IngestError, ReconcileOutcome},
    },
    source::RawSourceRecord,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Inserts the specialties and specialists of a batch that the catalog does not hold yet.
///
/// Specialties are always settled before any specialist is written, so every specialist
/// insert references a row that exists. The first failing store call aborts the batch.
pub struct Reconciler {
    store: Arc<dyn CatalogStore>,
}

impl Reconciler {
    /// Build a reconciler over the given store.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Reconcile a batch in two passes: distinct specialties, then specialists in feed order.
    pub async fn reconcile(
        &self,
        records: &[RawSourceRecord],
    ) -> Result<ReconcileOutcome, IngestError> {
        let mut outcome = ReconcileOutcome::default();
        self.reconcile_specialties(records, &mut outcome).await?;
        self.reconcile_specialists(records, &mut outcome).await?;
        Ok(outcome)
    }

    async fn reconcile_specialties(
        &self,
        records: &[RawSourceRecord],
        outcome: &mut ReconcileOutcome,
    ) -> Result<(), IngestError> {
        let names: BTreeSet<&str> = records
            .iter()
            .map(|record| record.specialization.as_str())
            .collect();
        tracing::debug!(distinct = names.len(), "Reconciling specialties");

        for name in names {
            if self.store.find_specialty_by_name(name).await?.is_some() {
                outcome.specialties_existing += 1;
                continue;
            }

            let insertion = self.store.insert_specialty(&NewSpecialty::named(name)).await?;
            if insertion.is_created() {
                outcome.specialties_created += 1;
                tracing::info!(name, id = insertion.id(), "Specialty inserted");
            } else {
                outcome.specialties_existing += 1;
                tracing::debug!(name, id = insertion.id(), "Specialty inserted concurrently");
            }
        }

        Ok(())
    }

    async fn reconcile_specialists(
        &self,
        records: &[RawSourceRecord],
        outcome: &mut ReconcileOutcome,
    ) -> Result<(), IngestError> {
        for record in records {
            if self
                .store
                .find_specialist_by_name(&record.name)
                .await?
                .is_some()
            {
                outcome.specialists_skipped += 1;
                tracing::trace!(name = %record.name, "Specialist already catalogued");
                continue;
            }

            let specialty = self
                .store
                .find_specialty_by_name(&record.specialization)
                .await?
                .ok_or_else(|| IngestError::SpecialtyNotFound {
                    specialty: record.specialization.clone(),
                    specialist: record.name.clone(),
                })?;

            let normalized = normalize(record, specialty.id);
            tracing::debug!(
                name = %record.name,
                specialty = %specialty.name,
                location = %normalized.specialist.location,
                staff = %normalized.staff,
                insurers = ?normalized.insurers,
                "Normalized specialist"
            );

            let insertion = self.store.insert_specialist(&normalized.specialist).await?;
            if insertion.is_created() {
                outcome.specialists_created += 1;
                tracing::info!(name = %record.name, id = insertion.id(), "Specialist inserted");
            } else {
                outcome.specialists_skipped += 1;
                tracing::debug!(name = %record.name, id = insertion.id(), "Specialist inserted concurrently");
            }
        }

        Ok(())
    }
}
