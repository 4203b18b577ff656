//! Process-local catalog used for dry runs and tests.

use crate::catalog::store::CatalogStore;
use crate::catalog::types::{
    Insertion, NewReview, NewSpecialist, NewSpecialty, Review, Specialist, Specialty, StoreError,
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    specialties: Vec<Specialty>,
    specialists: Vec<Specialist>,
    reviews: Vec<Review>,
    next_specialty_id: i32,
    next_specialist_id: i32,
    next_review_id: i32,
}

impl Tables {
    fn has_specialist(&self, id: i32) -> bool {
        self.specialists.iter().any(|specialist| specialist.id == id)
    }
}

/// In-memory catalog with the same natural-key guarantees as the database.
///
/// All mutations run under one lock, so insert-if-absent is atomic.
#[derive(Default)]
pub struct MemoryCatalog {
    tables: Mutex<Tables>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory catalog lock poisoned".into()))
    }

    /// All specialties in insertion order.
    pub fn all_specialties(&self) -> Result<Vec<Specialty>, StoreError> {
        Ok(self.tables()?.specialties.clone())
    }

    /// Look up a specialty by id.
    pub fn specialty_by_id(&self, id: i32) -> Result<Option<Specialty>, StoreError> {
        Ok(self
            .tables()?
            .specialties
            .iter()
            .find(|specialty| specialty.id == id)
            .cloned())
    }

    /// Replace name and description of an existing specialty. Returns `false` when absent.
    pub fn update_specialty(&self, specialty: &Specialty) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .specialties
            .iter()
            .any(|other| other.id != specialty.id && other.name == specialty.name)
        {
            return Err(StoreError::Conflict(format!(
                "specialty name {:?} already taken",
                specialty.name
            )));
        }
        match tables
            .specialties
            .iter_mut()
            .find(|existing| existing.id == specialty.id)
        {
            Some(existing) => {
                *existing = specialty.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete a specialty that no specialist references. Returns `false` when absent.
    pub fn delete_specialty(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .specialists
            .iter()
            .any(|specialist| specialist.specialty_id == id)
        {
            return Err(StoreError::Conflict(format!(
                "specialty {id} is still referenced"
            )));
        }
        let before = tables.specialties.len();
        tables.specialties.retain(|specialty| specialty.id != id);
        Ok(tables.specialties.len() != before)
    }

    /// All specialists in insertion order.
    pub fn all_specialists(&self) -> Result<Vec<Specialist>, StoreError> {
        Ok(self.tables()?.specialists.clone())
    }

    /// Specialists practicing the given specialty.
    pub fn specialists_by_specialty(&self, specialty_id: i32) -> Result<Vec<Specialist>, StoreError> {
        Ok(self
            .tables()?
            .specialists
            .iter()
            .filter(|specialist| specialist.specialty_id == specialty_id)
            .cloned()
            .collect())
    }

    /// Look up a specialist by id.
    pub fn specialist_by_id(&self, id: i32) -> Result<Option<Specialist>, StoreError> {
        Ok(self
            .tables()?
            .specialists
            .iter()
            .find(|specialist| specialist.id == id)
            .cloned())
    }

    /// Replace every column of an existing specialist. Returns `false` when absent.
    pub fn update_specialist(&self, specialist: &Specialist) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if !tables
            .specialties
            .iter()
            .any(|specialty| specialty.id == specialist.specialty_id)
        {
            return Err(StoreError::Conflict(format!(
                "specialty {} does not exist",
                specialist.specialty_id
            )));
        }
        if tables
            .specialists
            .iter()
            .any(|other| other.id != specialist.id && other.name == specialist.name)
        {
            return Err(StoreError::Conflict(format!(
                "specialist name {:?} already taken",
                specialist.name
            )));
        }
        match tables
            .specialists
            .iter_mut()
            .find(|existing| existing.id == specialist.id)
        {
            Some(existing) => {
                *existing = specialist.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete a specialist that no review references. Returns `false` when absent.
    pub fn delete_specialist(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if tables.reviews.iter().any(|review| review.specialist_id == id) {
            return Err(StoreError::Conflict(format!(
                "specialist {id} is still referenced"
            )));
        }
        let before = tables.specialists.len();
        tables.specialists.retain(|specialist| specialist.id != id);
        Ok(tables.specialists.len() != before)
    }

    /// All reviews in insertion order.
    pub fn all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        Ok(self.tables()?.reviews.clone())
    }

    /// Reviews of one specialist.
    pub fn reviews_by_specialist(&self, specialist_id: i32) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .tables()?
            .reviews
            .iter()
            .filter(|review| review.specialist_id == specialist_id)
            .cloned()
            .collect())
    }

    /// Store a review of an existing specialist and return its id.
    pub fn insert_review(&self, review: &NewReview) -> Result<i32, StoreError> {
        let mut tables = self.tables()?;
        if !tables.has_specialist(review.specialist_id) {
            return Err(StoreError::Conflict(format!(
                "specialist {} does not exist",
                review.specialist_id
            )));
        }
        tables.next_review_id += 1;
        let id = tables.next_review_id;
        tables.reviews.push(review.clone().with_id(id));
        Ok(id)
    }

    /// Replace every column of an existing review. Returns `false` when absent.
    pub fn update_review(&self, review: &Review) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        if !tables.has_specialist(review.specialist_id) {
            return Err(StoreError::Conflict(format!(
                "specialist {} does not exist",
                review.specialist_id
            )));
        }
        match tables
            .reviews
            .iter_mut()
            .find(|existing| existing.id == review.id)
        {
            Some(existing) => {
                *existing = review.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete a review. Returns `false` when absent.
    pub fn delete_review(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.reviews.len();
        tables.reviews.retain(|review| review.id != id);
        Ok(tables.reviews.len() != before)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<Specialty>, StoreError> {
        Ok(self
            .tables()?
            .specialties
            .iter()
            .find(|specialty| specialty.name == name)
            .cloned())
    }

    async fn insert_specialty(&self, specialty: &NewSpecialty) -> Result<Insertion, StoreError> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables
            .specialties
            .iter()
            .find(|existing| existing.name == specialty.name)
        {
            return Ok(Insertion::Existing(existing.id));
        }
        tables.next_specialty_id += 1;
        let id = tables.next_specialty_id;
        tables.specialties.push(Specialty {
            id,
            name: specialty.name.clone(),
            description: specialty.description.clone(),
        });
        Ok(Insertion::Created(id))
    }

    async fn find_specialist_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Specialist>, StoreError> {
        Ok(self
            .tables()?
            .specialists
            .iter()
            .find(|specialist| specialist.name == name)
            .cloned())
    }

    async fn insert_specialist(
        &self,
        specialist: &NewSpecialist,
    ) -> Result<Insertion, StoreError> {
        let mut tables = self.tables()?;
        if let Some(existing) = tables
            .specialists
            .iter()
            .find(|existing| existing.name == specialist.name)
        {
            return Ok(Insertion::Existing(existing.id));
        }
        if !tables
            .specialties
            .iter()
            .any(|specialty| specialty.id == specialist.specialty_id)
        {
            return Err(StoreError::Conflict(format!(
                "specialty {} does not exist",
                specialist.specialty_id
            )));
        }
        tables.next_specialist_id += 1;
        let id = tables.next_specialist_id;
        tables.specialists.push(specialist.clone().with_id(id));
        Ok(Insertion::Created(id))
    }
}
