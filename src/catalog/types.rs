//! Canonical catalog entities and store errors.

use crate::wkt::{GeoPoint, WktError};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by catalog store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database driver reported a failure.
    #[error("Database request failed: {0}")]
    Database(#[from] sqlx::Error),
    /// The store could not serve the request at all.
    #[error("Catalog store unavailable: {0}")]
    Unavailable(String),
    /// A write would break a natural-key or referential constraint.
    #[error("Catalog constraint violated: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(error) => matches!(
                error,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            Self::Unavailable(_) => true,
            Self::Conflict(_) => false,
        }
    }
}

/// A medical specialty, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Specialty {
    /// Store-assigned identifier.
    pub id: i32,
    /// Natural key.
    pub name: String,
    /// Human-readable description; empty for ingested specialties.
    pub description: String,
}

/// Insert payload for [`Specialty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpecialty {
    /// Natural key.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl NewSpecialty {
    /// Specialty with the given name and an empty description.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

/// Weekly opening hours, one free-text entry per day. Empty means closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OpeningHours {
    /// Monday.
    pub monday: String,
    /// Tuesday.
    pub tuesday: String,
    /// Wednesday.
    pub wednesday: String,
    /// Thursday.
    pub thursday: String,
    /// Friday.
    pub friday: String,
    /// Saturday.
    pub saturday: String,
    /// Sunday.
    pub sunday: String,
}

/// A catalogued specialist practice, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Specialist {
    /// Store-assigned identifier.
    pub id: i32,
    /// Natural key.
    pub name: String,
    /// Referenced [`Specialty::id`].
    pub specialty_id: i32,
    /// `POINT(<lon> <lat>)` literal.
    pub location: String,
    /// Postal address.
    pub address: String,
    /// Comma-joined phone numbers.
    pub telephone: String,
    /// Contact email.
    pub email: String,
    /// Weekly opening hours.
    #[sqlx(flatten)]
    pub hours: OpeningHours,
}

impl Specialist {
    /// Decode the stored WKT location.
    pub fn coordinates(&self) -> Result<GeoPoint, WktError> {
        self.location.parse()
    }
}

/// Insert payload for [`Specialist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpecialist {
    /// Natural key.
    pub name: String,
    /// Referenced [`Specialty::id`]; must exist before the insert.
    pub specialty_id: i32,
    /// `POINT(<lon> <lat>)` literal.
    pub location: String,
    /// Postal address.
    pub address: String,
    /// Comma-joined phone numbers.
    pub telephone: String,
    /// Contact email.
    pub email: String,
    /// Weekly opening hours.
    pub hours: OpeningHours,
}

impl NewSpecialist {
    /// Attach a store-assigned id, producing the persisted entity.
    pub fn with_id(self, id: i32) -> Specialist {
        Specialist {
            id,
            name: self.name,
            specialty_id: self.specialty_id,
            location: self.location,
            address: self.address,
            telephone: self.telephone,
            email: self.email,
            hours: self.hours,
        }
    }
}

/// A published review of a specialist.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Store-assigned identifier.
    pub id: i32,
    /// Referenced [`Specialist::id`].
    pub specialist_id: i32,
    /// Where the review was published.
    pub url: String,
    /// Rating as published by the review site.
    pub rating: f64,
    /// Free-text comment; may be empty.
    pub comment: String,
}

/// Insert payload for [`Review`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    /// Referenced [`Specialist::id`]; must exist before the insert.
    pub specialist_id: i32,
    /// Where the review was published.
    pub url: String,
    /// Rating as published by the review site.
    pub rating: f64,
    /// Free-text comment.
    pub comment: String,
}

impl NewReview {
    /// Attach a store-assigned id, producing the persisted entity.
    pub fn with_id(self, id: i32) -> Review {
        Review {
            id,
            specialist_id: self.specialist_id,
            url: self.url,
            rating: self.rating,
            comment: self.comment,
        }
    }
}

/// Result of an atomic insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new row was written with this id.
    Created(i32),
    /// A row with the same natural key already existed under this id.
    Existing(i32),
}

impl Insertion {
    /// Identifier of the row that now holds the natural key.
    pub fn id(self) -> i32 {
        match self {
            Self::Created(id) | Self::Existing(id) => id,
        }
    }

    /// Whether this call wrote the row.
    pub fn is_created(self) -> bool {
        matches!(self, Self::Created(_))
    }
}
