//! Persistent catalog of specialties and specialists.

pub mod memory;
pub mod postgres;
pub mod store;
pub mod types;

pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;
pub use store::CatalogStore;
pub use types::{
    Insertion, NewReview, NewSpecialist, NewSpecialty, OpeningHours, Review, Specialist,
    Specialty, StoreError,
};
