//! PostGIS-backed catalog.

use crate::catalog::store::CatalogStore;
use crate::catalog::types::{
    Insertion, NewReview, NewSpecialist, NewSpecialty, Review, Specialist, Specialty, StoreError,
};
use crate::config::DatabaseConfig;
use crate::wkt::GeoPoint;
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const SCHEMA: [&str; 4] = [
    "CREATE EXTENSION IF NOT EXISTS postgis",
    r#"CREATE TABLE IF NOT EXISTS specialty (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL DEFAULT ''
    )"#,
    r#"CREATE TABLE IF NOT EXISTS specialist (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        specialty_id INTEGER NOT NULL REFERENCES specialty (id),
        location GEOGRAPHY(Point, 4326) NOT NULL,
        address TEXT NOT NULL DEFAULT '',
        telephone TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        monday TEXT NOT NULL DEFAULT '',
        tuesday TEXT NOT NULL DEFAULT '',
        wednesday TEXT NOT NULL DEFAULT '',
        thursday TEXT NOT NULL DEFAULT '',
        friday TEXT NOT NULL DEFAULT '',
        saturday TEXT NOT NULL DEFAULT '',
        sunday TEXT NOT NULL DEFAULT ''
    )"#,
    r#"CREATE TABLE IF NOT EXISTS review (
        id SERIAL PRIMARY KEY,
        specialist_id INTEGER NOT NULL REFERENCES specialist (id),
        url TEXT NOT NULL DEFAULT '',
        rating DOUBLE PRECISION NOT NULL,
        comment TEXT NOT NULL DEFAULT ''
    )"#,
];

const SPECIALTY_COLUMNS: &str = "id, name, description";

const REVIEW_COLUMNS: &str = "id, specialist_id, url, rating, comment";

const SPECIALIST_COLUMNS: &str = "id, name, specialty_id, ST_AsText(location) AS location, \
     address, telephone, email, monday, tuesday, wednesday, thursday, friday, saturday, sunday";

/// Catalog stored in Postgres with the PostGIS extension.
#[derive(Clone, Debug)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Open a pool using the supplied settings.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        tracing::debug!(
            max_connections = config.max_connections,
            "Connected to catalog database"
        );
        Ok(Self { pool })
    }

    /// Create the catalog tables when they are missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("Catalog schema ensured");
        Ok(())
    }

    /// All specialties ordered by name.
    pub async fn all_specialties(&self) -> Result<Vec<Specialty>, StoreError> {
        let rows = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialty ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Look up a specialty by id.
    pub async fn specialty_by_id(&self, id: i32) -> Result<Option<Specialty>, StoreError> {
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialty WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace name and description of an existing specialty. Returns `false` when absent.
    pub async fn update_specialty(&self, specialty: &Specialty) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE specialty SET name = $1, description = $2 WHERE id = $3")
            .bind(&specialty.name)
            .bind(&specialty.description)
            .bind(specialty.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a specialty. Returns `false` when absent.
    pub async fn delete_specialty(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM specialty WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All specialists ordered by name.
    pub async fn all_specialists(&self) -> Result<Vec<Specialist>, StoreError> {
        let rows = sqlx::query_as::<_, Specialist>(&format!(
            "SELECT {SPECIALIST_COLUMNS} FROM specialist ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Specialists practicing the given specialty.
    pub async fn specialists_by_specialty(
        &self,
        specialty_id: i32,
    ) -> Result<Vec<Specialist>, StoreError> {
        let rows = sqlx::query_as::<_, Specialist>(&format!(
            "SELECT {SPECIALIST_COLUMNS} FROM specialist WHERE specialty_id = $1 ORDER BY name"
        ))
        .bind(specialty_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Look up a specialist by id.
    pub async fn specialist_by_id(&self, id: i32) -> Result<Option<Specialist>, StoreError> {
        let row = sqlx::query_as::<_, Specialist>(&format!(
            "SELECT {SPECIALIST_COLUMNS} FROM specialist WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Specialists of one specialty within `radius_m` meters of `point`, nearest first.
    ///
    /// Distance filtering runs in PostGIS; nothing is computed in process.
    pub async fn specialists_near(
        &self,
        specialty_id: i32,
        point: &GeoPoint,
        radius_m: f64,
    ) -> Result<Vec<Specialist>, StoreError> {
        let rows = sqlx::query_as::<_, Specialist>(&format!(
            "SELECT {SPECIALIST_COLUMNS} FROM specialist \
             WHERE specialty_id = $1 AND ST_DWithin(location, ST_GeogFromText($2), $3) \
             ORDER BY ST_Distance(location, ST_GeogFromText($2))"
        ))
        .bind(specialty_id)
        .bind(point.to_wkt())
        .bind(radius_m)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Replace every column of an existing specialist. Returns `false` when absent.
    pub async fn update_specialist(&self, specialist: &Specialist) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE specialist SET name = $1, specialty_id = $2, location = ST_GeogFromText($3), \
             address = $4, telephone = $5, email = $6, monday = $7, tuesday = $8, \
             wednesday = $9, thursday = $10, friday = $11, saturday = $12, sunday = $13 \
             WHERE id = $14",
        )
        .bind(&specialist.name)
        .bind(specialist.specialty_id)
        .bind(&specialist.location)
        .bind(&specialist.address)
        .bind(&specialist.telephone)
        .bind(&specialist.email)
        .bind(&specialist.hours.monday)
        .bind(&specialist.hours.tuesday)
        .bind(&specialist.hours.wednesday)
        .bind(&specialist.hours.thursday)
        .bind(&specialist.hours.friday)
        .bind(&specialist.hours.saturday)
        .bind(&specialist.hours.sunday)
        .bind(specialist.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a specialist. Returns `false` when absent.
    pub async fn delete_specialist(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM specialist WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All reviews ordered by id.
    pub async fn all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Reviews of one specialist.
    pub async fn reviews_by_specialist(
        &self,
        specialist_id: i32,
    ) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM review WHERE specialist_id = $1 ORDER BY id"
        ))
        .bind(specialist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Store a review of an existing specialist and return its id.
    pub async fn insert_review(&self, review: &NewReview) -> Result<i32, StoreError> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO review (specialist_id, url, rating, comment) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(review.specialist_id)
        .bind(&review.url)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Replace every column of an existing review. Returns `false` when absent.
    pub async fn update_review(&self, review: &Review) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE review SET specialist_id = $1, url = $2, rating = $3, comment = $4 \
             WHERE id = $5",
        )
        .bind(review.specialist_id)
        .bind(&review.url)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a review. Returns `false` when absent.
    pub async fn delete_review(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn existing_id(&self, table: &str, name: &str) -> Result<Insertion, StoreError> {
        let id: Option<i32> = sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        id.map(Insertion::Existing).ok_or_else(|| {
            StoreError::Conflict(format!("{table} {name:?} vanished during insert"))
        })
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    async fn find_specialty_by_name(&self, name: &str) -> Result<Option<Specialty>, StoreError> {
        let row = sqlx::query_as::<_, Specialty>(&format!(
            "SELECT {SPECIALTY_COLUMNS} FROM specialty WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_specialty(&self, specialty: &NewSpecialty) -> Result<Insertion, StoreError> {
        let created: Option<i32> = sqlx::query_scalar(
            "INSERT INTO specialty (name, description) VALUES ($1, $2) \
             ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(&specialty.name)
        .bind(&specialty.description)
        .fetch_optional(&self.pool)
        .await?;

        match created {
            Some(id) => Ok(Insertion::Created(id)),
            None => self.existing_id("specialty", &specialty.name).await,
        }
    }

    async fn find_specialist_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Specialist>, StoreError> {
        let row = sqlx::query_as::<_, Specialist>(&format!(
            "SELECT {SPECIALIST_COLUMNS} FROM specialist WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_specialist(
        &self,
        specialist: &NewSpecialist,
    ) -> Result<Insertion, StoreError> {
        let created: Option<i32> = sqlx::query_scalar(
            "INSERT INTO specialist (name, specialty_id, location, address, telephone, email, \
             monday, tuesday, wednesday, thursday, friday, saturday, sunday) \
             VALUES ($1, $2, ST_GeogFromText($3), $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (name) DO NOTHING RETURNING id",
        )
        .bind(&specialist.name)
        .bind(specialist.specialty_id)
        .bind(&specialist.location)
        .bind(&specialist.address)
        .bind(&specialist.telephone)
        .bind(&specialist.email)
        .bind(&specialist.hours.monday)
        .bind(&specialist.hours.tuesday)
        .bind(&specialist.hours.wednesday)
        .bind(&specialist.hours.thursday)
        .bind(&specialist.hours.friday)
        .bind(&specialist.hours.saturday)
        .bind(&specialist.hours.sunday)
        .fetch_optional(&self.pool)
        .await?;

        match created {
            Some(id) => Ok(Insertion::Created(id)),
            None => self.existing_id("specialist", &specialist.name).await,
        }
    }
}
