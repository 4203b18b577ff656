use std::{env, time::Duration};

use specialist_catalog::{
    catalog::{CatalogStore, NewReview, NewSpecialist, NewSpecialty, OpeningHours, PgCatalog},
    config::{Config, DatabaseConfig, DEFAULT_DATABASE_MAX_CONNECTIONS},
    source::SourceFetcher,
    wkt::GeoPoint,
};

async fn live_catalog() -> PgCatalog {
    dotenvy::dotenv().ok();
    let url = env::var("DATABASE_URL").expect("DATABASE_URL must point at a PostGIS database");
    let catalog = PgCatalog::connect(&DatabaseConfig {
        url,
        max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
    })
    .await
    .expect("failed to connect to Postgres");
    catalog.ensure_schema().await.expect("schema");
    catalog
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    format!("{prefix}-{nanos}")
}

#[tokio::test]
#[ignore = "Requires live Postgres with PostGIS"]
async fn live_insert_is_idempotent_and_queryable_by_distance() {
    let catalog = live_catalog().await;
    let specialty_name = unique("live-specialty");
    let specialist_name = unique("live-specialist");

    let specialty = catalog
        .insert_specialty(&NewSpecialty::named(&specialty_name))
        .await
        .expect("insert specialty");
    assert!(specialty.is_created());
    let again = catalog
        .insert_specialty(&NewSpecialty::named(&specialty_name))
        .await
        .expect("re-insert specialty");
    assert_eq!(again.id(), specialty.id());
    assert!(!again.is_created());

    let specialist = NewSpecialist {
        name: specialist_name.clone(),
        specialty_id: specialty.id(),
        location: GeoPoint::new(17.1077, 48.1486).to_wkt(),
        address: "Hlavná 1, 81101 Bratislava, Slovenská republika".into(),
        telephone: "02/123, ".into(),
        email: String::new(),
        hours: OpeningHours::default(),
    };
    let inserted = catalog
        .insert_specialist(&specialist)
        .await
        .expect("insert specialist");
    assert!(inserted.is_created());

    let stored = catalog
        .find_specialist_by_name(&specialist_name)
        .await
        .expect("lookup")
        .expect("specialist present");
    assert_eq!(stored.location, "POINT(17.1077 48.1486)");

    let near = catalog
        .specialists_near(specialty.id(), &GeoPoint::new(17.11, 48.15), 1_000.0)
        .await
        .expect("proximity query");
    assert!(near.iter().any(|found| found.name == specialist_name));
    let far = catalog
        .specialists_near(specialty.id(), &GeoPoint::new(21.26, 48.72), 1_000.0)
        .await
        .expect("proximity query");
    assert!(far.is_empty());

    let review_id = catalog
        .insert_review(&NewReview {
            specialist_id: stored.id,
            url: "https://reviews.example.sk/live".into(),
            rating: 4.5,
            comment: String::new(),
        })
        .await
        .expect("insert review");
    let mut reviews = catalog
        .reviews_by_specialist(stored.id)
        .await
        .expect("reviews");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 4.5);
    let mut review = reviews.remove(0);
    review.comment = "Ochotný personál".into();
    assert!(catalog.update_review(&review).await.expect("update review"));
    assert!(
        catalog
            .all_reviews()
            .await
            .expect("all reviews")
            .contains(&review)
    );
    assert!(catalog.delete_specialist(stored.id).await.is_err());
    assert!(catalog.delete_review(review_id).await.expect("delete review"));

    assert!(catalog.delete_specialist(stored.id).await.expect("delete"));
    assert!(catalog.delete_specialty(specialty.id()).await.expect("delete"));
}

#[tokio::test]
#[ignore = "Requires the live open-data endpoint"]
async fn live_source_returns_records() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("configuration");
    let fetcher = SourceFetcher::from_config(&config.source).expect("fetcher");
    let records = fetcher.fetch().await.expect("fetch");
    assert!(!records.is_empty(), "feed should publish specialists");
    assert!(records.iter().all(|record| !record.specialization.is_empty()));
}
