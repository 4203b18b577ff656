use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use specialist_catalog::{
    catalog::{CatalogStore, MemoryCatalog, PgCatalog},
    config::{self, Config},
    ingest::IngestionService,
    logging,
    source::SourceFetcher,
    wkt::GeoPoint,
};

const DEFAULT_RADIUS_METERS: f64 = 5_000.0;

#[derive(Parser)]
#[command(
    name = "specialist-catalog",
    about = "Ingest open-data healthcare specialists into the catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the feed once and reconcile it into the catalog.
    Ingest {
        /// Reconcile into an empty in-memory catalog instead of Postgres.
        #[arg(long)]
        dry_run: bool,
    },
    /// List catalogued specialties.
    Specialties,
    /// List specialists of one specialty around a point, nearest first.
    Near {
        /// Specialty name, as catalogued.
        #[arg(long)]
        specialty: String,
        /// Longitude of the search center in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Latitude of the search center in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Search radius in meters.
        #[arg(long, default_value_t = DEFAULT_RADIUS_METERS)]
        radius: f64,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config().context("invalid configuration")?;
    logging::init_tracing();

    match cli.command {
        Command::Ingest { dry_run } => ingest(config, dry_run).await,
        Command::Specialties => specialties(config).await,
        Command::Near {
            specialty,
            lon,
            lat,
            radius,
        } => near(config, &specialty, GeoPoint::new(lon, lat), radius).await,
    }
}

async fn connect(config: &Config) -> Result<PgCatalog> {
    let database = config.require_database()?;
    let catalog = PgCatalog::connect(database)
        .await
        .context("failed to connect to catalog database")?;
    catalog.ensure_schema().await?;
    Ok(catalog)
}

async fn ingest(config: &Config, dry_run: bool) -> Result<()> {
    let store: Arc<dyn CatalogStore> = if dry_run {
        tracing::info!("Dry run: reconciling into an in-memory catalog");
        Arc::new(MemoryCatalog::new())
    } else {
        Arc::new(connect(config).await?)
    };

    let fetcher = SourceFetcher::from_config(&config.source)?;
    let service = IngestionService::new(Box::new(fetcher), store);
    let outcome = service.run().await.context("ingestion run failed")?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn specialties(config: &Config) -> Result<()> {
    let catalog = connect(config).await?;
    for specialty in catalog.all_specialties().await? {
        println!("{}\t{}", specialty.id, specialty.name);
    }
    Ok(())
}

async fn near(config: &Config, specialty: &str, point: GeoPoint, radius: f64) -> Result<()> {
    let catalog = connect(config).await?;
    let found = catalog
        .find_specialty_by_name(specialty)
        .await?
        .ok_or_else(|| anyhow!("unknown specialty {specialty:?}"))?;
    let specialists = catalog.specialists_near(found.id, &point, radius).await?;
    tracing::debug!(
        specialty = %found.name,
        point = %point,
        radius,
        matches = specialists.len(),
        "Proximity query complete"
    );
    println!("{}", serde_json::to_string_pretty(&specialists)?);
    Ok(())
}
