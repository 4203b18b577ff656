use std::env;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Default timeout applied to the source HTTP client.
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;
/// Default size of the Postgres connection pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings for the open-data source endpoint.
    pub source: SourceConfig,
    /// Catalog database settings, absent when `DATABASE_URL` is unset.
    pub database: Option<DatabaseConfig>,
}

/// Settings consumed by [`crate::source::SourceFetcher`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Endpoint returning the specialist feature collection.
    pub specialists_url: String,
    /// Certificate verification policy for the source endpoint.
    pub tls_mode: TlsMode,
    /// Client-side timeout for the whole request.
    pub timeout: Duration,
}

/// Settings consumed by [`crate::catalog::PgCatalog`].
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Certificate verification policy for the source HTTP transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Accept self-signed or otherwise unverifiable certificates.
    ///
    /// The open-data portal is not expected to present a valid chain, so this is the default.
    #[default]
    Insecure,
    /// Require a verifiable certificate chain.
    Verified,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
        };
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let source = SourceConfig {
            specialists_url: required("SCRAPER_SPECIALISTS_URL")?,
            tls_mode: optional("SCRAPER_TLS_MODE")
                .map(|value| {
                    value
                        .parse::<TlsMode>()
                        .map_err(|()| ConfigError::InvalidValue("SCRAPER_TLS_MODE".into()))
                })
                .transpose()?
                .unwrap_or_default(),
            timeout: Duration::from_secs(
                optional("SCRAPER_TIMEOUT_SECS")
                    .map(|value| {
                        value
                            .parse::<u64>()
                            .map_err(|_| ConfigError::InvalidValue("SCRAPER_TIMEOUT_SECS".into()))
                    })
                    .transpose()?
                    .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS),
            ),
        };

        let database = optional("DATABASE_URL")
            .map(|url| -> Result<DatabaseConfig, ConfigError> {
                let max_connections = optional("DATABASE_MAX_CONNECTIONS")
                    .map(|value| {
                        value.parse::<u32>().map_err(|_| {
                            ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".into())
                        })
                    })
                    .transpose()?
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS);
                Ok(DatabaseConfig {
                    url,
                    max_connections,
                })
            })
            .transpose()?;

        Ok(Self { source, database })
    }

    /// Return the database settings, failing when `DATABASE_URL` was not provided.
    pub fn require_database(&self) -> Result<&DatabaseConfig, ConfigError> {
        self.database
            .as_ref()
            .ok_or_else(|| ConfigError::MissingVariable("DATABASE_URL".to_string()))
    }
}

impl std::str::FromStr for TlsMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insecure" => Ok(Self::Insecure),
            "verified" => Ok(Self::Verified),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment once and install it in the global cache.
///
/// Later calls return the cached value. Components receive the returned reference
/// explicitly rather than reading the cache themselves.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        source_url = %config.source.specialists_url,
        tls_mode = ?config.source.tls_mode,
        timeout_secs = config.source.timeout.as_secs(),
        has_database = config.database.is_some(),
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
