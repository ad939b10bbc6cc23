use std::{fmt, sync::Arc};

use anyhow::Context;
use tracing::{info, warn};

use wayfare_config::Config;
use wayfare_core::{
    Catalog, CatalogRepositories, CityFilterRegistry, FallbackTable, IngestPolicy,
    database::PostgresDatabase, types::Destination,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub city_filters: Arc<CityFilterRegistry>,
    /// `None` when running on in-memory storage.
    pub postgres: Option<Arc<PostgresDatabase>>,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage_kind())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Connect to Postgres (applying migrations) when a database URL is
    /// configured, otherwise fall back to in-memory storage.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        match config.database.url.clone() {
            Some(url) => {
                let db = PostgresDatabase::connect(&url, config.database.max_connections)
                    .await
                    .context("failed to connect to PostgreSQL")?;
                db.migrate().await.context("database migration failed")?;
                Ok(Self::with_postgres(config, db))
            }
            None => {
                warn!("no database configured; using in-memory storage");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn with_postgres(config: Config, db: PostgresDatabase) -> Self {
        let repos = CatalogRepositories::postgres(&db);
        Self::build(config, repos, Some(Arc::new(db)))
    }

    pub fn in_memory(config: Config) -> Self {
        Self::build(config, CatalogRepositories::in_memory(), None)
    }

    fn build(
        config: Config,
        repos: CatalogRepositories,
        postgres: Option<Arc<PostgresDatabase>>,
    ) -> Self {
        let catalog = Catalog::new(repos, fallback_table(&config), ingest_policy(&config));
        let city_filters = seed_city_filters(&config);
        info!(
            storage = if postgres.is_some() { "postgres" } else { "memory" },
            image_max_kb = config.images.max_kb,
            seeded_city_filters = city_filters.destinations().len(),
            "application state ready"
        );

        Self {
            catalog: Arc::new(catalog),
            city_filters: Arc::new(city_filters),
            postgres,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn storage_kind(&self) -> &'static str {
        if self.postgres.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }
}

fn fallback_table(config: &Config) -> FallbackTable {
    let mut table = FallbackTable::builtin();
    if let Some(default) = &config.images.default_fallback {
        table.set_default(default.trim());
    }
    for (tag, path) in &config.images.fallbacks {
        table.insert(tag, path.trim());
    }
    table
}

fn ingest_policy(config: &Config) -> IngestPolicy {
    IngestPolicy {
        max_kb: config.images.max_kb,
        ..IngestPolicy::default()
    }
}

fn seed_city_filters(config: &Config) -> CityFilterRegistry {
    let registry = CityFilterRegistry::new();
    for (tag, cities) in &config.city_filters {
        match Destination::parse(tag) {
            Ok(destination) => {
                registry.replace(destination, cities.iter().cloned());
            }
            Err(e) => warn!(destination = %tag, "skipping city filter seed: {e}"),
        }
    }
    registry
}
