pub mod images;
pub mod itineraries;
pub mod packages;

pub use images::PostgresImageStore;
pub use itineraries::PostgresItineraryRepository;
pub use packages::PostgresPackageRepository;

use std::{fmt, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::{MIGRATOR, error::Result};

/// Default pool ceiling when the configuration does not set one.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Process-wide connection pool plus the repositories built on it.
///
/// Opened once at startup and cloned into every repository; the pool hands out
/// connections per query.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn connect(connection_string: &str, max_connections: u32) -> Result<Self> {
        let max_connections = max_connections.max(1);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(connection_string)
            .await?;

        info!(max_connections, "Database pool initialized");

        Ok(Self {
            pool,
            max_connections,
        })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let max_connections = pool.options().get_max_connections();
        Self {
            pool,
            max_connections,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Cheap round trip used by health checks.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn images(&self) -> PostgresImageStore {
        PostgresImageStore::new(self.pool.clone())
    }

    pub fn packages(&self) -> PostgresPackageRepository {
        PostgresPackageRepository::new(self.pool.clone())
    }

    pub fn itineraries(&self) -> PostgresItineraryRepository {
        PostgresItineraryRepository::new(self.pool.clone())
    }
}
