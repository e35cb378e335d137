use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub query_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            connect_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database configuration error: {0}")]
    Configuration(String),

    #[error("database connection error: {0}")]
    Connection(String),

    #[error("database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Lazily opens and then reuses one connection pool for the process lifetime
///
/// The first caller of [`ConnectionManager::ensure_connected`] opens the pool
/// and applies migrations. Callers arriving while that attempt is in flight
/// wait for it instead of opening their own. A failed attempt is not cached.
pub struct ConnectionManager {
    database_url: String,
    settings: PoolSettings,
    pool: OnceCell<DbPool>,
}

impl ConnectionManager {
    pub fn new(database_url: impl Into<String>, settings: PoolSettings) -> Self {
        Self {
            database_url: database_url.into(),
            settings,
            pool: OnceCell::new(),
        }
    }

    /// Returns the shared pool, connecting on first use
    pub async fn ensure_connected(&self) -> Result<&DbPool, DbError> {
        if self.database_url.trim().is_empty() {
            return Err(DbError::Configuration("DATABASE_URL is not set".to_string()));
        }

        self.pool.get_or_try_init(|| self.connect()).await
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    pub fn query_timeout(&self) -> Duration {
        self.settings.query_timeout
    }

    async fn connect(&self) -> Result<DbPool, DbError> {
        tracing::debug!("Creating database connection pool");

        let connect = PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .acquire_timeout(self.settings.connect_timeout)
            .connect(&self.database_url);

        let pool = match tokio::time::timeout(self.settings.connect_timeout, connect).await {
            Ok(Ok(pool)) => pool,
            Ok(Err(e)) => {
                tracing::error!("Failed to connect to database: {}", e);
                return Err(DbError::Connection(e.to_string()));
            }
            Err(_) => {
                tracing::error!(
                    "Timed out connecting to database after {:?}",
                    self.settings.connect_timeout
                );
                return Err(DbError::Connection("connection attempt timed out".to_string()));
            }
        };

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Database connection pool created successfully");
        Ok(pool)
    }
}
