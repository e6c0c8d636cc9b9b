//! Database layer for Folio
//!
//! Provides:
//! - SeaORM entity models
//! - Repository traits and their Postgres implementations
//! - Connection pool management and migrations
//! - The document column selector

pub mod models;
mod documents;
mod fields;
mod meta;
mod repository;
mod selections;

pub use documents::PgDocumentRepository;
pub use fields::{DocumentField, FieldSelection};
pub use meta::PgMetaRepository;
pub use repository::{DocumentRepository, MetaRepository, Pagination, SelectionRepository};
pub use selections::PgSelectionRepository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction,
    TransactionError, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
///
/// Every repository call checks a connection out of the pool for the
/// duration of one statement (or one transaction) and hands it back on
/// every exit path.
#[derive(Clone)]
pub struct DbPool {
    conn: Arc<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!(
            host = config.host.as_deref().unwrap_or("-"),
            database = config.database.as_deref().unwrap_or("-"),
            "Connecting to database..."
        );

        let mut opts = ConnectOptions::new(config.connection_url());
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })?;

        info!("Database connection established");

        Ok(Self { conn: Arc::new(conn) })
    }

    /// Wrap an existing connection (used with `MockDatabase` in tests)
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn: Arc::new(conn) }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }

    /// Apply pending schema migrations from `migrations/`
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(self.conn.get_postgres_connection_pool())
            .await?;

        info!("Database migrations complete");
        Ok(())
    }

    /// Run `f` inside a transaction. Commits when `f` returns `Ok`, rolls
    /// back otherwise.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: for<'c> FnOnce(
                &'c DatabaseTransaction,
            ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>
            + Send,
        T: Send,
    {
        self.conn
            .transaction::<F, T, AppError>(f)
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db) => AppError::Database(db),
                TransactionError::Transaction(app) => app,
            })
    }
}
