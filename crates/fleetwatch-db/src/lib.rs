//! Fleetwatch Database - SQLite persistence layer

pub mod companies;
pub mod schema;
pub mod subscriptions;
pub mod trucks;
pub mod users;

use fleetwatch_core::{Error, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub use companies::CompaniesRepository;
pub use subscriptions::{SubscriberRow, SubscriptionsRepository};
pub use trucks::{ProviderTruck, ReconcileSummary, TrucksRepository};
pub use users::UsersRepository;

/// Database connection and operations
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DbError(e.to_string()))?;
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());
        info!("Connecting to database: {}", url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        // Initialize schema
        sqlx::query(schema::SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        info!("Database initialized");
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get companies repository
    pub fn companies(&self) -> CompaniesRepository {
        CompaniesRepository::new(self.pool.clone())
    }

    /// Get trucks repository
    pub fn trucks(&self) -> TrucksRepository {
        TrucksRepository::new(self.pool.clone())
    }

    /// Get users repository
    pub fn users(&self) -> UsersRepository {
        UsersRepository::new(self.pool.clone())
    }

    /// Get subscriptions repository
    pub fn subscriptions(&self) -> SubscriptionsRepository {
        SubscriptionsRepository::new(self.pool.clone())
    }

    /// Close the database connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_database_creation() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::new(&db_path).await.unwrap();
        assert!(db_path.exists());
        db.close().await;
    }
}
