//! Companies repository - tenant CRUD

use fleetwatch_core::{Company, Error, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Repository for company operations
pub struct CompaniesRepository {
    pool: SqlitePool,
}

impl CompaniesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new company, returning its id
    pub async fn insert(&self, name: &str, api_key: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO companies (name, api_key) VALUES (?, ?)")
            .bind(name)
            .bind(api_key)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Get company by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Company>> {
        let row = sqlx::query("SELECT id, name, api_key FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(row.map(|row| row_to_company(&row)))
    }

    /// Get company by name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Company>> {
        let row = sqlx::query("SELECT id, name, api_key FROM companies WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(row.map(|row| row_to_company(&row)))
    }

    /// Get companies by a set of ids
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<Company>> {
        let mut companies = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(company) = self.get_by_id(*id).await? {
                companies.push(company);
            }
        }
        Ok(companies)
    }

    /// Get all companies
    pub async fn get_all(&self) -> Result<Vec<Company>> {
        let rows = sqlx::query("SELECT id, name, api_key FROM companies ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(rows.iter().map(row_to_company).collect())
    }

    /// Update name and API key
    pub async fn update(&self, company: &Company) -> Result<bool> {
        let result = sqlx::query("UPDATE companies SET name = ?, api_key = ? WHERE id = ?")
            .bind(&company.name)
            .bind(&company.api_key)
            .bind(company.id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete company by ID
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_company(row: &sqlx::sqlite::SqliteRow) -> Company {
    Company {
        id: row.get("id"),
        name: row.get("name"),
        api_key: row.get("api_key"),
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use tempfile::{tempdir, TempDir};

    async fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::new(&dir.path().join("test.db")).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, _dir) = setup_db().await;
        let companies = db.companies();

        let id = companies.insert("Acme Freight", "key-123").await.unwrap();
        assert!(id > 0);

        let company = companies.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(company.name, "Acme Freight");
        assert_eq!(company.api_key, "key-123");

        let by_name = companies.get_by_name("Acme Freight").await.unwrap();
        assert!(by_name.is_some());
        assert!(companies.get_by_name("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (db, _dir) = setup_db().await;
        let companies = db.companies();

        let id = companies.insert("Acme", "old-key").await.unwrap();
        let mut company = companies.get_by_id(id).await.unwrap().unwrap();
        company.api_key = "new-key".to_string();
        assert!(companies.update(&company).await.unwrap());

        let reloaded = companies.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.api_key, "new-key");

        assert!(companies.delete(id).await.unwrap());
        assert!(companies.get_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_by_ids() {
        let (db, _dir) = setup_db().await;
        let companies = db.companies();

        let a = companies.insert("A", "ka").await.unwrap();
        let b = companies.insert("B", "kb").await.unwrap();

        let found = companies.get_by_ids(&[a, b, 999]).await.unwrap();
        assert_eq!(found.len(), 2);
    }
}
