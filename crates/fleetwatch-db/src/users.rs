//! Users repository - operator/subscriber accounts

use fleetwatch_core::{Error, Result, User};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Repository for user operations
pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user
    pub async fn insert(&self, user: &User) -> Result<i64> {
        let company_ids_json = serde_json::to_string(&user.company_ids)?;

        let result = sqlx::query(
            "INSERT INTO users (chat_id, full_name, company_ids, balance) VALUES (?, ?, ?, ?)",
        )
        .bind(user.chat_id)
        .bind(&user.full_name)
        .bind(&company_ids_json)
        .bind(user.balance)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Get user by internal ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, chat_id, full_name, company_ids, balance FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get user by chat id
    pub async fn get_by_chat_id(&self, chat_id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, chat_id, full_name, company_ids, balance FROM users WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get all users
    pub async fn get_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, chat_id, full_name, company_ids, balance FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        rows.iter().map(row_to_user).collect()
    }

    /// Update an existing user
    pub async fn update(&self, user: &User) -> Result<bool> {
        let company_ids_json = serde_json::to_string(&user.company_ids)?;

        let result = sqlx::query(
            "UPDATE users SET chat_id = ?, full_name = ?, company_ids = ?, balance = ? WHERE id = ?",
        )
        .bind(user.chat_id)
        .bind(&user.full_name)
        .bind(&company_ids_json)
        .bind(user.balance)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete user by internal ID
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let company_ids_json: String = row.get("company_ids");
    let company_ids: Vec<i64> = serde_json::from_str(&company_ids_json)?;

    Ok(User {
        id: row.get("id"),
        chat_id: row.get("chat_id"),
        full_name: row.get("full_name"),
        company_ids,
        balance: row.get("balance"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use tempfile::{tempdir, TempDir};

    async fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::new(&dir.path().join("test.db")).await.unwrap();
        (db, dir)
    }

    fn sample_user() -> User {
        User {
            id: 0,
            chat_id: 555,
            full_name: "Dispatcher One".to_string(),
            company_ids: vec![1, 2],
            balance: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, _dir) = setup_db().await;
        let users = db.users();

        let id = users.insert(&sample_user()).await.unwrap();

        let user = users.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.chat_id, 555);
        assert_eq!(user.company_ids, vec![1, 2]);

        let by_chat = users.get_by_chat_id(555).await.unwrap().unwrap();
        assert_eq!(by_chat.full_name, "Dispatcher One");
        assert!(users.get_by_chat_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_company_membership() {
        let (db, _dir) = setup_db().await;
        let users = db.users();

        let id = users.insert(&sample_user()).await.unwrap();
        let mut user = users.get_by_id(id).await.unwrap().unwrap();
        user.company_ids.push(3);
        assert!(users.update(&user).await.unwrap());

        let reloaded = users.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(reloaded.company_ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, _dir) = setup_db().await;
        let users = db.users();

        let id = users.insert(&sample_user()).await.unwrap();
        assert!(users.delete(id).await.unwrap());
        assert!(users.get_by_id(id).await.unwrap().is_none());
    }
}
