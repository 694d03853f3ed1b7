//! Subscriptions repository - notification subscriptions and the timer due-scan

use chrono::{DateTime, Utc};
use fleetwatch_core::{Category, Error, Result, Subscription};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// A matched subscriber row, joined to the truck's display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRow {
    pub chat_id: i64,
    pub truck_name: String,
}

/// Repository for subscription operations
pub struct SubscriptionsRepository {
    pool: SqlitePool,
}

impl SubscriptionsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new subscription, returning its id
    pub async fn insert(&self, sub: &Subscription) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                chat_id, truck_id, category, every_minutes, last_sent_at,
                warning_type, engine_status
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(sub.chat_id)
        .bind(sub.truck_id)
        .bind(sub.category.as_i64())
        .bind(sub.every_minutes)
        .bind(sub.last_sent_at.map(|t| t.to_rfc3339()))
        .bind(&sub.warning_type)
        .bind(&sub.engine_status)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Get subscription by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT id, chat_id, truck_id, category, every_minutes, last_sent_at,
                   warning_type, engine_status
            FROM subscriptions WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(row_to_subscription(&row)?)),
            None => Ok(None),
        }
    }

    /// All subscriptions belonging to one chat recipient
    pub async fn list_by_chat(&self, chat_id: i64) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT id, chat_id, truck_id, category, every_minutes, last_sent_at,
                   warning_type, engine_status
            FROM subscriptions WHERE chat_id = ? ORDER BY id
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        rows.iter().map(row_to_subscription).collect()
    }

    /// Delete one subscription
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Bulk-clear all subscriptions for a chat recipient
    pub async fn delete_all_for_chat(&self, chat_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Find subscribers for a vehicle/category pair, applying the
    /// category-specific sub-filter.
    ///
    /// May return duplicate rows when a subscriber holds identical
    /// subscriptions; the resolver deduplicates.
    pub async fn find_subscribers(
        &self,
        vehicle_id: i64,
        category: Category,
        sub_filter: Option<&str>,
    ) -> Result<Vec<SubscriberRow>> {
        let base = r#"
            SELECT s.chat_id, t.name AS truck_name
            FROM subscriptions s
            JOIN trucks t ON s.truck_id = t.vehicle_id
            WHERE s.truck_id = ? AND s.category = ?
        "#;

        let rows = match (category, sub_filter) {
            (Category::Warning, Some(filter)) => {
                sqlx::query(&format!("{} AND s.warning_type = ?", base))
                    .bind(vehicle_id)
                    .bind(category.as_i64())
                    .bind(filter)
                    .fetch_all(&self.pool)
                    .await
            }
            (Category::EngineStatus, Some(filter)) => {
                sqlx::query(&format!("{} AND s.engine_status = ?", base))
                    .bind(vehicle_id)
                    .bind(category.as_i64())
                    .bind(filter)
                    .fetch_all(&self.pool)
                    .await
            }
            _ => {
                sqlx::query(base)
                    .bind(vehicle_id)
                    .bind(category.as_i64())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| SubscriberRow {
                chat_id: row.get("chat_id"),
                truck_name: row.get("truck_name"),
            })
            .collect())
    }

    /// Timer subscriptions whose interval has elapsed (or that never fired)
    pub async fn find_timer_due(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT id, chat_id, truck_id, category, every_minutes, last_sent_at,
                   warning_type, engine_status
            FROM subscriptions
            WHERE category = 3
              AND (last_sent_at IS NULL
                   OR datetime(last_sent_at, '+' || every_minutes || ' minutes') <= datetime(?))
            ORDER BY id
            "#,
        )
        .bind(now.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        rows.iter().map(row_to_subscription).collect()
    }

    /// Record that a timer notification went out
    pub async fn mark_sent(&self, id: i64, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query("UPDATE subscriptions SET last_sent_at = ? WHERE id = ?")
            .bind(now.to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_subscription(row: &sqlx::sqlite::SqliteRow) -> Result<Subscription> {
    let category = Category::from_i64(row.get("category"))?;
    let last_sent_at: Option<String> = row.get("last_sent_at");
    let last_sent_at = last_sent_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Subscription {
        id: row.get("id"),
        chat_id: row.get("chat_id"),
        truck_id: row.get("truck_id"),
        category,
        every_minutes: row.get("every_minutes"),
        last_sent_at,
        warning_type: row.get("warning_type"),
        engine_status: row.get("engine_status"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::Duration;
    use fleetwatch_core::Subscription;
    use tempfile::{tempdir, TempDir};

    async fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::new(&dir.path().join("test.db")).await.unwrap();
        let company_id = db.companies().insert("Acme", "key").await.unwrap();
        db.trucks().insert("Unit 7", 42, company_id).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (db, _dir) = setup_db().await;
        let subs = db.subscriptions();

        subs.insert(&Subscription::warning(100, 42, "GatewayUnplugged"))
            .await
            .unwrap();
        subs.insert(&Subscription::timer(100, 42, 30)).await.unwrap();

        let listed = subs.list_by_chat(100).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].warning_type.as_deref(), Some("GatewayUnplugged"));
        assert_eq!(listed[1].every_minutes, Some(30));
    }

    #[tokio::test]
    async fn test_find_subscribers_applies_sub_filter() {
        let (db, _dir) = setup_db().await;
        let subs = db.subscriptions();

        subs.insert(&Subscription::warning(100, 42, "GatewayUnplugged"))
            .await
            .unwrap();
        subs.insert(&Subscription::warning(200, 42, "SuddenFuelLevelDrop"))
            .await
            .unwrap();

        let matched = subs
            .find_subscribers(42, Category::Warning, Some("GatewayUnplugged"))
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].chat_id, 100);
        assert_eq!(matched[0].truck_name, "Unit 7");
    }

    #[tokio::test]
    async fn test_find_subscribers_returns_duplicate_rows() {
        let (db, _dir) = setup_db().await;
        let subs = db.subscriptions();

        // Same subscriber, two identical subscriptions
        let sub = Subscription::engine_status(100, 42, "deviceMovement");
        subs.insert(&sub).await.unwrap();
        subs.insert(&sub).await.unwrap();

        let matched = subs
            .find_subscribers(42, Category::EngineStatus, Some("deviceMovement"))
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);
    }

    #[tokio::test]
    async fn test_timer_due_scan() {
        let (db, _dir) = setup_db().await;
        let subs = db.subscriptions();
        let now = Utc::now();

        let id = subs.insert(&Subscription::timer(100, 42, 30)).await.unwrap();

        // Never sent: due immediately
        let due = subs.find_timer_due(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, id);

        // Just sent: excluded until the interval elapses
        subs.mark_sent(id, now).await.unwrap();
        assert!(subs.find_timer_due(now).await.unwrap().is_empty());
        assert!(subs
            .find_timer_due(now + Duration::minutes(29))
            .await
            .unwrap()
            .is_empty());

        // Interval elapsed: due again
        let due = subs
            .find_timer_due(now + Duration::minutes(31))
            .await
            .unwrap();
        assert_eq!(due.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_bulk_clear() {
        let (db, _dir) = setup_db().await;
        let subs = db.subscriptions();

        let id = subs
            .insert(&Subscription::warning(100, 42, "GatewayUnplugged"))
            .await
            .unwrap();
        subs.insert(&Subscription::timer(100, 42, 15)).await.unwrap();

        assert!(subs.delete(id).await.unwrap());
        assert_eq!(subs.delete_all_for_chat(100).await.unwrap(), 1);
        assert!(subs.list_by_chat(100).await.unwrap().is_empty());
    }
}
