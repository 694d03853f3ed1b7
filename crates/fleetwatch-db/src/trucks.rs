//! Trucks repository - roster mirror and reconciliation

use fleetwatch_core::{Error, Result, Truck};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// A vehicle as reported by the provider's roster endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTruck {
    pub vehicle_id: i64,
    pub name: String,
}

/// Outcome of one roster reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub renamed: usize,
    pub deleted: usize,
}

impl ReconcileSummary {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.renamed == 0 && self.deleted == 0
    }
}

/// Repository for truck operations
pub struct TrucksRepository {
    pool: SqlitePool,
}

impl TrucksRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new truck
    pub async fn insert(&self, name: &str, vehicle_id: i64, company_id: i64) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO trucks (name, vehicle_id, company_id) VALUES (?, ?, ?)")
                .bind(name)
                .bind(vehicle_id)
                .bind(company_id)
                .execute(&self.pool)
                .await
                .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    /// Get truck by internal ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Truck>> {
        let row = sqlx::query("SELECT id, name, vehicle_id, company_id FROM trucks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(row.map(|row| row_to_truck(&row)))
    }

    /// Get truck by provider vehicle id
    pub async fn get_by_vehicle_id(&self, vehicle_id: i64) -> Result<Option<Truck>> {
        let row =
            sqlx::query("SELECT id, name, vehicle_id, company_id FROM trucks WHERE vehicle_id = ?")
                .bind(vehicle_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(row.map(|row| row_to_truck(&row)))
    }

    /// Get all trucks for a company
    pub async fn get_by_company(&self, company_id: i64) -> Result<Vec<Truck>> {
        let rows = sqlx::query(
            "SELECT id, name, vehicle_id, company_id FROM trucks WHERE company_id = ? ORDER BY id",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(rows.iter().map(row_to_truck).collect())
    }

    /// Rename a truck
    pub async fn rename(&self, id: i64, name: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE trucks SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete truck by internal ID
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM trucks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve the tenant API key for a provider vehicle id
    pub async fn api_key_for_vehicle(&self, vehicle_id: i64) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT c.api_key
            FROM trucks t
            JOIN companies c ON t.company_id = c.id
            WHERE t.vehicle_id = ?
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::DbError(e.to_string()))?;

        Ok(row.map(|row| row.get("api_key")))
    }

    /// Reconcile a company's trucks against the provider's current roster.
    ///
    /// Full three-way diff: insert unseen vehicles, rename on mismatch, and
    /// delete trucks no longer present in the provider list. Running it twice
    /// with an unchanged roster is a no-op on the second pass.
    pub async fn reconcile(
        &self,
        company_id: i64,
        roster: &[ProviderTruck],
    ) -> Result<ReconcileSummary> {
        let existing = self.get_by_company(company_id).await?;
        let existing_by_vehicle: HashMap<i64, &Truck> =
            existing.iter().map(|t| (t.vehicle_id, t)).collect();
        let roster_ids: HashSet<i64> = roster.iter().map(|t| t.vehicle_id).collect();

        let mut summary = ReconcileSummary::default();

        for provider_truck in roster {
            match existing_by_vehicle.get(&provider_truck.vehicle_id) {
                None => {
                    self.insert(&provider_truck.name, provider_truck.vehicle_id, company_id)
                        .await?;
                    summary.inserted += 1;
                }
                Some(truck) if truck.name != provider_truck.name => {
                    self.rename(truck.id, &provider_truck.name).await?;
                    summary.renamed += 1;
                }
                Some(_) => {}
            }
        }

        for truck in &existing {
            if !roster_ids.contains(&truck.vehicle_id) {
                self.delete(truck.id).await?;
                summary.deleted += 1;
            }
        }

        if summary.is_noop() {
            debug!("Roster for company {} already in sync", company_id);
        } else {
            info!(
                "Reconciled company {}: +{} inserted, {} renamed, -{} deleted",
                company_id, summary.inserted, summary.renamed, summary.deleted
            );
        }

        Ok(summary)
    }
}

fn row_to_truck(row: &sqlx::sqlite::SqliteRow) -> Truck {
    Truck {
        id: row.get("id"),
        name: row.get("name"),
        vehicle_id: row.get("vehicle_id"),
        company_id: row.get("company_id"),
    }
}
