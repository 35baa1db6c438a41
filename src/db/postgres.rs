use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::RecordStore;
use crate::{
    error::{AppError, AppResult},
    models::{ItemPatch, MediaKind, NewItem, WatchStatus, WatchableItem},
};

const COLUMNS: &str = "id, title, year, poster_url, overview, rating, review, status, \
                       recommendation, tmdb_id, created_at, updated_at";

/// Creates a PostgreSQL connection pool and applies pending migrations
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Postgres-backed collection. `movies` and `tvshows` share one schema.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    table: &'static str,
}

impl PgRecordStore {
    pub fn new(pool: PgPool, kind: MediaKind) -> Self {
        Self {
            pool,
            table: kind.collection(),
        }
    }

    fn from_row(row: &PgRow) -> AppResult<WatchableItem> {
        let status: String = row.try_get("status")?;
        Ok(WatchableItem {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            poster_url: row.try_get("poster_url")?,
            overview: row.try_get("overview")?,
            rating: row.try_get("rating")?,
            review: row.try_get("review")?,
            status: stored_status(&status)?,
            recommendation: row.try_get("recommendation")?,
            tmdb_id: row.try_get("tmdb_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A status the column should never hold is a data fault, not bad input
fn stored_status(raw: &str) -> AppResult<WatchStatus> {
    raw.parse().map_err(|_| {
        tracing::error!(status = %raw, "Unrecognized status in stored row");
        AppError::Internal(format!("Stored status is invalid: {}", raw))
    })
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list(&self) -> AppResult<Vec<WatchableItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM {} ORDER BY created_at ASC",
            COLUMNS, self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<WatchableItem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            COLUMNS, self.table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn create(&self, new: NewItem) -> AppResult<WatchableItem> {
        let item = new.into_item(Utc::now())?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {} ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
            self.table, COLUMNS
        ))
        .bind(item.id)
        .bind(&item.title)
        .bind(item.year)
        .bind(&item.poster_url)
        .bind(&item.overview)
        .bind(item.rating)
        .bind(&item.review)
        .bind(item.status.as_str())
        .bind(&item.recommendation)
        .bind(item.tmdb_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(table = self.table, id = %item.id, "Inserted item");

        Ok(item)
    }

    async fn update(&self, id: Uuid, patch: ItemPatch) -> AppResult<Option<WatchableItem>> {
        let Some(mut item) = self.get(id).await? else {
            return Ok(None);
        };

        patch.apply(&mut item, Utc::now())?;

        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET title = $2, year = $3, poster_url = $4, overview = $5, rating = $6,
                review = $7, status = $8, recommendation = $9, tmdb_id = $10,
                updated_at = $11
            WHERE id = $1
            "#,
            self.table
        ))
        .bind(item.id)
        .bind(&item.title)
        .bind(item.year)
        .bind(&item.poster_url)
        .bind(&item.overview)
        .bind(item.rating)
        .bind(&item.review)
        .bind(item.status.as_str())
        .bind(&item.recommendation)
        .bind(item.tmdb_id)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(item))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            tracing::info!(table = self.table, "Database pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_status_parses_known_values() {
        assert_eq!(stored_status("Watching").unwrap(), WatchStatus::Watching);
        assert_eq!(stored_status("Want to Watch").unwrap(), WatchStatus::WantToWatch);
    }

    #[test]
    fn test_unknown_stored_status_is_internal() {
        let result = stored_status("Abandoned");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
