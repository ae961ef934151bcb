//! Favorites repository.
//!
//! Wishlisted catalog items, keyed per user. Toggling from catalog pages
//! merge-upserts; clear-all issues one batch delete and reports the ids that
//! were requested but not deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sattva_core::{FavoriteId, UserId};

use super::{BulkDeleteOutcome, RepositoryError};

/// A favorited catalog item.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FavoriteRecord {
    pub id: FavoriteId,
    pub item_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository for favorites database operations.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's favorites, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<FavoriteRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, FavoriteRecord>(
            r"
            SELECT id, item_id, title, image_url, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Whether the user has favorited a catalog item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: &UserId,
        item_id: &str,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND item_id = $2)",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Add a catalog item to the user's favorites (merge-upsert).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add(
        &self,
        user_id: &UserId,
        item_id: &str,
        title: &str,
        image_url: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO favorites (user_id, item_id, title, image_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, item_id) DO UPDATE SET
                title     = EXCLUDED.title,
                image_url = EXCLUDED.image_url
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .bind(title)
        .bind(image_url)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a catalog item from the user's favorites.
    ///
    /// Returns `true` if a row was deleted, `false` if it wasn't favorited.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: &UserId, item_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND item_id = $2")
            .bind(user_id)
            .bind(item_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the given favorite rows in one statement.
    ///
    /// Ids that were requested but no longer exist (or belong to another
    /// user) come back in `failed` so the caller can retry or surface them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_many(
        &self,
        user_id: &UserId,
        ids: &[FavoriteId],
    ) -> Result<BulkDeleteOutcome, RepositoryError> {
        if ids.is_empty() {
            return Ok(BulkDeleteOutcome::default());
        }

        let requested: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let deleted: Vec<i64> = sqlx::query_scalar(
            "DELETE FROM favorites WHERE user_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(user_id)
        .bind(&requested)
        .fetch_all(self.pool)
        .await?;

        let failed = requested
            .into_iter()
            .filter(|id| !deleted.contains(id))
            .collect();

        Ok(BulkDeleteOutcome { deleted, failed })
    }
}
