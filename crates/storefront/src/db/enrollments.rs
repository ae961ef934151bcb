//! Enrollments repository.
//!
//! Program enrollments are created by the external order backend when a paid
//! order contains a program; the storefront lists them and supports clear-all
//! with the same first-class bulk-delete outcome as favorites.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sattva_core::{EnrollmentId, UserId};

use super::{BulkDeleteOutcome, RepositoryError};

/// A program enrollment.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub program_id: String,
    pub title: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Repository for enrollment database operations.
pub struct EnrollmentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EnrollmentRepository<'a> {
    /// Create a new enrollments repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's enrollments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<EnrollmentRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, EnrollmentRecord>(
            r"
            SELECT id, program_id, title, enrolled_at
            FROM enrollments
            WHERE user_id = $1
            ORDER BY enrolled_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete the given enrollment rows in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_many(
        &self,
        user_id: &UserId,
        ids: &[EnrollmentId],
    ) -> Result<BulkDeleteOutcome, RepositoryError> {
        if ids.is_empty() {
            return Ok(BulkDeleteOutcome::default());
        }

        let requested: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let deleted: Vec<i64> = sqlx::query_scalar(
            "DELETE FROM enrollments WHERE user_id = $1 AND id = ANY($2) RETURNING id",
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
