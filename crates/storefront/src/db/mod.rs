//! Database operations for storefront `PostgreSQL`.
//!
//! # Tables
//!
//! The hosted platforms own catalog (CMS), identity (provider), and the
//! durable order pipeline (payment backend). Postgres holds only the
//! per-user collections the account surface reads and writes:
//!
//! - `addresses` - singleton default shipping address per user
//! - `orders` - order records written by the external payment backend
//! - `favorites` - wishlisted catalog items
//! - `enrollments` - program enrollments
//! - `sessions` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p sattva-cli -- migrate
//! ```

pub mod addresses;
pub mod enrollments;
pub mod favorites;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value failed domain validation on the way out.
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// The targeted row does not exist.
    #[error("Not found")]
    NotFound,
}

/// Outcome of a bulk delete.
///
/// Partial failure is a first-class value: `failed` carries the ids that were
/// requested but not deleted, so callers can retry the remainder instead of
/// guessing from a count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    /// Ids that were deleted.
    pub deleted: Vec<i64>,
    /// Ids that were requested but not deleted.
    pub failed: Vec<i64>,
}

impl BulkDeleteOutcome {
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && !self.deleted.is_empty()
    }

    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// One page of a paged listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_delete_outcome_partial() {
        let outcome = BulkDeleteOutcome {
            deleted: vec![1, 2],
            failed: vec![3],
        };
        assert!(outcome.is_partial());
        assert_eq!(outcome.deleted_count(), 2);
        assert_eq!(outcome.failed_count(), 1);
    }

    #[test]
    fn test_bulk_delete_outcome_clean() {
        let outcome = BulkDeleteOutcome {
            deleted: vec![1, 2, 3],
            failed: vec![],
        };
        assert!(!outcome.is_partial());
    }

    #[test]
    fn test_bulk_delete_outcome_total_failure_is_not_partial() {
        let outcome = BulkDeleteOutcome {
            deleted: vec![],
            failed: vec![1],
        };
        assert!(!outcome.is_partial());
    }

    #[test]
    fn test_page_has_more() {
        let page = Page::<()> {
            items: vec![],
            page: 1,
            total_pages: 3,
            total_items: 25,
        };
        assert!(page.has_more());

        let last = Page::<()> {
            items: vec![],
            page: 3,
            total_pages: 3,
            total_items: 25,
        };
        assert!(!last.has_more());
    }
}
