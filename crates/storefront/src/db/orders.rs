//! Order repository.
//!
//! Order rows are written by the external payment/order backend after a
//! checkout completes; the storefront only reads them back for the account
//! view, newest first, one page at a time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sattva_core::{OrderId, OrderStatus, UserId};

use crate::cart::CartLine;

use super::{Page, RepositoryError};

/// An order record as shown in the account view.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: OrderId,
    pub gateway_order_id: String,
    pub payment_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub items: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    gateway_order_id: String,
    payment_id: Option<String>,
    amount: Decimal,
    currency: String,
    status: String,
    items: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_record(self) -> Result<OrderRecord, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let items: Vec<CartLine> = serde_json::from_value(self.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order items in database: {e}"))
        })?;

        Ok(OrderRecord {
            id: OrderId::new(self.id),
            gateway_order_id: self.gateway_order_id,
            payment_id: self.payment_id,
            amount: self.amount,
            currency: self.currency,
            status,
            items,
            created_at: self.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's orders, newest first.
    ///
    /// `page` is 1-based; out-of-range pages return an empty item list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
        page: u32,
        per_page: u32,
    ) -> Result<Page<OrderRecord>, RepositoryError> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let total_items: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;

        let offset = i64::from(page - 1) * i64::from(per_page);
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, gateway_order_id, payment_id, amount, currency, status, items, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(OrderRow::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_items = total_items.max(0) as u64;
        let total_pages = total_items
            .div_ceil(u64::from(per_page))
            .try_into()
            .unwrap_or(u32::MAX);

        Ok(Page {
            items,
            page,
            total_pages,
            total_items,
        })
    }
}
