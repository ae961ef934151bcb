//! Address repository for the per-user default shipping address.
//!
//! Each user has at most one row, keyed by their provider uid. Saving is a
//! merge-upsert; the row is never deleted through the UI.

use sqlx::PgPool;

use sattva_core::{Phone, Pincode, UserId};

use crate::models::ShippingAddress;

use super::RepositoryError;

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    full_name: String,
    phone: String,
    address_line: String,
    city: String,
    state: String,
    pincode: String,
    landmark: Option<String>,
}

impl AddressRow {
    fn into_address(self) -> Result<ShippingAddress, RepositoryError> {
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;
        let pincode = Pincode::parse(&self.pincode).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid pincode in database: {e}"))
        })?;

        Ok(ShippingAddress {
            full_name: self.full_name,
            phone,
            address_line: self.address_line,
            city: self.city,
            state: self.state,
            pincode,
            landmark: self.landmark,
        })
    }
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's default address, if one has been saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_default(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ShippingAddress>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT full_name, phone, address_line, city, state, pincode, landmark
            FROM addresses
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(AddressRow::into_address).transpose()
    }

    /// Create or overwrite the user's default address.
    ///
    /// Returns the saved address so the checkout flow can proceed without a
    /// re-fetch.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_default(
        &self,
        user_id: &UserId,
        address: &ShippingAddress,
    ) -> Result<ShippingAddress, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO addresses
                (user_id, full_name, phone, address_line, city, state, pincode, landmark)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                full_name    = EXCLUDED.full_name,
                phone        = EXCLUDED.phone,
                address_line = EXCLUDED.address_line,
                city         = EXCLUDED.city,
                state        = EXCLUDED.state,
                pincode      = EXCLUDED.pincode,
                landmark     = EXCLUDED.landmark,
                updated_at   = now()
            ",
        )
        .bind(user_id)
        .bind(&address.full_name)
        .bind(address.phone.as_str())
        .bind(&address.address_line)
        .bind(&address.city)
        .bind(&address.state)
        .bind(address.pincode.as_str())
        .bind(&address.landmark)
        .execute(self.pool)
        .await?;

        Ok(address.clone())
    }
}
