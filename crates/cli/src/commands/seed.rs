//! Seed per-user demo data for local development.
//!
//! In production the external payment/order backend writes order and
//! enrollment rows; locally there is no backend, so this command fills a
//! user's account views with plausible rows.

use super::CommandError;

/// Seed demo orders, favorites, and enrollments for a user.
///
/// Idempotent: rows carry fixed identifiers and conflicts are ignored.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run(user: &str) -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Seeding demo rows for user {user}...");

    let items = serde_json::json!([
        {
            "id": "prg_morning_flow",
            "name": "Morning Flow",
            "unit_price": "1999",
            "quantity": 1,
            "category": "program"
        },
        {
            "id": "itm_copper_bottle",
            "name": "Copper Bottle",
            "unit_price": "850",
            "discount_price": "799",
            "quantity": 2,
            "category": "store-item"
        }
    ]);

    sqlx::query(
        r"
        INSERT INTO orders (user_id, gateway_order_id, payment_id, amount, currency, status, items)
        VALUES ($1, 'order_seed_demo_1', 'pay_seed_demo_1', 3597.00, 'INR', 'paid', $2)
        ON CONFLICT (gateway_order_id) DO NOTHING
        ",
    )
    .bind(user)
    .bind(&items)
    .execute(&pool)
    .await?;

    sqlx::query(
        r"
        INSERT INTO favorites (user_id, item_id, title, image_url)
        VALUES
            ($1, 'prg_morning_flow', 'Morning Flow', NULL),
            ($1, 'itm_herbal_tea', 'Herbal Tea', NULL)
        ON CONFLICT (user_id, item_id) DO NOTHING
        ",
    )
    .bind(user)
    .execute(&pool)
    .await?;

    sqlx::query(
        r"
        INSERT INTO enrollments (user_id, program_id, title)
        VALUES ($1, 'prg_morning_flow', 'Morning Flow')
        ON CONFLICT (user_id, program_id) DO NOTHING
        ",
    )
    .bind(user)
    .execute(&pool)
    .await?;

    tracing::info!("Seed complete!");
    Ok(())
}
