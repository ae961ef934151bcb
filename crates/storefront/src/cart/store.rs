//! Session persistence for the cart.
//!
//! The whole line list lives under a single session key. Every mutation
//! rewrites the full list, with one asymmetry: an empty cart removes the key
//! entirely instead of writing an empty array. A snapshot that fails to
//! deserialize is logged, deleted, and treated as "no cart" - the only
//! recovery path in the component.

use tower_sessions::Session;

use crate::models::session_keys;

use super::{Cart, CartLine};

/// Load the cart from the session.
///
/// A missing key is an empty cart. A corrupted snapshot is deleted and also
/// yields an empty cart; it never propagates as an error.
pub async fn load(session: &Session) -> Cart {
    match session.get::<Vec<CartLine>>(session_keys::CART).await {
        Ok(Some(lines)) => Cart::from_lines(lines),
        Ok(None) => Cart::new(),
        Err(e) => {
            tracing::warn!("Discarding corrupted cart snapshot: {e}");
            if let Err(e) = session
                .remove::<serde_json::Value>(session_keys::CART)
                .await
            {
                tracing::warn!("Failed to delete corrupted cart snapshot: {e}");
            }
            Cart::new()
        }
    }
}

/// Persist the cart to the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    if cart.is_empty() {
        // Remove as a raw value so a corrupted snapshot can't block the delete
        session
            .remove::<serde_json::Value>(session_keys::CART)
            .await?;
        return Ok(());
    }

    session.insert(session_keys::CART, cart.lines()).await
}

/// Remove the persisted snapshot (order success, explicit clear).
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn clear(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<serde_json::Value>(session_keys::CART)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::{MemoryStore, Session};

    use crate::cart::CartItem;

    use super::*;

    fn test_session() -> Session {
        let store = Arc::new(MemoryStore::default());
        Session::new(None, store, None)
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_line(
            CartItem {
                id: "p1".to_string(),
                name: "Herbal tea".to_string(),
                unit_price: Decimal::from(500),
                discount_price: Some(Decimal::from(450)),
                image_url: None,
                category: Some("store-item".to_string()),
            },
            2,
        );
        cart.add_line(
            CartItem {
                id: "p2".to_string(),
                name: "Morning flow".to_string(),
                unit_price: Decimal::from(1999),
                discount_price: None,
                image_url: None,
                category: Some("program".to_string()),
            },
            1,
        );
        cart
    }

    async fn snapshot(session: &Session) -> Option<serde_json::Value> {
        session
            .get::<serde_json::Value>(session_keys::CART)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_is_empty_cart() {
        let session = test_session();
        let cart = load(&session).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_persist_rehydrate_roundtrip() {
        let session = test_session();
        let cart = sample_cart();

        save(&session, &cart).await.unwrap();
        let restored = load(&session).await;

        // Set-equal by (id, quantity, effective price)
        let key = |c: &Cart| {
            let mut v: Vec<_> = c
                .lines()
                .iter()
                .map(|l| (l.id.clone(), l.quantity, l.effective_unit_price()))
                .collect();
            v.sort();
            v
        };
        assert_eq!(key(&restored), key(&cart));
        assert_eq!(restored.total(), cart.total());
    }

    #[tokio::test]
    async fn test_empty_cart_removes_key_instead_of_writing_empty_array() {
        let session = test_session();
        save(&session, &sample_cart()).await.unwrap();
        assert!(snapshot(&session).await.is_some());

        save(&session, &Cart::new()).await.unwrap();
        assert!(snapshot(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let session = test_session();
        save(&session, &sample_cart()).await.unwrap();

        clear(&session).await.unwrap();

        assert!(snapshot(&session).await.is_none());
        assert!(load(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_snapshot_recovers_to_empty_and_deletes_key() {
        let session = test_session();
        session
            .insert(session_keys::CART, "definitely not a cart")
            .await
            .unwrap();

        let cart = load(&session).await;

        assert!(cart.is_empty());
        assert!(snapshot(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_mutation_then_save_rewrites_full_list() {
        let session = test_session();
        let mut cart = sample_cart();
        save(&session, &cart).await.unwrap();

        cart.set_quantity("p1", 5);
        save(&session, &cart).await.unwrap();

        let restored = load(&session).await;
        let p1 = restored.lines().iter().find(|l| l.id == "p1").unwrap();
        assert_eq!(p1.quantity, 5);
        assert_eq!(restored.lines().len(), 2);
    }
}
