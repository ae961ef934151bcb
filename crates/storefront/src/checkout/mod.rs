//! Checkout orchestration.
//!
//! Sequences a non-empty cart + saved address + authenticated identity into
//! a confirmed order via the gateway's hosted widget:
//!
//! ```text
//! Loading -> NeedsAddress -> Ready -> CreatingOrder -> AwaitingPayment
//!                              ^            |               |
//!                              +-- failure -+    dismissal -+
//!                                           VerifyingPayment -> Completed
//! ```
//!
//! Each HTTP request re-derives the stage from cart + address state; the
//! enum here is the decision logic the route handlers run, not a record
//! persisted between requests.
//!
//! Verification failure deliberately still completes the flow when
//! `trust_gateway_on_verify_failure` is set (the default): the gateway has
//! already captured the payment by the time verification runs, so the order
//! confirmation is shown and unverified payments are reconciled out of band.
//! Setting the flag to `false` surfaces verification failure as a checkout
//! error instead.

use thiserror::Error;
use uuid::Uuid;

use sattva_core::{CurrencyCode, UserId};

use crate::cart::Cart;
use crate::models::ShippingAddress;
use crate::services::payments::{GatewayOrder, OrderDraft, VerificationRequest};

/// Errors from checkout orchestration.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Proceed was requested with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Proceed was requested with no shipping address on file.
    #[error("no shipping address on file")]
    MissingAddress,

    /// A transition was requested from the wrong state.
    #[error("invalid checkout state transition")]
    InvalidTransition,
}

/// The stages of one checkout flow instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Resolving whether a saved address exists.
    Loading,
    /// No address on file; the address form is shown.
    NeedsAddress,
    /// Address present, cart non-empty; proceed is enabled.
    /// Carries the error string from a failed order attempt, if any.
    Ready { error: Option<String> },
    /// Order creation request is in flight.
    CreatingOrder,
    /// The gateway widget is open; waiting on its callback or dismissal.
    AwaitingPayment { order: GatewayOrder },
    /// The widget reported success; verification call in flight.
    VerifyingPayment,
    /// Terminal for this flow instance.
    Completed {
        order_id: String,
        payment_id: String,
    },
}

impl CheckoutState {
    /// Resolve the initial stage from cart and address state (Loading exit).
    #[must_use]
    pub const fn resolve(has_address: bool) -> Self {
        if has_address {
            Self::Ready { error: None }
        } else {
            Self::NeedsAddress
        }
    }

    /// Proceed to payment: Ready -> `CreatingOrder`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart is empty (the UI
    /// offers no proceed action in that case, this is the backstop) and
    /// [`CheckoutError::InvalidTransition`] from any state but Ready.
    pub fn begin_order(self, cart: &Cart) -> Result<Self, CheckoutError> {
        if !matches!(self, Self::Ready { .. }) {
            return Err(CheckoutError::InvalidTransition);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(Self::CreatingOrder)
    }

    /// Order creation succeeded: `CreatingOrder` -> `AwaitingPayment`.
    #[must_use]
    pub fn order_created(self, order: GatewayOrder) -> Self {
        Self::AwaitingPayment { order }
    }

    /// Order creation failed: `CreatingOrder` -> Ready with a surfaced error.
    ///
    /// No partial order is left behind; the next attempt gets a fresh
    /// receipt id.
    #[must_use]
    pub fn order_failed(self, message: String) -> Self {
        Self::Ready {
            error: Some(message),
        }
    }

    /// The user closed the widget: `AwaitingPayment` -> Ready, no error.
    #[must_use]
    pub fn widget_dismissed(self) -> Self {
        Self::Ready { error: None }
    }

    /// The widget reported success: `AwaitingPayment` -> `VerifyingPayment`.
    #[must_use]
    pub fn payment_submitted(self) -> Self {
        Self::VerifyingPayment
    }

    /// Verification finished (or failed): `VerifyingPayment` -> Completed,
    /// unless verification failed and the deployment opted out of trusting
    /// the gateway callback.
    #[must_use]
    pub fn verification_finished(
        self,
        verified: bool,
        trust_gateway_on_verify_failure: bool,
        order_id: String,
        payment_id: String,
    ) -> Self {
        if verified || trust_gateway_on_verify_failure {
            Self::Completed {
                order_id,
                payment_id,
            }
        } else {
            Self::Ready {
                error: Some(
                    "We could not confirm your payment. If you were charged, it will be reconciled shortly."
                        .to_string(),
                ),
            }
        }
    }
}

/// Generate a fresh receipt id for one order-creation attempt.
#[must_use]
pub fn new_receipt() -> String {
    format!("rcpt_{}", Uuid::new_v4().simple())
}

/// Assemble the order payload for the order-creation function.
///
/// The amount is the cart total in minor units (paise); the currency is
/// always INR.
#[must_use]
pub fn build_draft(cart: &Cart, user_id: UserId) -> OrderDraft {
    OrderDraft {
        items: cart.lines().to_vec(),
        total: cart.total(),
        amount: cart.total_minor(),
        currency: CurrencyCode::INR.code().to_string(),
        receipt: new_receipt(),
        user_id,
    }
}

/// Assemble the verification payload from the widget's success callback.
#[must_use]
pub fn build_verification(
    cart: &Cart,
    user_id: UserId,
    payment_id: String,
    order_id: String,
    signature: String,
) -> VerificationRequest {
    VerificationRequest {
        payment_id,
        order_id,
        signature,
        user_id,
        items: cart.lines().to_vec(),
        amount: cart.total_minor(),
        currency: CurrencyCode::INR.code().to_string(),
    }
}

/// Widget launch parameters for the checkout page.
///
/// Everything the gateway script needs: key id, the created order, and
/// prefill fields. The widget UI itself is gateway-owned.
#[derive(Debug, Clone)]
pub struct WidgetParams {
    pub key_id: String,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_phone: String,
}

impl WidgetParams {
    /// Build widget parameters from the created order and checkout context.
    #[must_use]
    pub fn new(
        key_id: String,
        order: &GatewayOrder,
        user: &crate::models::CurrentUser,
        address: &ShippingAddress,
    ) -> Self {
        Self {
            key_id,
            order_id: order.id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            prefill_name: user
                .display_name
                .clone()
                .unwrap_or_else(|| address.full_name.clone()),
            prefill_email: user.email_str().unwrap_or_default().to_string(),
            prefill_phone: user
                .phone
                .clone()
                .unwrap_or_else(|| address.phone.as_str().to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use crate::cart::CartItem;

    use super::*;

    fn cart_with_total_1999() -> Cart {
        let mut cart = Cart::new();
        cart.add_line(
            CartItem {
                id: "prg_1".to_string(),
                name: "Morning Flow".to_string(),
                unit_price: Decimal::from(1999),
                discount_price: None,
                image_url: None,
                category: Some("program".to_string()),
            },
            1,
        );
        cart
    }

    fn order() -> GatewayOrder {
        GatewayOrder {
            id: "order_abc".to_string(),
            amount: 199_900,
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_resolve_without_address_needs_address() {
        assert_eq!(CheckoutState::resolve(false), CheckoutState::NeedsAddress);
    }

    #[test]
    fn test_resolve_with_address_is_ready() {
        assert_eq!(
            CheckoutState::resolve(true),
            CheckoutState::Ready { error: None }
        );
    }

    #[test]
    fn test_empty_cart_never_reaches_creating_order() {
        let state = CheckoutState::resolve(true);
        let result = state.begin_order(&Cart::new());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_begin_order_requires_ready() {
        let result = CheckoutState::NeedsAddress.begin_order(&cart_with_total_1999());
        assert!(matches!(result, Err(CheckoutError::InvalidTransition)));
    }

    #[test]
    fn test_happy_path_reaches_completed() {
        let cart = cart_with_total_1999();
        let state = CheckoutState::resolve(true)
            .begin_order(&cart)
            .unwrap()
            .order_created(order())
            .payment_submitted()
            .verification_finished(true, true, "order_abc".into(), "pay_xyz".into());

        assert_eq!(
            state,
            CheckoutState::Completed {
                order_id: "order_abc".to_string(),
                payment_id: "pay_xyz".to_string(),
            }
        );
    }

    #[test]
    fn test_order_amount_is_minor_units_inr() {
        // Cart total 1999 rupees -> order amount 199900 paise, currency INR
        let cart = cart_with_total_1999();
        let draft = build_draft(&cart, UserId::from("u_1"));

        assert_eq!(draft.amount, 199_900);
        assert_eq!(draft.currency, "INR");
        assert_eq!(draft.total, Decimal::from(1999));
        assert_eq!(draft.items.len(), 1);
    }

    #[test]
    fn test_receipt_is_fresh_per_attempt() {
        let cart = cart_with_total_1999();
        let first = build_draft(&cart, UserId::from("u_1"));
        let second = build_draft(&cart, UserId::from("u_1"));

        assert!(first.receipt.starts_with("rcpt_"));
        assert_ne!(first.receipt, second.receipt);
    }

    #[test]
    fn test_order_failure_returns_to_ready_with_error() {
        let cart = cart_with_total_1999();
        let state = CheckoutState::resolve(true)
            .begin_order(&cart)
            .unwrap()
            .order_failed("Server error. Please try again later.".to_string());

        assert_eq!(
            state,
            CheckoutState::Ready {
                error: Some("Server error. Please try again later.".to_string())
            }
        );
    }

    #[test]
    fn test_widget_dismissal_returns_to_ready_without_error() {
        let cart = cart_with_total_1999();
        let before = cart.clone();

        let state = CheckoutState::resolve(true)
            .begin_order(&cart)
            .unwrap()
            .order_created(order())
            .widget_dismissed();

        assert_eq!(state, CheckoutState::Ready { error: None });
        // Dismissal touches neither cart nor address
        assert_eq!(cart, before);
    }

    #[test]
    fn test_verification_failure_still_completes_when_trusting_gateway() {
        let state = CheckoutState::VerifyingPayment.verification_finished(
            false,
            true,
            "order_abc".into(),
            "pay_xyz".into(),
        );

        assert!(matches!(state, CheckoutState::Completed { ref order_id, ref payment_id }
            if order_id == "order_abc" && payment_id == "pay_xyz"));
    }

    #[test]
    fn test_verification_failure_blocks_when_not_trusting_gateway() {
        let state = CheckoutState::VerifyingPayment.verification_finished(
            false,
            false,
            "order_abc".into(),
            "pay_xyz".into(),
        );

        assert!(matches!(state, CheckoutState::Ready { error: Some(_) }));
    }

    #[test]
    fn test_build_verification_carries_order_payload() {
        let cart = cart_with_total_1999();
        let request = build_verification(
            &cart,
            UserId::from("u_1"),
            "pay_xyz".to_string(),
            "order_abc".to_string(),
            "sig".to_string(),
        );

        assert_eq!(request.amount, 199_900);
        assert_eq!(request.currency, "INR");
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.user_id.as_str(), "u_1");
    }
}
