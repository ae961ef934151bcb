//! Checkout route handlers.
//!
//! Each request re-derives the checkout stage from cart + address state and
//! drives the `checkout::CheckoutState` machine one transition forward. The
//! gateway widget runs on the pay page; its success callback posts the
//! payment/order/signature triple back to `/checkout/verify`, and closing it
//! simply navigates back to `/checkout` (a benign return to Ready).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::store;
use crate::checkout::{CheckoutState, WidgetParams, build_draft, build_verification};
use crate::db::addresses::AddressRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{CspNonce, RequireAuth};
use crate::models::{AddressForm, CurrentUser, ShippingAddress};
use crate::state::AppState;

use super::cart::CartView;

/// Address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub full_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub landmark: Option<String>,
}

impl From<&ShippingAddress> for AddressView {
    fn from(address: &ShippingAddress) -> Self {
        Self {
            full_name: address.full_name.clone(),
            phone: address.phone.as_str().to_string(),
            address_line: address.address_line.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            pincode: address.pincode.as_str().to_string(),
            landmark: address.landmark.clone(),
        }
    }
}

/// Checkout page template (address form or order summary).
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
    pub address: Option<AddressView>,
    pub needs_address: bool,
    /// Error from a failed order attempt or blocked verification.
    pub error: Option<String>,
    /// Error from address form validation or a failed save.
    pub form_error: Option<String>,
}

/// Payment page template: embeds the gateway widget.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/pay.html")]
pub struct PayTemplate {
    pub script_url: String,
    pub key_id: String,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_phone: String,
    pub nonce: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub order_id: String,
    pub payment_id: String,
}

/// Verification callback form data (the widget's success triple).
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
}

/// Confirmation page query parameters.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub order_id: String,
    pub payment_id: String,
}

async fn load_address(
    state: &AppState,
    user: &CurrentUser,
) -> Result<Option<ShippingAddress>, AppError> {
    Ok(AddressRepository::new(state.pool())
        .get_default(&user.uid)
        .await?)
}

/// Display the checkout page: address form or order summary.
#[instrument(skip(state, session, user), fields(user = %user.uid))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let cart = store::load(&session).await;
    let address = load_address(&state, &user).await?;

    let stage = CheckoutState::resolve(address.is_some());

    Ok(CheckoutTemplate {
        cart: CartView::from(&cart),
        address: address.as_ref().map(AddressView::from),
        needs_address: stage == CheckoutState::NeedsAddress,
        error: None,
        form_error: None,
    }
    .into_response())
}

/// Save the user's default address (merge-upsert), then show the summary.
///
/// Requires an authenticated user - the extractor rejects before any I/O.
/// Validation failures re-render the form; the saved address flows straight
/// into the Ready view without a re-fetch.
#[instrument(skip(state, session, user, form), fields(user = %user.uid))]
pub async fn save_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Response, AppError> {
    let cart = store::load(&session).await;

    let address = match form.validate() {
        Ok(address) => address,
        Err(e) => {
            return Ok(CheckoutTemplate {
                cart: CartView::from(&cart),
                address: None,
                needs_address: true,
                error: None,
                form_error: Some(e.to_string()),
            }
            .into_response());
        }
    };

    match AddressRepository::new(state.pool())
        .upsert_default(&user.uid, &address)
        .await
    {
        Ok(saved) => Ok(CheckoutTemplate {
            cart: CartView::from(&cart),
            address: Some(AddressView::from(&saved)),
            needs_address: false,
            error: None,
            form_error: None,
        }
        .into_response()),
        Err(e) => {
            tracing::error!("Failed to save address: {e}");
            Ok(CheckoutTemplate {
                cart: CartView::from(&cart),
                address: None,
                needs_address: true,
                error: None,
                form_error: Some("Failed to save address. Please try again.".to_string()),
            }
            .into_response())
        }
    }
}

/// Proceed to payment: create a gateway order and open the widget.
///
/// A fresh receipt id is generated per attempt, so a failed attempt leaves
/// no partial order behind. Failures return to the summary with a surfaced
/// error string.
#[instrument(skip(state, session, user, nonce), fields(user = %user.uid))]
pub async fn create_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    CspNonce(nonce): CspNonce,
) -> Result<Response, AppError> {
    let cart = store::load(&session).await;
    if cart.is_empty() {
        // The UI offers no proceed action on an empty cart; this is the backstop
        return Ok(Redirect::to("/cart").into_response());
    }

    let Some(address) = load_address(&state, &user).await? else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    let stage = match CheckoutState::resolve(true).begin_order(&cart) {
        Ok(stage) => stage,
        Err(e) => {
            tracing::warn!("Proceed rejected: {e}");
            return Ok(Redirect::to("/cart").into_response());
        }
    };

    let draft = build_draft(&cart, user.uid.clone());
    match state.payments().create_order(&draft).await {
        Ok(order) => {
            add_breadcrumb(
                "checkout",
                "gateway order created",
                Some(&[("order_id", order.id.as_str())]),
            );

            let stage = stage.order_created(order);
            let CheckoutState::AwaitingPayment { order } = stage else {
                return Err(AppError::Internal("unexpected checkout stage".to_string()));
            };

            let params = WidgetParams::new(
                state.config().payments.key_id.clone(),
                &order,
                &user,
                &address,
            );

            Ok(PayTemplate {
                script_url: state.config().payments.checkout_script_url.clone(),
                key_id: params.key_id,
                order_id: params.order_id,
                amount: params.amount,
                currency: params.currency,
                prefill_name: params.prefill_name,
                prefill_email: params.prefill_email,
                prefill_phone: params.prefill_phone,
                nonce,
            }
            .into_response())
        }
        Err(e) => {
            tracing::warn!("Order creation failed: {e}");
            let stage = stage.order_failed(e.user_message());
            let error = match stage {
                CheckoutState::Ready { error } => error,
                _ => None,
            };

            Ok(CheckoutTemplate {
                cart: CartView::from(&cart),
                address: Some(AddressView::from(&address)),
                needs_address: false,
                error,
                form_error: None,
            }
            .into_response())
        }
    }
}

/// Widget success callback: verify the payment, clear the cart, confirm.
///
/// The gateway has already captured the payment; with the default
/// `trust_gateway_on_verify_failure` the flow completes even when
/// verification fails (logged for reconciliation). Opting out surfaces the
/// failure and keeps the cart instead.
#[instrument(skip(state, session, user, form), fields(user = %user.uid, order_id = %form.order_id))]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<VerifyForm>,
) -> Result<Response, AppError> {
    let cart = store::load(&session).await;

    let request = build_verification(
        &cart,
        user.uid.clone(),
        form.payment_id.clone(),
        form.order_id.clone(),
        form.signature,
    );

    let verified = match state.payments().verify_payment(&request).await {
        Ok(outcome) => {
            if !outcome.success {
                tracing::warn!(
                    message = outcome.message.as_deref().unwrap_or(""),
                    "Payment verification mismatch"
                );
            }
            outcome.success
        }
        Err(e) => {
            tracing::error!("Payment verification call failed: {e}");
            false
        }
    };

    let stage = CheckoutState::VerifyingPayment.verification_finished(
        verified,
        state.config().payments.trust_gateway_on_verify_failure,
        form.order_id,
        form.payment_id,
    );

    match stage {
        CheckoutState::Completed {
            order_id,
            payment_id,
        } => {
            if let Err(e) = store::clear(&session).await {
                tracing::error!("Failed to clear cart after order: {e}");
            }

            Ok(Redirect::to(&format!(
                "/checkout/success?order_id={}&payment_id={}",
                urlencoding::encode(&order_id),
                urlencoding::encode(&payment_id),
            ))
            .into_response())
        }
        stage => {
            let error = match stage {
                CheckoutState::Ready { error } => error,
                _ => None,
            };
            let address = load_address(&state, &user).await?;

            Ok(CheckoutTemplate {
                cart: CartView::from(&cart),
                address: address.as_ref().map(AddressView::from),
                needs_address: address.is_none(),
                error,
                form_error: None,
            }
            .into_response())
        }
    }
}

/// Order confirmation page.
#[instrument]
pub async fn success(Query(query): Query<SuccessQuery>) -> impl IntoResponse {
    SuccessTemplate {
        order_id: query.order_id,
        payment_id: query.payment_id,
    }
}
