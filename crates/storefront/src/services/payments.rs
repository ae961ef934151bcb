//! Payment gateway client.
//!
//! The gateway's hosted widget runs in the browser; order creation and
//! payment verification go through external serverless functions that hold
//! the gateway secret. This client only assembles requests and classifies
//! failures into the strings the checkout page shows - no retries, no typed
//! branching anywhere else in the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use sattva_core::UserId;

use crate::cart::CartLine;
use crate::config::PaymentConfig;

/// Errors that can occur when calling the payment functions.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP 429 from the functions or the gateway behind them.
    #[error("rate limited")]
    RateLimited,

    /// HTTP 5xx.
    #[error("server error: HTTP {0}")]
    Server(u16),

    /// No response at all (connect failure, timeout, dropped socket).
    #[error("no response from payment service")]
    Network(#[source] reqwest::Error),

    /// A 2xx response that doesn't carry what it should.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Any other non-success response.
    #[error("{message}")]
    Api { status: u16, message: String },
}

impl PaymentError {
    /// The user-facing string shown in the checkout error banner.
    ///
    /// These are presentation strings, not a taxonomy callers branch on.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            Self::Server(_) => "Server error. Please try again later.".to_string(),
            Self::Network(_) => {
                "Could not reach the payment service. Please check your connection.".to_string()
            }
            Self::MalformedResponse(_) | Self::Api { .. } => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for PaymentError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e)
    }
}

/// Classify a non-success HTTP status into a [`PaymentError`].
fn classify_status(status: u16, body: String) -> PaymentError {
    match status {
        429 => PaymentError::RateLimited,
        500..=599 => PaymentError::Server(status),
        _ => PaymentError::Api {
            status,
            message: if body.is_empty() {
                format!("Payment request failed with HTTP {status}")
            } else {
                body.chars().take(200).collect()
            },
        },
    }
}

/// The order payload assembled client-side and handed to the order function.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDraft {
    pub items: Vec<CartLine>,
    pub total: Decimal,
    /// Amount in minor units (paise), as the gateway wants it.
    pub amount: i64,
    pub currency: String,
    /// Client-generated idempotency token, fresh per attempt.
    pub receipt: String,
    pub user_id: UserId,
}

/// The gateway order returned by the order-creation function.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    order: Option<GatewayOrder>,
}

/// The payment/order/signature triple reported by the widget on success,
/// plus everything the verification function wants alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationRequest {
    pub payment_id: String,
    pub order_id: String,
    pub signature: String,
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub amount: i64,
    pub currency: String,
}

/// Result of server-side payment verification.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationOutcome {
    pub success: bool,
    pub message: Option<String>,
}

/// Client for the external order-creation and verification functions.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    functions_base_url: String,
}

impl PaymentClient {
    /// Create a new payment functions client.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            functions_base_url: config.functions_base_url.clone(),
        }
    }

    /// Create a gateway order for the draft.
    ///
    /// A fresh receipt id per attempt makes creation idempotent by
    /// construction: a failed attempt leaves no partial order behind.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] classified for the checkout error banner.
    #[instrument(skip(self, draft), fields(receipt = %draft.receipt, amount = draft.amount))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<GatewayOrder, PaymentError> {
        let url = format!("{}/orders", self.functions_base_url);

        let response = self.client.post(&url).json(draft).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let parsed: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::MalformedResponse(e.to_string()))?;

        parsed.order.ok_or_else(|| {
            PaymentError::MalformedResponse("response missing order object".to_string())
        })
    }

    /// Verify a captured payment with the verification function.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] if the call itself fails; a completed call
    /// reports success or mismatch through [`VerificationOutcome`].
    #[instrument(skip(self, request), fields(order_id = %request.order_id, payment_id = %request.payment_id))]
    pub async fn verify_payment(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, PaymentError> {
        let url = format!("{}/payments/verify", self.functions_base_url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message() {
        let err = classify_status(429, String::new());
        assert!(matches!(err, PaymentError::RateLimited));
        assert_eq!(
            err.user_message(),
            "Too many requests. Please wait a moment and try again."
        );
    }

    #[test]
    fn test_server_error_message() {
        for status in [500, 502, 503] {
            let err = classify_status(status, "gateway exploded".to_string());
            assert!(matches!(err, PaymentError::Server(_)));
            assert_eq!(err.user_message(), "Server error. Please try again later.");
        }
    }

    #[test]
    fn test_other_statuses_surface_raw_message() {
        let err = classify_status(400, "amount must be positive".to_string());
        assert_eq!(err.user_message(), "amount must be positive");
    }

    #[test]
    fn test_other_statuses_with_empty_body_get_fallback() {
        let err = classify_status(404, String::new());
        assert_eq!(err.user_message(), "Payment request failed with HTTP 404");
    }

    #[test]
    fn test_malformed_response_surfaces_description() {
        let err = PaymentError::MalformedResponse("response missing order object".to_string());
        assert_eq!(
            err.user_message(),
            "malformed response: response missing order object"
        );
    }
}
