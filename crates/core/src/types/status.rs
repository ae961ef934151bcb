//! Status enums for per-user records.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order record.
///
/// The external payment/order backend owns order rows; the storefront only
/// reads them back for the account view. Unknown strings from the backend are
/// surfaced as data corruption by the repository rather than silently mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Gateway order created, payment not yet confirmed.
    #[default]
    Created,
    /// Payment captured and verified.
    Paid,
    /// Payment captured but server-side verification did not succeed.
    Unverified,
    /// Payment failed or was abandoned.
    Failed,
    /// Order refunded through the gateway.
    Refunded,
}

impl OrderStatus {
    /// Human-readable label for account views.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "Processing",
            Self::Paid => "Paid",
            Self::Unverified => "Payment under review",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Paid => write!(f, "paid"),
            Self::Unverified => write!(f, "unverified"),
            Self::Failed => write!(f, "failed"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            "unverified" => Ok(Self::Unverified),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_from_str_roundtrip() {
        for status in [
            OrderStatus::Created,
            OrderStatus::Paid,
            OrderStatus::Unverified,
            OrderStatus::Failed,
            OrderStatus::Refunded,
        ] {
            let s = status.to_string();
            let parsed: OrderStatus = s.parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_default_is_created() {
        assert_eq!(OrderStatus::default(), OrderStatus::Created);
    }
}
