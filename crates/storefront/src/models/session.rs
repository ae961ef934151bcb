//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use sattva_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data mirrored from the identity provider's session. The provider
/// owns the user record; this is only what the storefront needs to render
/// pages and namespace per-user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Provider-issued uid.
    pub uid: UserId,
    /// User's email address. Phone/OTP sign-ins may not have one.
    pub email: Option<Email>,
    /// Display name, if the profile carries one.
    pub display_name: Option<String>,
    /// Phone number, if the profile carries one.
    pub phone: Option<String>,
    /// Provider id token, used for profile updates and sign-out.
    pub id_token: String,
}

impl CurrentUser {
    /// The email as a string for prefill and Sentry context.
    #[must_use]
    pub fn email_str(&self) -> Option<&str> {
        self.email.as_ref().map(Email::as_str)
    }

    /// What to call the user in the account header.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .or_else(|| self.email_str())
            .or(self.phone.as_deref())
            .unwrap_or("there")
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the persisted cart line list.
    ///
    /// The single fixed namespace the cart occupies; an absent key means an
    /// empty cart.
    pub const CART: &str = "cart";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for the in-flight OTP challenge (provider session info + phone).
    pub const OTP_CHALLENGE: &str = "otp_challenge";
}
