//! Managed identity provider client.
//!
//! Authentication is fully delegated: the provider owns user records,
//! password storage, OTP delivery, and OAuth federation. This client wraps
//! the provider's REST endpoints and maps its error codes onto [`AuthError`].
//! The storefront keeps only a [`crate::models::CurrentUser`] in the session.

mod error;

pub use error::AuthError;

use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sattva_core::Email;

use crate::config::IdentityConfig;

/// A provider-issued session: the uid plus profile fields and the id token
/// used for subsequent profile calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSession {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub id_token: String,
}

/// An in-flight phone/OTP challenge.
///
/// Stored in the session between the request-code and verify-code steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub phone: String,
    pub session_info: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
    #[serde(rename = "idToken")]
    id_token: Option<String>,
}

impl SessionResponse {
    fn into_session(self, fallback_token: Option<String>) -> ProviderSession {
        ProviderSession {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            phone: self.phone_number,
            id_token: self.id_token.or(fallback_token).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OtpStartResponse {
    #[serde(rename = "sessionInfo")]
    session_info: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the managed identity provider REST API.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    oauth_client_id: Option<String>,
    oauth_auth_url: Option<String>,
}

impl AuthClient {
    /// Create a new identity provider client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.expose_secret().to_string(),
            oauth_client_id: config.oauth_client_id.clone(),
            oauth_auth_url: config.oauth_auth_url.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/v1/accounts:{action}?key={}", self.base_url, self.api_key)
    }

    /// POST a JSON body to a provider action and parse the session response.
    async fn post_session(
        &self,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<ProviderSession, AuthError> {
        let response = self
            .client
            .post(self.endpoint(action))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_provider_error(status.as_u16(), response.text().await.ok()));
        }

        let session: SessionResponse = response.json().await?;
        Ok(session.into_session(None))
    }

    // =========================================================================
    // Email / Password
    // =========================================================================

    /// Register a new user with name, email, password, and phone.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for malformed email input, and
    /// `AuthError::UserAlreadyExists` if the email is registered.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<ProviderSession, AuthError> {
        let email = Email::parse(email)?;

        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "displayName": name,
            "phoneNumber": phone,
            "returnSecureToken": true,
        });

        self.post_session("signUp", &body).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email/password.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, AuthError> {
        let email = Email::parse(email)?;

        let body = serde_json::json!({
            "email": email.as_str(),
            "password": password,
            "returnSecureToken": true,
        });

        self.post_session("signInWithPassword", &body).await
    }

    /// Revoke the provider session on sign-out.
    ///
    /// Failure is logged, not surfaced: the local session is cleared either
    /// way and the provider token expires on its own.
    #[instrument(skip(self, id_token))]
    pub async fn sign_out(&self, id_token: &str) {
        let body = serde_json::json!({ "idToken": id_token });
        if let Err(e) = self
            .client
            .post(self.endpoint("signOut"))
            .json(&body)
            .send()
            .await
        {
            tracing::warn!("Provider sign-out failed: {e}");
        }
    }

    /// Send a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the email is not registered.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        let body = serde_json::json!({
            "requestType": "PASSWORD_RESET",
            "email": email.as_str(),
        });

        let response = self
            .client
            .post(self.endpoint("sendOobCode"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_provider_error(status.as_u16(), response.text().await.ok()));
        }

        Ok(())
    }

    // =========================================================================
    // Phone / OTP
    // =========================================================================

    /// Request an OTP for a phone number.
    ///
    /// Returns the challenge to stash in the session for the verify step.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RateLimited` when the provider throttles the phone.
    #[instrument(skip(self))]
    pub async fn request_otp(&self, phone: &str) -> Result<OtpChallenge, AuthError> {
        let body = serde_json::json!({ "phoneNumber": phone });

        let response = self
            .client
            .post(self.endpoint("sendVerificationCode"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_provider_error(status.as_u16(), response.text().await.ok()));
        }

        let started: OtpStartResponse = response.json().await?;
        Ok(OtpChallenge {
            phone: phone.to_owned(),
            session_info: started.session_info,
        })
    }

    /// Complete a phone sign-in with the code the user received.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidOtp` for a wrong or expired code.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(
        &self,
        challenge: &OtpChallenge,
        code: &str,
    ) -> Result<ProviderSession, AuthError> {
        let body = serde_json::json!({
            "sessionInfo": challenge.session_info,
            "code": code,
        });

        self.post_session("signInWithPhoneNumber", &body).await
    }

    // =========================================================================
    // OAuth
    // =========================================================================

    /// Build the provider's OAuth authorization URL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OauthNotConfigured` when the deployment has no
    /// OAuth client configured.
    pub fn oauth_authorize_url(
        &self,
        state: &str,
        redirect_uri: &str,
    ) -> Result<String, AuthError> {
        let (Some(client_id), Some(auth_url)) = (&self.oauth_client_id, &self.oauth_auth_url)
        else {
            return Err(AuthError::OauthNotConfigured);
        };

        Ok(format!(
            "{auth_url}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={}",
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        ))
    }

    /// Exchange an OAuth callback code for a provider session.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the code is rejected.
    #[instrument(skip(self, code))]
    pub async fn sign_in_with_oauth(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ProviderSession, AuthError> {
        let body = serde_json::json!({
            "code": code,
            "requestUri": redirect_uri,
            "returnSecureToken": true,
        });

        self.post_session("signInWithIdp", &body).await
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Update the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns a provider error if the token is stale or the update fails.
    #[instrument(skip(self, id_token))]
    pub async fn update_profile(
        &self,
        id_token: &str,
        display_name: Option<&str>,
        phone: Option<&str>,
    ) -> Result<ProviderSession, AuthError> {
        let body = serde_json::json!({
            "idToken": id_token,
            "displayName": display_name,
            "phoneNumber": phone,
            "returnSecureToken": true,
        });

        let mut session = self.post_session("update", &body).await?;
        // The provider omits the token on profile updates; keep the current one
        if session.id_token.is_empty() {
            session.id_token = id_token.to_owned();
        }
        Ok(session)
    }
}

/// Map a provider error response onto [`AuthError`].
fn map_provider_error(status: u16, body: Option<String>) -> AuthError {
    let message = body
        .as_deref()
        .and_then(|b| serde_json::from_str::<ErrorEnvelope>(b).ok())
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .unwrap_or_default();

    match message.split(':').next().unwrap_or("").trim() {
        "EMAIL_EXISTS" => AuthError::UserAlreadyExists,
        "EMAIL_NOT_FOUND" => AuthError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => AuthError::InvalidCredentials,
        "WEAK_PASSWORD" => AuthError::WeakPassword(message),
        "INVALID_CODE" | "INVALID_SESSION_INFO" | "SESSION_EXPIRED" => AuthError::InvalidOtp,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::RateLimited,
        _ => AuthError::Api { status, message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_body(code: &str) -> Option<String> {
        Some(format!(r#"{{"error": {{"message": "{code}"}}}}"#))
    }

    #[test]
    fn test_map_email_exists() {
        assert!(matches!(
            map_provider_error(400, error_body("EMAIL_EXISTS")),
            AuthError::UserAlreadyExists
        ));
    }

    #[test]
    fn test_map_invalid_credentials() {
        assert!(matches!(
            map_provider_error(400, error_body("INVALID_LOGIN_CREDENTIALS")),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            map_provider_error(400, error_body("INVALID_PASSWORD")),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_map_weak_password_keeps_detail() {
        let err = map_provider_error(
            400,
            error_body("WEAK_PASSWORD : Password should be at least 6 characters"),
        );
        match err {
            AuthError::WeakPassword(msg) => assert!(msg.contains("6 characters")),
            other => panic!("expected WeakPassword, got {other:?}"),
        }
    }

    #[test]
    fn test_map_otp_errors() {
        assert!(matches!(
            map_provider_error(400, error_body("INVALID_CODE")),
            AuthError::InvalidOtp
        ));
        assert!(matches!(
            map_provider_error(400, error_body("SESSION_EXPIRED")),
            AuthError::InvalidOtp
        ));
    }

    #[test]
    fn test_map_rate_limited() {
        assert!(matches!(
            map_provider_error(400, error_body("TOO_MANY_ATTEMPTS_TRY_LATER")),
            AuthError::RateLimited
        ));
    }

    #[test]
    fn test_map_unknown_falls_through_to_api() {
        let err = map_provider_error(500, Some("not even json".to_string()));
        assert!(matches!(err, AuthError::Api { status: 500, .. }));
    }
}
