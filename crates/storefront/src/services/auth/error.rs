//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during identity provider operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] sattva_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// OTP code rejected by the provider.
    #[error("invalid verification code")]
    InvalidOtp,

    /// The OTP challenge or OAuth state in the session is missing or stale.
    #[error("invalid session state")]
    InvalidSessionState,

    /// Social sign-in is not configured for this deployment.
    #[error("OAuth sign-in not configured")]
    OauthNotConfigured,

    /// Provider throttled the request.
    #[error("too many attempts, try again later")]
    RateLimited,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error the client has no mapping for.
    #[error("provider error: {status} - {message}")]
    Api { status: u16, message: String },
}
