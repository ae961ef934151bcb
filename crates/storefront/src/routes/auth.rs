//! Authentication route handlers.
//!
//! All credential handling is delegated to the managed identity provider;
//! these handlers translate form posts into provider calls and mirror the
//! resulting session into [`CurrentUser`]. Provider failures render back
//! into the form with a message instead of bubbling.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sattva_core::{Email, Phone, UserId};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::{AuthError, OtpChallenge, ProviderSession};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Password reset page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset.html")]
pub struct ResetTemplate {
    pub error: Option<String>,
    pub sent: bool,
}

/// Phone/OTP sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/otp.html")]
pub struct OtpTemplate {
    pub error: Option<String>,
    pub phone: Option<String>,
    pub code_sent: bool,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Register form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Password reset form data.
#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub email: String,
}

/// OTP request form data.
#[derive(Debug, Deserialize)]
pub struct OtpRequestForm {
    pub phone: String,
}

/// OTP verification form data.
#[derive(Debug, Deserialize)]
pub struct OtpVerifyForm {
    pub code: String,
}

/// OAuth callback query parameters.
#[derive(Debug, Deserialize)]
pub struct OauthCallbackQuery {
    pub code: String,
    pub state: String,
}

/// Build the session identity from a provider session.
fn session_user(provider: ProviderSession, fallback_email: Option<&str>) -> CurrentUser {
    let email = provider
        .email
        .as_deref()
        .or(fallback_email)
        .and_then(|e| Email::parse(e).ok());

    CurrentUser {
        uid: UserId::from(provider.uid),
        email,
        display_name: provider.display_name,
        phone: provider.phone,
        id_token: provider.id_token,
    }
}

/// Establish the local session after a provider sign-in.
async fn establish_session(session: &Session, user: &CurrentUser) -> Result<(), AppError> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.uid, user.email_str());
    Ok(())
}

// =============================================================================
// Email / Password
// =============================================================================

/// Display login page.
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate { error: None }
}

/// Login action.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.auth().sign_in(&form.email, &form.password).await {
        Ok(provider) => {
            let user = session_user(provider, Some(&form.email));
            establish_session(&session, &user).await?;
            Ok(Redirect::to("/account").into_response())
        }
        Err(e) => {
            tracing::info!("Login failed: {e}");
            Ok(LoginTemplate {
                error: Some(login_error_message(&e)),
            }
            .into_response())
        }
    }
}

/// Display register page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate { error: None }
}

/// Register action.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    // Optional phone is validated before it reaches the provider
    let phone = match form.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => match Phone::parse(raw) {
            Ok(phone) => Some(format!("+91{phone}")),
            Err(e) => {
                return Ok(RegisterTemplate {
                    error: Some(e.to_string()),
                }
                .into_response());
            }
        },
        None => None,
    };

    match state
        .auth()
        .sign_up(&form.name, &form.email, &form.password, phone.as_deref())
        .await
    {
        Ok(provider) => {
            let user = session_user(provider, Some(&form.email));
            establish_session(&session, &user).await?;
            Ok(Redirect::to("/account").into_response())
        }
        Err(e) => {
            tracing::info!("Registration failed: {e}");
            Ok(RegisterTemplate {
                error: Some(login_error_message(&e)),
            }
            .into_response())
        }
    }
}

/// Logout action.
#[instrument(skip(state, session, auth))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<Response, AppError> {
    if let Some(user) = auth {
        state.auth().sign_out(&user.id_token).await;
    }

    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Password Reset
// =============================================================================

/// Display password reset page.
pub async fn reset_page() -> impl IntoResponse {
    ResetTemplate {
        error: None,
        sent: false,
    }
}

/// Send a password reset email.
#[instrument(skip(state, form))]
pub async fn reset(
    State(state): State<AppState>,
    Form(form): Form<ResetForm>,
) -> impl IntoResponse {
    match state.auth().send_password_reset(&form.email).await {
        Ok(()) => ResetTemplate {
            error: None,
            sent: true,
        },
        Err(e) => {
            tracing::info!("Password reset failed: {e}");
            ResetTemplate {
                error: Some(login_error_message(&e)),
                sent: false,
            }
        }
    }
}

// =============================================================================
// Phone / OTP
// =============================================================================

/// Display phone sign-in page.
pub async fn otp_page() -> impl IntoResponse {
    OtpTemplate {
        error: None,
        phone: None,
        code_sent: false,
    }
}

/// Request an OTP for a phone number.
#[instrument(skip(state, session, form))]
pub async fn otp_request(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpRequestForm>,
) -> Result<Response, AppError> {
    let phone = match Phone::parse(form.phone.trim()) {
        Ok(phone) => phone,
        Err(e) => {
            return Ok(OtpTemplate {
                error: Some(e.to_string()),
                phone: None,
                code_sent: false,
            }
            .into_response());
        }
    };

    match state.auth().request_otp(&format!("+91{phone}")).await {
        Ok(challenge) => {
            session
                .insert(session_keys::OTP_CHALLENGE, &challenge)
                .await?;
            Ok(OtpTemplate {
                error: None,
                phone: Some(phone.as_str().to_string()),
                code_sent: true,
            }
            .into_response())
        }
        Err(e) => {
            tracing::info!("OTP request failed: {e}");
            Ok(OtpTemplate {
                error: Some(login_error_message(&e)),
                phone: None,
                code_sent: false,
            }
            .into_response())
        }
    }
}

/// Verify the OTP and sign in.
#[instrument(skip(state, session, form))]
pub async fn otp_verify(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpVerifyForm>,
) -> Result<Response, AppError> {
    let Some(challenge) = session
        .remove::<OtpChallenge>(session_keys::OTP_CHALLENGE)
        .await?
    else {
        return Ok(OtpTemplate {
            error: Some(login_error_message(&AuthError::InvalidSessionState)),
            phone: None,
            code_sent: false,
        }
        .into_response());
    };

    match state.auth().verify_otp(&challenge, form.code.trim()).await {
        Ok(provider) => {
            let user = session_user(provider, None);
            establish_session(&session, &user).await?;
            Ok(Redirect::to("/account").into_response())
        }
        Err(e) => {
            tracing::info!("OTP verification failed: {e}");
            // Keep the challenge gone; the user requests a fresh code
            Ok(OtpTemplate {
                error: Some(login_error_message(&e)),
                phone: Some(challenge.phone),
                code_sent: false,
            }
            .into_response())
        }
    }
}

// =============================================================================
// OAuth
// =============================================================================

/// Redirect to the provider's OAuth authorization page.
#[instrument(skip(state, session))]
pub async fn oauth_start(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    let oauth_state = URL_SAFE_NO_PAD.encode(bytes);

    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);
    let url = state
        .auth()
        .oauth_authorize_url(&oauth_state, &redirect_uri)?;

    session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await?;

    Ok(Redirect::to(&url).into_response())
}

/// Handle the provider's OAuth callback.
#[instrument(skip(state, session, query))]
pub async fn oauth_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<OauthCallbackQuery>,
) -> Result<Response, AppError> {
    let stored: Option<String> = session.remove(session_keys::OAUTH_STATE).await?;
    if stored.as_deref() != Some(query.state.as_str()) {
        return Err(AppError::Auth(AuthError::InvalidSessionState));
    }

    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);
    let provider = state
        .auth()
        .sign_in_with_oauth(&query.code, &redirect_uri)
        .await?;

    let user = session_user(provider, None);
    establish_session(&session, &user).await?;

    Ok(Redirect::to("/account").into_response())
}

/// Map provider errors to the strings the auth forms show.
fn login_error_message(e: &AuthError) -> String {
    match e {
        AuthError::InvalidCredentials | AuthError::UserNotFound => {
            "Invalid email or password".to_string()
        }
        AuthError::UserAlreadyExists => "An account with this email already exists".to_string(),
        AuthError::WeakPassword(msg) => msg.clone(),
        AuthError::InvalidEmail(e) => e.to_string(),
        AuthError::InvalidOtp => "That code didn't work. Request a new one.".to_string(),
        AuthError::InvalidSessionState => {
            "Your sign-in session expired. Please start again.".to_string()
        }
        AuthError::RateLimited => "Too many attempts. Please wait and try again.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages_do_not_leak_provider_detail() {
        let msg = login_error_message(&AuthError::Api {
            status: 500,
            message: "internal stack trace".to_string(),
        });
        assert!(!msg.contains("stack trace"));
    }

    #[test]
    fn test_invalid_credentials_message() {
        assert_eq!(
            login_error_message(&AuthError::InvalidCredentials),
            "Invalid email or password"
        );
    }
}
