//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /programs               - Program listing (?category=)
//! GET  /programs/{slug}        - Program detail
//! GET  /sessions               - Session offerings
//! GET  /store                  - Store item listing (?category=)
//! GET  /store/{slug}           - Store item detail
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add item, then show the cart
//! POST /cart/update            - Overwrite a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Resolve address, show form or summary
//! POST /checkout/address       - Save the default address
//! POST /checkout/order         - Create a gateway order, open the widget
//! POST /checkout/verify        - Widget success callback -> verification
//! GET  /checkout/success       - Order confirmation
//!
//! # Favorites
//! POST /favorites/toggle       - Toggle a catalog item (requires auth)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! GET  /auth/reset             - Password reset page
//! POST /auth/reset             - Send reset email
//! GET  /auth/otp               - Phone sign-in page
//! POST /auth/otp               - Request an OTP
//! POST /auth/otp/verify        - Verify the OTP
//! GET  /auth/oauth/start       - Redirect to the provider's OAuth page
//! GET  /auth/oauth/callback    - Handle the OAuth callback
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! POST /account/profile        - Update profile
//! GET  /account/orders         - Order history (?page=)
//! GET  /account/favorites      - Favorites
//! POST /account/favorites/clear   - Clear all favorites
//! GET  /account/enrollments    - Enrollments
//! POST /account/enrollments/clear - Clear all enrollments
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod favorites;
pub mod home;
pub mod programs;
pub mod sessions;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/programs", get(programs::index))
        .route("/programs/{slug}", get(programs::show))
        .route("/sessions", get(sessions::index))
        .route("/store", get(store::index))
        .route("/store/{slug}", get(store::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
///
/// Order creation and verification sit behind the api rate limiter.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::save_address))
        .route(
            "/order",
            post(checkout::create_order).layer(api_rate_limiter()),
        )
        .route("/verify", post(checkout::verify).layer(api_rate_limiter()))
        .route("/success", get(checkout::success))
}

/// Create the auth routes router.
///
/// All auth endpoints sit behind the strict rate limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/reset", get(auth::reset_page).post(auth::reset))
        .route("/otp", get(auth::otp_page).post(auth::otp_request))
        .route("/otp/verify", post(auth::otp_verify))
        .route("/oauth/start", get(auth::oauth_start))
        .route("/oauth/callback", get(auth::oauth_callback))
        .layer(auth_rate_limiter())
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/orders", get(account::orders))
        .route("/favorites", get(account::favorites))
        .route("/favorites/clear", post(account::clear_favorites))
        .route("/enrollments", get(account::enrollments))
        .route("/enrollments/clear", post(account::clear_enrollments))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog routes
        .merge(catalog_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Favorites toggle
        .route("/favorites/toggle", post(favorites::toggle))
        // Auth routes
        .nest("/auth", auth_routes())
        // Account routes
        .nest("/account", account_routes())
}
