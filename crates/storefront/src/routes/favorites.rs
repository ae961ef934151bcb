//! Favorites toggle route handler.
//!
//! Catalog detail pages post here to add or remove a favorite; the handler
//! bounces back to the page the user came from.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::favorites::FavoriteRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Favorite toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub item_id: String,
    pub title: String,
    pub image_url: Option<String>,
    /// Where to land after toggling; must be a site-relative path.
    pub next: Option<String>,
}

/// Toggle a catalog item in the user's favorites.
#[instrument(skip(state, user, form), fields(user = %user.uid, item_id = %form.item_id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ToggleForm>,
) -> Result<Response, AppError> {
    let repo = FavoriteRepository::new(state.pool());

    if repo.contains(&user.uid, &form.item_id).await? {
        repo.remove(&user.uid, &form.item_id).await?;
    } else {
        repo.add(
            &user.uid,
            &form.item_id,
            &form.title,
            form.image_url.as_deref(),
        )
        .await?;
    }

    // Only bounce to site-relative paths
    let next = form
        .next
        .filter(|n| n.starts_with('/') && !n.starts_with("//"))
        .unwrap_or_else(|| "/account/favorites".to_string());

    Ok(Redirect::to(&next).into_response())
}
