//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::state::AppState;

use super::programs::ProgramCardView;
use super::store::StoreItemView;

/// Number of cards featured per section on the home page.
const FEATURED_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub programs: Vec<ProgramCardView>,
    pub store_items: Vec<StoreItemView>,
    pub error: Option<String>,
}

/// Display the home page with featured programs and store items.
///
/// Either section failing collapses into one banner; the page still renders
/// whatever loaded.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let mut error = None;

    let programs = match state.content().programs(None).await {
        Ok(programs) => programs
            .iter()
            .take(FEATURED_COUNT)
            .map(ProgramCardView::from)
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to load featured programs: {e}");
            error = Some(e.user_message().to_string());
            Vec::new()
        }
    };

    let store_items = match state.content().store_items(None).await {
        Ok(items) => items
            .iter()
            .take(FEATURED_COUNT)
            .map(StoreItemView::from)
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to load featured store items: {e}");
            error.get_or_insert_with(|| e.user_message().to_string());
            Vec::new()
        }
    };

    HomeTemplate {
        programs,
        store_items,
        error,
    }
}
