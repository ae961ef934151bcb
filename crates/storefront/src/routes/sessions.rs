//! Session offering route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::content::types::SessionOffering;
use crate::filters;
use crate::state::AppState;

/// Session offering display data for templates.
#[derive(Clone)]
pub struct SessionCardView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
}

impl From<&SessionOffering> for SessionCardView {
    fn from(session: &SessionOffering) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            slug: session.slug.clone(),
            price: session.price,
            discount_price: session.discount_price,
            image_url: session.image_url.clone(),
            duration: session.duration.clone(),
            description: session.description.clone(),
        }
    }
}

/// Session listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "sessions/index.html")]
pub struct SessionsIndexTemplate {
    pub sessions: Vec<SessionCardView>,
    pub error: Option<String>,
}

/// Display the session offerings page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let (sessions, error) = match state.content().sessions().await {
        Ok(sessions) => (sessions.iter().map(SessionCardView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to load sessions: {e}");
            (Vec::new(), Some(e.user_message().to_string()))
        }
    };

    SessionsIndexTemplate { sessions, error }
}
