//! Program route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::content::types::ProgramSummary;
use crate::db::favorites::FavoriteRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Program display data for templates.
#[derive(Clone)]
pub struct ProgramCardView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
}

impl From<&ProgramSummary> for ProgramCardView {
    fn from(program: &ProgramSummary) -> Self {
        Self {
            id: program.id.clone(),
            title: program.title.clone(),
            slug: program.slug.clone(),
            price: program.price,
            discount_price: program.discount_price,
            image_url: program.image_url.clone(),
            category: program.category.clone(),
            duration: program.duration.clone(),
            description: program.description.clone(),
        }
    }
}

/// Category filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Program listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "programs/index.html")]
pub struct ProgramsIndexTemplate {
    pub programs: Vec<ProgramCardView>,
    pub category: Option<String>,
    pub error: Option<String>,
}

/// Program detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "programs/show.html")]
pub struct ProgramShowTemplate {
    pub program: ProgramCardView,
    pub body: Option<String>,
    pub logged_in: bool,
    pub favorited: bool,
}

/// Display program listing page.
///
/// A fetch failure renders the listing empty with an inline error banner and
/// a reload link; there is no automatic retry.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let (programs, error) = match state.content().programs(query.category.as_deref()).await {
        Ok(programs) => (programs.iter().map(ProgramCardView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to load programs: {e}");
            (Vec::new(), Some(e.user_message().to_string()))
        }
    };

    ProgramsIndexTemplate {
        programs,
        category: query.category,
        error,
    }
}

/// Display program detail page.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let program = state.content().program_by_slug(&slug).await?;

    let favorited = match &auth {
        Some(user) => FavoriteRepository::new(state.pool())
            .contains(&user.uid, &program.summary.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to check favorite state: {e}");
                false
            }),
        None => false,
    };

    Ok(ProgramShowTemplate {
        program: ProgramCardView::from(&program.summary),
        body: program.body,
        logged_in: auth.is_some(),
        favorited,
    })
}
