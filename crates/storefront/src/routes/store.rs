//! Store item route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::content::types::StoreItem;
use crate::db::favorites::FavoriteRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Store item display data for templates.
#[derive(Clone)]
pub struct StoreItemView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl From<&StoreItem> for StoreItemView {
    fn from(item: &StoreItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            slug: item.slug.clone(),
            price: item.price,
            discount_price: item.discount_price,
            image_url: item.image_url.clone(),
            category: item.category.clone(),
            description: item.description.clone(),
        }
    }
}

/// Category filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Store listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/index.html")]
pub struct StoreIndexTemplate {
    pub items: Vec<StoreItemView>,
    pub category: Option<String>,
    pub error: Option<String>,
}

/// Store item detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/show.html")]
pub struct StoreShowTemplate {
    pub item: StoreItemView,
    pub body: Option<String>,
    pub logged_in: bool,
    pub favorited: bool,
}

/// Display store listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let (items, error) = match state.content().store_items(query.category.as_deref()).await {
        Ok(items) => (items.iter().map(StoreItemView::from).collect(), None),
        Err(e) => {
            tracing::warn!("Failed to load store items: {e}");
            (Vec::new(), Some(e.user_message().to_string()))
        }
    };

    StoreIndexTemplate {
        items,
        category: query.category,
        error,
    }
}

/// Display store item detail page.
#[instrument(skip(state, auth))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let item = state.content().store_item_by_slug(&slug).await?;

    let favorited = match &auth {
        Some(user) => FavoriteRepository::new(state.pool())
            .contains(&user.uid, &item.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to check favorite state: {e}");
                false
            }),
        None => false,
    };

    let body = item.body.clone();
    Ok(StoreShowTemplate {
        item: StoreItemView::from(&item),
        body,
        logged_in: auth.is_some(),
        favorited,
    })
}
