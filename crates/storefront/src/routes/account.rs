//! Account route handlers.
//!
//! Read-only/paged views over the per-user collections, plus profile
//! updates through the identity provider. Clear-all on favorites and
//! enrollments reports partial failure explicitly instead of an alert-box
//! count.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sattva_core::Phone;

use crate::db::BulkDeleteOutcome;
use crate::db::enrollments::{EnrollmentRecord, EnrollmentRepository};
use crate::db::favorites::{FavoriteRecord, FavoriteRepository};
use crate::db::orders::{OrderRecord, OrderRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Orders shown per page.
const ORDERS_PER_PAGE: u32 = 10;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub label: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub updated: bool,
    pub error: Option<String>,
}

impl AccountTemplate {
    fn for_user(user: &CurrentUser) -> Self {
        Self {
            label: user.display_label().to_string(),
            email: user.email_str().map(String::from),
            display_name: user.display_name.clone(),
            phone: user.phone.clone(),
            updated: false,
            error: None,
        }
    }
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub gateway_order_id: String,
    pub amount: Decimal,
    pub status: &'static str,
    pub placed_on: String,
    pub item_summary: String,
}

impl From<&OrderRecord> for OrderView {
    fn from(order: &OrderRecord) -> Self {
        let item_summary = order
            .items
            .iter()
            .map(|line| format!("{} × {}", line.name, line.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            gateway_order_id: order.gateway_order_id.clone(),
            amount: order.amount,
            status: order.status.label(),
            placed_on: order.created_at.format("%d %b %Y").to_string(),
            item_summary,
        }
    }
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
    pub error: Option<String>,
}

/// Favorite display data for templates.
#[derive(Clone)]
pub struct FavoriteView {
    pub id: i64,
    pub item_id: String,
    pub title: String,
    pub image_url: Option<String>,
}

impl From<&FavoriteRecord> for FavoriteView {
    fn from(favorite: &FavoriteRecord) -> Self {
        Self {
            id: favorite.id.as_i64(),
            item_id: favorite.item_id.clone(),
            title: favorite.title.clone(),
            image_url: favorite.image_url.clone(),
        }
    }
}

/// Favorites template.
#[derive(Template, WebTemplate)]
#[template(path = "account/favorites.html")]
pub struct FavoritesTemplate {
    pub favorites: Vec<FavoriteView>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Enrollment display data for templates.
#[derive(Clone)]
pub struct EnrollmentView {
    pub id: i64,
    pub title: String,
    pub enrolled_on: String,
}

impl From<&EnrollmentRecord> for EnrollmentView {
    fn from(enrollment: &EnrollmentRecord) -> Self {
        Self {
            id: enrollment.id.as_i64(),
            title: enrollment.title.clone(),
            enrolled_on: enrollment.enrolled_at.format("%d %b %Y").to_string(),
        }
    }
}

/// Enrollments template.
#[derive(Template, WebTemplate)]
#[template(path = "account/enrollments.html")]
pub struct EnrollmentsTemplate {
    pub enrollments: Vec<EnrollmentView>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Wording for a clear-all outcome.
fn clear_notice(outcome: &BulkDeleteOutcome, what: &str) -> String {
    if outcome.failed.is_empty() {
        format!("Removed {} {what}.", outcome.deleted_count())
    } else {
        format!(
            "Removed {} {what}; {} could not be removed. Try again for the rest.",
            outcome.deleted_count(),
            outcome.failed_count()
        )
    }
}

/// Display the account overview.
#[instrument(skip(user), fields(user = %user.uid))]
pub async fn index(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    AccountTemplate::for_user(&user)
}

/// Update the user's profile through the identity provider.
#[instrument(skip(state, session, user, form), fields(user = %user.uid))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let display_name = form
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let phone = match form.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => match Phone::parse(raw) {
            Ok(phone) => Some(format!("+91{phone}")),
            Err(e) => {
                let mut template = AccountTemplate::for_user(&user);
                template.error = Some(e.to_string());
                return Ok(template.into_response());
            }
        },
        None => None,
    };

    match state
        .auth()
        .update_profile(&user.id_token, display_name, phone.as_deref())
        .await
    {
        Ok(provider) => {
            let refreshed = CurrentUser {
                uid: user.uid.clone(),
                email: user.email.clone(),
                display_name: provider.display_name.or(user.display_name),
                phone: provider.phone.or(user.phone),
                id_token: provider.id_token,
            };
            set_current_user(&session, &refreshed).await?;

            let mut template = AccountTemplate::for_user(&refreshed);
            template.updated = true;
            Ok(template.into_response())
        }
        Err(e) => {
            tracing::warn!("Profile update failed: {e}");
            let mut template = AccountTemplate::for_user(&user);
            template.error = Some("Could not update your profile. Please try again.".to_string());
            Ok(template.into_response())
        }
    }
}

/// Display the paged order history.
#[instrument(skip(state, user), fields(user = %user.uid))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let page = query.page.unwrap_or(1);

    match OrderRepository::new(state.pool())
        .list_for_user(&user.uid, page, ORDERS_PER_PAGE)
        .await
    {
        Ok(orders) => OrdersTemplate {
            has_more: orders.has_more(),
            orders: orders.items.iter().map(OrderView::from).collect(),
            page: orders.page,
            total_pages: orders.total_pages,
            error: None,
        },
        Err(e) => {
            tracing::error!("Failed to load orders: {e}");
            OrdersTemplate {
                orders: Vec::new(),
                page,
                total_pages: 0,
                has_more: false,
                error: Some("Could not load your orders. Please try again.".to_string()),
            }
        }
    }
}

/// Display favorites.
#[instrument(skip(state, user), fields(user = %user.uid))]
pub async fn favorites(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    match FavoriteRepository::new(state.pool()).list(&user.uid).await {
        Ok(favorites) => FavoritesTemplate {
            favorites: favorites.iter().map(FavoriteView::from).collect(),
            notice: None,
            error: None,
        },
        Err(e) => {
            tracing::error!("Failed to load favorites: {e}");
            FavoritesTemplate {
                favorites: Vec::new(),
                notice: None,
                error: Some("Could not load your favorites. Please try again.".to_string()),
            }
        }
    }
}

/// Clear all favorites in one batch delete.
#[instrument(skip(state, user), fields(user = %user.uid))]
pub async fn clear_favorites(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let repo = FavoriteRepository::new(state.pool());
    let ids: Vec<_> = repo.list(&user.uid).await?.iter().map(|f| f.id).collect();
    let outcome = repo.delete_many(&user.uid, &ids).await?;

    let remaining = repo.list(&user.uid).await?;
    Ok(FavoritesTemplate {
        favorites: remaining.iter().map(FavoriteView::from).collect(),
        notice: Some(clear_notice(&outcome, "favorites")),
        error: None,
    }
    .into_response())
}

/// Display enrollments.
#[instrument(skip(state, user), fields(user = %user.uid))]
pub async fn enrollments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    match EnrollmentRepository::new(state.pool()).list(&user.uid).await {
        Ok(enrollments) => EnrollmentsTemplate {
            enrollments: enrollments.iter().map(EnrollmentView::from).collect(),
            notice: None,
            error: None,
        },
        Err(e) => {
            tracing::error!("Failed to load enrollments: {e}");
            EnrollmentsTemplate {
                enrollments: Vec::new(),
                notice: None,
                error: Some("Could not load your enrollments. Please try again.".to_string()),
            }
        }
    }
}

/// Clear all enrollments in one batch delete.
#[instrument(skip(state, user), fields(user = %user.uid))]
pub async fn clear_enrollments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let repo = EnrollmentRepository::new(state.pool());
    let ids: Vec<_> = repo.list(&user.uid).await?.iter().map(|e| e.id).collect();
    let outcome = repo.delete_many(&user.uid, &ids).await?;

    let remaining = repo.list(&user.uid).await?;
    Ok(EnrollmentsTemplate {
        enrollments: remaining.iter().map(EnrollmentView::from).collect(),
        notice: Some(clear_notice(&outcome, "enrollments")),
        error: None,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_notice_clean() {
        let outcome = BulkDeleteOutcome {
            deleted: vec![1, 2, 3],
            failed: vec![],
        };
        assert_eq!(clear_notice(&outcome, "favorites"), "Removed 3 favorites.");
    }

    #[test]
    fn test_clear_notice_partial_failure_names_the_remainder() {
        let outcome = BulkDeleteOutcome {
            deleted: vec![1],
            failed: vec![2, 3],
        };
        let notice = clear_notice(&outcome, "favorites");
        assert!(notice.contains("Removed 1 favorites"));
        assert!(notice.contains("2 could not be removed"));
    }
}
