//! Cart route handlers.
//!
//! Plain form posts with redirects: mutations land back on the cart page,
//! which doubles as the opened drawer. The count badge fragment stays
//! available for progressively-enhanced deployments.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{Cart, CartItem, CartLine, store};
use crate::filters;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub image_url: Option<String>,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.effective_unit_price(),
            line_total: line.line_total(),
            image_url: line.image_url.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: Decimal,
    pub count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: cart.total(),
            count: cart.count(),
        }
    }
}

/// Add to cart form data.
///
/// Catalog pages post the item fields they rendered with, the same data the
/// cart would otherwise have to re-fetch.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = store::load(&session).await;
    CartShowTemplate {
        cart: CartView::from(&cart),
    }
}

/// Add an item to the cart, then open the cart page.
///
/// An existing line with the same id has its quantity incremented.
#[instrument(skip(session, form), fields(item_id = %form.id))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Response {
    let mut cart = store::load(&session).await;

    let quantity = form.quantity.unwrap_or(1);
    cart.add_line(
        CartItem {
            id: form.id,
            name: form.name,
            unit_price: form.unit_price,
            discount_price: form.discount_price,
            image_url: form.image_url,
            category: form.category,
        },
        quantity,
    );

    if let Err(e) = store::save(&session, &cart).await {
        tracing::error!("Failed to persist cart: {e}");
    }

    // add_line opened the drawer; the cart page is the drawer
    Redirect::to("/cart").into_response()
}

/// Overwrite a line's quantity. Zero removes the line.
#[instrument(skip(session, form), fields(item_id = %form.id, quantity = form.quantity))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut cart = store::load(&session).await;
    cart.set_quantity(&form.id, form.quantity);

    if let Err(e) = store::save(&session, &cart).await {
        tracing::error!("Failed to persist cart: {e}");
    }

    Redirect::to("/cart").into_response()
}

/// Remove a line from the cart.
#[instrument(skip(session, form), fields(item_id = %form.id))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut cart = store::load(&session).await;
    cart.remove_line(&form.id);

    if let Err(e) = store::save(&session, &cart).await {
        tracing::error!("Failed to persist cart: {e}");
    }

    Redirect::to("/cart").into_response()
}

/// Empty the cart and drop the persisted snapshot.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    if let Err(e) = store::clear(&session).await {
        tracing::error!("Failed to clear cart: {e}");
    }

    Redirect::to("/cart").into_response()
}

/// Cart count badge fragment.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = store::load(&session).await;
    CartCountTemplate { count: cart.count() }
}
