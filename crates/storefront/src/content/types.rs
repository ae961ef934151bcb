//! Typed catalog view models.
//!
//! The stable shapes the rest of the storefront works against. Required
//! fields (id, title, slug, price) are plain values; everything the CMS may
//! omit is an explicit `Option`.

use rust_decimal::Decimal;

/// A program as shown in listings and carts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSummary {
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

/// A program detail document, including the rich-text body (markdown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub summary: ProgramSummary,
    pub body: Option<String>,
}

/// A bookable session offering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOffering {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
}

/// A physical store item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreItem {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}
