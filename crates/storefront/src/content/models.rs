//! Raw CMS document shapes.
//!
//! Every field is optional because the CMS never guarantees a projection is
//! fully populated. These types exist only to feed the normalizer; nothing
//! outside the `content` module sees them.

use serde::Deserialize;

/// A raw catalog document (program, session offering, or store item).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogDoc {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<RawSlug>,
    pub price: Option<f64>,
    #[serde(rename = "discountPrice")]
    pub discount_price: Option<f64>,
    pub image: Option<RawImage>,
    pub category: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub body: Option<String>,
}

/// Slug wrapper as the CMS stores it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSlug {
    pub current: Option<String>,
}

/// Image reference wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct RawImage {
    pub asset: Option<RawAssetRef>,
}

/// Asset reference (`image-<id>-<dims>-<format>`).
#[derive(Debug, Clone, Deserialize)]
pub struct RawAssetRef {
    #[serde(rename = "_ref")]
    pub reference: Option<String>,
}

impl RawCatalogDoc {
    /// The image asset reference, if the document carries one.
    #[must_use]
    pub fn image_ref(&self) -> Option<&str> {
        self.image
            .as_ref()?
            .asset
            .as_ref()?
            .reference
            .as_deref()
    }

    /// The slug string, if the document carries one.
    #[must_use]
    pub fn slug_str(&self) -> Option<&str> {
        self.slug.as_ref()?.current.as_deref()
    }
}
