//! Normalization boundary between raw CMS documents and typed view models.
//!
//! A document missing any required field (id, title, slug, usable price) is
//! dropped with a warning rather than surfaced half-formed. This is the only
//! place raw CMS JSON is interpreted.

use rust_decimal::Decimal;

use super::models::RawCatalogDoc;
use super::types::{Program, ProgramSummary, SessionOffering, StoreItem};

/// Image CDN base URL plus the ref-to-URL conversion.
#[derive(Debug, Clone)]
pub struct ImageBase {
    base_url: String,
}

impl ImageBase {
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self { base_url }
    }

    /// Convert an asset reference (`image-<id>-<dims>-<format>`) to a CDN URL.
    ///
    /// Returns `None` for references that don't follow the asset naming
    /// scheme; the document then renders without an image.
    #[must_use]
    pub fn url(&self, asset_ref: &str) -> Option<String> {
        let rest = asset_ref.strip_prefix("image-")?;
        let (name, format) = rest.rsplit_once('-')?;
        if name.is_empty() || format.is_empty() {
            return None;
        }
        Some(format!("{}/{}.{}?auto=format", self.base_url, name, format))
    }
}

/// Required-field extraction shared by all three document kinds.
fn base_fields(doc: &RawCatalogDoc) -> Option<(String, String, String, Decimal)> {
    let id = doc.id.clone()?;
    let title = doc.title.clone()?;
    let slug = doc.slug_str()?.to_owned();
    let price = decimal_price(doc.price)?;
    Some((id, title, slug, price))
}

fn decimal_price(price: Option<f64>) -> Option<Decimal> {
    price.and_then(|p| Decimal::try_from(p).ok())
}

fn image_url(doc: &RawCatalogDoc, images: &ImageBase) -> Option<String> {
    doc.image_ref().and_then(|r| images.url(r))
}

/// Normalize a raw document into a [`Program`].
#[must_use]
pub fn normalize_program(doc: RawCatalogDoc, images: &ImageBase) -> Option<Program> {
    let Some((id, title, slug, price)) = base_fields(&doc) else {
        tracing::warn!(id = ?doc.id, "Dropping program document with missing fields");
        return None;
    };

    Some(Program {
        summary: ProgramSummary {
            image_url: image_url(&doc, images),
            discount_price: decimal_price(doc.discount_price),
            id,
            title,
            slug,
            price,
            category: doc.category,
            duration: doc.duration,
            description: doc.description,
        },
        body: doc.body,
    })
}

/// Normalize a raw document into a [`SessionOffering`].
#[must_use]
pub fn normalize_session(doc: RawCatalogDoc, images: &ImageBase) -> Option<SessionOffering> {
    let Some((id, title, slug, price)) = base_fields(&doc) else {
        tracing::warn!(id = ?doc.id, "Dropping session document with missing fields");
        return None;
    };

    Some(SessionOffering {
        image_url: image_url(&doc, images),
        discount_price: decimal_price(doc.discount_price),
        id,
        title,
        slug,
        price,
        duration: doc.duration,
        description: doc.description,
    })
}

/// Normalize a raw document into a [`StoreItem`].
#[must_use]
pub fn normalize_store_item(doc: RawCatalogDoc, images: &ImageBase) -> Option<StoreItem> {
    let Some((id, title, slug, price)) = base_fields(&doc) else {
        tracing::warn!(id = ?doc.id, "Dropping store item document with missing fields");
        return None;
    };

    Some(StoreItem {
        image_url: image_url(&doc, images),
        discount_price: decimal_price(doc.discount_price),
        id,
        title,
        slug,
        price,
        category: doc.category,
        description: doc.description,
        body: doc.body,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn images() -> ImageBase {
        ImageBase::new("https://cdn.test/images/production".to_string())
    }

    fn raw(json: serde_json::Value) -> RawCatalogDoc {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_image_ref_to_url() {
        let url = images().url("image-abc123-800x600-jpg").unwrap();
        assert_eq!(
            url,
            "https://cdn.test/images/production/abc123-800x600.jpg?auto=format"
        );
    }

    #[test]
    fn test_image_ref_rejects_malformed() {
        assert!(images().url("file-abc123-pdf").is_none());
        assert!(images().url("image-").is_none());
    }

    #[test]
    fn test_normalize_full_program() {
        let doc = raw(serde_json::json!({
            "_id": "prg_1",
            "title": "Morning Flow",
            "slug": {"current": "morning-flow"},
            "price": 1999.0,
            "discountPrice": 1499.0,
            "image": {"asset": {"_ref": "image-abc-1200x800-webp"}},
            "category": "yoga",
            "duration": "6 weeks",
            "body": "# Welcome\nBreathe."
        }));

        let program = normalize_program(doc, &images()).unwrap();
        assert_eq!(program.summary.id, "prg_1");
        assert_eq!(program.summary.slug, "morning-flow");
        assert_eq!(program.summary.price, Decimal::from(1999));
        assert_eq!(program.summary.discount_price, Some(Decimal::from(1499)));
        assert_eq!(program.summary.category.as_deref(), Some("yoga"));
        assert!(program.summary.image_url.unwrap().contains("abc-1200x800"));
        assert!(program.body.unwrap().starts_with("# Welcome"));
    }

    #[test]
    fn test_normalize_drops_doc_missing_required_fields() {
        // No price
        let doc = raw(serde_json::json!({
            "_id": "prg_2",
            "title": "Untitled",
            "slug": {"current": "untitled"}
        }));
        assert!(normalize_program(doc, &images()).is_none());

        // No slug
        let doc = raw(serde_json::json!({
            "_id": "prg_3",
            "title": "No slug",
            "price": 100.0
        }));
        assert!(normalize_program(doc, &images()).is_none());
    }

    #[test]
    fn test_normalize_tolerates_missing_optionals() {
        let doc = raw(serde_json::json!({
            "_id": "itm_1",
            "title": "Copper Bottle",
            "slug": {"current": "copper-bottle"},
            "price": 850.0
        }));

        let item = normalize_store_item(doc, &images()).unwrap();
        assert!(item.discount_price.is_none());
        assert!(item.image_url.is_none());
        assert!(item.category.is_none());
        assert!(item.body.is_none());
    }

    #[test]
    fn test_normalize_session() {
        let doc = raw(serde_json::json!({
            "_id": "ses_1",
            "title": "Breathwork 1:1",
            "slug": {"current": "breathwork"},
            "price": 499.0,
            "duration": "45 min"
        }));

        let session = normalize_session(doc, &images()).unwrap();
        assert_eq!(session.duration.as_deref(), Some("45 min"));
    }
}
