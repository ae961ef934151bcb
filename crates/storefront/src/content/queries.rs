//! Catalog query strings.
//!
//! The CMS speaks a parameterized projection query language; parameters are
//! bound as `$name` values on the query string. Every query projects the same
//! flat field set so one raw document shape covers the whole catalog.

/// All programs, newest first.
pub const PROGRAMS: &str = r#"*[_type == "program"] | order(_createdAt desc) {_id, title, slug, price, discountPrice, image, "category": category->slug.current, duration, description}"#;

/// Programs in a category.
pub const PROGRAMS_BY_CATEGORY: &str = r#"*[_type == "program" && category->slug.current == $category] | order(_createdAt desc) {_id, title, slug, price, discountPrice, image, "category": category->slug.current, duration, description}"#;

/// One program by slug, with the rich-text body.
pub const PROGRAM_BY_SLUG: &str = r#"*[_type == "program" && slug.current == $slug][0] {_id, title, slug, price, discountPrice, image, "category": category->slug.current, duration, description, body}"#;

/// All bookable sessions.
pub const SESSIONS: &str = r#"*[_type == "sessionOffering"] | order(_createdAt desc) {_id, title, slug, price, discountPrice, image, duration, description}"#;

/// All store items, newest first.
pub const STORE_ITEMS: &str = r#"*[_type == "storeItem"] | order(_createdAt desc) {_id, title, slug, price, discountPrice, image, "category": category->slug.current, description}"#;

/// Store items in a category.
pub const STORE_ITEMS_BY_CATEGORY: &str = r#"*[_type == "storeItem" && category->slug.current == $category] | order(_createdAt desc) {_id, title, slug, price, discountPrice, image, "category": category->slug.current, description}"#;

/// One store item by slug, with the rich-text body.
pub const STORE_ITEM_BY_SLUG: &str = r#"*[_type == "storeItem" && slug.current == $slug][0] {_id, title, slug, price, discountPrice, image, "category": category->slug.current, description, body}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_share_projection_fields() {
        // Every query must project the fields the normalizer relies on.
        for query in [
            PROGRAMS,
            PROGRAMS_BY_CATEGORY,
            PROGRAM_BY_SLUG,
            SESSIONS,
            STORE_ITEMS,
            STORE_ITEMS_BY_CATEGORY,
            STORE_ITEM_BY_SLUG,
        ] {
            assert!(query.contains("_id"), "missing _id in {query}");
            assert!(query.contains("title"), "missing title in {query}");
            assert!(query.contains("slug"), "missing slug in {query}");
            assert!(query.contains("price"), "missing price in {query}");
            assert!(query.contains("discountPrice"), "missing discountPrice in {query}");
        }
    }
}
