//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a rupee amount with the currency symbol.
///
/// Usage in templates: `{{ line.unit_price|inr }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn inr(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_inr(value))
}

/// Renders CMS markdown body text to HTML.
///
/// The output must be marked `|safe` in templates.
///
/// Usage in templates: `{{ body|markdown|safe }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn markdown(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(render_markdown(&value.to_string()))
}

/// Returns the content hash for main.css.
///
/// The hash is computed at build time from the CSS file content.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

fn format_inr(value: impl Display) -> String {
    format!("₹{value:.2}")
}

fn render_markdown(source: &str) -> String {
    comrak::markdown_to_html(source, &comrak::Options::default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_inr, render_markdown};

    #[test]
    fn test_inr_formats_two_decimals() {
        assert_eq!(format_inr(Decimal::new(199_900, 2)), "₹1999.00");
        assert_eq!(format_inr(Decimal::from(500)), "₹500.00");
    }

    #[test]
    fn test_markdown_renders_heading() {
        let out = render_markdown("# Welcome\n\nBreathe in.");
        assert!(out.contains("<h1>"));
        assert!(out.contains("Breathe in."));
    }
}
