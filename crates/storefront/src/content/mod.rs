//! Headless CMS client for the wellness catalog.
//!
//! # Architecture
//!
//! - The CMS is source of truth for programs, sessions, and store items -
//!   no local sync, direct query-API calls over HTTPS
//! - Read-only: this client never mutates content
//! - In-memory caching via `moka` for query responses (5 minute TTL)
//! - Raw documents (fields may be absent) are converted to typed view models
//!   at a single normalization boundary; nothing downstream touches raw JSON
//!
//! The query fetch helper is the one network call in the repo with a
//! client-enforced timeout; it reports "timed out" and "offline" as distinct
//! errors so catalog pages can word the banner accordingly.

mod cache;
pub mod models;
pub mod normalize;
pub mod queries;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CmsConfig;

use cache::CacheValue;
use normalize::{ImageBase, normalize_program, normalize_session, normalize_store_item};
use types::{Program, ProgramSummary, SessionOffering, StoreItem};

/// Wall-clock budget for one catalog query.
const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Errors that can occur when querying the CMS.
#[derive(Debug, Error)]
pub enum CmsError {
    /// The query did not complete within the fetch budget.
    #[error("CMS query timed out")]
    Timeout,

    /// The CMS endpoint was unreachable (DNS, connect, TLS).
    #[error("CMS unreachable")]
    Offline,

    /// Any other HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The CMS returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CmsError {
    /// The banner text catalog pages show when a fetch fails.
    ///
    /// Timed-out and offline get distinct wording; everything else collapses
    /// into a generic retry message.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout => "The catalog took too long to respond. Please try again.",
            Self::Offline => "Could not reach the catalog. Check your connection and try again.",
            Self::NotFound(_) => "That item is no longer available.",
            _ => "Could not load content. Please try again later.",
        }
    }
}

impl From<reqwest::Error> for CmsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Offline
        } else {
            Self::Http(e)
        }
    }
}

/// Wrapper around the CMS query response envelope.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Option<serde_json::Value>,
}

/// Client for the headless CMS query API.
///
/// Provides typed access to programs, sessions, and store items.
/// Responses are cached for 5 minutes.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ContentClientInner>,
}

struct ContentClientInner {
    client: reqwest::Client,
    endpoint: String,
    read_token: Option<String>,
    images: ImageBase,
    cache: Cache<String, CacheValue>,
}

impl ContentClient {
    /// Create a new CMS query client.
    #[must_use]
    pub fn new(config: &CmsConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let endpoint = format!(
            "{}/{}/query/{}",
            config.api_base_url, config.api_version, config.dataset
        );

        Self {
            inner: Arc::new(ContentClientInner {
                client: reqwest::Client::new(),
                endpoint,
                read_token: config
                    .read_token
                    .as_ref()
                    .map(|t| t.expose_secret().to_string()),
                images: ImageBase::new(config.image_base_url.clone()),
                cache,
            }),
        }
    }

    /// Execute a catalog query with bound parameters.
    ///
    /// Parameters are passed as JSON-encoded `$name` query-string values the
    /// way the CMS expects them.
    async fn execute(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, CmsError> {
        let mut url = format!(
            "{}?query={}",
            self.inner.endpoint,
            urlencoding::encode(query)
        );
        for (name, value) in params {
            let json_value = serde_json::to_string(value)?;
            url.push_str(&format!("&%24{}={}", name, urlencoding::encode(&json_value)));
        }

        let mut request = self.inner.client.get(&url).timeout(FETCH_TIMEOUT);
        if let Some(token) = &self.inner.read_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %message.chars().take(500).collect::<String>(),
                "CMS returned non-success status"
            );
            return Err(CmsError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let envelope: QueryResponse = response.json().await?;
        Ok(envelope.result.unwrap_or(serde_json::Value::Null))
    }

    // =========================================================================
    // Programs
    // =========================================================================

    /// Get all programs, optionally filtered by category slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn programs(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<ProgramSummary>, CmsError> {
        let cache_key = format!("programs:{}", category.unwrap_or(""));

        if let Some(CacheValue::Programs(programs)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for programs");
            return Ok(programs);
        }

        let result = match category {
            Some(slug) => {
                self.execute(queries::PROGRAMS_BY_CATEGORY, &[("category", slug)])
                    .await?
            }
            None => self.execute(queries::PROGRAMS, &[]).await?,
        };

        let raw: Vec<models::RawCatalogDoc> = serde_json::from_value(result).unwrap_or_default();
        let programs: Vec<ProgramSummary> = raw
            .into_iter()
            .filter_map(|doc| normalize_program(doc, &self.inner.images))
            .map(|p| p.summary)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Programs(programs.clone()))
            .await;

        Ok(programs)
    }

    /// Get a program by its slug, including the rich-text body.
    ///
    /// # Errors
    ///
    /// Returns an error if the program is not found or the query fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn program_by_slug(&self, slug: &str) -> Result<Program, CmsError> {
        let cache_key = format!("program:{slug}");

        if let Some(CacheValue::Program(program)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for program");
            return Ok(*program);
        }

        let result = self
            .execute(queries::PROGRAM_BY_SLUG, &[("slug", slug)])
            .await?;

        if result.is_null() {
            return Err(CmsError::NotFound(format!("Program not found: {slug}")));
        }

        let raw: models::RawCatalogDoc = serde_json::from_value(result)?;
        let program = normalize_program(raw, &self.inner.images)
            .ok_or_else(|| CmsError::NotFound(format!("Program not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Program(Box::new(program.clone())))
            .await;

        Ok(program)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Get all bookable sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn sessions(&self) -> Result<Vec<SessionOffering>, CmsError> {
        let cache_key = "sessions".to_string();

        if let Some(CacheValue::Sessions(sessions)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for sessions");
            return Ok(sessions);
        }

        let result = self.execute(queries::SESSIONS, &[]).await?;

        let raw: Vec<models::RawCatalogDoc> = serde_json::from_value(result).unwrap_or_default();
        let sessions: Vec<SessionOffering> = raw
            .into_iter()
            .filter_map(|doc| normalize_session(doc, &self.inner.images))
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Sessions(sessions.clone()))
            .await;

        Ok(sessions)
    }

    // =========================================================================
    // Store items
    // =========================================================================

    /// Get all store items, optionally filtered by category slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn store_items(&self, category: Option<&str>) -> Result<Vec<StoreItem>, CmsError> {
        let cache_key = format!("store_items:{}", category.unwrap_or(""));

        if let Some(CacheValue::StoreItems(items)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for store items");
            return Ok(items);
        }

        let result = match category {
            Some(slug) => {
                self.execute(queries::STORE_ITEMS_BY_CATEGORY, &[("category", slug)])
                    .await?
            }
            None => self.execute(queries::STORE_ITEMS, &[]).await?,
        };

        let raw: Vec<models::RawCatalogDoc> = serde_json::from_value(result).unwrap_or_default();
        let items: Vec<StoreItem> = raw
            .into_iter()
            .filter_map(|doc| normalize_store_item(doc, &self.inner.images))
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::StoreItems(items.clone()))
            .await;

        Ok(items)
    }

    /// Get a store item by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not found or the query fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn store_item_by_slug(&self, slug: &str) -> Result<StoreItem, CmsError> {
        let cache_key = format!("store_item:{slug}");

        if let Some(CacheValue::StoreItem(item)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for store item");
            return Ok(*item);
        }

        let result = self
            .execute(queries::STORE_ITEM_BY_SLUG, &[("slug", slug)])
            .await?;

        if result.is_null() {
            return Err(CmsError::NotFound(format!("Store item not found: {slug}")));
        }

        let raw: models::RawCatalogDoc = serde_json::from_value(result)?;
        let item = normalize_store_item(raw, &self.inner.images)
            .ok_or_else(|| CmsError::NotFound(format!("Store item not found: {slug}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::StoreItem(Box::new(item.clone())))
            .await;

        Ok(item)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cms_error_display() {
        let err = CmsError::NotFound("program: morning-flow".to_string());
        assert_eq!(err.to_string(), "Not found: program: morning-flow");

        assert_eq!(CmsError::Timeout.to_string(), "CMS query timed out");
        assert_eq!(CmsError::Offline.to_string(), "CMS unreachable");
    }

    #[test]
    fn test_api_error_display() {
        let err = CmsError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
    }

    #[test]
    fn test_user_message_distinguishes_timeout_from_offline() {
        assert_ne!(
            CmsError::Timeout.user_message(),
            CmsError::Offline.user_message()
        );
        assert!(CmsError::Timeout.user_message().contains("too long"));
        assert!(CmsError::Offline.user_message().contains("connection"));
    }
}
