//! Provider contract and capability traits.
//!
//! A provider is identified by a name and a canonical base URL. Everything
//! else it can do is an optional capability, declared by overriding the
//! matching accessor on [`Provider`] to return `Some(self)`. The registry and
//! the lookup code check those accessors before taking a code path.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::entity::Entity;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Fetch a single record by its normalized identifier.
#[async_trait]
pub trait IdFetcher<E: Entity>: Send + Sync {
    async fn fetch_by_id(&self, id: &str) -> anyhow::Result<E>;
}

/// Fetch a single record from one of the provider's own page URLs.
#[async_trait]
pub trait UrlFetcher<E: Entity>: Send + Sync {
    async fn fetch_by_url(&self, url: &Url) -> anyhow::Result<E>;
}

/// Keyword search.
#[async_trait]
pub trait Searcher<E: Entity>: Send + Sync {
    /// Ordering weight for merged multi-provider results; higher sorts first.
    fn priority(&self) -> i64;

    async fn search(&self, keyword: &str) -> anyhow::Result<Vec<E::SearchResult>>;
}

/// Canonicalize a raw identifier. An empty return value marks it invalid.
pub trait IdNormalizer: Send + Sync {
    fn normalize_id(&self, raw: &str) -> String;
}

/// Extract the identifier from one of the provider's page URLs.
pub trait UrlParser: Send + Sync {
    fn parse_id_from_url(&self, url: &Url) -> anyhow::Result<String>;
}

/// Providers whose HTTP client accepts a per-request timeout.
pub trait TimeoutConfigurable: Send + Sync {
    fn set_request_timeout(&mut self, timeout: Duration);
}

/// Providers that must download their own resources (images, previews)
/// through their own client, e.g. because the site checks cookies.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<reqwest::Response>;
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// A metadata source for one entity kind.
///
/// Providers are built once, configured by the registry, then shared
/// read-only behind an `Arc` for the rest of the process.
pub trait Provider<E: Entity>: Send + Sync {
    /// Stable provider name; also the provider column of stored records.
    fn name(&self) -> &str;

    /// Canonical base URL. Its host and path prefix route URL lookups.
    fn url(&self) -> &Url;

    /// Identity providers serve externally versioned reference data and are
    /// always fetched live, never cached.
    fn is_identity_provider(&self) -> bool {
        false
    }

    fn id_fetcher(&self) -> Option<&dyn IdFetcher<E>> {
        None
    }

    fn url_fetcher(&self) -> Option<&dyn UrlFetcher<E>> {
        None
    }

    fn searcher(&self) -> Option<&dyn Searcher<E>> {
        None
    }

    fn id_normalizer(&self) -> Option<&dyn IdNormalizer> {
        None
    }

    fn url_parser(&self) -> Option<&dyn UrlParser> {
        None
    }

    fn resource_fetcher(&self) -> Option<&dyn ResourceFetcher> {
        None
    }

    /// Only reachable while the registry owns the provider exclusively.
    fn timeout_configurable(&mut self) -> Option<&mut dyn TimeoutConfigurable> {
        None
    }
}

/// Constructor for one provider, invoked once when the registry is built.
pub type ProviderFactory<E> = Box<dyn FnOnce() -> Box<dyn Provider<E>> + Send>;

/// Normalize `raw` with the provider's rule, or trim it when the provider
/// declares none.
pub fn normalize_id<E: Entity>(provider: &dyn Provider<E>, raw: &str) -> String {
    match provider.id_normalizer() {
        Some(normalizer) => normalizer.normalize_id(raw),
        None => raw.trim().to_string(),
    }
}
