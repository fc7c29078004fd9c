//! Provider registry for resolving providers by name or by URL.
//!
//! The [`ProviderRegistry`] is built once from an explicit list of provider
//! constructors and is read-only afterwards, so it can be shared across
//! tasks without locking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use super::entity::Entity;
use super::error::{Error, InvariantViolation, Result};
use super::provider::{Provider, ProviderFactory};

/// Providers of one entity kind, indexed by uppercased name and by host.
///
/// Registration order is preserved. It decides which provider wins when
/// several providers share a host and their path prefixes all match a URL.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
/// use metaforged::metadata::ProviderRegistry;
///
/// let registry = ProviderRegistry::build(factories, Some(Duration::from_secs(30)));
/// let provider = registry.resolve_by_name("reference")?;
/// ```
pub struct ProviderRegistry<E: Entity> {
    providers: Vec<Arc<dyn Provider<E>>>,
    by_name: HashMap<String, Arc<dyn Provider<E>>>,
    by_host: HashMap<String, Vec<Arc<dyn Provider<E>>>>,
}

impl<E: Entity> ProviderRegistry<E> {
    /// Construct every provider, apply `request_timeout` to those that accept
    /// one, and index them.
    ///
    /// A provider whose name collides (case-insensitively) with an earlier
    /// one is dropped with a warning.
    pub fn build(factories: Vec<ProviderFactory<E>>, request_timeout: Option<Duration>) -> Self {
        let mut registry = Self {
            providers: Vec::with_capacity(factories.len()),
            by_name: HashMap::new(),
            by_host: HashMap::new(),
        };

        for factory in factories {
            let mut provider = factory();
            if let (Some(timeout), Some(setter)) =
                (request_timeout, provider.timeout_configurable())
            {
                setter.set_request_timeout(timeout);
            }
            registry.insert(Arc::from(provider));
        }

        registry
    }

    fn insert(&mut self, provider: Arc<dyn Provider<E>>) {
        let key = provider.name().to_uppercase();
        if self.by_name.contains_key(&key) {
            warn!(
                kind = E::KIND,
                provider = provider.name(),
                "Duplicate provider name, keeping the first registration"
            );
            return;
        }

        let host = provider.url().host_str().unwrap_or_default().to_string();
        debug!(
            kind = E::KIND,
            provider = provider.name(),
            host = %host,
            "Registered provider"
        );

        self.by_name.insert(key, Arc::clone(&provider));
        self.by_host
            .entry(host)
            .or_default()
            .push(Arc::clone(&provider));
        self.providers.push(provider);
    }

    /// All providers in registration order.
    pub fn providers(&self) -> &[Arc<dyn Provider<E>>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Whether a provider is registered under `name` (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_uppercase())
    }

    /// Look up a provider by name, ignoring case.
    pub fn resolve_by_name(&self, name: &str) -> Result<Arc<dyn Provider<E>>> {
        self.by_name
            .get(&name.to_uppercase())
            .cloned()
            .ok_or_else(|| Error::ProviderNotFound(name.to_string()))
    }

    /// Find the provider that owns `raw_url`.
    ///
    /// The URL's host selects the candidates; the first candidate (in
    /// registration order) whose canonical path is a prefix of the URL's path
    /// wins.
    pub fn resolve_by_url(&self, raw_url: &str) -> Result<Arc<dyn Provider<E>>> {
        let url = Url::parse(raw_url).map_err(|e| Error::InvalidUrl(format!("{raw_url}: {e}")))?;
        self.resolve_parsed_url(&url)
    }

    pub(crate) fn resolve_parsed_url(&self, url: &Url) -> Result<Arc<dyn Provider<E>>> {
        let host = url.host_str().unwrap_or_default();
        self.by_host
            .get(host)
            .and_then(|candidates| {
                candidates
                    .iter()
                    .find(|p| url.path().starts_with(p.url().path()))
            })
            .cloned()
            .ok_or_else(|| Error::ProviderNotFound(url.to_string()))
    }

    /// Resolve a provider that is known to exist, such as one named by a
    /// stored record or a search result.
    ///
    /// A miss means the registry and its callers disagree, which is reported
    /// on the invariant channel instead of as [`Error::ProviderNotFound`].
    pub fn must_resolve_by_name(
        &self,
        name: &str,
    ) -> std::result::Result<Arc<dyn Provider<E>>, InvariantViolation> {
        self.resolve_by_name(name).map_err(|_| {
            InvariantViolation(format!("{} provider {name:?} is not registered", E::KIND))
        })
    }
}
