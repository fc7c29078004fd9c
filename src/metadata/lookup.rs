//! Single-entity lookups by provider id or by page URL.
//!
//! Both entry points normalize an identifier, then share one cache-aside
//! sequence: identity providers are always fetched live and never cached;
//! every other provider is served from the store when `lazy` is set and the
//! stored record is valid, otherwise fetched, validated and written back.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use super::entity::Entity;
use super::error::{Error, Result};
use super::provider::{normalize_id, Provider};
use super::service::MetadataService;

impl<E: Entity> MetadataService<E> {
    /// Look up a record by provider name and raw identifier.
    ///
    /// A failed write-back fails the lookup even when the fetch succeeded.
    pub async fn get_info_by_id(&self, provider: &str, id: &str, lazy: bool) -> Result<E> {
        let provider = self.registry.resolve_by_name(provider)?;
        self.get_info_by_provider_id(provider.as_ref(), id, lazy)
            .await
    }

    /// Look up a record on an already resolved provider.
    pub async fn get_info_by_provider_id(
        &self,
        provider: &dyn Provider<E>,
        raw_id: &str,
        lazy: bool,
    ) -> Result<E> {
        let fetcher = provider
            .id_fetcher()
            .ok_or_else(|| Error::info_not_found(provider.name(), "fetch by id"))?;

        let id = normalize_id(provider, raw_id);
        if id.is_empty() {
            return Err(Error::InvalidId(raw_id.to_string()));
        }

        self.cache_aside(provider, &id, lazy, fetcher.fetch_by_id(&id))
            .await
    }

    /// Look up a record from one of a provider's page URLs.
    pub async fn get_info_by_url(&self, raw_url: &str, lazy: bool) -> Result<E> {
        let url =
            Url::parse(raw_url).map_err(|e| Error::InvalidUrl(format!("{raw_url}: {e}")))?;
        let provider: Arc<dyn Provider<E>> = self.registry.resolve_parsed_url(&url)?;

        let (Some(parser), Some(fetcher)) = (provider.url_parser(), provider.url_fetcher()) else {
            return Err(Error::info_not_found(provider.name(), "fetch by url"));
        };

        let id = parser.parse_id_from_url(&url)?;
        if id.is_empty() {
            return Err(Error::InvalidUrl(raw_url.to_string()));
        }

        self.cache_aside(provider.as_ref(), &id, lazy, fetcher.fetch_by_url(&url))
            .await
    }

    async fn cache_aside<F>(
        &self,
        provider: &dyn Provider<E>,
        id: &str,
        lazy: bool,
        fetch: F,
    ) -> Result<E>
    where
        F: Future<Output = anyhow::Result<E>> + Send,
    {
        let name = provider.name();

        if provider.is_identity_provider() {
            debug!(kind = E::KIND, provider = name, id, "Identity provider, fetching live");
            let info = fetch.await?;
            return ensure_valid(info, name, id);
        }

        if lazy {
            if let Some(info) = self.store.find_exact(name, id).await? {
                if info.is_valid() {
                    debug!(kind = E::KIND, provider = name, id, "Cache hit");
                    return Ok(info);
                }
                debug!(kind = E::KIND, provider = name, id, "Stored record incomplete, refetching");
            }
        }

        // Stored under the lookup key, whatever spelling upstream returned.
        let mut info = ensure_valid(fetch.await?, name, id)?;
        info.set_provider(name);
        info.set_id(id);
        self.store.upsert(&info).await?;
        debug!(kind = E::KIND, provider = name, id, "Fetched and stored");
        Ok(info)
    }
}

fn ensure_valid<E: Entity>(info: E, provider: &str, id: &str) -> Result<E> {
    if info.is_valid() {
        return Ok(info);
    }
    warn!(kind = E::KIND, provider, id, "Provider returned incomplete metadata");
    Err(Error::IncompleteMetadata {
        provider: provider.to_string(),
        id: id.to_string(),
    })
}
