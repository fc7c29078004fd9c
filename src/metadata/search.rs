//! Keyword search against a single provider or fanned out across all of them.

use std::cmp::Reverse;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::entity::{Entity, SearchRecord};
use super::error::{Error, InvariantViolation, Result};
use super::provider::Provider;
use super::service::MetadataService;
use super::store::RecordStore;

/// Search one provider.
///
/// In lazy mode, a provider that also fetches by id is first asked through
/// the store: a valid record whose id or name key equals `keyword` is
/// returned as the only result without a network call.
pub(crate) async fn search_provider<E: Entity>(
    store: &dyn RecordStore<E>,
    provider: &dyn Provider<E>,
    keyword: &str,
    lazy: bool,
) -> Result<Vec<E::SearchResult>> {
    let name = provider.name();
    let searcher = provider
        .searcher()
        .ok_or_else(|| Error::info_not_found(name, "search"))?;

    if lazy && !provider.is_identity_provider() && provider.id_fetcher().is_some() {
        if let Some(info) = store.find_by_name_or_id(name, keyword).await? {
            if info.is_valid() {
                debug!(kind = E::KIND, provider = name, keyword, "Search served from store");
                return Ok(vec![info.to_search_result()]);
            }
        }
    }

    Ok(searcher.search(keyword).await?)
}

impl<E: Entity> MetadataService<E> {
    /// Search a single provider by name.
    pub async fn search(
        &self,
        keyword: &str,
        provider: &str,
        lazy: bool,
    ) -> Result<Vec<E::SearchResult>> {
        let provider = self.registry.resolve_by_name(provider)?;
        search_provider(self.store.as_ref(), provider.as_ref(), keyword, lazy).await
    }

    /// Search every provider that can search, with no external cancellation.
    pub async fn search_all(
        &self,
        keyword: &str,
    ) -> std::result::Result<Vec<E::SearchResult>, InvariantViolation> {
        self.search_all_with(keyword, CancellationToken::new())
            .await
    }

    /// Search every provider that can search, in parallel.
    ///
    /// Each provider runs in its own task bounded by the service's search
    /// deadline and by `cancel`. A provider that fails, times out, or is
    /// cancelled contributes nothing. Only valid results are kept, and the
    /// merged list is stably sorted by descending provider priority.
    ///
    /// The only error is an [`InvariantViolation`]: a result naming a
    /// provider that is not a registered searcher.
    pub async fn search_all_with(
        &self,
        keyword: &str,
        cancel: CancellationToken,
    ) -> std::result::Result<Vec<E::SearchResult>, InvariantViolation> {
        let deadline = self.search_timeout;
        let mut tasks = JoinSet::new();

        for provider in self.registry.providers() {
            if provider.searcher().is_none() {
                continue;
            }
            let provider = Arc::clone(provider);
            let store = Arc::clone(&self.store);
            let keyword = keyword.to_string();
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let name = provider.name().to_string();
                let search = search_provider(store.as_ref(), provider.as_ref(), &keyword, true);
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(Error::Cancelled(name.clone())),
                    res = tokio::time::timeout(deadline, search) => res.unwrap_or_else(|_| {
                        Err(Error::Timeout {
                            provider: name.clone(),
                            after: deadline,
                        })
                    }),
                };
                (name, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(found))) => {
                    let total = found.len();
                    let before = results.len();
                    results.extend(found.into_iter().filter(|r| r.is_valid()));
                    debug!(
                        kind = E::KIND,
                        provider = %name,
                        total,
                        kept = results.len() - before,
                        "Provider search finished"
                    );
                }
                Ok((name, Err(e))) => {
                    warn!(kind = E::KIND, provider = %name, error = %e, "Provider search failed");
                }
                Err(e) => {
                    warn!(kind = E::KIND, error = %e, "Provider search task aborted");
                }
            }
        }

        let mut ranked = Vec::with_capacity(results.len());
        for result in results {
            let provider = self.registry.must_resolve_by_name(result.provider())?;
            let priority = provider.searcher().map(|s| s.priority()).ok_or_else(|| {
                InvariantViolation(format!(
                    "{} provider {:?} returned search results but cannot search",
                    E::KIND,
                    provider.name()
                ))
            })?;
            ranked.push((priority, result));
        }
        ranked.sort_by_key(|(priority, _)| Reverse(*priority));

        info!(kind = E::KIND, keyword, results = ranked.len(), "Search completed");
        Ok(ranked.into_iter().map(|(_, result)| result).collect())
    }
}
