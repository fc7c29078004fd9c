//! Per-entity metadata service.
//!
//! A [`MetadataService`] ties one provider registry to one record store. The
//! single-entity lookups live in [`super::lookup`], the keyword searches in
//! [`super::search`].

use std::sync::Arc;
use std::time::Duration;

use super::entity::Entity;
use super::provider::Provider;
use super::registry::ProviderRegistry;
use super::store::RecordStore;

/// Default per-provider deadline for multi-provider searches.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Lookups and searches for one entity kind.
pub struct MetadataService<E: Entity> {
    pub(super) registry: Arc<ProviderRegistry<E>>,
    pub(super) store: Arc<dyn RecordStore<E>>,
    pub(super) search_timeout: Duration,
}

impl<E: Entity> MetadataService<E> {
    pub fn new(registry: ProviderRegistry<E>, store: Arc<dyn RecordStore<E>>) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    /// Override the per-provider deadline used by multi-provider searches.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry<E> {
        &self.registry
    }

    /// Registered providers in registration order.
    pub fn providers(&self) -> &[Arc<dyn Provider<E>>] {
        self.registry.providers()
    }

    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }

    /// Whether a provider is registered under `name` (case-insensitive).
    pub fn is_provider(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
}

impl<E: Entity> Clone for MetadataService<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
            search_timeout: self.search_timeout,
        }
    }
}
