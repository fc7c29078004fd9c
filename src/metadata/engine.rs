//! Engine facade over the actor and movie services.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use metaforged_common::{ActorInfo, MovieInfo};
use metaforged_db::pool::init_pool;
use tracing::{debug, info};

use crate::config::{Config, EngineConfig};

use super::entity::Entity;
use super::provider::{Provider, ProviderFactory};
use super::providers::factories_from_config;
use super::registry::ProviderRegistry;
use super::service::{MetadataService, DEFAULT_SEARCH_TIMEOUT};
use super::store::{RecordStore, SqliteRecordStore};

/// Timeouts shared by both entity kinds.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Applied to every provider that accepts a request timeout.
    pub request_timeout: Option<Duration>,
    /// Per-provider deadline for multi-provider searches.
    pub search_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

impl From<&EngineConfig> for EngineOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(config.request_timeout_secs)),
            search_timeout: Duration::from_secs(config.search_timeout_secs),
        }
    }
}

/// Actor and movie metadata lookups behind one handle.
///
/// # Example
///
/// ```rust,ignore
/// let engine = Engine::from_config(&config)?;
/// let movie = engine.movies().get_info_by_id("catalog", "ABC-123", true).await?;
/// let actors = engine.actors().search_all("jane").await?;
/// ```
pub struct Engine {
    actors: MetadataService<ActorInfo>,
    movies: MetadataService<MovieInfo>,
    http: reqwest::Client,
}

impl Engine {
    pub fn new(
        actors: MetadataService<ActorInfo>,
        movies: MetadataService<MovieInfo>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            actors,
            movies,
            http,
        }
    }

    /// Build both registries and share one store between them.
    pub fn with_store<S>(
        store: Arc<S>,
        actor_providers: Vec<ProviderFactory<ActorInfo>>,
        movie_providers: Vec<ProviderFactory<MovieInfo>>,
        options: &EngineOptions,
    ) -> anyhow::Result<Self>
    where
        S: RecordStore<ActorInfo> + RecordStore<MovieInfo> + 'static,
    {
        let actor_store: Arc<dyn RecordStore<ActorInfo>> = store.clone();
        let movie_store: Arc<dyn RecordStore<MovieInfo>> = store;

        let actors = MetadataService::new(
            ProviderRegistry::build(actor_providers, options.request_timeout),
            actor_store,
        )
        .with_search_timeout(options.search_timeout);
        let movies = MetadataService::new(
            ProviderRegistry::build(movie_providers, options.request_timeout),
            movie_store,
        )
        .with_search_timeout(options.search_timeout);

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = options.request_timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().context("failed to build HTTP client")?;

        info!(
            actor_providers = actors.registry().len(),
            movie_providers = movies.registry().len(),
            "Engine ready"
        );
        Ok(Self::new(actors, movies, http))
    }

    /// Open the configured database and build every configured provider.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = init_pool(&config.database.path)
            .with_context(|| format!("Failed to open database: {}", config.database.path))?;
        let store = Arc::new(SqliteRecordStore::new(pool));

        Self::with_store(
            store,
            factories_from_config(&config.providers)?,
            factories_from_config(&config.providers)?,
            &EngineOptions::from(&config.engine),
        )
    }

    pub fn actors(&self) -> &MetadataService<ActorInfo> {
        &self.actors
    }

    pub fn movies(&self) -> &MetadataService<MovieInfo> {
        &self.movies
    }

    /// Download a resource (image, preview, ...) belonging to `provider`.
    ///
    /// Providers that expose a resource fetcher serve their own resources;
    /// everything else goes through the shared client.
    pub async fn fetch<E: Entity>(
        &self,
        url: &str,
        provider: &dyn Provider<E>,
    ) -> anyhow::Result<reqwest::Response> {
        if let Some(fetcher) = provider.resource_fetcher() {
            debug!(provider = provider.name(), url, "Fetching through provider");
            return fetcher.fetch(url).await;
        }

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("request failed: {url}"))?;
        resp.error_for_status()
            .with_context(|| format!("request returned error: {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::providers::ReferenceIndexProvider;
    use metaforged_db::pool::init_memory_pool;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine() -> Engine {
        let store = Arc::new(SqliteRecordStore::new(init_memory_pool().unwrap()));
        Engine::with_store(store, Vec::new(), Vec::new(), &EngineOptions::default())
            .unwrap()
    }

    #[test]
    fn options_follow_config() {
        let options = EngineOptions::from(&EngineConfig {
            request_timeout_secs: 5,
            search_timeout_secs: 9,
        });
        assert_eq!(options.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.search_timeout, Duration::from_secs(9));
    }

    #[tokio::test]
    async fn engine_applies_search_timeout() {
        let store = Arc::new(SqliteRecordStore::new(init_memory_pool().unwrap()));
        let options = EngineOptions {
            request_timeout: None,
            search_timeout: Duration::from_secs(3),
        };
        let engine = Engine::with_store(store, Vec::new(), Vec::new(), &options).unwrap();
        assert_eq!(engine.actors().search_timeout(), Duration::from_secs(3));
        assert_eq!(engine.movies().search_timeout(), Duration::from_secs(3));
        assert!(engine.movies().registry().is_empty());
    }

    #[tokio::test]
    async fn fetch_uses_shared_client_without_resource_fetcher() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/covers/1.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let index = ReferenceIndexProvider::<MovieInfo>::new(
            "index",
            Url::parse("https://index.example/").unwrap(),
            Vec::new(),
        );
        let engine = engine();

        let resp = engine
            .fetch::<MovieInfo>(&format!("{}/covers/1.jpg", server.uri()), &index)
            .await
            .unwrap();
        assert_eq!(resp.bytes().await.unwrap().as_ref(), b"jpeg");
    }

    #[tokio::test]
    async fn fetch_reports_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let index = ReferenceIndexProvider::<MovieInfo>::new(
            "index",
            Url::parse("https://index.example/").unwrap(),
            Vec::new(),
        );
        let engine = engine();

        assert!(engine
            .fetch::<MovieInfo>(&format!("{}/missing.jpg", server.uri()), &index)
            .await
            .is_err());
    }
}
