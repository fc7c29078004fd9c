//! Shared test harness for integration tests.
//!
//! Provides [`FakeProvider`], a scriptable provider that counts its fetches
//! and searches, and [`Harness`], a [`MetadataService`] wired to a
//! [`MemoryStore`] so tests can inspect what was written.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metaforged::metadata::{
    Entity, IdFetcher, MemoryStore, MetadataService, Provider, ProviderFactory, ProviderRegistry,
    Searcher, UrlFetcher, UrlParser,
};
use metaforged_common::{MovieInfo, MovieSearchResult};
use url::Url;

/// What a fake provider does when searched.
#[derive(Clone)]
pub enum SearchBehavior<R> {
    Results(Vec<R>),
    Fail,
    Hang,
}

pub struct FakeProvider<E: Entity> {
    name: String,
    url: Url,
    identity: bool,
    record: Option<E>,
    search: Option<(i64, SearchBehavior<E::SearchResult>)>,
    search_delay: Duration,
    parse_urls: bool,
    fetches: Arc<AtomicUsize>,
    searches: Arc<AtomicUsize>,
}

impl<E: Entity> FakeProvider<E> {
    /// A provider that can fetch by id and returns `record` for every id.
    /// Without a record, every fetch fails.
    pub fn new(name: &str, record: Option<E>) -> Self {
        Self {
            name: name.to_string(),
            url: Url::parse(&format!("https://{name}.example/")).unwrap(),
            identity: false,
            record,
            search: None,
            search_delay: Duration::ZERO,
            parse_urls: false,
            fetches: Arc::new(AtomicUsize::new(0)),
            searches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Url::parse(url).unwrap();
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn searching(mut self, priority: i64, behavior: SearchBehavior<E::SearchResult>) -> Self {
        self.search = Some((priority, behavior));
        self
    }

    pub fn search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn parsing_urls(mut self) -> Self {
        self.parse_urls = true;
        self
    }

    pub fn fetches(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }

    pub fn searches(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.searches)
    }

    async fn fetch(&self, id: &str) -> anyhow::Result<E> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.record
            .clone()
            .ok_or_else(|| anyhow::anyhow!("{} has nothing for {id}", self.name))
    }
}

impl<E: Entity> Provider<E> for FakeProvider<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn is_identity_provider(&self) -> bool {
        self.identity
    }

    fn id_fetcher(&self) -> Option<&dyn IdFetcher<E>> {
        Some(self)
    }

    fn url_fetcher(&self) -> Option<&dyn UrlFetcher<E>> {
        self.parse_urls.then_some(self as &dyn UrlFetcher<E>)
    }

    fn url_parser(&self) -> Option<&dyn UrlParser> {
        self.parse_urls.then_some(self as &dyn UrlParser)
    }

    fn searcher(&self) -> Option<&dyn Searcher<E>> {
        self.search.as_ref().map(|_| self as &dyn Searcher<E>)
    }
}

#[async_trait]
impl<E: Entity> IdFetcher<E> for FakeProvider<E> {
    async fn fetch_by_id(&self, id: &str) -> anyhow::Result<E> {
        self.fetch(id).await
    }
}

#[async_trait]
impl<E: Entity> UrlFetcher<E> for FakeProvider<E> {
    async fn fetch_by_url(&self, url: &Url) -> anyhow::Result<E> {
        self.fetch(url.as_str()).await
    }
}

impl<E: Entity> UrlParser for FakeProvider<E> {
    fn parse_id_from_url(&self, url: &Url) -> anyhow::Result<String> {
        let rest = url
            .path()
            .strip_prefix(self.url.path())
            .ok_or_else(|| anyhow::anyhow!("{url} is not a {} page", self.name))?;
        Ok(rest.trim_matches('/').to_string())
    }
}

#[async_trait]
impl<E: Entity> Searcher<E> for FakeProvider<E> {
    fn priority(&self) -> i64 {
        self.search.as_ref().map_or(0, |(priority, _)| *priority)
    }

    async fn search(&self, keyword: &str) -> anyhow::Result<Vec<E::SearchResult>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.search_delay).await;
        match self.search.as_ref().map(|(_, behavior)| behavior.clone()) {
            Some(SearchBehavior::Results(results)) => Ok(results),
            Some(SearchBehavior::Fail) => anyhow::bail!("{} search failed for {keyword}", self.name),
            Some(SearchBehavior::Hang) => std::future::pending().await,
            None => Ok(Vec::new()),
        }
    }
}

/// A service over fake providers and an inspectable in-memory store.
pub struct Harness<E: Entity> {
    pub service: MetadataService<E>,
    pub store: Arc<MemoryStore<E>>,
}

impl<E: Entity> Harness<E> {
    pub fn new(providers: Vec<FakeProvider<E>>) -> Self {
        let factories = providers
            .into_iter()
            .map(|p| Box::new(move || Box::new(p) as Box<dyn Provider<E>>) as ProviderFactory<E>)
            .collect();
        let store: Arc<MemoryStore<E>> = Arc::new(MemoryStore::new());
        let service = MetadataService::new(ProviderRegistry::build(factories, None), store.clone());
        Self { service, store }
    }

    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.service = self.service.with_search_timeout(timeout);
        self
    }
}

pub fn count(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A movie with every required field set.
pub fn movie(provider: &str, id: &str, title: &str) -> MovieInfo {
    MovieInfo {
        id: id.to_string(),
        number: id.to_string(),
        title: title.to_string(),
        provider: provider.to_string(),
        homepage: format!("https://{provider}.example/{id}"),
        cover_url: format!("https://{provider}.example/{id}.jpg"),
        ..Default::default()
    }
}

/// A movie missing its cover, which makes it invalid.
pub fn incomplete_movie(provider: &str, id: &str) -> MovieInfo {
    MovieInfo {
        cover_url: String::new(),
        ..movie(provider, id, "Incomplete")
    }
}

pub fn movie_result(provider: &str, id: &str) -> MovieSearchResult {
    MovieSearchResult {
        id: id.to_string(),
        number: id.to_string(),
        title: format!("Result {id}"),
        provider: provider.to_string(),
        homepage: format!("https://{provider}.example/{id}"),
        ..Default::default()
    }
}
