//! Generic JSON metadata API provider.
//!
//! Talks to an API rooted at the provider's canonical URL:
//!
//! - `GET {url}/{id}` returns one record.
//! - `GET {url}/search?q={keyword}` returns `{"results": [...]}`.
//!
//! Requests go through a token-bucket rate limiter via [`governor`] when one
//! is configured. Failed requests are not retried.

use std::marker::PhantomData;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderConfig;
use crate::metadata::entity::{Entity, SearchRecord};
use crate::metadata::provider::{
    IdFetcher, IdNormalizer, Provider, ResourceFetcher, Searcher, TimeoutConfigurable,
    UrlFetcher, UrlParser,
};

use super::{id_from_url, parse_base_url};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    results: Vec<T>,
}

/// JSON API provider for one entity kind.
///
/// # Examples
///
/// ```no_run
/// use metaforged::metadata::providers::JsonApiProvider;
/// use metaforged_common::MovieInfo;
/// use url::Url;
///
/// let provider = JsonApiProvider::<MovieInfo>::new(
///     "catalog",
///     Url::parse("https://catalog.example/movies/").unwrap(),
/// )
/// .unwrap()
/// .with_priority(10)
/// .with_uppercase_ids(true);
/// ```
pub struct JsonApiProvider<E> {
    name: String,
    url: Url,
    priority: i64,
    id_pattern: Option<Regex>,
    uppercase_ids: bool,
    client: reqwest::Client,
    rate_limiter: Option<DirectRateLimiter>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> JsonApiProvider<E> {
    /// Create a provider with a 30 second request timeout, no id rules and
    /// no rate limit.
    pub fn new(name: impl Into<String>, url: Url) -> anyhow::Result<Self> {
        let client = build_client(DEFAULT_REQUEST_TIMEOUT)?;

        Ok(Self {
            name: name.into(),
            url,
            priority: 0,
            id_pattern: None,
            uppercase_ids: false,
            client,
            rate_limiter: None,
            _entity: PhantomData,
        })
    }

    pub fn from_config(entry: &ProviderConfig) -> anyhow::Result<Self> {
        let url = parse_base_url(&entry.name, &entry.url)?;
        let mut provider = Self::new(entry.name.clone(), url)?
            .with_priority(entry.priority)
            .with_uppercase_ids(entry.uppercase_ids);

        if let Some(pattern) = &entry.id_pattern {
            let regex = Regex::new(pattern)
                .with_context(|| format!("provider {}: invalid id_pattern", entry.name))?;
            provider = provider.with_id_pattern(regex);
        }

        if let Some(per_second) = entry.rate_limit_per_sec.and_then(NonZeroU32::new) {
            provider = provider.with_rate_limit(per_second);
        }

        Ok(provider)
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Reject ids that do not match `pattern` after normalization.
    pub fn with_id_pattern(mut self, pattern: Regex) -> Self {
        self.id_pattern = Some(pattern);
        self
    }

    pub fn with_uppercase_ids(mut self, uppercase: bool) -> Self {
        self.uppercase_ids = uppercase;
        self
    }

    pub fn with_rate_limit(mut self, per_second: NonZeroU32) -> Self {
        self.rate_limiter = Some(RateLimiter::direct(Quota::per_second(per_second)));
        self
    }

    /// `{url}/{segments...}`, keeping the base path.
    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("provider {}: {} cannot be a base url", self.name, self.url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Rate-limited GET that fails on non-success status codes.
    async fn get(&self, url: Url) -> anyhow::Result<reqwest::Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        debug!(provider = %self.name, url = %url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("{} request failed: {url}", self.name))?;

        resp.error_for_status()
            .with_context(|| format!("{} request returned error: {url}", self.name))
    }
}

fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

impl<E: Entity> Provider<E> for JsonApiProvider<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn id_fetcher(&self) -> Option<&dyn IdFetcher<E>> {
        Some(self)
    }

    fn url_fetcher(&self) -> Option<&dyn UrlFetcher<E>> {
        Some(self)
    }

    fn searcher(&self) -> Option<&dyn Searcher<E>> {
        Some(self)
    }

    fn id_normalizer(&self) -> Option<&dyn IdNormalizer> {
        Some(self)
    }

    fn url_parser(&self) -> Option<&dyn UrlParser> {
        Some(self)
    }

    fn resource_fetcher(&self) -> Option<&dyn ResourceFetcher> {
        Some(self)
    }

    fn timeout_configurable(&mut self) -> Option<&mut dyn TimeoutConfigurable> {
        Some(self)
    }
}

impl<E: Entity> IdNormalizer for JsonApiProvider<E> {
    fn normalize_id(&self, raw: &str) -> String {
        let id = raw.trim();
        let id = if self.uppercase_ids {
            id.to_uppercase()
        } else {
            id.to_string()
        };

        match &self.id_pattern {
            Some(pattern) if !pattern.is_match(&id) => String::new(),
            _ => id,
        }
    }
}

impl<E: Entity> UrlParser for JsonApiProvider<E> {
    fn parse_id_from_url(&self, url: &Url) -> anyhow::Result<String> {
        let raw = id_from_url(&self.url, url)?;
        Ok(self.normalize_id(&raw))
    }
}

#[async_trait]
impl<E: Entity> IdFetcher<E> for JsonApiProvider<E> {
    async fn fetch_by_id(&self, id: &str) -> anyhow::Result<E> {
        let url = self.endpoint(&[id])?;
        let mut info: E = self
            .get(url)
            .await?
            .json()
            .await
            .with_context(|| format!("{}: failed to decode {} {id}", self.name, E::KIND))?;
        info.set_provider(&self.name);
        Ok(info)
    }
}

#[async_trait]
impl<E: Entity> UrlFetcher<E> for JsonApiProvider<E> {
    async fn fetch_by_url(&self, url: &Url) -> anyhow::Result<E> {
        let id = self.parse_id_from_url(url)?;
        if id.is_empty() {
            anyhow::bail!("{}: no {} id in {url}", self.name, E::KIND);
        }
        self.fetch_by_id(&id).await
    }
}

#[async_trait]
impl<E: Entity> Searcher<E> for JsonApiProvider<E> {
    fn priority(&self) -> i64 {
        self.priority
    }

    async fn search(&self, keyword: &str) -> anyhow::Result<Vec<E::SearchResult>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", keyword);

        let body: SearchResponse<E::SearchResult> = self
            .get(url)
            .await?
            .json()
            .await
            .with_context(|| format!("{}: failed to decode search results", self.name))?;

        let mut results = body.results;
        for result in &mut results {
            result.set_provider(&self.name);
        }

        debug!(
            provider = %self.name,
            keyword,
            count = results.len(),
            "Search returned results"
        );
        Ok(results)
    }
}

#[async_trait]
impl<E: Entity> ResourceFetcher for JsonApiProvider<E> {
    async fn fetch(&self, url: &str) -> anyhow::Result<reqwest::Response> {
        let url = Url::parse(url).with_context(|| format!("invalid resource url: {url}"))?;
        self.get(url).await
    }
}

impl<E: Entity> TimeoutConfigurable for JsonApiProvider<E> {
    fn set_request_timeout(&mut self, timeout: Duration) {
        match build_client(timeout) {
            Ok(client) => self.client = client,
            Err(e) => warn!(
                provider = %self.name,
                error = %e,
                "Keeping previous HTTP client"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaforged_common::MovieInfo;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> JsonApiProvider<MovieInfo> {
        let url = Url::parse(&format!("{}/movies/", server.uri())).unwrap();
        JsonApiProvider::new("catalog", url).unwrap()
    }

    #[tokio::test]
    async fn fetch_by_id_stamps_provider_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/ABC-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "ABC-123",
                "number": "ABC-123",
                "title": "Example",
                "provider": "upstream",
                "runtime": 120,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server).await;
        let info = provider.fetch_by_id("ABC-123").await.unwrap();
        assert_eq!(info.title, "Example");
        assert_eq!(info.runtime, 120);
        assert_eq!(info.provider, "catalog");
    }

    #[tokio::test]
    async fn search_sends_keyword_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/search"))
            .and(query_param("q", "abc 123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"id": "1", "number": "ABC-123", "title": "One"},
                    {"id": "2", "number": "ABC-124", "title": "Two"},
                ]
            })))
            .mount(&server)
            .await;

        let provider = provider(&server).await.with_priority(7);
        let results = provider.search("abc 123").await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.provider == "catalog"));
        assert_eq!(Searcher::<MovieInfo>::priority(&provider), 7);
    }

    #[tokio::test]
    async fn http_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider(&server).await;
        let err = provider.fetch_by_id("X").await.unwrap_err();
        assert!(err.to_string().contains("returned error"));
    }

    #[tokio::test]
    async fn fetch_by_url_maps_page_to_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/ABC-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "ABC-123",
                "title": "Example",
            })))
            .mount(&server)
            .await;

        let provider = provider(&server).await.with_uppercase_ids(true);
        let page = Url::parse(&format!("{}/movies/abc-123", server.uri())).unwrap();
        let info = provider.fetch_by_url(&page).await.unwrap();
        assert_eq!(info.id, "ABC-123");
    }

    #[test]
    fn normalization_applies_case_and_pattern() {
        let url = Url::parse("https://catalog.example/movies/").unwrap();
        let provider = JsonApiProvider::<MovieInfo>::new("catalog", url)
            .unwrap()
            .with_uppercase_ids(true)
            .with_id_pattern(Regex::new(r"^[A-Z]+-\d+$").unwrap());

        assert_eq!(provider.normalize_id(" abc-123 "), "ABC-123");
        assert_eq!(provider.normalize_id("not an id"), "");

        let page = Url::parse("https://catalog.example/movies/abc-9").unwrap();
        assert_eq!(provider.parse_id_from_url(&page).unwrap(), "ABC-9");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = Url::parse("https://catalog.example/api/movies").unwrap();
        let provider = JsonApiProvider::<MovieInfo>::new("catalog", url).unwrap();
        assert_eq!(
            provider.endpoint(&["search"]).unwrap().as_str(),
            "https://catalog.example/api/movies/search"
        );
    }
}
