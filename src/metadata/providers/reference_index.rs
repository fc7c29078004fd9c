//! Identity provider backed by a community-curated JSON dataset.
//!
//! The dataset is a JSON array of records loaded once at startup. Since the
//! data is versioned outside this process, lookups against this provider
//! always go to the dataset and are never cached in the record store.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::config::ProviderConfig;
use crate::metadata::entity::Entity;
use crate::metadata::provider::{IdFetcher, Provider, Searcher, UrlFetcher, UrlParser};

use super::{id_from_url, parse_base_url};

pub struct ReferenceIndexProvider<E: Entity> {
    name: String,
    url: Url,
    priority: i64,
    records: BTreeMap<String, E>,
}

impl<E: Entity> ReferenceIndexProvider<E> {
    /// Index `records` by id. Every record is re-tagged with `name`; a later
    /// record with the same id replaces an earlier one.
    pub fn new(name: impl Into<String>, url: Url, records: Vec<E>) -> Self {
        let name = name.into();
        let records = records
            .into_iter()
            .map(|mut record| {
                record.set_provider(&name);
                (record.id().to_string(), record)
            })
            .collect();

        Self {
            name,
            url,
            priority: 0,
            records,
        }
    }

    /// Load a dataset file containing a JSON array of records.
    pub fn from_dataset(name: impl Into<String>, url: Url, path: &Path) -> anyhow::Result<Self> {
        let name = name.into();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset for {name}: {:?}", path))?;
        let records: Vec<E> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset for {name}: {:?}", path))?;

        let provider = Self::new(name, url, records);
        info!(
            kind = E::KIND,
            provider = %provider.name,
            records = provider.len(),
            "Loaded reference dataset"
        );
        Ok(provider)
    }

    pub fn from_config(entry: &ProviderConfig) -> anyhow::Result<Self> {
        let url = parse_base_url(&entry.name, &entry.url)?;
        let dataset = entry
            .dataset
            .as_deref()
            .with_context(|| format!("provider {}: no dataset configured", entry.name))?;

        Ok(Self::from_dataset(entry.name.clone(), url, dataset)?.with_priority(entry.priority))
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<E: Entity> Provider<E> for ReferenceIndexProvider<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn is_identity_provider(&self) -> bool {
        true
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

    fn url_parser(&self) -> Option<&dyn UrlParser> {
        Some(self)
    }
}

impl<E: Entity> UrlParser for ReferenceIndexProvider<E> {
    fn parse_id_from_url(&self, url: &Url) -> anyhow::Result<String> {
        id_from_url(&self.url, url)
    }
}

#[async_trait]
impl<E: Entity> IdFetcher<E> for ReferenceIndexProvider<E> {
    async fn fetch_by_id(&self, id: &str) -> anyhow::Result<E> {
        self.records
            .get(id)
            .cloned()
            .with_context(|| format!("{} {id} is not in the {} dataset", E::KIND, self.name))
    }
}

#[async_trait]
impl<E: Entity> UrlFetcher<E> for ReferenceIndexProvider<E> {
    async fn fetch_by_url(&self, url: &Url) -> anyhow::Result<E> {
        let id = self.parse_id_from_url(url)?;
        self.fetch_by_id(&id).await
    }
}

#[async_trait]
impl<E: Entity> Searcher<E> for ReferenceIndexProvider<E> {
    fn priority(&self) -> i64 {
        self.priority
    }

    async fn search(&self, keyword: &str) -> anyhow::Result<Vec<E::SearchResult>> {
        Ok(self
            .records
            .values()
            .filter(|record| record.matches_keyword(keyword))
            .map(Entity::to_search_result)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaforged_common::ActorInfo;
    use std::io::Write;

    fn actor(id: &str, name: &str) -> ActorInfo {
        ActorInfo {
            id: id.into(),
            name: name.into(),
            provider: "somewhere-else".into(),
            homepage: format!("https://faces.example/{id}"),
            ..Default::default()
        }
    }

    fn index() -> ReferenceIndexProvider<ActorInfo> {
        ReferenceIndexProvider::new(
            "faces",
            Url::parse("https://faces.example/").unwrap(),
            vec![actor("1", "Alice Example"), actor("2", "Bob Example")],
        )
    }

    #[tokio::test]
    async fn fetch_by_id_retags_provider() {
        let info = index().fetch_by_id("2").await.unwrap();
        assert_eq!(info.name, "Bob Example");
        assert_eq!(info.provider, "faces");
        assert!(index().fetch_by_id("3").await.is_err());
    }

    #[tokio::test]
    async fn search_matches_names() {
        let index = index();
        assert_eq!(index.search("example").await.unwrap().len(), 2);

        let alice = index.search("alice").await.unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].id, "1");
        assert_eq!(alice[0].provider, "faces");
    }

    #[test]
    fn always_an_identity_provider() {
        let provider: &dyn Provider<ActorInfo> = &index();
        assert!(provider.is_identity_provider());
        assert!(provider.id_normalizer().is_none());
    }

    #[test]
    fn loads_dataset_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let records = vec![actor("9", "Dana")];
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();

        let provider = ReferenceIndexProvider::<ActorInfo>::from_dataset(
            "faces",
            Url::parse("https://faces.example/").unwrap(),
            file.path(),
        )
        .unwrap();
        assert_eq!(provider.len(), 1);
    }
}
