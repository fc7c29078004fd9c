//! Entity abstraction shared by the registry, lookups, and searches.
//!
//! Actors and movies go through the same cache-aside and fan-out code; the
//! [`Entity`] trait supplies what differs between them.

use std::fmt::Debug;

use metaforged_common::validity;
use metaforged_common::{ActorInfo, ActorSearchResult, MovieInfo, MovieSearchResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A transient search hit tagged with the provider that produced it.
pub trait SearchRecord: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn provider(&self) -> &str;
    fn set_provider(&mut self, provider: &str);
    fn is_valid(&self) -> bool;
}

/// A persisted record keyed by `(provider, id)`.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type SearchResult: SearchRecord;

    /// Lowercase label used in logs and messages (`"actor"`, `"movie"`).
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: &str);
    fn provider(&self) -> &str;
    fn set_provider(&mut self, provider: &str);

    /// Secondary lookup column for lazy keyword shortcuts: the actor's name
    /// or the movie's release number.
    fn name_key(&self) -> &str;

    fn is_valid(&self) -> bool;
    fn to_search_result(&self) -> Self::SearchResult;

    /// Loose keyword match used by dataset-backed providers.
    fn matches_keyword(&self, keyword: &str) -> bool;
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl SearchRecord for ActorSearchResult {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn set_provider(&mut self, provider: &str) {
        self.provider = provider.to_string();
    }

    fn is_valid(&self) -> bool {
        validity::actor_search_result_is_valid(self)
    }
}

impl SearchRecord for MovieSearchResult {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn set_provider(&mut self, provider: &str) {
        self.provider = provider.to_string();
    }

    fn is_valid(&self) -> bool {
        validity::movie_search_result_is_valid(self)
    }
}

impl Entity for ActorInfo {
    type SearchResult = ActorSearchResult;

    const KIND: &'static str = "actor";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    fn set_provider(&mut self, provider: &str) {
        self.provider = provider.to_string();
    }

    fn name_key(&self) -> &str {
        &self.name
    }

    fn is_valid(&self) -> bool {
        validity::actor_info_is_valid(self)
    }

    fn to_search_result(&self) -> ActorSearchResult {
        ActorInfo::to_search_result(self)
    }

    fn matches_keyword(&self, keyword: &str) -> bool {
        self.id.eq_ignore_ascii_case(keyword)
            || contains_ignore_case(&self.name, keyword)
            || self
                .aliases
                .iter()
                .any(|alias| contains_ignore_case(alias, keyword))
    }
}

impl Entity for MovieInfo {
    type SearchResult = MovieSearchResult;

    const KIND: &'static str = "movie";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    fn set_provider(&mut self, provider: &str) {
        self.provider = provider.to_string();
    }

    fn name_key(&self) -> &str {
        &self.number
    }

    fn is_valid(&self) -> bool {
        validity::movie_info_is_valid(self)
    }

    fn to_search_result(&self) -> MovieSearchResult {
        MovieInfo::to_search_result(self)
    }

    fn matches_keyword(&self, keyword: &str) -> bool {
        self.id.eq_ignore_ascii_case(keyword)
            || self.number.eq_ignore_ascii_case(keyword)
            || contains_ignore_case(&self.title, keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_matches_name_and_aliases() {
        let actor = ActorInfo {
            id: "1001".into(),
            name: "Jane Example".into(),
            aliases: vec!["J. Ex".into()],
            ..Default::default()
        };
        assert!(actor.matches_keyword("jane"));
        assert!(actor.matches_keyword("j. ex"));
        assert!(actor.matches_keyword("1001"));
        assert!(!actor.matches_keyword("someone else"));
    }

    #[test]
    fn movie_matches_number_exactly() {
        let movie = MovieInfo {
            id: "abc00123".into(),
            number: "ABC-123".into(),
            title: "A Long Title".into(),
            ..Default::default()
        };
        assert!(movie.matches_keyword("abc-123"));
        assert!(movie.matches_keyword("long"));
        assert!(!movie.matches_keyword("ABC-12"));
    }
}
