//! Required-field tables that decide whether a record is complete.
//!
//! A record that fails its table must never be served from the cache and
//! must never be persisted. The tables are the single source of truth; every
//! `is_valid` in [`crate::types`] delegates here.

use crate::types::{ActorInfo, ActorSearchResult, MovieInfo, MovieSearchResult};

/// Actor fields that may appear in a required-field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorField {
    Id,
    Name,
    Provider,
    Homepage,
}

/// Movie fields that may appear in a required-field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieField {
    Id,
    Number,
    Title,
    Provider,
    Homepage,
    CoverUrl,
}

pub const ACTOR_INFO_REQUIRED: &[ActorField] = &[
    ActorField::Id,
    ActorField::Name,
    ActorField::Provider,
    ActorField::Homepage,
];

pub const ACTOR_SEARCH_RESULT_REQUIRED: &[ActorField] = &[
    ActorField::Id,
    ActorField::Name,
    ActorField::Provider,
    ActorField::Homepage,
];

pub const MOVIE_INFO_REQUIRED: &[MovieField] = &[
    MovieField::Id,
    MovieField::Number,
    MovieField::Title,
    MovieField::CoverUrl,
    MovieField::Provider,
    MovieField::Homepage,
];

pub const MOVIE_SEARCH_RESULT_REQUIRED: &[MovieField] = &[
    MovieField::Id,
    MovieField::Number,
    MovieField::Title,
    MovieField::Provider,
    MovieField::Homepage,
];

fn is_set(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn actor_info_is_valid(info: &ActorInfo) -> bool {
    ACTOR_INFO_REQUIRED.iter().all(|field| {
        is_set(match field {
            ActorField::Id => &info.id,
            ActorField::Name => &info.name,
            ActorField::Provider => &info.provider,
            ActorField::Homepage => &info.homepage,
        })
    })
}

pub fn actor_search_result_is_valid(result: &ActorSearchResult) -> bool {
    ACTOR_SEARCH_RESULT_REQUIRED.iter().all(|field| {
        is_set(match field {
            ActorField::Id => &result.id,
            ActorField::Name => &result.name,
            ActorField::Provider => &result.provider,
            ActorField::Homepage => &result.homepage,
        })
    })
}

pub fn movie_info_is_valid(info: &MovieInfo) -> bool {
    MOVIE_INFO_REQUIRED.iter().all(|field| {
        is_set(match field {
            MovieField::Id => &info.id,
            MovieField::Number => &info.number,
            MovieField::Title => &info.title,
            MovieField::Provider => &info.provider,
            MovieField::Homepage => &info.homepage,
            MovieField::CoverUrl => &info.cover_url,
        })
    })
}

pub fn movie_search_result_is_valid(result: &MovieSearchResult) -> bool {
    MOVIE_SEARCH_RESULT_REQUIRED.iter().all(|field| {
        is_set(match field {
            MovieField::Id => &result.id,
            MovieField::Number => &result.number,
            MovieField::Title => &result.title,
            MovieField::Provider => &result.provider,
            MovieField::Homepage => &result.homepage,
            MovieField::CoverUrl => &result.cover_url,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_movie() -> MovieInfo {
        MovieInfo {
            id: "ABC-123".into(),
            number: "ABC-123".into(),
            title: "Title".into(),
            provider: "api".into(),
            homepage: "https://api.example/movies/ABC-123".into(),
            cover_url: "https://api.example/ABC-123.jpg".into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_movie_is_valid() {
        assert!(movie_info_is_valid(&complete_movie()));
    }

    #[test]
    fn each_required_movie_field_is_enforced() {
        let blank: [fn(&mut MovieInfo); 6] = [
            |m| m.id.clear(),
            |m| m.number.clear(),
            |m| m.title.clear(),
            |m| m.provider.clear(),
            |m| m.homepage.clear(),
            |m| m.cover_url.clear(),
        ];
        for clear in blank {
            let mut movie = complete_movie();
            clear(&mut movie);
            assert!(!movie_info_is_valid(&movie), "{movie:?}");
        }
    }

    #[test]
    fn whitespace_does_not_count_as_set() {
        let actor = ActorInfo {
            id: "1".into(),
            name: "   ".into(),
            provider: "p".into(),
            homepage: "https://p.example/1".into(),
            ..Default::default()
        };
        assert!(!actor_info_is_valid(&actor));
    }

    #[test]
    fn movie_search_result_does_not_need_cover() {
        let result = complete_movie().to_search_result();
        let mut without_cover = result.clone();
        without_cover.cover_url.clear();
        assert!(movie_search_result_is_valid(&result));
        assert!(movie_search_result_is_valid(&without_cover));
    }
}
