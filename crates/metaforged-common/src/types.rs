//! Entity records shared between the engine, the providers, and the store.
//!
//! Every persisted record is keyed by `(provider, id)`. Search results are
//! transient projections that carry the provider name so the aggregator can
//! look up the provider's priority later.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validity;

// ---------------------------------------------------------------------------
// Actors
// ---------------------------------------------------------------------------

/// Full actor record as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorInfo {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub homepage: String,
    pub summary: String,
    pub hobby: String,
    pub skill: String,
    pub blood_type: String,
    pub cup_size: String,
    pub measurements: String,
    pub nationality: String,
    /// Height in centimetres, 0 when unknown.
    pub height: u32,
    pub aliases: Vec<String>,
    pub images: Vec<String>,
    pub birthday: Option<NaiveDate>,
    pub debut_date: Option<NaiveDate>,
}

impl ActorInfo {
    /// Whether every required actor field is populated.
    pub fn is_valid(&self) -> bool {
        validity::actor_info_is_valid(self)
    }

    /// Project this record into a search result.
    pub fn to_search_result(&self) -> ActorSearchResult {
        ActorSearchResult {
            id: self.id.clone(),
            name: self.name.clone(),
            provider: self.provider.clone(),
            homepage: self.homepage.clone(),
            aliases: self.aliases.clone(),
            images: self.images.clone(),
        }
    }
}

/// A single hit from an actor keyword search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorSearchResult {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub homepage: String,
    pub aliases: Vec<String>,
    pub images: Vec<String>,
}

impl ActorSearchResult {
    pub fn is_valid(&self) -> bool {
        validity::actor_search_result_is_valid(self)
    }
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

/// Full movie record as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieInfo {
    pub id: String,
    /// Release number as printed on the product (often equal to `id`).
    pub number: String,
    pub title: String,
    pub summary: String,
    pub provider: String,
    pub homepage: String,
    pub director: String,
    pub actors: Vec<String>,
    pub thumb_url: String,
    pub big_thumb_url: String,
    pub cover_url: String,
    pub big_cover_url: String,
    pub preview_video_url: String,
    pub preview_video_hls_url: String,
    pub preview_images: Vec<String>,
    pub maker: String,
    pub label: String,
    pub series: String,
    pub genres: Vec<String>,
    pub score: f64,
    /// Runtime in minutes, 0 when unknown.
    pub runtime: u32,
    pub release_date: Option<NaiveDate>,
}

impl MovieInfo {
    /// Whether every required movie field is populated.
    pub fn is_valid(&self) -> bool {
        validity::movie_info_is_valid(self)
    }

    /// Project this record into a search result.
    pub fn to_search_result(&self) -> MovieSearchResult {
        MovieSearchResult {
            id: self.id.clone(),
            number: self.number.clone(),
            title: self.title.clone(),
            provider: self.provider.clone(),
            homepage: self.homepage.clone(),
            thumb_url: self.thumb_url.clone(),
            cover_url: self.cover_url.clone(),
            score: self.score,
            actors: self.actors.clone(),
            release_date: self.release_date,
        }
    }
}

/// A single hit from a movie keyword search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieSearchResult {
    pub id: String,
    pub number: String,
    pub title: String,
    pub provider: String,
    pub homepage: String,
    pub thumb_url: String,
    pub cover_url: String,
    pub score: f64,
    pub actors: Vec<String>,
    pub release_date: Option<NaiveDate>,
}

impl MovieSearchResult {
    pub fn is_valid(&self) -> bool {
        validity::movie_search_result_is_valid(self)
    }
}
