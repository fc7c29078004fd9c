//! Metadata aggregation across pluggable providers.
//!
//! Providers expose optional capabilities (fetch by id, fetch by URL, keyword
//! search, ...). The [`ProviderRegistry`] resolves them by name or by URL, and
//! a [`MetadataService`] per entity kind runs cache-aside lookups against a
//! [`RecordStore`] and parallel searches across every searcher.
//!
//! # Module layout
//!
//! - [`entity`] -- What lookups and searches need from actor and movie records.
//! - [`provider`] -- Provider trait and capability traits.
//! - [`registry`] -- Provider registry for name and URL resolution.
//! - [`store`] -- Record store trait with SQLite and in-memory implementations.
//! - [`service`] -- Per-entity service; lookups and searches hang off it.
//! - [`engine`] -- Actor and movie services plus resource fetching.
//! - [`providers`] -- Concrete provider implementations.

pub mod engine;
pub mod entity;
pub mod error;
pub mod lookup;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod search;
pub mod service;
pub mod store;

pub use engine::{Engine, EngineOptions};
pub use entity::{Entity, SearchRecord};
pub use error::{Error, InvariantViolation, Result};
pub use provider::{
    IdFetcher, IdNormalizer, Provider, ProviderFactory, ResourceFetcher, Searcher,
    TimeoutConfigurable, UrlFetcher, UrlParser,
};
pub use registry::ProviderRegistry;
pub use service::MetadataService;
pub use store::{MemoryStore, RecordStore, SqliteRecordStore};
