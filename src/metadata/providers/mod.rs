//! Concrete metadata provider implementations.
//!
//! Each submodule implements [`Provider`](super::Provider) and declares the
//! capabilities it supports. [`factories_from_config`] turns the configured
//! `[[providers]]` entries of one entity kind into registry constructors.

pub mod json_api;
pub mod reference_index;

pub use json_api::JsonApiProvider;
pub use reference_index::ReferenceIndexProvider;

use anyhow::Context;
use url::Url;

use crate::config::{ProviderConfig, ProviderType};

use super::entity::Entity;
use super::provider::{Provider, ProviderFactory};

/// Build constructors for every configured provider of entity kind `E`.
///
/// Providers are created eagerly so that a bad dataset or URL fails here,
/// before the registry is built.
pub fn factories_from_config<E: Entity>(
    entries: &[ProviderConfig],
) -> anyhow::Result<Vec<ProviderFactory<E>>> {
    let mut factories = Vec::new();

    for entry in entries.iter().filter(|e| e.kind.as_str() == E::KIND) {
        let provider: Box<dyn Provider<E>> = match entry.provider_type {
            ProviderType::JsonApi => Box::new(JsonApiProvider::<E>::from_config(entry)?),
            ProviderType::ReferenceIndex => {
                Box::new(ReferenceIndexProvider::<E>::from_config(entry)?)
            }
        };
        factories.push(Box::new(move || provider) as ProviderFactory<E>);
    }

    Ok(factories)
}

pub(crate) fn parse_base_url(name: &str, raw: &str) -> anyhow::Result<Url> {
    Url::parse(raw).with_context(|| format!("provider {name}: invalid url {raw}"))
}

/// The last path segment of `url` below `base`, or an empty string when
/// `url` is the base itself.
pub(crate) fn id_from_url(base: &Url, url: &Url) -> anyhow::Result<String> {
    let rest = url
        .path()
        .strip_prefix(base.path())
        .with_context(|| format!("{url} is outside {base}"))?;

    Ok(rest
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string())
}
