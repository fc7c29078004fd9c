mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    expand_paths(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./metaforged.toml",
        "~/.config/metaforged/config.toml",
        "/etc/metaforged/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    expand_paths(&mut config);
    Ok(config)
}

fn expand_paths(config: &mut Config) {
    config.database.path = shellexpand::tilde(&config.database.path).into_owned();

    for provider in config.providers.iter_mut() {
        if let Some(dataset) = provider.dataset.as_mut() {
            let expanded = shellexpand::tilde(&dataset.to_string_lossy()).into_owned();
            *dataset = expanded.into();
        }
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    // Validate engine config
    if config.engine.request_timeout_secs == 0 {
        anyhow::bail!("Request timeout cannot be 0");
    }
    if config.engine.search_timeout_secs == 0 {
        anyhow::bail!("Search timeout cannot be 0");
    }

    // Validate providers
    let mut seen = HashSet::new();
    for provider in &config.providers {
        if provider.name.trim().is_empty() {
            anyhow::bail!("A {} provider has an empty name", provider.kind);
        }

        url::Url::parse(&provider.url).with_context(|| {
            format!("Provider '{}' has an invalid url: {}", provider.name, provider.url)
        })?;

        if let Some(pattern) = &provider.id_pattern {
            regex::Regex::new(pattern).with_context(|| {
                format!("Provider '{}' has an invalid id_pattern", provider.name)
            })?;
        }

        if provider.rate_limit_per_sec == Some(0) {
            anyhow::bail!("Provider '{}' has a zero rate limit", provider.name);
        }

        if provider.provider_type == ProviderType::ReferenceIndex && provider.dataset.is_none() {
            anyhow::bail!(
                "Reference index provider '{}' has no dataset",
                provider.name
            );
        }

        if !seen.insert((provider.kind, provider.name.to_uppercase())) {
            tracing::warn!(
                "Duplicate {} provider '{}', only the first is registered",
                provider.kind,
                provider.name
            );
        }
    }

    Ok(())
}
