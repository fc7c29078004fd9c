use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file (tilde-expanded)
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "metaforged.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Per-request timeout applied to every provider that accepts one
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Per-provider deadline for multi-provider searches
    #[serde(default = "default_search_timeout")]
    pub search_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_search_timeout() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            search_timeout_secs: default_search_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    #[serde(rename = "type")]
    pub provider_type: ProviderType,

    pub name: String,

    /// Canonical base URL; its host and path prefix route URL lookups
    pub url: String,

    /// Ordering weight for merged search results (higher first)
    #[serde(default)]
    pub priority: i64,

    /// Regex a raw id must match after normalization
    #[serde(default)]
    pub id_pattern: Option<String>,

    #[serde(default)]
    pub uppercase_ids: bool,

    /// JSON dataset file, required for reference indexes
    #[serde(default)]
    pub dataset: Option<PathBuf>,

    /// Token bucket refill rate; unlimited when absent
    #[serde(default)]
    pub rate_limit_per_sec: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Actor,
    Movie,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Actor => "actor",
            ProviderKind::Movie => "movie",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// JSON metadata API: `GET {url}/{id}` and `GET {url}/search?q=`
    JsonApi,
    /// Identity provider over a local JSON dataset
    ReferenceIndex,
}
