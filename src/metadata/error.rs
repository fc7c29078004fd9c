//! Error taxonomy for metadata lookups and searches.
//!
//! [`Error`] is the user-facing channel. [`InvariantViolation`] is kept as its
//! own type so callers can tell "not found" apart from "should never happen".

use std::time::Duration;

/// Errors returned by provider resolution, lookups, and single-provider searches.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No provider is registered under the given name or URL.
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    /// The identifier normalized to an empty string.
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    /// No identifier could be parsed out of the URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The provider answered, but the record is missing required fields.
    #[error("incomplete metadata from provider {provider} for {id}")]
    IncompleteMetadata { provider: String, id: String },

    /// The provider lacks the capability the operation needs.
    #[error("info not found: provider {provider} cannot {operation}")]
    InfoNotFound {
        provider: String,
        operation: &'static str,
    },

    /// A provider query exceeded its deadline.
    #[error("provider {provider} timed out after {after:?}")]
    Timeout { provider: String, after: Duration },

    /// The query was cancelled before the provider answered.
    #[error("provider {0} query cancelled")]
    Cancelled(String),

    /// Passthrough of a provider fetch, parse, or search failure.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),

    /// Passthrough of a record store failure.
    #[error("record store: {0}")]
    Store(#[from] metaforged_common::Error),

    /// An internal invariant did not hold.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

impl Error {
    pub(crate) fn info_not_found(provider: &str, operation: &'static str) -> Self {
        Self::InfoNotFound {
            provider: provider.to_string(),
            operation,
        }
    }
}

/// A broken internal invariant, such as a record that names a provider that
/// is no longer registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invariant violated: {0}")]
pub struct InvariantViolation(pub String);

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            Error::ProviderNotFound("nope".into()).to_string(),
            "provider not found: nope"
        );
        assert_eq!(Error::InvalidId("  ".into()).to_string(), "invalid id: \"  \"");
        assert_eq!(
            Error::info_not_found("ref", "search").to_string(),
            "info not found: provider ref cannot search"
        );
    }

    #[test]
    fn upstream_is_transparent() {
        let err = Error::from(anyhow::anyhow!("HTTP 503"));
        assert_eq!(err.to_string(), "HTTP 503");
    }

    #[test]
    fn invariant_converts_into_error() {
        let err: Error = InvariantViolation("provider gone".into()).into();
        assert!(matches!(err, Error::Invariant(_)));
    }
}
