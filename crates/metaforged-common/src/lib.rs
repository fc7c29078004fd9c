//! Metaforged-Common: Shared models, validity rules, and errors.
//!
//! This crate provides functionality used across metaforged:
//!
//! - **Entity Models**: Actor and movie records plus their search projections
//! - **Validity**: Per-type required-field tables gating caching and persistence
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use metaforged_common::{ActorInfo, Error, Result};
//!
//! let actor = ActorInfo {
//!     id: "1001".into(),
//!     name: "Example".into(),
//!     provider: "reference".into(),
//!     homepage: "https://example.com/actors/1001".into(),
//!     ..Default::default()
//! };
//! assert!(actor.is_valid());
//!
//! fn example() -> Result<()> {
//!     Err(Error::database("actor_metadata is locked"))
//! }
//! ```

pub mod error;
pub mod types;
pub mod validity;

pub use error::{Error, Result};
pub use types::*;
