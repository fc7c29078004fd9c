//! Database query modules.
//!
//! Records are grouped by entity kind:
//! - actors: Actor record lookup and upsert
//! - movies: Movie record lookup and upsert

pub mod actors;
pub mod movies;
