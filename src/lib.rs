//! Metaforged - Actor and movie metadata aggregation
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod metadata;
