//! Metaforged-DB: Record store schema, migrations, and query operations
//!
//! This crate persists fetched actor and movie records in SQLite using
//! rusqlite and r2d2 connection pooling. Records are keyed by
//! `(provider, id)` and written with insert-or-overwrite semantics.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `queries` - Actor and movie record queries
//!
//! # Example
//!
//! ```no_run
//! use metaforged_db::pool::{init_pool, get_conn};
//! use metaforged_db::queries::actors;
//!
//! let pool = init_pool("/var/lib/metaforged/db.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let actor = actors::get_actor(&conn, "reference", "1001").unwrap();
//! println!("Cached: {}", actor.is_some());
//! ```

pub mod migrations;
pub mod pool;
pub mod queries;
