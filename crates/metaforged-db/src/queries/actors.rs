//! Actor record queries.
//!
//! Exact lookups use only the `(provider, id)` key. The name-or-id lookup is
//! reserved for the lazy search shortcut.

use metaforged_common::{ActorInfo, Error, Result};
use rusqlite::{Connection, OptionalExtension};

fn data_column(row: &rusqlite::Row) -> rusqlite::Result<String> {
    row.get(0)
}

fn decode(data: Option<String>) -> Result<Option<ActorInfo>> {
    data.map(|json| serde_json::from_str(&json).map_err(Error::from))
        .transpose()
}

/// Get an actor record by its exact `(provider, id)` key.
///
/// # Returns
///
/// * `Ok(Some(ActorInfo))` - The stored record
/// * `Ok(None)` - If no record is stored under the key
/// * `Err(Error)` - If a database or decoding error occurs
pub fn get_actor(conn: &Connection, provider: &str, id: &str) -> Result<Option<ActorInfo>> {
    let data = conn
        .query_row(
            "SELECT data FROM actor_metadata WHERE provider = :provider AND id = :id",
            rusqlite::named_params! { ":provider": provider, ":id": id },
            data_column,
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    decode(data)
}

/// Find an actor record of `provider` whose name or id equals `keyword`.
///
/// An id match wins over a name match when both exist.
pub fn find_actor_by_name_or_id(
    conn: &Connection,
    provider: &str,
    keyword: &str,
) -> Result<Option<ActorInfo>> {
    let data = conn
        .query_row(
            "SELECT data FROM actor_metadata
             WHERE provider = :provider AND (name = :keyword OR id = :keyword)
             ORDER BY (id = :keyword) DESC, id
             LIMIT 1",
            rusqlite::named_params! { ":provider": provider, ":keyword": keyword },
            data_column,
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    decode(data)
}

/// Insert an actor record, or overwrite every column of the existing one.
pub fn upsert_actor(conn: &Connection, actor: &ActorInfo) -> Result<()> {
    let data = serde_json::to_string(actor)?;

    conn.execute(
        "INSERT INTO actor_metadata (provider, id, name, data, updated_at)
         VALUES (:provider, :id, :name, :data, datetime('now'))
         ON CONFLICT (provider, id) DO UPDATE SET
             name = excluded.name,
             data = excluded.data,
             updated_at = excluded.updated_at",
        rusqlite::named_params! {
            ":provider": &actor.provider,
            ":id": &actor.id,
            ":name": &actor.name,
            ":data": data,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}
