//! Movie record queries.
//!
//! Movies are found lazily by release number or id; exact lookups use only
//! the `(provider, id)` key.

use metaforged_common::{Error, MovieInfo, Result};
use rusqlite::{Connection, OptionalExtension};

fn decode_movie(data: Option<String>) -> Result<Option<MovieInfo>> {
    match data {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Get a movie record by its exact `(provider, id)` key.
pub fn get_movie(conn: &Connection, provider: &str, id: &str) -> Result<Option<MovieInfo>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM movie_metadata WHERE provider = :provider AND id = :id",
            rusqlite::named_params! { ":provider": provider, ":id": id },
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    decode_movie(data)
}

/// Find a movie record of `provider` whose release number or id equals `keyword`.
pub fn find_movie_by_number_or_id(
    conn: &Connection,
    provider: &str,
    keyword: &str,
) -> Result<Option<MovieInfo>> {
    let data: Option<String> = conn
        .query_row(
            "SELECT data FROM movie_metadata
             WHERE provider = :provider AND (number = :keyword OR id = :keyword)
             ORDER BY (id = :keyword) DESC, id
             LIMIT 1",
            rusqlite::named_params! { ":provider": provider, ":keyword": keyword },
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    decode_movie(data)
}

/// Insert a movie record, or overwrite every column of the existing one.
pub fn upsert_movie(conn: &Connection, movie: &MovieInfo) -> Result<()> {
    let data = serde_json::to_string(movie)?;

    conn.execute(
        "INSERT INTO movie_metadata (provider, id, number, title, data, updated_at)
         VALUES (:provider, :id, :number, :title, :data, datetime('now'))
         ON CONFLICT (provider, id) DO UPDATE SET
             number = excluded.number,
             title = excluded.title,
             data = excluded.data,
             updated_at = excluded.updated_at",
        rusqlite::named_params! {
            ":provider": &movie.provider,
            ":id": &movie.id,
            ":number": &movie.number,
            ":title": &movie.title,
            ":data": data,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    fn movie(provider: &str, id: &str, number: &str) -> MovieInfo {
        MovieInfo {
            id: id.into(),
            number: number.into(),
            title: format!("Title of {number}"),
            provider: provider.into(),
            homepage: format!("https://{provider}.example/movies/{id}"),
            cover_url: format!("https://{provider}.example/covers/{id}.jpg"),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_then_get() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let mut stored = movie("api", "abc123", "ABC-123");
        stored.genres = vec!["Drama".into()];
        stored.score = 4.2;
        stored.runtime = 120;
        upsert_movie(&conn, &stored).unwrap();

        assert_eq!(get_movie(&conn, "api", "abc123").unwrap(), Some(stored));
        assert!(get_movie(&conn, "api", "ABC-123").unwrap().is_none());
    }

    #[test]
    fn test_find_by_number_or_id() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        upsert_movie(&conn, &movie("api", "abc123", "ABC-123")).unwrap();

        let by_number = find_movie_by_number_or_id(&conn, "api", "ABC-123").unwrap();
        assert_eq!(by_number.unwrap().id, "abc123");

        let by_id = find_movie_by_number_or_id(&conn, "api", "abc123").unwrap();
        assert_eq!(by_id.unwrap().number, "ABC-123");

        // Titles are not a lookup key.
        assert!(find_movie_by_number_or_id(&conn, "api", "Title of ABC-123")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_upsert_last_writer_wins() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let mut first = movie("api", "abc123", "ABC-123");
        first.maker = "First Maker".into();
        upsert_movie(&conn, &first).unwrap();

        let mut second = movie("api", "abc123", "ABC-124");
        second.title = "Renamed".into();
        upsert_movie(&conn, &second).unwrap();

        let fetched = get_movie(&conn, "api", "abc123").unwrap().unwrap();
        assert_eq!(fetched.number, "ABC-124");
        assert_eq!(fetched.title, "Renamed");
        assert!(fetched.maker.is_empty());
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM movie_metadata", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
