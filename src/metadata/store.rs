//! Record store contract consumed by the lookup and search code.
//!
//! [`SqliteRecordStore`] persists records through `metaforged-db`;
//! [`MemoryStore`] keeps them in a map for embedding and tests. Both key every
//! record by `(provider, id)` and overwrite all fields on upsert.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use metaforged_common::{ActorInfo, Error, MovieInfo, Result};
use metaforged_db::pool::{get_conn, DbPool};
use metaforged_db::queries::{actors, movies};
use parking_lot::Mutex;
use rusqlite::Connection;

use super::entity::Entity;

/// Key-indexed persistence for fetched records.
#[async_trait]
pub trait RecordStore<E: Entity>: Send + Sync {
    /// Exact `(provider, id)` lookup.
    async fn find_exact(&self, provider: &str, id: &str) -> Result<Option<E>>;

    /// Lazy shortcut: a record of `provider` whose id or name key equals
    /// `keyword`.
    async fn find_by_name_or_id(&self, provider: &str, keyword: &str) -> Result<Option<E>>;

    /// Insert, or overwrite every field of the record with the same key.
    async fn upsert(&self, record: &E) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// SQLite-backed store. Queries run on the blocking pool so a slow disk
/// never stalls other provider tasks.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: DbPool,
}

impl SqliteRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::internal(format!("store task failed: {e}")))?
    }
}

#[async_trait]
impl RecordStore<ActorInfo> for SqliteRecordStore {
    async fn find_exact(&self, provider: &str, id: &str) -> Result<Option<ActorInfo>> {
        let (provider, id) = (provider.to_string(), id.to_string());
        self.with_conn(move |conn| actors::get_actor(conn, &provider, &id))
            .await
    }

    async fn find_by_name_or_id(&self, provider: &str, keyword: &str) -> Result<Option<ActorInfo>> {
        let (provider, keyword) = (provider.to_string(), keyword.to_string());
        self.with_conn(move |conn| actors::find_actor_by_name_or_id(conn, &provider, &keyword))
            .await
    }

    async fn upsert(&self, record: &ActorInfo) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| actors::upsert_actor(conn, &record))
            .await
    }
}

#[async_trait]
impl RecordStore<MovieInfo> for SqliteRecordStore {
    async fn find_exact(&self, provider: &str, id: &str) -> Result<Option<MovieInfo>> {
        let (provider, id) = (provider.to_string(), id.to_string());
        self.with_conn(move |conn| movies::get_movie(conn, &provider, &id))
            .await
    }

    async fn find_by_name_or_id(&self, provider: &str, keyword: &str) -> Result<Option<MovieInfo>> {
        let (provider, keyword) = (provider.to_string(), keyword.to_string());
        self.with_conn(move |conn| movies::find_movie_by_number_or_id(conn, &provider, &keyword))
            .await
    }

    async fn upsert(&self, record: &MovieInfo) -> Result<()> {
        let record = record.clone();
        self.with_conn(move |conn| movies::upsert_movie(conn, &record))
            .await
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Map-backed store that also counts upserts.
pub struct MemoryStore<E: Entity> {
    records: Mutex<HashMap<(String, String), E>>,
    writes: AtomicUsize,
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed a record without counting it as a write.
    pub fn insert(&self, record: E) {
        let key = (record.provider().to_string(), record.id().to_string());
        self.records.lock().insert(key, record);
    }

    pub fn get(&self, provider: &str, id: &str) -> Option<E> {
        self.records
            .lock()
            .get(&(provider.to_string(), id.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Number of upserts performed through [`RecordStore::upsert`].
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for MemoryStore<E> {
    async fn find_exact(&self, provider: &str, id: &str) -> Result<Option<E>> {
        Ok(self.get(provider, id))
    }

    async fn find_by_name_or_id(&self, provider: &str, keyword: &str) -> Result<Option<E>> {
        if let Some(record) = self.get(provider, keyword) {
            return Ok(Some(record));
        }
        let records = self.records.lock();
        Ok(records
            .values()
            .filter(|r| r.provider() == provider && r.name_key() == keyword)
            .min_by(|a, b| a.id().cmp(b.id()))
            .cloned())
    }

    async fn upsert(&self, record: &E) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.insert(record.clone());
        Ok(())
    }
}
