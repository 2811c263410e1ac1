
//! Store module - SQLite-backed persistence for users, journals and recommendation records
pub mod schema;
pub mod migration;
pub mod error;
pub mod user_store;
pub mod journal_store;
pub mod content_store;
pub use schema::*;
pub use error::{StoreError, StoreResult};
pub use migration::MigrationManager;
pub use user_store::UserStore;
pub use journal_store::JournalStore;
pub use content_store::ContentStore;
use std::path::Path;
use std::sync::Arc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

pub(crate) type DbPool = Arc<Pool<SqliteConnectionManager>>;

/// Handle over the three collections. Cheap to share behind `Arc`.
pub struct EmotivaDatabase {
    pub users: UserStore,
    pub journals: JournalStore,
    pub content: ContentStore,
    pool: DbPool,
}

impl EmotivaDatabase {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn new(db_path: &Path, pool_size: u32) -> anyhow::Result<Self> {
        info!("Opening emotiva database at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let manager = SqliteConnectionManager::file(db_path)
            .with_flags(
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;",
                )
            });
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| anyhow::anyhow!("Failed to create connection pool: {}", e))?;

        {
            let mut conn = pool.get()?;
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            MigrationManager::new(&mut conn).initialize_database()?;
        }
        info!("Emotiva database initialized successfully");
        Ok(Self::from_pool(Arc::new(pool)))
    }

    /// In-memory database. Every SQLite in-memory connection is its own
    /// database, so the pool is pinned to a single connection.
    pub fn new_in_memory() -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)?;
        {
            let mut conn = pool.get()?;
            MigrationManager::new(&mut conn).initialize_database()?;
        }
        Ok(Self::from_pool(Arc::new(pool)))
    }

    fn from_pool(pool: DbPool) -> Self {
        Self {
            users: UserStore::new(Arc::clone(&pool)),
            journals: JournalStore::new(Arc::clone(&pool)),
            content: ContentStore::new(Arc::clone(&pool)),
            pool,
        }
    }

    pub fn get_stats(&self) -> StoreResult<DatabaseStats> {
        let conn = self.pool.get()?;
        Ok(migration::get_database_stats(&conn)?)
    }
}

impl Drop for EmotivaDatabase {
    fn drop(&mut self) {
        if let Ok(conn) = self.pool.get() {
            let _ = conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
        }
    }
}
