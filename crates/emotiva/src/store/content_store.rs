
//! Recommendation record storage. Blocks are kept as a JSON document per record.
use crate::store::{schema::*, DbPool, StoreResult};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use std::path::Path;
use tracing::info;

pub struct ContentStore {
    pool: DbPool,
}

impl ContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> StoreResult<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Insert or replace a record by id.
    pub fn upsert(&self, record: &RecommendationRecord) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO recommendations (id, title, blocks, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &record.id,
                &record.title,
                serde_json::to_string(&record.blocks)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<RecommendationRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT id, title, blocks FROM recommendations WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, title, blocks_json)) => Ok(Some(RecommendationRecord {
                id,
                title,
                blocks: serde_json::from_str(&blocks_json)?,
            })),
            None => Ok(None),
        }
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM recommendations", [], |row| row.get(0))?)
    }

    /// Load a JSON array of records and upsert each one in a single transaction.
    /// Returns the number of records written.
    pub fn import_from_file(&self, path: &Path) -> StoreResult<usize> {
        let raw = std::fs::read_to_string(path)?;
        let records: Vec<RecommendationRecord> = serde_json::from_str(&raw)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for record in &records {
            tx.execute(
                "INSERT OR REPLACE INTO recommendations (id, title, blocks, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![&record.id, &record.title, serde_json::to_string(&record.blocks)?, &now],
            )?;
        }
        tx.commit()?;

        info!("Imported {} recommendation records from {}", records.len(), path.display());
        Ok(records.len())
    }
}
