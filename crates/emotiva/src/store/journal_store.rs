
//! Journal entry storage. Identifiers are UUID v4 strings generated on insert.
use crate::store::{schema::*, DbPool, StoreError, StoreResult};
use chrono::Utc;
use rusqlite::params;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

pub struct JournalStore {
    pool: DbPool,
}

impl JournalStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> StoreResult<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Insert an entry and return its generated id.
    pub fn insert(&self, journal: &NewJournal) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO journals (id, email, title, content, timestamp, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &id,
                &journal.email,
                serde_json::to_string(&journal.title)?,
                serde_json::to_string(&journal.content)?,
                serde_json::to_string(&journal.timestamp)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        debug!("Stored journal {} for {}", id, journal.email);
        Ok(id)
    }

    /// All entries owned by `email`, oldest insert first.
    pub fn list_for_email(&self, email: &str) -> StoreResult<Vec<JournalEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, content, timestamp
             FROM journals WHERE email = ?1 ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map([email], |row| {
                Ok(JournalEntry {
                    id: row.get(0)?,
                    title: json_column(row.get(1)?),
                    content: json_column(row.get(2)?),
                    timestamp: json_column(row.get(3)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Overwrite title and content. Returns whether an entry matched.
    pub fn update(&self, id: &str, title: &Value, content: &Value) -> StoreResult<bool> {
        let id = parse_id(id)?;
        let conn = self.get_conn()?;
        let matched = conn.execute(
            "UPDATE journals SET title = ?1, content = ?2 WHERE id = ?3",
            params![serde_json::to_string(title)?, serde_json::to_string(content)?, id],
        )?;
        Ok(matched > 0)
    }

    /// Returns whether an entry was deleted.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let id = parse_id(id)?;
        let conn = self.get_conn()?;
        let deleted = conn.execute("DELETE FROM journals WHERE id = ?1", [id])?;
        Ok(deleted == 1)
    }
}

/// Text that is not valid JSON (edited outside the service) reads back as a string.
fn json_column(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// Normalizes to the hyphenated lowercase form used on insert.
fn parse_id(raw: &str) -> StoreResult<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| StoreError::InvalidId(raw.to_string()))
}
