
//! User account storage
use crate::store::{schema::*, DbPool, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> StoreResult<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Insert a new account. `password_hash` must already be hashed.
    pub fn create_user(&self, name: &str, email: &str, password_hash: &str) -> StoreResult<User> {
        let conn = self.get_conn()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (name, email, password, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, email, password_hash, now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(|e| {
            if StoreError::is_unique_violation(&e) {
                StoreError::DuplicateEmail
            } else {
                StoreError::Database(e)
            }
        })?;

        info!("Created user account for {}", email);
        Ok(User {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                "SELECT id, name, email, password, created_at, updated_at
                 FROM users WHERE email = ?1",
                [email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Apply only the provided fields. Returns the updated row, or `None`
    /// when no account has this email.
    pub fn update_profile(&self, email: &str, update: &ProfileUpdate) -> StoreResult<Option<User>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let mut matched = tx.execute(
            "UPDATE users SET updated_at = ?1 WHERE email = ?2",
            params![now, email],
        )?;
        if let Some(name) = &update.name {
            matched = tx.execute("UPDATE users SET name = ?1 WHERE email = ?2", params![name, email])?;
        }
        if let Some(hash) = &update.password_hash {
            matched = tx.execute("UPDATE users SET password = ?1 WHERE email = ?2", params![hash, email])?;
        }

        if matched == 0 {
            debug!("Profile update matched no user for {}", email);
            return Ok(None);
        }

        let user = tx.query_row(
            "SELECT id, name, email, password, created_at, updated_at
             FROM users WHERE email = ?1",
            [email],
            row_to_user,
        )?;
        tx.commit()?;

        info!("Updated profile for {}", email);
        Ok(Some(user))
    }
}

fn parse_timestamp(raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: parse_timestamp(row.get(4)?)?,
        updated_at: parse_timestamp(row.get(5)?)?,
    })
}
