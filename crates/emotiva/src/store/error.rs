use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User already exists")]
    DuplicateEmail,

    #[error("'{0}' is not a valid journal id")]
    InvalidId(String),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when SQLite rejected a write on a UNIQUE index.
    pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
        matches!(
            e,
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
