//! Storage-layer errors for SQLite operations.

/// Errors that can occur in the storage layer.
///
/// Transient lock contention (`SQLITE_BUSY` / `SQLITE_LOCKED`) is handled
/// internally by the transaction runner's retry loop and never reaches the
/// caller as this error — everything below is either a deterministic query
/// failure or a fatal schema/invariant violation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A SQLite call failed for a reason other than busy/locked.
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    /// A migration script failed to apply; the enclosing transaction was
    /// rolled back, so the database is left at the prior version.
    #[error("migration to version {version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    /// `PRAGMA user_version` did not yield a non-negative integer.
    #[error("unexpected user_version value: {0}")]
    UnexpectedUserVersion(String),

    /// A query returned a row shape the caller did not expect (wrong
    /// column count/type, or an unexpected number of rows for a query that
    /// assumes at most one).
    #[error("unexpected row shape in {context}: {rows} row(s)")]
    UnexpectedRow { context: String, rows: usize },

    /// The lock coordinator's internal mutex was poisoned by a panicking
    /// holder. Unrecoverable for the lifetime of the process.
    #[error("lock coordinator poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    pub(crate) fn sqlite(err: rusqlite::Error) -> Self {
        Self::Sqlite {
            message: err.to_string(),
        }
    }

    /// True when the underlying SQLite error code is `SQLITE_BUSY` or
    /// `SQLITE_LOCKED` — the two codes the transaction runner retries on.
    pub fn is_transient(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                )
        )
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::sqlite(err)
    }
}
