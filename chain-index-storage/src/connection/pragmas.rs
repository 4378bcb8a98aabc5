//! PRAGMA configuration applied to every connection the engine opens.

use chain_index_core::StorageError;
use rusqlite::Connection;

/// Pragmas shared by every connection, regardless of lifetime or mode.
fn apply_common_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA page_size = 16184;
        PRAGMA cache_size = -50000;
        ",
    )
    .map_err(StorageError::from)
}

/// Pragmas for the single long-lived writer connection: WAL journaling,
/// relaxed (but still crash-safe) sync, and foreign-key enforcement.
pub fn apply_long_lived_pragmas(conn: &Connection) -> Result<(), StorageError> {
    apply_common_pragmas(conn)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(StorageError::from)
}

/// Pragmas for a short-lived read-only connection: `read_uncommitted`
/// permits it to observe the writer's in-progress WAL tail without
/// blocking on the writer's locks.
pub fn apply_short_lived_read_pragmas(conn: &Connection) -> Result<(), StorageError> {
    apply_common_pragmas(conn)?;
    conn.execute_batch("PRAGMA read_uncommitted = 1;")
        .map_err(StorageError::from)
}

/// Pragmas for a short-lived read-write connection (e.g. interactive
/// pattern management). No `read_uncommitted` — it writes, so it must see
/// a consistent view.
pub fn apply_short_lived_write_pragmas(conn: &Connection) -> Result<(), StorageError> {
    apply_common_pragmas(conn)
}
