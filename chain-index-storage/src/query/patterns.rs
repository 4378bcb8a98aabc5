//! Queries over the `patterns` table (spec §4.F item 9) — plain CRUD; the
//! grammar itself is out of scope here (spec §1), only persistence of its
//! textual form.

use chain_index_core::{pattern_from_text, pattern_to_text, Pattern, StorageError};
use rusqlite::Connection;

/// `INSERT OR IGNORE` every pattern's persisted text form; returns the
/// number of new rows.
pub fn insert_patterns(conn: &Connection, patterns: &[Pattern]) -> Result<usize, StorageError> {
    let mut stmt = conn.prepare_cached("INSERT OR IGNORE INTO patterns (pattern) VALUES (?1)")?;
    let mut inserted = 0;
    for pattern in patterns {
        inserted += stmt.execute(rusqlite::params![pattern_to_text(pattern)])?;
    }
    Ok(inserted)
}

/// Delete a single pattern; returns the number of rows removed (0 or 1).
pub fn delete_pattern(conn: &Connection, pattern: &Pattern) -> Result<usize, StorageError> {
    let mut stmt = conn.prepare_cached("DELETE FROM patterns WHERE pattern = ?1")?;
    Ok(stmt.execute(rusqlite::params![pattern_to_text(pattern)])?)
}

/// List every persisted pattern, parsed back from its textual form.
/// `UnexpectedRow` if a persisted row fails to parse — it should never
/// have been written in the first place, since `insert_patterns` only
/// ever writes what `pattern_to_text` produces.
pub fn list_patterns(conn: &Connection) -> Result<Vec<Pattern>, StorageError> {
    let mut stmt = conn.prepare_cached("SELECT pattern FROM patterns")?;
    let mut rows = stmt.query([])?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        let pattern = pattern_from_text(&text).ok_or_else(|| StorageError::UnexpectedRow {
            context: format!("list_patterns: unrecognized persisted pattern {text:?}"),
            rows: 1,
        })?;
        result.push(pattern);
    }
    Ok(result)
}
