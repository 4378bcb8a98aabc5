//! Queries over the `scripts` table (spec §4.F item 11).

use chain_index_core::{RowCodec, ScriptRow, StorageError};
use rusqlite::{Connection, OptionalExtension};

use crate::query::as_params;

/// `INSERT OR IGNORE` every row; returns the number of new rows.
pub fn insert_scripts(conn: &Connection, rows: &[ScriptRow]) -> Result<usize, StorageError> {
    let mut stmt = conn.prepare_cached("INSERT OR IGNORE INTO scripts (script_hash, script) VALUES (?, ?)")?;
    let mut inserted = 0;
    for row in rows {
        let cells = row.to_row();
        inserted += stmt.execute(as_params(&cells).as_slice())?;
    }
    Ok(inserted)
}

/// Fetch the bytes for a script hash, or `None` if absent.
pub fn get_script(conn: &Connection, hash: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
    conn.query_row(
        "SELECT script FROM scripts WHERE script_hash = ?1",
        rusqlite::params![hash],
        |row| row.get(0),
    )
    .optional()
    .map_err(StorageError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_get_roundtrips() {
        let conn = setup();
        let row = ScriptRow { script_hash: vec![7, 7], script: vec![0xDE, 0xAD] };
        assert_eq!(insert_scripts(&conn, &[row.clone()]).unwrap(), 1);
        assert_eq!(get_script(&conn, &row.script_hash).unwrap(), Some(row.script));
    }

    #[test]
    fn get_script_missing_is_none() {
        let conn = setup();
        assert_eq!(get_script(&conn, &[0x00]).unwrap(), None);
    }

    #[test]
    fn insert_scripts_is_idempotent() {
        let conn = setup();
        let row = ScriptRow { script_hash: vec![1], script: vec![2] };
        assert_eq!(insert_scripts(&conn, &[row.clone()]).unwrap(), 1);
        assert_eq!(insert_scripts(&conn, &[row]).unwrap(), 0);
    }
}
