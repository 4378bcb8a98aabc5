//! Queries over the `binary_data` table (spec §4.F item 10).

use chain_index_core::{BinaryDataRow, StorageError};
use rusqlite::{Connection, OptionalExtension};

use crate::query::as_params;

/// `INSERT OR IGNORE` every row; returns the number of new rows.
pub fn insert_binary_data(conn: &Connection, rows: &[BinaryDataRow]) -> Result<usize, StorageError> {
    use chain_index_core::RowCodec;

    let mut stmt =
        conn.prepare_cached("INSERT OR IGNORE INTO binary_data (binary_data_hash, binary_data) VALUES (?, ?)")?;
    let mut inserted = 0;
    for row in rows {
        let cells = row.to_row();
        inserted += stmt.execute(as_params(&cells).as_slice())?;
    }
    Ok(inserted)
}

/// Fetch the bytes for a content hash, or `None` if absent.
pub fn get_binary_data(conn: &Connection, hash: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
    conn.query_row(
        "SELECT binary_data FROM binary_data WHERE binary_data_hash = ?1",
        rusqlite::params![hash],
        |row| row.get(0),
    )
    .optional()
    .map_err(StorageError::from)
}

/// Delete every `binary_data` row unreferenced by any input. The `ORDER
/// BY inputs.datum_hash` clause in the subquery is load-bearing (spec
/// §9): it steers the planner onto `inputsByDatumHash`, turning what
/// would otherwise be an hours-long table scan on a large store into a
/// sub-second indexed anti-join. Do not "simplify" it away.
pub fn prune_binary_data(conn: &Connection) -> Result<usize, StorageError> {
    let mut stmt = conn.prepare_cached(
        "DELETE FROM binary_data
         WHERE binary_data_hash NOT IN (
             SELECT datum_hash FROM inputs
             WHERE datum_hash IS NOT NULL
             ORDER BY inputs.datum_hash
         )",
    )?;
    Ok(stmt.execute([])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_index_core::{Checkpoint, Input};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_get_roundtrips() {
        let conn = setup();
        let row = BinaryDataRow { binary_data_hash: vec![1, 2, 3], binary_data: vec![9, 9, 9] };
        assert_eq!(insert_binary_data(&conn, &[row.clone()]).unwrap(), 1);
        assert_eq!(get_binary_data(&conn, &row.binary_data_hash).unwrap(), Some(row.binary_data));
    }

    #[test]
    fn get_binary_data_missing_is_none() {
        let conn = setup();
        assert_eq!(get_binary_data(&conn, &[0xFF]).unwrap(), None);
    }

    #[test]
    fn prune_removes_only_orphans() {
        let conn = setup();
        let orphan = BinaryDataRow { binary_data_hash: vec![1], binary_data: vec![0xAA] };
        let referenced = BinaryDataRow { binary_data_hash: vec![2], binary_data: vec![0xBB] };
        insert_binary_data(&conn, &[orphan.clone(), referenced.clone()]).unwrap();

        crate::query::checkpoints::insert_checkpoints(
            &conn,
            &[Checkpoint { slot_no: 10, header_hash: vec![0] }],
        )
        .unwrap();
        crate::query::inputs::insert_inputs(
            &conn,
            &[crate::query::inputs::InputRecord {
                input: Input {
                    extended_output_reference: vec![0],
                    address: "addr".to_string(),
                    value: vec![1],
                    datum_hash: Some(referenced.binary_data_hash.clone()),
                    script_hash: None,
                    payment_credential: "cred".to_string(),
                    created_at: 10,
                    spent_at: None,
                    transaction_index: 0,
                    output_index: 0,
                },
                binary_data: None,
                script: None,
            }],
        )
        .unwrap();

        assert_eq!(prune_binary_data(&conn).unwrap(), 1);
        assert_eq!(get_binary_data(&conn, &orphan.binary_data_hash).unwrap(), None);
        assert_eq!(
            get_binary_data(&conn, &referenced.binary_data_hash).unwrap(),
            Some(referenced.binary_data)
        );
    }
}
