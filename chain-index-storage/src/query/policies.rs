//! Queries over the `policies` table — a plain child table of `inputs`
//! (spec §3) used by the asset-filter slice of the pattern grammar, which
//! is itself out of scope (spec §1). The storage engine still owns this
//! table's CRUD.

use chain_index_core::{PolicyRow, RowCodec, StorageError};
use rusqlite::Connection;

use crate::query::as_params;

/// `INSERT OR IGNORE` every policy link; returns the number of new rows.
pub fn insert_policies(conn: &Connection, rows: &[PolicyRow]) -> Result<usize, StorageError> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO policies (output_reference, policy_id) VALUES (?, ?)",
    )?;
    let mut inserted = 0;
    for row in rows {
        let cells = row.to_row();
        inserted += stmt.execute(as_params(&cells).as_slice())?;
    }
    Ok(inserted)
}

/// Every policy ID carried by a given input.
pub fn list_policies_by_output_reference(
    conn: &Connection,
    output_reference: &[u8],
) -> Result<Vec<PolicyRow>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT output_reference, policy_id FROM policies WHERE output_reference = ?1",
    )?;
    let mut rows = stmt.query(rusqlite::params![output_reference])?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        result.push(PolicyRow {
            output_reference: row.get(0)?,
            policy_id: row.get(1)?,
        });
    }
    Ok(result)
}

/// Delete every policy link for an input (its rollback/deletion path).
pub fn delete_policies_by_output_reference(
    conn: &Connection,
    output_reference: &[u8],
) -> Result<usize, StorageError> {
    let mut stmt = conn.prepare_cached("DELETE FROM policies WHERE output_reference = ?1")?;
    Ok(stmt.execute(rusqlite::params![output_reference])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_index_core::{Checkpoint, Input};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&conn).unwrap();
        crate::query::checkpoints::insert_checkpoints(
            &conn,
            &[Checkpoint { slot_no: 10, header_hash: vec![0] }],
        )
        .unwrap();
        crate::query::inputs::insert_inputs(
            &conn,
            &[crate::query::inputs::InputRecord {
                input: Input {
                    extended_output_reference: vec![1],
                    address: "addr".to_string(),
                    value: vec![1],
                    datum_hash: None,
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
        conn
    }

    #[test]
    fn insert_then_list_roundtrips() {
        let conn = setup();
        let rows = vec![
            PolicyRow { output_reference: vec![1], policy_id: "policyA".to_string() },
            PolicyRow { output_reference: vec![1], policy_id: "policyB".to_string() },
        ];
        assert_eq!(insert_policies(&conn, &rows).unwrap(), 2);
        assert_eq!(list_policies_by_output_reference(&conn, &[1]).unwrap().len(), 2);
    }

    #[test]
    fn delete_removes_all_for_reference() {
        let conn = setup();
        insert_policies(
            &conn,
            &[PolicyRow { output_reference: vec![1], policy_id: "policyA".to_string() }],
        )
        .unwrap();
        assert_eq!(delete_policies_by_output_reference(&conn, &[1]).unwrap(), 1);
        assert!(list_policies_by_output_reference(&conn, &[1]).unwrap().is_empty());
    }
}
