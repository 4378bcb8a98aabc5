//! `rollback_to` (spec §4.F item 12): the privileged operation that
//! reverts the store to an earlier chain position.

use chain_index_core::StorageError;
use rusqlite::Connection;

use crate::index_manager;

/// Roll the store back to `target_slot`. Fast path: if the current tip
/// already equals `target_slot`, this is a no-op (restart-to-tip).
/// Otherwise, wrapped in the ephemeral index bracket for both
/// `inputsBySpentAt` and `inputsByCreatedAt` (the three DML statements
/// below scan on both columns):
///
/// 1. `DELETE FROM inputs WHERE created_at > target`
/// 2. `UPDATE inputs SET spent_at = NULL WHERE spent_at > target`
/// 3. `DELETE FROM checkpoints WHERE slot_no > target`
///
/// followed by `PRAGMA optimize` to refresh planner statistics. Returns
/// the new tip, or `None` if checkpoints are now empty.
pub fn rollback_to(conn: &Connection, target_slot: u64) -> Result<Option<u64>, StorageError> {
    let current_tip: Option<i64> =
        conn.query_row("SELECT MAX(slot_no) FROM checkpoints", [], |row| row.get(0))?;

    let target = target_slot as i64;
    if current_tip == Some(target) {
        return Ok(Some(target_slot));
    }

    index_manager::with_ephemeral_index(
        conn,
        index_manager::INPUTS_BY_SPENT_AT.0,
        index_manager::INPUTS_BY_SPENT_AT.1,
        |conn| {
            index_manager::with_ephemeral_index(
                conn,
                index_manager::INPUTS_BY_CREATED_AT.0,
                index_manager::INPUTS_BY_CREATED_AT.1,
                |conn| {
                    conn.execute("DELETE FROM inputs WHERE created_at > ?1", rusqlite::params![target])?;
                    conn.execute(
                        "UPDATE inputs SET spent_at = NULL WHERE spent_at > ?1",
                        rusqlite::params![target],
                    )?;
                    conn.execute("DELETE FROM checkpoints WHERE slot_no > ?1", rusqlite::params![target])?;
                    Ok(())
                },
            )
        },
    )?;

    conn.execute_batch("PRAGMA optimize;")?;

    let new_tip: Option<i64> =
        conn.query_row("SELECT MAX(slot_no) FROM checkpoints", [], |row| row.get(0))?;
    match new_tip {
        None => Ok(None),
        Some(slot) if slot >= 0 => Ok(Some(slot as u64)),
        Some(slot) => Err(StorageError::UnexpectedRow {
            context: format!("rollback_to: checkpoints.slot_no returned negative value {slot}"),
            rows: 1,
        }),
    }
}
