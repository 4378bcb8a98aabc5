//! Queries over the `checkpoints` table (spec §4.F items 6-8).

use std::collections::HashSet;

use chain_index_core::{Cell, Checkpoint, RowCodec, StorageError};
use rusqlite::Connection;

use crate::query::as_params;

/// `INSERT OR IGNORE` every checkpoint; returns the number of new rows.
pub fn insert_checkpoints(
    conn: &Connection,
    checkpoints: &[Checkpoint],
) -> Result<usize, StorageError> {
    let mut stmt =
        conn.prepare_cached("INSERT OR IGNORE INTO checkpoints (slot_no, header_hash) VALUES (?, ?)")?;
    let mut inserted = 0;
    for checkpoint in checkpoints {
        let cells = checkpoint.to_row();
        inserted += stmt.execute(as_params(&cells).as_slice())?;
    }
    Ok(inserted)
}

/// The smallest checkpoint with `slot_no >= threshold`, or `None` if
/// every checkpoint is below it.
fn smallest_at_or_above(conn: &Connection, threshold: u64) -> Result<Option<Checkpoint>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT slot_no, header_hash FROM checkpoints WHERE slot_no >= ?1 ORDER BY slot_no ASC LIMIT 1",
    )?;
    let mut rows = stmt.query(rusqlite::params![threshold as i64])?;
    match rows.next()? {
        Some(row) => {
            let cells = vec![Cell::from(row.get_ref(0)?), Cell::from(row.get_ref(1)?)];
            Ok(Some(Checkpoint::from_row(&cells)?))
        }
        None => Ok(None),
    }
}

/// The offsets-behind-tip to probe, per spec §4.F item 7 / §9's resolved
/// open question: for `k <= 10` every slot in the window is sampled
/// (dense sampling collapses to duplicates otherwise at small `k`);
/// above that, a dense near-tip band plus a logarithmically decaying
/// tail of coarser offsets.
fn sampling_offsets(longest_rollback: u64) -> Vec<u64> {
    if longest_rollback <= 10 {
        return (0..=longest_rollback).collect();
    }

    let n = (longest_rollback as f64).log2().ceil() as u32;
    let dense_limit = longest_rollback / 2u64.pow(n);

    let mut offsets: Vec<u64> = (0..=dense_limit).step_by(10).collect();
    for i in (0..n).rev() {
        offsets.push(longest_rollback / 2u64.pow(i));
    }
    offsets
}

/// A sparse, logarithmic sample of the checkpoint tail: for each probed
/// offset, the single smallest checkpoint at or above `tip - offset`,
/// union-deduped by `slot_no` and returned descending. Gives chain-sync
/// clients a fast-intersect ladder without scanning every checkpoint.
pub fn list_checkpoints_desc(
    conn: &Connection,
    longest_rollback: u64,
) -> Result<Vec<Checkpoint>, StorageError> {
    let tip: Option<i64> =
        conn.query_row("SELECT MAX(slot_no) FROM checkpoints", [], |row| row.get(0))?;
    let Some(tip) = tip else {
        return Ok(Vec::new());
    };
    let tip = tip as u64;

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for offset in sampling_offsets(longest_rollback) {
        let threshold = tip.saturating_sub(offset);
        if let Some(checkpoint) = smallest_at_or_above(conn, threshold)? {
            if seen.insert(checkpoint.slot_no) {
                result.push(checkpoint);
            }
        }
    }
    result.sort_by(|a, b| b.slot_no.cmp(&a.slot_no));
    Ok(result)
}

/// `SELECT * FROM checkpoints WHERE slot_no < slot ORDER BY slot_no DESC
/// LIMIT n`.
pub fn list_ancestors_desc(
    conn: &Connection,
    slot: u64,
    n: usize,
) -> Result<Vec<Checkpoint>, StorageError> {
    let mut stmt = conn.prepare_cached(
        "SELECT slot_no, header_hash FROM checkpoints WHERE slot_no < ?1 ORDER BY slot_no DESC LIMIT ?2",
    )?;
    let mut rows = stmt.query(rusqlite::params![slot as i64, n as i64])?;

    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let cells = vec![Cell::from(row.get_ref(0)?), Cell::from(row.get_ref(1)?)];
        result.push(Checkpoint::from_row(&cells)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn checkpoints(slots: &[u64]) -> Vec<Checkpoint> {
        slots
            .iter()
            .map(|&slot_no| Checkpoint { slot_no, header_hash: vec![slot_no as u8] })
            .collect()
    }

    #[test]
    fn head_of_list_checkpoints_desc_is_the_tip() {
        let conn = setup();
        insert_checkpoints(&conn, &checkpoints(&[0, 10, 20, 30])).unwrap();
        let list = list_checkpoints_desc(&conn, 5).unwrap();
        assert_eq!(list.first().unwrap().slot_no, 30);
        for pair in list.windows(2) {
            assert!(pair[0].slot_no > pair[1].slot_no);
        }
    }

    #[test]
    fn small_k_samples_every_slot() {
        let conn = setup();
        insert_checkpoints(&conn, &checkpoints(&[0, 1, 2, 3, 4, 5])).unwrap();
        let list = list_checkpoints_desc(&conn, 5).unwrap();
        assert_eq!(list.len(), 6);
    }

    #[test]
    fn list_ancestors_desc_excludes_slot_itself() {
        let conn = setup();
        insert_checkpoints(&conn, &checkpoints(&[0, 10, 20, 30])).unwrap();
        let ancestors = list_ancestors_desc(&conn, 20, 10).unwrap();
        assert_eq!(
            ancestors.iter().map(|c| c.slot_no).collect::<Vec<_>>(),
            vec![10, 0]
        );
    }

    #[test]
    fn one_step_ancestors_concatenate_into_full_list() {
        let conn = setup();
        let slots = [0, 10, 20, 30];
        insert_checkpoints(&conn, &checkpoints(&slots)).unwrap();

        let mut stepwise = Vec::new();
        for &slot in slots.iter().rev() {
            if let Some(ancestor) = list_ancestors_desc(&conn, slot, 1).unwrap().into_iter().next() {
                stepwise.push(ancestor.slot_no);
            }
        }
        let whole = list_ancestors_desc(&conn, 30, slots.len())
            .unwrap()
            .into_iter()
            .map(|c| c.slot_no)
            .collect::<Vec<_>>();
        assert_eq!(stepwise, whole);
    }

    #[test]
    fn empty_store_yields_empty_list() {
        let conn = setup();
        assert!(list_checkpoints_desc(&conn, 5).unwrap().is_empty());
    }
}
