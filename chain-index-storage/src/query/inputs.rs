//! Queries over the `inputs` table (spec §4.F items 1-5).

use chain_index_core::{
    pattern_to_sql, status_flag_to_sql, BinaryDataRow, Cancellable, Cell, Input, Pattern,
    RowCodec, ScriptRow, SortDirection, StatusFlag, StorageError,
};
use rusqlite::Connection;

use crate::index_manager;
use crate::query::as_params;

/// A single input ready to insert, bundled with the binary-data and
/// script rows it references, if any. `insert_inputs` upserts all three
/// in one pass per spec §4.F item 1.
#[derive(Debug, Clone)]
pub struct InputRecord {
    pub input: Input,
    pub binary_data: Option<BinaryDataRow>,
    pub script: Option<ScriptRow>,
}

/// `INSERT OR IGNORE` every input, plus its referenced `binary_data` and
/// `scripts` rows when present. Idempotent per
/// `extended_output_reference`; returns the number of *new* input rows
/// written (rows ignored as duplicates do not count).
pub fn insert_inputs(conn: &Connection, records: &[InputRecord]) -> Result<usize, StorageError> {
    let mut input_stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO inputs
         (extended_output_reference, address, value, datum_hash, script_hash,
          payment_credential, created_at, spent_at, transaction_index, output_index)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )?;
    let mut binary_stmt = conn
        .prepare_cached("INSERT OR IGNORE INTO binary_data (binary_data_hash, binary_data) VALUES (?, ?)")?;
    let mut script_stmt =
        conn.prepare_cached("INSERT OR IGNORE INTO scripts (script_hash, script) VALUES (?, ?)")?;

    let mut inserted = 0;
    for record in records {
        let cells = record.input.to_row();
        inserted += input_stmt.execute(as_params(&cells).as_slice())?;

        if let Some(binary_data) = &record.binary_data {
            let cells = binary_data.to_row();
            binary_stmt.execute(as_params(&cells).as_slice())?;
        }
        if let Some(script) = &record.script {
            let cells = script.to_row();
            script_stmt.execute(as_params(&cells).as_slice())?;
        }
    }
    Ok(inserted)
}

/// `DELETE FROM inputs <where-clause-from-pattern>` for each pattern;
/// returns the sum of affected rows.
pub fn delete_inputs(conn: &Connection, patterns: &[Pattern]) -> Result<usize, StorageError> {
    let mut total = 0;
    for pattern in patterns {
        let predicate = pattern_to_sql(pattern);
        let sql = format!("DELETE FROM inputs WHERE {}", predicate.sql_fragment);
        let mut stmt = conn.prepare_cached(&sql)?;
        total += stmt.execute(as_params(&predicate.params).as_slice())?;
    }
    Ok(total)
}

/// `UPDATE inputs SET spent_at = ? <where-clause>` for each pattern;
/// returns the sum of affected rows.
pub fn mark_inputs(
    conn: &Connection,
    slot: u64,
    patterns: &[Pattern],
) -> Result<usize, StorageError> {
    let slot = slot as i64;
    let mut total = 0;
    for pattern in patterns {
        let predicate = pattern_to_sql(pattern);
        let sql = format!("UPDATE inputs SET spent_at = ? WHERE {}", predicate.sql_fragment);
        let mut stmt = conn.prepare_cached(&sql)?;

        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&slot];
        params.extend(predicate.params.iter().map(|p| p as &dyn rusqlite::ToSql));
        total += stmt.execute(params.as_slice())?;
    }
    Ok(total)
}

/// Delete inputs whose `spent_at` is older than `tip - longest_rollback`.
/// Wrapped in the ephemeral index bracket for `inputsBySpentAt` per spec
/// §4.F item 4 — `prune_inputs` may run before the permanent index set is
/// installed (`IndexPolicy::SkipNonEssential`).
pub fn prune_inputs(conn: &Connection, longest_rollback: u64) -> Result<usize, StorageError> {
    index_manager::with_ephemeral_index(
        conn,
        index_manager::INPUTS_BY_SPENT_AT.0,
        index_manager::INPUTS_BY_SPENT_AT.1,
        |conn| {
            let tip: Option<i64> =
                conn.query_row("SELECT MAX(slot_no) FROM checkpoints", [], |row| row.get(0))?;
            let Some(tip) = tip else {
                return Ok(0);
            };
            let threshold = (tip.max(0) as u64).saturating_sub(longest_rollback) as i64;
            let mut stmt = conn.prepare_cached("DELETE FROM inputs WHERE spent_at < ?1")?;
            Ok(stmt.execute(rusqlite::params![threshold])?)
        },
    )
}

/// Stream every input matching `pattern` and `status`, ordered by
/// `(created_at, transaction_index, output_index)` in `direction`,
/// invoking `yield_row` per row. Joins `checkpoints` as `createdAt` (inner
/// — every input's `created_at` references a known checkpoint per the
/// data-model invariant) and as `spentAt` (left — `spent_at` may be
/// null); neither joined table's columns are surfaced to the caller, the
/// join only enforces the referential invariant at query time.
///
/// Steps the statement row by row rather than collecting into a `Vec` —
/// this must not materialize the whole result set in memory (spec §9).
pub fn fold_inputs<F>(
    conn: &Connection,
    pattern: &Pattern,
    status: StatusFlag,
    direction: SortDirection,
    yield_row: &mut F,
) -> Result<(), StorageError>
where
    F: FnMut(Input) -> Result<(), StorageError>,
{
    fold_inputs_inner(conn, pattern, status, direction, None, yield_row)
}

/// As `fold_inputs`, but checked against a cooperative cancellation token
/// before each row is materialized (spec §5: cancellation at a suspension
/// point must stop the loop without corrupting state). The enclosing
/// transaction still rolls back or commits normally on return — this only
/// short-circuits the row-stepping loop early.
pub fn fold_inputs_cancellable<F>(
    conn: &Connection,
    pattern: &Pattern,
    status: StatusFlag,
    direction: SortDirection,
    cancellation: &dyn Cancellable,
    yield_row: &mut F,
) -> Result<(), StorageError>
where
    F: FnMut(Input) -> Result<(), StorageError>,
{
    fold_inputs_inner(conn, pattern, status, direction, Some(cancellation), yield_row)
}

fn fold_inputs_inner<F>(
    conn: &Connection,
    pattern: &Pattern,
    status: StatusFlag,
    direction: SortDirection,
    cancellation: Option<&dyn Cancellable>,
    yield_row: &mut F,
) -> Result<(), StorageError>
where
    F: FnMut(Input) -> Result<(), StorageError>,
{
    let predicate = pattern_to_sql(pattern);
    let status_fragment = status_flag_to_sql(status);
    let dir = direction.as_sql();
    let sql = format!(
        "SELECT inputs.extended_output_reference, inputs.address, inputs.value,
                inputs.datum_hash, inputs.script_hash, inputs.payment_credential,
                inputs.created_at, inputs.spent_at, inputs.transaction_index, inputs.output_index
         FROM inputs
         JOIN checkpoints AS createdAt ON inputs.created_at = createdAt.slot_no
         LEFT JOIN checkpoints AS spentAt ON inputs.spent_at = spentAt.slot_no
         WHERE {} {}
         ORDER BY inputs.created_at {dir}, inputs.transaction_index {dir}, inputs.output_index {dir}",
        predicate.sql_fragment, status_fragment,
    );

    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query(as_params(&predicate.params).as_slice())?;

    while let Some(row) = rows.next()? {
        if cancellation.is_some_and(|c| c.is_cancelled()) {
            break;
        }
        let cells: Vec<Cell> = (0..10)
            .map(|i| row.get_ref(i).map(Cell::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let input = Input::from_row(&cells)?;
        yield_row(input)?;
    }
    Ok(())
}
