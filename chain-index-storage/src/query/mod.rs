//! Query Layer (spec §4.F): one module per entity family, each a set of
//! free functions over `&rusqlite::Connection`. Transaction bracketing,
//! retry, and lock-coordinator bookkeeping are the caller's job
//! (`crate::engine`, `crate::transaction`) — nothing in this module opens
//! or closes a transaction itself.

pub mod binary_data;
pub mod checkpoints;
pub mod inputs;
pub mod patterns;
pub mod policies;
pub mod rollback;
pub mod scripts;

pub use inputs::InputRecord;

use rusqlite::ToSql;

/// Borrow every cell in `cells` as `&dyn ToSql`, in order — the shape
/// `Statement::execute`/`query` wants for a parameter list built from a
/// `RowCodec::to_row()` or a compiled pattern's `params`.
pub(crate) fn as_params<T: ToSql>(cells: &[T]) -> Vec<&dyn ToSql> {
    cells.iter().map(|c| c as &dyn ToSql).collect()
}
