//! `StorageEngine`: the facade spec §9's design notes describe — "global
//! connection state... modeled as a value owned by the top-level runtime
//! scope and passed explicitly". A caller constructs one `StorageEngine`
//! for the lifetime of the process, and hands out cheap, clonable
//! short-lived reader/writer handles to the rest of the system (the HTTP
//! query surface, interactive pattern management) that share its lock
//! coordinator.

use std::sync::Arc;

use chain_index_core::{
    BinaryDataRow, Cancellable, Checkpoint, ConnectionType, DatabaseFile, Input, Pattern,
    ScriptRow, SortDirection, StatusFlag, StorageConfig, StorageError,
};
use rusqlite::Connection;

use crate::connection::{self, LongLivedConnection};
use crate::lock::LockCoordinator;
use crate::query;
use crate::query::InputRecord;
use crate::transaction::{run_transaction, TransactionMode};

/// Owns the single long-lived writer connection and the lock coordinator
/// for as long as the process runs. Every write — inputs, checkpoints,
/// binary data, scripts, rollback, pruning — goes through this type.
pub struct StorageEngine {
    connection: LongLivedConnection,
    lock: Arc<LockCoordinator>,
    database_file: DatabaseFile,
    longest_rollback: u64,
}

impl StorageEngine {
    /// Open the long-lived connection (migrate, install/defer indexes)
    /// and construct a fresh lock coordinator.
    pub fn open(config: StorageConfig) -> Result<Self, StorageError> {
        let connection = LongLivedConnection::open(&config.database_file, config.defer_indexes)?;
        Ok(Self {
            connection,
            lock: Arc::new(LockCoordinator::new()),
            database_file: config.database_file,
            longest_rollback: config.longest_rollback,
        })
    }

    /// A handle for short-lived read-only sections — the HTTP query
    /// surface. Unconstrained by the lock coordinator (spec §4.C).
    pub fn reader(&self) -> ShortLivedReader {
        ShortLivedReader { database_file: self.database_file.clone() }
    }

    /// A handle for short-lived read-write sections — interactive
    /// pattern management. Gated by the lock coordinator against the
    /// long-lived writer.
    pub fn short_lived_writer(&self) -> ShortLivedWriter {
        ShortLivedWriter { database_file: self.database_file.clone(), lock: Arc::clone(&self.lock) }
    }

    /// The on-disk path, if this engine was opened against a file rather
    /// than an in-memory database.
    pub fn path(&self) -> Option<&std::path::PathBuf> {
        self.connection.path()
    }

    fn transact<F, T>(&self, mode: TransactionMode, body: F) -> Result<T, StorageError>
    where
        F: FnMut(&Connection) -> Result<T, StorageError>,
    {
        let _guard = self.lock.acquire_long_lived()?;
        run_transaction(self.connection.connection(), mode, body)
    }

    pub fn insert_inputs(&self, records: &[InputRecord]) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, |conn| query::inputs::insert_inputs(conn, records))
    }

    pub fn delete_inputs(&self, patterns: &[Pattern]) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, |conn| query::inputs::delete_inputs(conn, patterns))
    }

    pub fn mark_inputs(&self, slot: u64, patterns: &[Pattern]) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, move |conn| {
            query::inputs::mark_inputs(conn, slot, patterns)
        })
    }

    /// Delete inputs with `spent_at` older than `tip - longest_rollback`,
    /// using the retention window this engine was opened with.
    pub fn prune_inputs(&self) -> Result<usize, StorageError> {
        let longest_rollback = self.longest_rollback;
        self.transact(TransactionMode::ReadWrite, move |conn| {
            query::inputs::prune_inputs(conn, longest_rollback)
        })
    }

    pub fn insert_checkpoints(&self, checkpoints: &[Checkpoint]) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, |conn| {
            query::checkpoints::insert_checkpoints(conn, checkpoints)
        })
    }

    pub fn list_checkpoints_desc(&self) -> Result<Vec<Checkpoint>, StorageError> {
        let longest_rollback = self.longest_rollback;
        self.transact(TransactionMode::ReadOnly, move |conn| {
            query::checkpoints::list_checkpoints_desc(conn, longest_rollback)
        })
    }

    pub fn list_ancestors_desc(&self, slot: u64, n: usize) -> Result<Vec<Checkpoint>, StorageError> {
        self.transact(TransactionMode::ReadOnly, move |conn| {
            query::checkpoints::list_ancestors_desc(conn, slot, n)
        })
    }

    /// Roll the store back to `target_slot`. See spec §4.F item 12 / §8's
    /// invariants; the only write path allowed to shrink `checkpoints`.
    pub fn rollback_to(&self, target_slot: u64) -> Result<Option<u64>, StorageError> {
        self.transact(TransactionMode::ReadWrite, move |conn| {
            query::rollback::rollback_to(conn, target_slot)
        })
    }

    pub fn insert_binary_data(&self, rows: &[BinaryDataRow]) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, |conn| {
            query::binary_data::insert_binary_data(conn, rows)
        })
    }

    pub fn get_binary_data(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.transact(TransactionMode::ReadOnly, move |conn| query::binary_data::get_binary_data(conn, hash))
    }

    /// Garbage-collect `binary_data` rows unreferenced by any input.
    pub fn prune_binary_data(&self) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, |conn| query::binary_data::prune_binary_data(conn))
    }

    pub fn insert_scripts(&self, rows: &[ScriptRow]) -> Result<usize, StorageError> {
        self.transact(TransactionMode::ReadWrite, |conn| query::scripts::insert_scripts(conn, rows))
    }

    pub fn get_script(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.transact(TransactionMode::ReadOnly, move |conn| query::scripts::get_script(conn, hash))
    }

    /// Stream every input matching `pattern`/`status`, in `direction`
    /// order, through `yield_row`. Runs on the long-lived connection —
    /// the follower's own read-your-writes view. See `ShortLivedReader`
    /// for the equivalent on a throwaway connection.
    pub fn fold_inputs<F>(
        &self,
        pattern: &Pattern,
        status: StatusFlag,
        direction: SortDirection,
        mut yield_row: F,
    ) -> Result<(), StorageError>
    where
        F: FnMut(Input) -> Result<(), StorageError>,
    {
        self.transact(TransactionMode::ReadOnly, |conn| {
            query::inputs::fold_inputs(conn, pattern, status, direction, &mut yield_row)
        })
    }

    /// As `fold_inputs`, but stops early if `cancellation` reports
    /// cancelled between rows (spec §5). The read transaction still
    /// commits normally on return.
    pub fn fold_inputs_cancellable<F>(
        &self,
        pattern: &Pattern,
        status: StatusFlag,
        direction: SortDirection,
        cancellation: &dyn Cancellable,
        mut yield_row: F,
    ) -> Result<(), StorageError>
    where
        F: FnMut(Input) -> Result<(), StorageError>,
    {
        self.transact(TransactionMode::ReadOnly, |conn| {
            query::inputs::fold_inputs_cancellable(conn, pattern, status, direction, cancellation, &mut yield_row)
        })
    }
}

/// A throwaway read-only connection handle. Opens a fresh connection per
/// call and closes it on return; unconstrained by the lock coordinator
/// (spec §4.C: short-lived reads are unconstrained; SQLite's own WAL
/// readers handle isolation against the writer).
pub struct ShortLivedReader {
    database_file: DatabaseFile,
}

impl ShortLivedReader {
    fn read<F, T>(&self, body: F) -> Result<T, StorageError>
    where
        F: FnMut(&Connection) -> Result<T, StorageError>,
    {
        connection::with_short_lived(&self.database_file, ConnectionType::ReadOnly, |conn| {
            run_transaction(conn, TransactionMode::ReadOnly, body)
        })
    }

    pub fn fold_inputs<F>(
        &self,
        pattern: &Pattern,
        status: StatusFlag,
        direction: SortDirection,
        mut yield_row: F,
    ) -> Result<(), StorageError>
    where
        F: FnMut(Input) -> Result<(), StorageError>,
    {
        self.read(|conn| query::inputs::fold_inputs(conn, pattern, status, direction, &mut yield_row))
    }

    pub fn fold_inputs_cancellable<F>(
        &self,
        pattern: &Pattern,
        status: StatusFlag,
        direction: SortDirection,
        cancellation: &dyn Cancellable,
        mut yield_row: F,
    ) -> Result<(), StorageError>
    where
        F: FnMut(Input) -> Result<(), StorageError>,
    {
        self.read(|conn| {
            query::inputs::fold_inputs_cancellable(conn, pattern, status, direction, cancellation, &mut yield_row)
        })
    }

    pub fn list_checkpoints_desc(&self, longest_rollback: u64) -> Result<Vec<Checkpoint>, StorageError> {
        self.read(move |conn| query::checkpoints::list_checkpoints_desc(conn, longest_rollback))
    }

    pub fn list_ancestors_desc(&self, slot: u64, n: usize) -> Result<Vec<Checkpoint>, StorageError> {
        self.read(move |conn| query::checkpoints::list_ancestors_desc(conn, slot, n))
    }

    pub fn list_patterns(&self) -> Result<Vec<Pattern>, StorageError> {
        self.read(query::patterns::list_patterns)
    }

    pub fn get_binary_data(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.read(move |conn| query::binary_data::get_binary_data(conn, hash))
    }

    pub fn get_script(&self, hash: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.read(move |conn| query::scripts::get_script(conn, hash))
    }
}

/// A throwaway read-write connection handle — e.g. for interactive
/// pattern management. Gated by the shared lock coordinator: waits for
/// the long-lived writer to be idle before opening, per spec §4.C.
pub struct ShortLivedWriter {
    database_file: DatabaseFile,
    lock: Arc<LockCoordinator>,
}

impl ShortLivedWriter {
    fn write<F, T>(&self, body: F) -> Result<T, StorageError>
    where
        F: FnMut(&Connection) -> Result<T, StorageError>,
    {
        let _guard = self.lock.acquire_short_lived_write()?;
        connection::with_short_lived(&self.database_file, ConnectionType::ReadWrite, |conn| {
            run_transaction(conn, TransactionMode::ReadWrite, body)
        })
    }

    pub fn insert_patterns(&self, patterns: &[Pattern]) -> Result<usize, StorageError> {
        self.write(|conn| query::patterns::insert_patterns(conn, patterns))
    }

    pub fn delete_pattern(&self, pattern: &Pattern) -> Result<usize, StorageError> {
        self.write(move |conn| query::patterns::delete_pattern(conn, pattern))
    }

    /// Spec §5: binary data and scripts, like patterns, may also be
    /// written by a short-lived section rather than only through the
    /// long-lived writer.
    pub fn insert_binary_data(&self, rows: &[BinaryDataRow]) -> Result<usize, StorageError> {
        self.write(|conn| query::binary_data::insert_binary_data(conn, rows))
    }

    pub fn insert_scripts(&self, rows: &[ScriptRow]) -> Result<usize, StorageError> {
        self.write(|conn| query::scripts::insert_scripts(conn, rows))
    }
}
