//! Connection factory (spec §4.B): URI construction, pragmas, and the two
//! bracketed connection lifetimes — long-lived (the privileged writer,
//! opened once) and short-lived (opened and closed per call).

pub mod pragmas;

use std::path::PathBuf;

use chain_index_core::{ConnectionType, DatabaseFile, IndexPolicy, StorageError};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::{index_manager, migrations};

/// The single long-lived writer connection. Owns schema migrations and
/// the permanent index set; exclusively writes `inputs`, `checkpoints`,
/// `patterns`, `policies`, `binary_data`, and `scripts`.
pub struct LongLivedConnection {
    conn: Connection,
    path: Option<PathBuf>,
}

impl LongLivedConnection {
    /// Open the long-lived connection: apply pragmas, run pending
    /// migrations, then install (or defer) the permanent index set.
    pub fn open(file: &DatabaseFile, defer_indexes: IndexPolicy) -> Result<Self, StorageError> {
        let uri = chain_index_core::config::database_file::connection_uri(
            file,
            ConnectionType::ReadWrite,
        );
        let conn = Connection::open(&uri)?;
        pragmas::apply_long_lived_pragmas(&conn)?;

        if matches!(file, DatabaseFile::InMemoryIsolated) {
            debug!(event = "DatabaseRunningInMemory");
        }

        migrations::run_migrations(&conn)?;
        index_manager::install_permanent_indexes(&conn, defer_indexes)?;

        let path = match file {
            DatabaseFile::OnDisk(p) => Some(p.clone()),
            DatabaseFile::InMemoryShared(_) | DatabaseFile::InMemoryIsolated => None,
        };

        info!(event = "DatabaseConnection", mode = "long_lived");
        Ok(Self { conn, path })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Open a short-lived connection, run `body` against it, and let it close
/// on scope exit. Traces creation/destruction per spec §4.G.
///
/// Callers are responsible for lock-coordinator bookkeeping around this
/// call (see `crate::lock`); this function only handles the connection
/// itself.
pub fn with_short_lived<F, T>(
    file: &DatabaseFile,
    mode: ConnectionType,
    body: F,
) -> Result<T, StorageError>
where
    F: FnOnce(&Connection) -> Result<T, StorageError>,
{
    let uri = chain_index_core::config::database_file::connection_uri(file, mode);
    let conn = Connection::open(&uri)?;
    match mode {
        ConnectionType::ReadOnly => pragmas::apply_short_lived_read_pragmas(&conn)?,
        ConnectionType::ReadWrite => pragmas::apply_short_lived_write_pragmas(&conn)?,
    }

    debug!(event = "ConnectionCreateShortLived", mode = ?mode);
    let result = body(&conn);
    debug!(event = "ConnectionDestroyShortLived", mode = ?mode);
    result
}
