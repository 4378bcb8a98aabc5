//! The three ways a database can be addressed, and the connection mode.

use std::path::{Path, PathBuf};

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseFile {
    /// A file on disk at the given path.
    OnDisk(PathBuf),
    /// An in-memory database with a shared cache, reachable by multiple
    /// connections within the process via `file::<name>:?mode=memory&cache=shared`.
    InMemoryShared(String),
    /// An isolated `:memory:` database, visible only to the connection
    /// that opened it. Used by tests.
    InMemoryIsolated,
}

impl DatabaseFile {
    /// A shared in-memory database under the default name, for tests that
    /// need more than one connection to observe the same data.
    pub fn shared_default() -> Self {
        Self::InMemoryShared("chain-index".to_string())
    }

    pub fn on_disk(path: impl AsRef<Path>) -> Self {
        Self::OnDisk(path.as_ref().to_path_buf())
    }
}

/// Whether a connection may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    ReadOnly,
    ReadWrite,
}

/// Build the `rusqlite`-compatible connection URI for `(file, mode)`.
///
/// - `OnDisk(path)` -> `file:<path>?mode=ro|rwc`
/// - `InMemoryShared(name)` -> `file:<name>?mode=memory&cache=shared`
/// - `InMemoryIsolated` -> `:memory:` (mode is irrelevant; SQLite always
///   allows read/write on a private in-memory database)
pub fn connection_uri(file: &DatabaseFile, mode: ConnectionType) -> String {
    match file {
        DatabaseFile::OnDisk(path) => {
            let mode_str = match mode {
                ConnectionType::ReadOnly => "ro",
                ConnectionType::ReadWrite => "rwc",
            };
            format!("file:{}?mode={mode_str}", path.display())
        }
        DatabaseFile::InMemoryShared(name) => {
            format!("file:{name}?mode=memory&cache=shared")
        }
        DatabaseFile::InMemoryIsolated => ":memory:".to_string(),
    }
}
