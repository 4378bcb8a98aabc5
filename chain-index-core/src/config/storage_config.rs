//! Top-level configuration the storage engine is opened with.

use serde::{Deserialize, Serialize};

use super::database_file::DatabaseFile;

/// Whether the index manager installs the full permanent index set at
/// startup, or defers it for faster bulk ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexPolicy {
    /// Create every permanent index immediately.
    InstallIfNotExist,
    /// Skip non-essential indexes; a warning is traced, and bulk
    /// operations that need one temporarily create it via the ephemeral
    /// index bracket.
    SkipNonEssential,
}

impl Default for IndexPolicy {
    fn default() -> Self {
        Self::InstallIfNotExist
    }
}

/// Configuration the long-lived writer connection is opened with.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// `k`: the retention window, in slots. Clients can roll back to any
    /// slot within `[tip - k, tip]`; older slots may be pruned. Must be
    /// >= 1.
    pub longest_rollback: u64,
    /// Index install/defer policy applied when opening the long-lived
    /// connection.
    pub defer_indexes: IndexPolicy,
    /// Where the database lives.
    pub database_file: DatabaseFile,
}

impl StorageConfig {
    /// Construct a config for an on-disk database with the given
    /// retention window and the default (install-immediately) index
    /// policy.
    pub fn on_disk(path: impl Into<std::path::PathBuf>, longest_rollback: u64) -> Self {
        Self {
            longest_rollback,
            defer_indexes: IndexPolicy::default(),
            database_file: DatabaseFile::OnDisk(path.into()),
        }
    }

    /// Construct a config for an isolated in-memory database, for tests.
    pub fn in_memory(longest_rollback: u64) -> Self {
        Self {
            longest_rollback,
            defer_indexes: IndexPolicy::default(),
            database_file: DatabaseFile::InMemoryIsolated,
        }
    }
}
