//! Schema & Migrations (spec §4.A): a monotonically numbered list of
//! embedded SQL scripts gated by `PRAGMA user_version`.

mod v001_initial;
mod v002_binary_scripts;
mod v003_patterns;

use chain_index_core::StorageError;
use rusqlite::Connection;
use tracing::info;

/// `(version, script)` in ascending order. Every script with version
/// greater than the persisted `user_version` is applied in order.
const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_initial::MIGRATION_SQL),
    (2, v002_binary_scripts::MIGRATION_SQL),
    (3, v003_patterns::MIGRATION_SQL),
];

/// Read the current schema version and apply every pending migration, in
/// order, each inside its own write transaction. On any statement
/// failure the migration's transaction rolls back and the error
/// propagates — no partial-version state is ever left observable.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current_version: i64 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(StorageError::from)?;

    if current_version < 0 {
        return Err(StorageError::UnexpectedUserVersion(current_version.to_string()));
    }
    let current_version = current_version as u32;
    info!(event = "DatabaseCurrentVersion", version = current_version);

    let pending: Vec<&(u32, &str)> =
        MIGRATIONS.iter().filter(|(v, _)| *v > current_version).collect();

    if pending.is_empty() {
        info!(event = "DatabaseNoMigrationNeeded");
        return Ok(());
    }

    for (version, script) in pending {
        let from = current_version;
        let to = *version;
        info!(event = "DatabaseRunningMigration", from, to);
        apply_migration(conn, to, script)?;
    }

    Ok(())
}

/// Apply a single migration script inside one transaction: set
/// `user_version` first, then the script's statements, split on `;` with
/// empty segments dropped.
fn apply_migration(conn: &Connection, version: u32, script: &str) -> Result<(), StorageError> {
    conn.execute_batch("BEGIN IMMEDIATE TRANSACTION")
        .map_err(StorageError::from)?;

    let result = (|| -> Result<(), StorageError> {
        conn.execute_batch(&format!("PRAGMA user_version = {version};"))?;
        for statement in script.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            conn.execute_batch(statement).map_err(|e| StorageError::MigrationFailed {
                version,
                message: e.to_string(),
            })?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => conn.execute_batch("COMMIT").map_err(|e| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        }),
        Err(err) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(err)
        }
    }
}
