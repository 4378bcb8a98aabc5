//! Index Manager (spec §4.E): the permanent index set installed at
//! startup, and the ephemeral index bracket used by bulk operations that
//! need an index that may have been deferred.

use chain_index_core::{IndexPolicy, StorageError};
use rusqlite::Connection;
use tracing::{debug, warn};

/// Named so the query layer's ephemeral-index call sites (`rollback_to`,
/// `prune_inputs`) can reference a specific index's `(name, ddl)` pair
/// without re-stating the DDL.
pub const INPUTS_BY_ADDRESS: (&str, &str) = (
    "inputsByAddress",
    "CREATE INDEX IF NOT EXISTS inputsByAddress ON inputs(address COLLATE NOCASE, spent_at)",
);
pub const INPUTS_BY_PAYMENT_CREDENTIAL: (&str, &str) = (
    "inputsByPaymentCredential",
    "CREATE INDEX IF NOT EXISTS inputsByPaymentCredential ON inputs(payment_credential COLLATE NOCASE, spent_at)",
);
pub const INPUTS_BY_DATUM_HASH: (&str, &str) = (
    "inputsByDatumHash",
    "CREATE INDEX IF NOT EXISTS inputsByDatumHash ON inputs(datum_hash)",
);
pub const INPUTS_BY_SPENT_AT: (&str, &str) = (
    "inputsBySpentAt",
    "CREATE INDEX IF NOT EXISTS inputsBySpentAt ON inputs(spent_at)",
);
pub const INPUTS_BY_CREATED_AT: (&str, &str) = (
    "inputsByCreatedAt",
    "CREATE INDEX IF NOT EXISTS inputsByCreatedAt ON inputs(created_at)",
);

/// The five permanent indexes the query layer depends on for acceptable
/// performance at scale.
const PERMANENT_INDEXES: &[(&str, &str)] = &[
    INPUTS_BY_ADDRESS,
    INPUTS_BY_PAYMENT_CREDENTIAL,
    INPUTS_BY_DATUM_HASH,
    INPUTS_BY_SPENT_AT,
    INPUTS_BY_CREATED_AT,
];

/// Install every permanent index, or defer and trace a warning, per the
/// configured policy.
pub fn install_permanent_indexes(conn: &Connection, policy: IndexPolicy) -> Result<(), StorageError> {
    match policy {
        IndexPolicy::InstallIfNotExist => {
            for (name, ddl) in PERMANENT_INDEXES {
                if index_exists(conn, name)? {
                    debug!(event = "DatabaseIndexAlreadyExists", name = %name);
                } else {
                    conn.execute_batch(ddl)?;
                    debug!(event = "DatabaseCreateIndex", name = %name);
                }
            }
        }
        IndexPolicy::SkipNonEssential => {
            warn!(event = "DatabaseDeferIndexes", warning = "index installation deferred");
        }
    }
    Ok(())
}

/// Does an index by this name exist? Probed via `PRAGMA index_info`,
/// which returns a non-empty result set iff the index exists.
fn index_exists(conn: &Connection, name: &str) -> Result<bool, StorageError> {
    let mut stmt = conn.prepare_cached(&format!("PRAGMA index_info({name})"))?;
    let exists = stmt.exists([])?;
    Ok(exists)
}

/// Run `body` with `index_name` guaranteed present, creating it first if
/// absent and dropping it afterward in that case. If the index was
/// already present (permanent, or left over from policy
/// `InstallIfNotExist`), `body` just runs — no create/drop, no trace.
pub fn with_ephemeral_index<F, T>(
    conn: &Connection,
    index_name: &str,
    create_ddl: &str,
    body: F,
) -> Result<T, StorageError>
where
    F: FnOnce(&Connection) -> Result<T, StorageError>,
{
    let pre_existing = index_exists(conn, index_name)?;
    if !pre_existing {
        conn.execute_batch(create_ddl)?;
        debug!(event = "ConnectionCreateTemporaryIndex", name = %index_name);
    }

    let result = body(conn);

    if !pre_existing {
        conn.execute_batch(&format!("DROP INDEX IF EXISTS {index_name}"))?;
        debug!(event = "ConnectionRemoveTemporaryIndex", name = %index_name);
    }

    result
}
