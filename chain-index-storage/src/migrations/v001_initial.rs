//! V001: Initial schema — checkpoints and inputs.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS checkpoints (
    slot_no INTEGER PRIMARY KEY,
    header_hash BLOB NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS inputs (
    extended_output_reference BLOB PRIMARY KEY,
    address TEXT NOT NULL,
    value BLOB NOT NULL,
    datum_hash BLOB,
    script_hash BLOB,
    payment_credential TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    spent_at INTEGER,
    transaction_index INTEGER NOT NULL,
    output_index INTEGER NOT NULL,
    FOREIGN KEY (created_at) REFERENCES checkpoints(slot_no)
) STRICT;
"#;
