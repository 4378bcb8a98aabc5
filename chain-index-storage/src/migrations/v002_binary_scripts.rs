//! V002: binary_data and scripts — content-addressed blobs referenced by
//! inputs.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS binary_data (
    binary_data_hash BLOB PRIMARY KEY,
    binary_data BLOB NOT NULL
) STRICT;

CREATE TABLE IF NOT EXISTS scripts (
    script_hash BLOB PRIMARY KEY,
    script BLOB NOT NULL
) STRICT;
"#;
