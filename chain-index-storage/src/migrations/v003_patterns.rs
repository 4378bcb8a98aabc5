//! V003: patterns and policies.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS patterns (
    pattern TEXT PRIMARY KEY
) STRICT;

CREATE TABLE IF NOT EXISTS policies (
    output_reference BLOB NOT NULL,
    policy_id TEXT NOT NULL,
    FOREIGN KEY (output_reference) REFERENCES inputs(extended_output_reference) ON DELETE CASCADE,
    PRIMARY KEY (output_reference, policy_id)
) STRICT;
"#;
