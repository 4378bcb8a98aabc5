//! The data model (spec §3) and the row-tuple codec contract (spec §6).
//!
//! Every entity maps to/from a `Vec<Cell>` — the primitive-cell tuple the
//! spec's domain codec contract describes (`Integer | Blob | Text | Null`).
//! `Cell` also implements `rusqlite::ToSql`, so `to_row()` doubles as the
//! parameter list for an `INSERT`, and `from_row` reads back from a
//! `rusqlite::Row` via `Cell::from(row.get_ref(i)?)`. Column order in each
//! `to_row`/`from_row` pair matches the column order of that entity's
//! table in the migration that creates it.

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::errors::StorageError;

/// A primitive SQLite cell value, independent of any particular row type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Blob(Vec<u8>),
    Text(String),
    Null,
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Integer(v) => ToSqlOutput::from(*v),
            Cell::Blob(v) => ToSqlOutput::from(v.as_slice()),
            Cell::Text(v) => ToSqlOutput::from(v.as_str()),
            Cell::Null => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Integer(f as i64),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }
}

impl Cell {
    fn as_u64(&self, context: &'static str) -> Result<u64, StorageError> {
        match self {
            Cell::Integer(i) if *i >= 0 => Ok(*i as u64),
            other => Err(unexpected(context, other)),
        }
    }

    fn as_opt_u64(&self, context: &'static str) -> Result<Option<u64>, StorageError> {
        match self {
            Cell::Null => Ok(None),
            Cell::Integer(i) if *i >= 0 => Ok(Some(*i as u64)),
            other => Err(unexpected(context, other)),
        }
    }

    fn as_blob(&self, context: &'static str) -> Result<Vec<u8>, StorageError> {
        match self {
            Cell::Blob(b) => Ok(b.clone()),
            other => Err(unexpected(context, other)),
        }
    }

    fn as_opt_blob(&self, context: &'static str) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            Cell::Null => Ok(None),
            Cell::Blob(b) => Ok(Some(b.clone())),
            other => Err(unexpected(context, other)),
        }
    }

    fn as_text(&self, context: &'static str) -> Result<String, StorageError> {
        match self {
            Cell::Text(t) => Ok(t.clone()),
            other => Err(unexpected(context, other)),
        }
    }
}

fn unexpected(context: &'static str, cell: &Cell) -> StorageError {
    StorageError::UnexpectedRow {
        context: format!("{context}: unexpected cell {cell:?}"),
        rows: 1,
    }
}

/// Map a domain object to its row-tuple representation and back.
pub trait RowCodec: Sized {
    fn to_row(&self) -> Vec<Cell>;
    fn from_row(cells: &[Cell]) -> Result<Self, StorageError>;
}

/// A `(slot_no, header_hash)` marker identifying a point in the ingested
/// chain. Strictly monotonic in `slot_no` across a sequence of inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub slot_no: u64,
    pub header_hash: Vec<u8>,
}

impl RowCodec for Checkpoint {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::Integer(self.slot_no as i64),
            Cell::Blob(self.header_hash.clone()),
        ]
    }

    fn from_row(cells: &[Cell]) -> Result<Self, StorageError> {
        if cells.len() != 2 {
            return Err(StorageError::UnexpectedRow {
                context: "Checkpoint::from_row".to_string(),
                rows: cells.len(),
            });
        }
        Ok(Self {
            slot_no: cells[0].as_u64("Checkpoint.slot_no")?,
            header_hash: cells[1].as_blob("Checkpoint.header_hash")?,
        })
    }
}

/// An unspent-transaction-output-like record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub extended_output_reference: Vec<u8>,
    pub address: String,
    pub value: Vec<u8>,
    pub datum_hash: Option<Vec<u8>>,
    pub script_hash: Option<Vec<u8>>,
    pub payment_credential: String,
    pub created_at: u64,
    pub spent_at: Option<u64>,
    pub transaction_index: u32,
    pub output_index: u32,
}

impl RowCodec for Input {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::Blob(self.extended_output_reference.clone()),
            Cell::Text(self.address.clone()),
            Cell::Blob(self.value.clone()),
            self.datum_hash.clone().map(Cell::Blob).unwrap_or(Cell::Null),
            self.script_hash.clone().map(Cell::Blob).unwrap_or(Cell::Null),
            Cell::Text(self.payment_credential.clone()),
            Cell::Integer(self.created_at as i64),
            self.spent_at.map(|v| Cell::Integer(v as i64)).unwrap_or(Cell::Null),
            Cell::Integer(self.transaction_index as i64),
            Cell::Integer(self.output_index as i64),
        ]
    }

    fn from_row(cells: &[Cell]) -> Result<Self, StorageError> {
        if cells.len() != 10 {
            return Err(StorageError::UnexpectedRow {
                context: "Input::from_row".to_string(),
                rows: cells.len(),
            });
        }
        Ok(Self {
            extended_output_reference: cells[0].as_blob("Input.extended_output_reference")?,
            address: cells[1].as_text("Input.address")?,
            value: cells[2].as_blob("Input.value")?,
            datum_hash: cells[3].as_opt_blob("Input.datum_hash")?,
            script_hash: cells[4].as_opt_blob("Input.script_hash")?,
            payment_credential: cells[5].as_text("Input.payment_credential")?,
            created_at: cells[6].as_u64("Input.created_at")?,
            spent_at: cells[7].as_opt_u64("Input.spent_at")?,
            transaction_index: cells[8].as_u64("Input.transaction_index")? as u32,
            output_index: cells[9].as_u64("Input.output_index")? as u32,
        })
    }
}

/// A compact textual predicate over input attributes, as persisted. Opaque
/// to the storage engine — compiled to SQL by the pattern contract
/// (`crate::pattern`), not by this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRow {
    pub pattern: String,
}

impl RowCodec for PatternRow {
    fn to_row(&self) -> Vec<Cell> {
        vec![Cell::Text(self.pattern.clone())]
    }

    fn from_row(cells: &[Cell]) -> Result<Self, StorageError> {
        if cells.len() != 1 {
            return Err(StorageError::UnexpectedRow {
                context: "PatternRow::from_row".to_string(),
                rows: cells.len(),
            });
        }
        Ok(Self {
            pattern: cells[0].as_text("PatternRow.pattern")?,
        })
    }
}

/// Many-to-one link from an input to the policy IDs of the assets it
/// carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRow {
    pub output_reference: Vec<u8>,
    pub policy_id: String,
}

impl RowCodec for PolicyRow {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::Blob(self.output_reference.clone()),
            Cell::Text(self.policy_id.clone()),
        ]
    }

    fn from_row(cells: &[Cell]) -> Result<Self, StorageError> {
        if cells.len() != 2 {
            return Err(StorageError::UnexpectedRow {
                context: "PolicyRow::from_row".to_string(),
                rows: cells.len(),
            });
        }
        Ok(Self {
            output_reference: cells[0].as_blob("PolicyRow.output_reference")?,
            policy_id: cells[1].as_text("PolicyRow.policy_id")?,
        })
    }
}

/// Content-addressed datum bytes. Orphaned rows (no referring input) are
/// eligible for GC via `prune_binary_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryDataRow {
    pub binary_data_hash: Vec<u8>,
    pub binary_data: Vec<u8>,
}

impl RowCodec for BinaryDataRow {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::Blob(self.binary_data_hash.clone()),
            Cell::Blob(self.binary_data.clone()),
        ]
    }

    fn from_row(cells: &[Cell]) -> Result<Self, StorageError> {
        if cells.len() != 2 {
            return Err(StorageError::UnexpectedRow {
                context: "BinaryDataRow::from_row".to_string(),
                rows: cells.len(),
            });
        }
        Ok(Self {
            binary_data_hash: cells[0].as_blob("BinaryDataRow.binary_data_hash")?,
            binary_data: cells[1].as_blob("BinaryDataRow.binary_data")?,
        })
    }
}

/// Content-addressed script bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRow {
    pub script_hash: Vec<u8>,
    pub script: Vec<u8>,
}

impl RowCodec for ScriptRow {
    fn to_row(&self) -> Vec<Cell> {
        vec![
            Cell::Blob(self.script_hash.clone()),
            Cell::Blob(self.script.clone()),
        ]
    }

    fn from_row(cells: &[Cell]) -> Result<Self, StorageError> {
        if cells.len() != 2 {
            return Err(StorageError::UnexpectedRow {
                context: "ScriptRow::from_row".to_string(),
                rows: cells.len(),
            });
        }
        Ok(Self {
            script_hash: cells[0].as_blob("ScriptRow.script_hash")?,
            script: cells[1].as_blob("ScriptRow.script")?,
        })
    }
}
