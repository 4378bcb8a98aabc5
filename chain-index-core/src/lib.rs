//! chain-index-core: error taxonomy, configuration, and the external
//! boundary contracts (pattern compilation, row codec, cancellation) the
//! chain-index storage engine is built against.
//!
//! - Errors: a single `thiserror` enum, `StorageError`.
//! - Config: the shape the storage engine is constructed with.
//! - Model: the data model and its `RowCodec` contract.
//! - Pattern: the pattern-to-SQL compilation contract.
//! - Traits: cooperative cancellation.

pub mod config;
pub mod errors;
pub mod model;
pub mod pattern;
pub mod traits;

pub use config::{ConnectionType, DatabaseFile, IndexPolicy, StorageConfig};
pub use errors::StorageError;
pub use model::{BinaryDataRow, Cell, Checkpoint, Input, PatternRow, PolicyRow, RowCodec, ScriptRow};
pub use pattern::{pattern_from_text, pattern_to_sql, pattern_to_text, status_flag_to_sql};
pub use pattern::{CompiledPredicate, Pattern, SortDirection, StatusFlag};
pub use traits::{Cancellable, CancellationToken};
