//! chain-index-storage: the SQLite persistence layer for the chain-index
//! storage core (spec §4) — connection factory, lock coordinator,
//! transaction runner, index manager, schema migrations, the query
//! layer, and the `StorageEngine` facade that ties them together.
//!
//! Callers construct one [`StorageEngine`] for the process's lifetime via
//! [`StorageEngine::open`], then hand out [`ShortLivedReader`] /
//! [`ShortLivedWriter`] handles to the rest of the system.

pub mod connection;
pub mod engine;
pub mod index_manager;
pub mod lock;
pub mod migrations;
pub mod query;
pub mod transaction;

pub use connection::LongLivedConnection;
pub use engine::{ShortLivedReader, ShortLivedWriter, StorageEngine};
pub use lock::LockCoordinator;
pub use query::InputRecord;
pub use transaction::TransactionMode;
