//! Error handling for the storage core.
//! One error enum for the subsystem, `thiserror` only, zero `anyhow`.

pub mod storage_error;

pub use storage_error::StorageError;
