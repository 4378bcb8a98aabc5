//! Small traits shared across the storage core.

pub mod cancellation;

pub use cancellation::{Cancellable, CancellationToken};
