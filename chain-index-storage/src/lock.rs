//! Lock Coordinator (spec §4.C): arbitrates the single long-lived writer
//! against a fluctuating pool of short-lived connections.
//!
//! Two shared, atomically-readable cells, guarded by one `Mutex` and
//! signalled by one `Condvar`:
//! - `short_lived_count`: how many short-lived read-write sections are
//!   currently active.
//! - `long_lived_active`: whether the long-lived writer is mid-transaction.
//!
//! Invariant upheld at every instant: either the long-lived writer is
//! running and no short-lived writer is, or zero-or-more short-lived
//! writers are running and the long-lived writer is not. Short-lived
//! *read-only* sections are unconstrained by this coordinator — SQLite's
//! own WAL readers handle those — only short-lived *read-write* sections
//! participate.

use std::sync::{Condvar, Mutex};

use chain_index_core::StorageError;
use tracing::debug;

struct State {
    short_lived_count: u32,
    long_lived_active: bool,
}

/// Coordinates the long-lived writer against short-lived read-write
/// sections. Cheap to construct; one instance is shared for the lifetime
/// of an open database.
pub struct LockCoordinator {
    state: Mutex<State>,
    condvar: Condvar,
}

/// RAII guard held by a short-lived read-write section. Decrements
/// `short_lived_count` and wakes waiters when dropped.
pub struct ShortLivedWriteGuard<'a> {
    coordinator: &'a LockCoordinator,
}

impl Drop for ShortLivedWriteGuard<'_> {
    fn drop(&mut self) {
        let mut state = match self.coordinator.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.short_lived_count -= 1;
        self.coordinator.condvar.notify_all();
    }
}

/// RAII guard held by the long-lived writer while it runs a transaction.
/// Clears `long_lived_active` and wakes waiters when dropped.
pub struct LongLivedGuard<'a> {
    coordinator: &'a LockCoordinator,
}

impl Drop for LongLivedGuard<'_> {
    fn drop(&mut self) {
        let mut state = match self.coordinator.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.long_lived_active = false;
        self.coordinator.condvar.notify_all();
    }
}

impl LockCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                short_lived_count: 0,
                long_lived_active: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Block until no short-lived read-write section is active, then
    /// increment `short_lived_count`. Returns a guard that decrements on
    /// drop.
    pub fn acquire_short_lived_write(&self) -> Result<ShortLivedWriteGuard<'_>, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("short-lived write acquire".to_string()))?;
        while state.long_lived_active {
            state = self
                .condvar
                .wait(state)
                .map_err(|_| StorageError::LockPoisoned("short-lived write wait".to_string()))?;
        }
        state.short_lived_count += 1;
        Ok(ShortLivedWriteGuard { coordinator: self })
    }

    /// Set `long_lived_active`, then block until `short_lived_count` hits
    /// zero. Returns a guard that clears the flag on drop.
    pub fn acquire_long_lived(&self) -> Result<LongLivedGuard<'_>, StorageError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StorageError::LockPoisoned("long-lived acquire".to_string()))?;
        state.long_lived_active = true;
        while state.short_lived_count > 0 {
            debug!(event = "ConnectionLocked", retry_in = "condvar wait");
            state = self
                .condvar
                .wait(state)
                .map_err(|_| StorageError::LockPoisoned("long-lived wait".to_string()))?;
        }
        Ok(LongLivedGuard { coordinator: self })
    }
}

impl Default for LockCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
