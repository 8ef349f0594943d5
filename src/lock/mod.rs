//! Per-key locks serializing read-check-write sequences on one resource.
//!
//! Repositories take a lock named after the resource key for the span of a
//! [`transaction`](crate::repository::Transactional::transaction). A shared-store
//! backend would provide a [`LockManager`] backed by advisory locks or leases;
//! [`InMemoryLockManager`] covers the single-process case.

mod guard;
mod in_memory;

use std::sync::Arc;

use thiserror::Error;

pub use guard::LockGuard;
pub use in_memory::{InMemoryLock, InMemoryLockManager};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// A thread panicked while holding the lock's internal state.
    #[error("lock poisoned: {0}")]
    Poisoned(String),

    /// The lock was released by a thread that does not hold it.
    #[error("lock on '{0}' is not held by the releasing thread")]
    NotHeld(String),

    #[error("lock error: {0}")]
    Other(String),
}

/// A single named lock.
///
/// Acquisition is reentrant for the holding thread; each `acquire` must be
/// paired with one `release`.
pub trait Lock: Send + Sync {
    /// Block until the lock is held by the calling thread.
    fn acquire(&self) -> Result<(), LockError>;

    /// Take the lock if it is free (or already ours). `Ok(false)` when another
    /// thread holds it.
    fn try_acquire(&self) -> Result<bool, LockError>;

    fn release(&self) -> Result<(), LockError>;
}

/// Hands out one logical lock per key.
pub trait LockManager: Send + Sync {
    type Lock: Lock;

    /// Repeated calls with the same key return the same lock.
    fn lock_for(&self, key: &str) -> Result<Arc<Self::Lock>, LockError>;

    /// Acquire the lock for `key` and return a guard that releases it on drop.
    fn acquire(&self, key: &str) -> Result<LockGuard<Self::Lock>, LockError> {
        LockGuard::acquire(self.lock_for(key)?)
    }
}
