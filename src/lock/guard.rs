use std::sync::Arc;

use tracing::warn;

use super::{Lock, LockError};

/// Holds a [`Lock`] until dropped.
pub struct LockGuard<L: Lock> {
    lock: Arc<L>,
}

impl<L: Lock> LockGuard<L> {
    pub fn acquire(lock: Arc<L>) -> Result<Self, LockError> {
        lock.acquire()?;
        Ok(Self { lock })
    }
}

impl<L: Lock> Drop for LockGuard<L> {
    fn drop(&mut self) {
        if let Err(err) = self.lock.release() {
            warn!(error = %err, "Failed to release lock");
        }
    }
}
