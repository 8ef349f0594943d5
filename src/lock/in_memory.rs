use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use super::{Lock, LockError, LockManager};

#[derive(Default)]
struct Holder {
    owner: Option<ThreadId>,
    depth: usize,
}

/// Reentrant lock backed by `Mutex` + `Condvar`.
pub struct InMemoryLock {
    key: String,
    state: Mutex<Holder>,
    wake: Condvar,
}

impl InMemoryLock {
    pub fn new(key: impl Into<String>) -> Self {
        InMemoryLock {
            key: key.into(),
            state: Mutex::new(Holder::default()),
            wake: Condvar::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether any thread currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.state
            .lock()
            .map(|holder| holder.owner.is_some())
            .unwrap_or(false)
    }

    fn holder(&self) -> Result<MutexGuard<'_, Holder>, LockError> {
        self.state
            .lock()
            .map_err(|e| LockError::Poisoned(format!("{}: {e}", self.key)))
    }
}

impl Lock for InMemoryLock {
    fn acquire(&self) -> Result<(), LockError> {
        let me = thread::current().id();
        let mut holder = self.holder()?;
        while holder.owner.is_some_and(|owner| owner != me) {
            holder = self
                .wake
                .wait(holder)
                .map_err(|e| LockError::Poisoned(format!("{}: {e}", self.key)))?;
        }
        holder.owner = Some(me);
        holder.depth += 1;
        Ok(())
    }

    fn try_acquire(&self) -> Result<bool, LockError> {
        let me = thread::current().id();
        let mut holder = self.holder()?;
        match holder.owner {
            Some(owner) if owner != me => Ok(false),
            _ => {
                holder.owner = Some(me);
                holder.depth += 1;
                Ok(true)
            }
        }
    }

    fn release(&self) -> Result<(), LockError> {
        let mut holder = self.holder()?;
        if holder.owner != Some(thread::current().id()) {
            return Err(LockError::NotHeld(self.key.clone()));
        }
        holder.depth -= 1;
        if holder.depth == 0 {
            holder.owner = None;
            self.wake.notify_one();
        }
        Ok(())
    }
}

/// Lazily creates one [`InMemoryLock`] per key.
///
/// Entries nobody references any more are dropped on the next lookup, so the
/// table only tracks keys with a live guard.
#[derive(Default)]
pub struct InMemoryLockManager {
    locks: Mutex<HashMap<String, Arc<InMemoryLock>>>,
}

impl InMemoryLockManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockManager for InMemoryLockManager {
    type Lock = InMemoryLock;

    fn lock_for(&self, key: &str) -> Result<Arc<InMemoryLock>, LockError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| LockError::Poisoned("lock table".into()))?;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1 || lock.is_held());
        Ok(locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(InMemoryLock::new(key)))
            .clone())
    }
}
