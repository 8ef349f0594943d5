//! BTreeMap-backed repository for tests and single-process services.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, ThreadId};

use crate::error::CrudError;
use crate::filter::Predicate;
use crate::lock::{InMemoryLock, InMemoryLockManager, LockGuard, LockManager};
use crate::page::{Page, PageRequest};
use crate::resource::{FieldAccess, Resource};

use super::{Lookup, Persist, Query, RepositoryError, Transactional};

type IdGenerator<I> = Arc<dyn Fn() -> I + Send + Sync>;

/// Undo log for the transactions open on one thread.
struct Journal<E: Resource> {
    /// Previous value per write, oldest first.
    undo: Vec<(E::Id, Option<E>)>,
    /// Undo length at the start of each open (nested) transaction.
    marks: Vec<usize>,
    /// Locks on every id written so far, released when the outermost
    /// transaction ends.
    held: BTreeMap<E::Id, LockGuard<InMemoryLock>>,
}

/// In-memory repository keyed by resource id.
///
/// Clones share storage, locks and open transactions.
pub struct InMemoryRepository<E: Resource> {
    storage: Arc<RwLock<BTreeMap<E::Id, E>>>,
    locks: Arc<InMemoryLockManager>,
    journals: Arc<Mutex<HashMap<ThreadId, Journal<E>>>>,
    id_generator: Option<IdGenerator<E::Id>>,
}

impl<E: Resource> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            locks: self.locks.clone(),
            journals: self.journals.clone(),
            id_generator: self.id_generator.clone(),
        }
    }
}

impl<E: Resource> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Resource> InMemoryRepository<E> {
    /// Empty repository. Saving a resource without an id fails.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(BTreeMap::new())),
            locks: Arc::new(InMemoryLockManager::new()),
            journals: Arc::new(Mutex::new(HashMap::new())),
            id_generator: None,
        }
    }

    /// Assign ids from `generator` to resources saved without one.
    pub fn with_id_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> E::Id + Send + Sync + 'static,
    {
        self.id_generator = Some(Arc::new(generator));
        self
    }

    /// Assign ids 1, 2, 3, ... to resources saved without one.
    pub fn with_sequential_ids(self) -> Self
    where
        E::Id: From<u64>,
    {
        let next = AtomicU64::new(1);
        self.with_id_generator(move || <E::Id>::from(next.fetch_add(1, Ordering::SeqCst)))
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self
            .storage
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("len"))?
            .len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn lock_key(id: &E::Id) -> String {
        format!("{}:{}", E::RESOURCE_TYPE, id)
    }

    fn snapshot(&self, operation: &'static str) -> Result<Vec<E>, RepositoryError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RepositoryError::LockPoisoned(operation))?;
        Ok(storage.values().cloned().collect())
    }

    /// Take the lock on `id` before writing it.
    ///
    /// Inside a transaction the guard moves into the thread's journal, so no
    /// other thread can write the id until this transaction has committed or
    /// rolled back. Outside one, the guard is returned and covers the single
    /// write.
    fn hold(&self, id: &E::Id) -> Result<Option<LockGuard<InMemoryLock>>, RepositoryError> {
        let me = thread::current().id();
        let in_transaction = {
            let journals = self
                .journals
                .lock()
                .map_err(|_| RepositoryError::LockPoisoned("journal"))?;
            match journals.get(&me) {
                Some(journal) if journal.held.contains_key(id) => return Ok(None),
                Some(_) => true,
                None => false,
            }
        };

        // Never wait on a key lock while holding the journal table.
        let guard = self.locks.acquire(&Self::lock_key(id))?;
        if !in_transaction {
            return Ok(Some(guard));
        }
        let mut journals = self
            .journals
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned("journal"))?;
        if let Some(journal) = journals.get_mut(&me) {
            journal.held.insert(id.clone(), guard);
        }
        Ok(None)
    }

    /// Note a write in the calling thread's journal, if it has one open.
    fn record(&self, id: E::Id, previous: Option<E>) -> Result<(), RepositoryError> {
        let mut journals = self
            .journals
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned("journal"))?;
        if let Some(journal) = journals.get_mut(&thread::current().id()) {
            journal.undo.push((id, previous));
        }
        Ok(())
    }

    fn begin(&self) -> Result<Scope<'_, E>, RepositoryError> {
        let mut journals = self
            .journals
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned("begin"))?;
        let journal = journals
            .entry(thread::current().id())
            .or_insert_with(|| Journal {
                undo: Vec::new(),
                marks: Vec::new(),
                held: BTreeMap::new(),
            });
        journal.marks.push(journal.undo.len());
        Ok(Scope {
            repo: self,
            open: true,
        })
    }

    /// Close the innermost transaction on this thread, undoing its writes
    /// unless `commit` is set.
    fn end(&self, commit: bool) -> Result<(), RepositoryError> {
        let (undo, finished) = {
            let mut journals = self
                .journals
                .lock()
                .map_err(|_| RepositoryError::LockPoisoned("end"))?;
            let me = thread::current().id();
            let Some(journal) = journals.get_mut(&me) else {
                return Ok(());
            };
            let mark = journal.marks.pop().unwrap_or(0);
            let undo = if commit {
                Vec::new()
            } else {
                journal.undo.split_off(mark)
            };
            let finished = if journal.marks.is_empty() {
                journals.remove(&me)
            } else {
                None
            };
            (undo, finished)
        };

        if !undo.is_empty() {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| RepositoryError::LockPoisoned("rollback"))?;
            for (id, previous) in undo.into_iter().rev() {
                match previous {
                    Some(entity) => storage.insert(id, entity),
                    None => storage.remove(&id),
                };
            }
        }
        // Key locks go only once the undo is applied.
        drop(finished);
        Ok(())
    }
}

/// Open transaction on the current thread; rolls back if dropped unfinished.
struct Scope<'a, E: Resource> {
    repo: &'a InMemoryRepository<E>,
    open: bool,
}

impl<E: Resource> Scope<'_, E> {
    fn finish(mut self, commit: bool) -> Result<(), RepositoryError> {
        self.open = false;
        self.repo.end(commit)
    }
}

impl<E: Resource> Drop for Scope<'_, E> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.repo.end(false);
        }
    }
}

impl<E: Resource> Lookup<E> for InMemoryRepository<E> {
    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, RepositoryError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("find_by_id"))?;
        Ok(storage.get(id).cloned())
    }

    fn exists_by_id(&self, id: &E::Id) -> Result<bool, RepositoryError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("exists_by_id"))?;
        Ok(storage.contains_key(id))
    }

    fn find_all_by_ids(&self, ids: &[E::Id]) -> Result<Vec<E>, RepositoryError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("find_all_by_ids"))?;
        Ok(ids.iter().filter_map(|id| storage.get(id).cloned()).collect())
    }
}

impl<E: Resource + FieldAccess> Query<E> for InMemoryRepository<E> {
    fn find_all(&self) -> Result<Vec<E>, RepositoryError> {
        self.snapshot("find_all")
    }

    fn find_matching(&self, predicate: &Predicate) -> Result<Vec<E>, RepositoryError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("find_matching"))?;
        Ok(storage
            .values()
            .filter(|entity| predicate.matches(*entity))
            .cloned()
            .collect())
    }

    fn find_page(
        &self,
        request: &PageRequest,
        predicate: Option<&Predicate>,
    ) -> Result<Page<E>, RepositoryError> {
        let mut matching = match predicate {
            Some(predicate) => self.find_matching(predicate)?,
            None => self.snapshot("find_page")?,
        };
        matching.sort_by(|a, b| request.sort().compare(a, b));

        let total = matching.len();
        let content = matching
            .into_iter()
            .skip(request.offset())
            .take(request.size())
            .collect();
        Ok(Page::new(content, request, total))
    }
}

impl<E: Resource> Persist<E> for InMemoryRepository<E> {
    fn save(&self, mut entity: E) -> Result<E, RepositoryError> {
        let id = match entity.id() {
            Some(id) => id.clone(),
            None => {
                let generate = self.id_generator.as_ref().ok_or(RepositoryError::MissingId {
                    resource_type: E::RESOURCE_TYPE,
                })?;
                let id = generate();
                entity.set_id(id.clone());
                id
            }
        };

        let _guard = self.hold(&id)?;
        let previous = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| RepositoryError::LockPoisoned("save"))?;
            storage.insert(id.clone(), entity.clone())
        };
        self.record(id, previous)?;
        Ok(entity)
    }

    fn delete(&self, entity: &E) -> Result<(), RepositoryError> {
        let Some(id) = entity.id() else {
            return Ok(());
        };
        let _guard = self.hold(id)?;
        let previous = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| RepositoryError::LockPoisoned("delete"))?;
            storage.remove(id)
        };
        if previous.is_some() {
            self.record(id.clone(), previous)?;
        }
        Ok(())
    }
}

impl<E: Resource> Transactional<E> for InMemoryRepository<E> {
    fn transaction<T, F>(&self, key: Option<&E::Id>, work: F) -> Result<T, CrudError>
    where
        F: FnOnce() -> Result<T, CrudError>,
    {
        let _guard = match key {
            Some(id) => Some(
                self.locks
                    .acquire(&Self::lock_key(id))
                    .map_err(RepositoryError::from)?,
            ),
            None => None,
        };

        let scope = self.begin()?;
        let outcome = work();
        scope.finish(outcome.is_ok())?;
        outcome
    }
}
