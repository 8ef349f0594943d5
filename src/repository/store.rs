use crate::error::CrudError;
use crate::filter::Predicate;
use crate::page::{Page, PageRequest};
use crate::resource::Resource;

use super::RepositoryError;

/// Look resources up by identifier.
pub trait Lookup<E: Resource> {
    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, RepositoryError>;

    fn exists_by_id(&self, id: &E::Id) -> Result<bool, RepositoryError> {
        Ok(self.find_by_id(id)?.is_some())
    }

    /// Identifiers that resolve to nothing are left out of the result.
    fn find_all_by_ids(&self, ids: &[E::Id]) -> Result<Vec<E>, RepositoryError> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(entity) = self.find_by_id(id)? {
                found.push(entity);
            }
        }
        Ok(found)
    }
}

/// Query resources by [`Predicate`].
pub trait Query<E: Resource> {
    fn find_all(&self) -> Result<Vec<E>, RepositoryError> {
        self.find_matching(&Predicate::Always)
    }

    fn find_matching(&self, predicate: &Predicate) -> Result<Vec<E>, RepositoryError>;

    fn find_one(&self, predicate: &Predicate) -> Result<Option<E>, RepositoryError> {
        Ok(self.find_matching(predicate)?.into_iter().next())
    }

    /// Sorted page of the resources matching `predicate` (all when `None`).
    fn find_page(
        &self,
        request: &PageRequest,
        predicate: Option<&Predicate>,
    ) -> Result<Page<E>, RepositoryError>;
}

/// Write resources.
pub trait Persist<E: Resource> {
    /// Insert or replace, returning the stored resource (with its id set).
    fn save(&self, entity: E) -> Result<E, RepositoryError>;

    /// Remove the resource. Deleting something already gone is not an error.
    fn delete(&self, entity: &E) -> Result<(), RepositoryError>;
}

/// Run a unit of work atomically.
pub trait Transactional<E: Resource> {
    /// Run `work` so that its writes commit together or not at all.
    ///
    /// With a `key`, concurrent transactions on the same resource are
    /// serialized. An `Err` from `work` discards every write it made through
    /// this repository. Nested calls on the same thread join the outer
    /// transaction.
    fn transaction<T, F>(&self, key: Option<&E::Id>, work: F) -> Result<T, CrudError>
    where
        F: FnOnce() -> Result<T, CrudError>;
}

/// Everything the services need from storage.
pub trait Repository<E: Resource>:
    Lookup<E> + Query<E> + Persist<E> + Transactional<E> + Send + Sync
{
}

impl<E, T> Repository<E> for T
where
    E: Resource,
    T: Lookup<E> + Query<E> + Persist<E> + Transactional<E> + Send + Sync,
{
}
