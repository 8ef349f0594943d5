use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::check::OperationCheck;
use crate::error::CrudError;
use crate::filter::{self, FilterCriteria, Predicate};
use crate::page::{Page, PageRequest};
use crate::repository::Repository;
use crate::resource::{FieldAccess, Resource};

use super::{gate, no_op, permit_all, validate_criteria, Check, InspectHook, MutateHook};

/// Generic service for a single-level resource type.
pub struct CrudService<E: Resource, R> {
    repository: R,
    criteria: Option<FilterCriteria>,
    creatable: Check<E>,
    editable: Check<E>,
    deletable: Check<E>,
    before_create: MutateHook<E>,
    before_delete: InspectHook<E>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> CrudService<E, R>
where
    E: Resource + FieldAccess,
    R: Repository<E>,
{
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            criteria: None,
            creatable: permit_all(),
            editable: permit_all(),
            deletable: permit_all(),
            before_create: Box::new(|_| Ok(())),
            before_delete: no_op(),
            _entity: PhantomData,
        }
    }

    /// Declare the search criteria. Fails if a criteria field is unknown to `E`.
    pub fn filter(mut self, criteria: FilterCriteria) -> Result<Self, CrudError> {
        validate_criteria::<E>(&criteria)?;
        self.criteria = Some(criteria);
        Ok(self)
    }

    pub fn creatable<F>(mut self, check: F) -> Self
    where
        F: Fn(&E) -> OperationCheck + Send + Sync + 'static,
    {
        self.creatable = Box::new(check);
        self
    }

    pub fn editable<F>(mut self, check: F) -> Self
    where
        F: Fn(&E) -> OperationCheck + Send + Sync + 'static,
    {
        self.editable = Box::new(check);
        self
    }

    pub fn deletable<F>(mut self, check: F) -> Self
    where
        F: Fn(&E) -> OperationCheck + Send + Sync + 'static,
    {
        self.deletable = Box::new(check);
        self
    }

    /// Runs after the create check passes, right before the save.
    pub fn before_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut E) -> Result<(), CrudError> + Send + Sync + 'static,
    {
        self.before_create = Box::new(hook);
        self
    }

    /// Runs after the delete check passes, right before the removal.
    pub fn before_delete<F>(mut self, hook: F) -> Self
    where
        F: Fn(&E) -> Result<(), CrudError> + Send + Sync + 'static,
    {
        self.before_delete = Box::new(hook);
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn criteria(&self) -> Option<&FilterCriteria> {
        self.criteria.as_ref()
    }

    /// `None` when there is nothing to filter on.
    fn predicate(&self, search: Option<&str>) -> Option<Predicate> {
        let term = search.filter(|term| !term.is_empty())?;
        let criteria = self.criteria.as_ref()?;
        Some(filter::build(criteria, term))
    }

    /// All resources, narrowed by `search` when criteria are declared.
    pub fn list(&self, search: Option<&str>) -> Result<Vec<E>, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, ?search, "List");
        let found = match self.predicate(search) {
            Some(predicate) => self.repository.find_matching(&predicate)?,
            None => self.repository.find_all()?,
        };
        Ok(found)
    }

    pub fn page(&self, request: &PageRequest, search: Option<&str>) -> Result<Page<E>, CrudError> {
        debug!(
            resource_type = E::RESOURCE_TYPE,
            page = request.page(),
            size = request.size(),
            ?search,
            "Page"
        );
        let predicate = self.predicate(search);
        Ok(self.repository.find_page(request, predicate.as_ref())?)
    }

    pub fn get(&self, id: &E::Id) -> Result<E, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %id, "Get");
        self.repository.find_by_id(id)?.ok_or_else(|| {
            warn!(resource_type = E::RESOURCE_TYPE, %id, "Not found");
            CrudError::not_found(E::RESOURCE_TYPE, id)
        })
    }

    /// Bulk fetch. Identifiers that do not resolve are left out rather than
    /// failing the call.
    pub fn get_by_ids(&self, ids: &[E::Id]) -> Result<Vec<E>, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, count = ids.len(), "Get by ids");
        Ok(self.repository.find_all_by_ids(ids)?)
    }

    pub fn create(&self, mut entity: E) -> Result<E, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, "Create");
        gate::<E>("create", (self.creatable)(&entity))?;

        let saved = self.repository.transaction(None, || {
            (self.before_create)(&mut entity)?;
            Ok(self.repository.save(entity)?)
        })?;

        if let Some(id) = saved.id() {
            info!(resource_type = E::RESOURCE_TYPE, %id, "Created");
        }
        Ok(saved)
    }

    /// Full replacement of `id`. The stored resource carries `id` whatever the
    /// incoming resource says.
    pub fn update(&self, id: &E::Id, mut entity: E) -> Result<E, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %id, "Update");

        let saved = self.repository.transaction(Some(id), || {
            if !self.repository.exists_by_id(id)? {
                warn!(resource_type = E::RESOURCE_TYPE, %id, "Not found");
                return Err(CrudError::not_found(E::RESOURCE_TYPE, id));
            }
            entity.set_id(id.clone());
            gate::<E>("update", (self.editable)(&entity))?;
            Ok(self.repository.save(entity)?)
        })?;

        info!(resource_type = E::RESOURCE_TYPE, %id, "Updated");
        Ok(saved)
    }

    pub fn delete(&self, id: &E::Id) -> Result<(), CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %id, "Delete");

        self.repository.transaction(Some(id), || {
            let entity = self.get(id)?;
            gate::<E>("delete", (self.deletable)(&entity))?;
            (self.before_delete)(&entity)?;
            Ok(self.repository.delete(&entity)?)
        })?;

        info!(resource_type = E::RESOURCE_TYPE, %id, "Deleted");
        Ok(())
    }
}
