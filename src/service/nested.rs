use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::check::OperationCheck;
use crate::error::CrudError;
use crate::filter::Predicate;
use crate::page::{Page, PageRequest};
use crate::repository::Repository;
use crate::resource::{field_text, FieldAccess, Resource};

use super::{gate, no_op, permit_all, Check, InspectHook};

type EditCheck<E> = Box<dyn Fn(&<E as Resource>::Id, &E) -> OperationCheck + Send + Sync>;
type ParentHook<P, E> = Box<dyn Fn(&P, &E) -> Result<(), CrudError> + Send + Sync>;
type UpdateHook<E> = Box<dyn Fn(&mut E, &E) -> Result<(), CrudError> + Send + Sync>;

/// Generic service for a resource `E` that always lives under a parent `P`.
///
/// The child names its parent through `parent_field`, a field of `E` whose
/// value renders the same as the parent's identifier. Every operation proves
/// the parent exists first, and every child lookup is scoped to the parent in
/// the query itself.
pub struct NestedCrudService<P: Resource, E: Resource, R, PR> {
    repository: R,
    parents: PR,
    parent_field: String,
    creatable: Check<E>,
    editable: EditCheck<E>,
    deletable: Check<E>,
    after_create: ParentHook<P, E>,
    before_update: UpdateHook<E>,
    after_update: ParentHook<P, E>,
    before_delete: InspectHook<E>,
    _parent: PhantomData<fn() -> P>,
}

impl<P, E, R, PR> NestedCrudService<P, E, R, PR>
where
    P: Resource,
    E: Resource + FieldAccess,
    R: Repository<E>,
    PR: Repository<P>,
{
    /// Fails if `parent_field` is not a field of `E`.
    pub fn new(repository: R, parents: PR, parent_field: impl Into<String>) -> Result<Self, CrudError> {
        let parent_field = parent_field.into();
        if !E::has_field(&parent_field) {
            return Err(CrudError::invalid_argument(format!(
                "{} has no parent field '{parent_field}'",
                E::RESOURCE_TYPE
            )));
        }
        Ok(Self {
            repository,
            parents,
            parent_field,
            creatable: permit_all(),
            editable: Box::new(|_, _| OperationCheck::permitted()),
            deletable: permit_all(),
            after_create: Box::new(|_, _| Ok(())),
            before_update: Box::new(|_, _| Ok(())),
            after_update: Box::new(|_, _| Ok(())),
            before_delete: no_op(),
            _parent: PhantomData,
        })
    }

    pub fn creatable<F>(mut self, check: F) -> Self
    where
        F: Fn(&E) -> OperationCheck + Send + Sync + 'static,
    {
        self.creatable = Box::new(check);
        self
    }

    /// Edit check; sees the target id and the incoming resource.
    pub fn editable<F>(mut self, check: F) -> Self
    where
        F: Fn(&E::Id, &E) -> OperationCheck + Send + Sync + 'static,
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

    /// Runs after the child is saved, in the same transaction. An error undoes
    /// the save.
    pub fn after_create<F>(mut self, hook: F) -> Self
    where
        F: Fn(&P, &E) -> Result<(), CrudError> + Send + Sync + 'static,
    {
        self.after_create = Box::new(hook);
        self
    }

    /// Runs before the save with `(incoming, existing)`, to carry forward
    /// fields clients may not overwrite or drop stale derived ones.
    pub fn before_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut E, &E) -> Result<(), CrudError> + Send + Sync + 'static,
    {
        self.before_update = Box::new(hook);
        self
    }

    pub fn after_update<F>(mut self, hook: F) -> Self
    where
        F: Fn(&P, &E) -> Result<(), CrudError> + Send + Sync + 'static,
    {
        self.after_update = Box::new(hook);
        self
    }

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

    pub fn parents(&self) -> &PR {
        &self.parents
    }

    pub fn parent_field(&self) -> &str {
        &self.parent_field
    }

    fn resolve_parent(&self, parent_id: &P::Id) -> Result<P, CrudError> {
        self.parents.find_by_id(parent_id)?.ok_or_else(|| {
            warn!(parent_type = P::RESOURCE_TYPE, %parent_id, "Parent not found");
            CrudError::not_found(P::RESOURCE_TYPE, parent_id)
        })
    }

    fn children_of(&self, parent_id: &P::Id) -> Predicate {
        Predicate::field_equals(self.parent_field.clone(), parent_id.to_string())
    }

    fn belongs_to(&self, entity: &E, parent_id: &P::Id) -> Result<(), CrudError> {
        let owner = entity
            .field_value(&self.parent_field)
            .as_ref()
            .and_then(field_text);
        if owner.as_deref() == Some(parent_id.to_string().as_str()) {
            return Ok(());
        }
        Err(CrudError::invalid_argument(format!(
            "{} does not belong to {} (ID: {parent_id})",
            E::RESOURCE_TYPE,
            P::RESOURCE_TYPE
        )))
    }

    /// Children of the parent.
    pub fn list_by_parent(&self, parent_id: &P::Id) -> Result<Vec<E>, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, "List by parent");
        self.resolve_parent(parent_id)?;
        Ok(self.repository.find_matching(&self.children_of(parent_id))?)
    }

    pub fn page_by_parent(&self, parent_id: &P::Id, request: &PageRequest) -> Result<Page<E>, CrudError> {
        debug!(
            resource_type = E::RESOURCE_TYPE,
            %parent_id,
            page = request.page(),
            size = request.size(),
            "Page by parent"
        );
        self.resolve_parent(parent_id)?;
        Ok(self
            .repository
            .find_page(request, Some(&self.children_of(parent_id)))?)
    }

    /// The child `id` under `parent_id`. A child of another parent is reported
    /// as not found.
    pub fn get(&self, parent_id: &P::Id, id: &E::Id) -> Result<E, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Get");
        self.resolve_parent(parent_id)?;
        let scoped = self
            .children_of(parent_id)
            .and(Predicate::id_equals(id.to_string()));
        self.repository.find_one(&scoped)?.ok_or_else(|| {
            warn!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Not found");
            CrudError::not_found(E::RESOURCE_TYPE, id)
        })
    }

    pub fn create(&self, parent_id: &P::Id, entity: E) -> Result<E, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, "Create");
        let parent = self.resolve_parent(parent_id)?;
        self.belongs_to(&entity, parent_id)?;
        gate::<E>("create", (self.creatable)(&entity))?;

        let saved = self.repository.transaction(None, || {
            let saved = self.repository.save(entity)?;
            (self.after_create)(&parent, &saved)?;
            Ok(saved)
        })?;

        if let Some(id) = saved.id() {
            info!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Created");
        }
        Ok(saved)
    }

    pub fn update(&self, parent_id: &P::Id, id: &E::Id, mut entity: E) -> Result<E, CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Update");

        let saved = self.repository.transaction(Some(id), || {
            let parent = self.resolve_parent(parent_id)?;
            let existing = self.get(parent_id, id)?;
            entity.set_id(id.clone());
            gate::<E>("update", (self.editable)(id, &entity))?;
            (self.before_update)(&mut entity, &existing)?;
            self.belongs_to(&entity, parent_id)?;
            let saved = self.repository.save(entity)?;
            (self.after_update)(&parent, &saved)?;
            Ok(saved)
        })?;

        info!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Updated");
        Ok(saved)
    }

    pub fn delete(&self, parent_id: &P::Id, id: &E::Id) -> Result<(), CrudError> {
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Delete");

        self.repository.transaction(Some(id), || {
            let entity = self.get(parent_id, id)?;
            gate::<E>("delete", (self.deletable)(&entity))?;
            (self.before_delete)(&entity)?;
            Ok(self.repository.delete(&entity)?)
        })?;

        info!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Deleted");
        Ok(())
    }
}
