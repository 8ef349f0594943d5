use std::marker::PhantomData;

use tracing::debug;

use crate::error::CrudError;
use crate::mapper::CompositeKeyResourceMapper;
use crate::page::{PageRequest, PageResult};
use crate::repository::Repository;
use crate::resource::{FieldAccess, Resource};
use crate::service::NestedCrudService;

use super::PathNames;

/// Boundary for a child addressed by `(parent id, local token)`.
///
/// The child's real identifier is derived by the mapper before any lookup.
pub struct CompositeKeyEndpoint<P: Resource, E: Resource, R, PR, M, Req, Dto, Token> {
    service: NestedCrudService<P, E, R, PR>,
    mapper: M,
    names: PathNames,
    _io: PhantomData<fn(Req, Token) -> Dto>,
}

impl<P, E, R, PR, M, Req, Dto, Token> CompositeKeyEndpoint<P, E, R, PR, M, Req, Dto, Token>
where
    P: Resource,
    E: Resource + FieldAccess,
    R: Repository<E>,
    PR: Repository<P>,
    M: CompositeKeyResourceMapper<E, Req, Dto, P::Id, Token>,
{
    pub fn new(service: NestedCrudService<P, E, R, PR>, mapper: M) -> Self {
        Self {
            service,
            mapper,
            names: PathNames::default(),
            _io: PhantomData,
        }
    }

    /// Path variable names used when bound to a transport; the token is read
    /// from the `id` name.
    pub fn with_path_names(mut self, parent_id: impl Into<String>, token: impl Into<String>) -> Self {
        self.names = PathNames {
            parent_id: parent_id.into(),
            id: token.into(),
        };
        self
    }

    pub fn service(&self) -> &NestedCrudService<P, E, R, PR> {
        &self.service
    }

    pub fn path_names(&self) -> &PathNames {
        &self.names
    }

    /// The identifier `(parent_id, token)` denotes.
    pub fn composite_id(&self, parent_id: &P::Id, token: &Token) -> E::Id {
        let id = self.mapper.composite_id(parent_id, token);
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Derived composite id");
        id
    }

    pub fn list(&self, parent_id: &P::Id) -> Result<Vec<Dto>, CrudError> {
        let found = self.service.list_by_parent(parent_id)?;
        Ok(found.iter().map(|e| self.mapper.to_dto(e)).collect())
    }

    pub fn page(&self, parent_id: &P::Id, request: &PageRequest) -> Result<PageResult<Dto>, CrudError> {
        let page = self.service.page_by_parent(parent_id, request)?;
        Ok(page.map(|e| self.mapper.to_dto(&e)).into())
    }

    pub fn get(&self, parent_id: &P::Id, token: &Token) -> Result<Dto, CrudError> {
        let id = self.composite_id(parent_id, token);
        Ok(self.mapper.to_dto(&self.service.get(parent_id, &id)?))
    }

    pub fn create(&self, parent_id: &P::Id, request: Req) -> Result<Dto, CrudError> {
        let entity = self.mapper.to_entity(parent_id, request);
        let created = self.service.create(parent_id, entity)?;
        Ok(self.mapper.to_dto(&created))
    }

    pub fn update(&self, parent_id: &P::Id, token: &Token, request: Req) -> Result<Dto, CrudError> {
        let id = self.composite_id(parent_id, token);
        let entity = self.mapper.update_entity(parent_id, request);
        let updated = self.service.update(parent_id, &id, entity)?;
        Ok(self.mapper.to_dto(&updated))
    }

    pub fn delete(&self, parent_id: &P::Id, token: &Token) -> Result<(), CrudError> {
        let id = self.composite_id(parent_id, token);
        self.service.delete(parent_id, &id)
    }
}
