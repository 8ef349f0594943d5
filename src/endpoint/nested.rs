use std::marker::PhantomData;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::error::CrudError;
use crate::mapper::NestedResourceMapper;
use crate::page::{PageDefaults, PageRequest, PageResult};
use crate::patch::{self, Patchable};
use crate::repository::Repository;
use crate::resource::{FieldAccess, Resource};
use crate::service::NestedCrudService;

use super::{PathNames, PathParams};

/// Boundary for a parent-scoped resource addressed by path variables.
///
/// Identifiers are parsed from [`PathParams`] before anything touches a
/// repository.
pub struct NestedCrudEndpoint<P: Resource, E: Resource, R, PR, M, Req, Dto> {
    service: NestedCrudService<P, E, R, PR>,
    mapper: M,
    names: PathNames,
    page_defaults: PageDefaults,
    _io: PhantomData<fn(Req) -> Dto>,
}

impl<P, E, R, PR, M, Req, Dto> NestedCrudEndpoint<P, E, R, PR, M, Req, Dto>
where
    P: Resource,
    P::Id: FromStr,
    E: Resource + FieldAccess,
    E::Id: FromStr,
    R: Repository<E>,
    PR: Repository<P>,
    M: NestedResourceMapper<E, Req, Dto, P::Id>,
{
    pub fn new(service: NestedCrudService<P, E, R, PR>, mapper: M) -> Self {
        Self {
            service,
            mapper,
            names: PathNames::default(),
            page_defaults: PageDefaults::default(),
            _io: PhantomData,
        }
    }

    /// Read the identifiers from differently named path variables.
    pub fn with_path_names(mut self, parent_id: impl Into<String>, id: impl Into<String>) -> Self {
        self.names = PathNames {
            parent_id: parent_id.into(),
            id: id.into(),
        };
        self
    }

    pub fn with_page_defaults(mut self, defaults: PageDefaults) -> Self {
        self.page_defaults = defaults;
        self
    }

    pub fn service(&self) -> &NestedCrudService<P, E, R, PR> {
        &self.service
    }

    pub fn page_defaults(&self) -> &PageDefaults {
        &self.page_defaults
    }

    pub fn path_names(&self) -> &PathNames {
        &self.names
    }

    fn parent_id(&self, params: &PathParams) -> Result<P::Id, CrudError> {
        params.parse(&self.names.parent_id)
    }

    fn ids(&self, params: &PathParams) -> Result<(P::Id, E::Id), CrudError> {
        Ok((self.parent_id(params)?, params.parse(&self.names.id)?))
    }

    pub fn list(&self, params: &PathParams) -> Result<Vec<Dto>, CrudError> {
        let parent_id = self.parent_id(params)?;
        let found = self.service.list_by_parent(&parent_id)?;
        Ok(found.iter().map(|e| self.mapper.to_dto(e)).collect())
    }

    pub fn page(&self, params: &PathParams, request: &PageRequest) -> Result<PageResult<Dto>, CrudError> {
        let parent_id = self.parent_id(params)?;
        let page = self.service.page_by_parent(&parent_id, request)?;
        Ok(page.map(|e| self.mapper.to_dto(&e)).into())
    }

    pub fn get(&self, params: &PathParams) -> Result<Dto, CrudError> {
        let (parent_id, id) = self.ids(params)?;
        Ok(self.mapper.to_dto(&self.service.get(&parent_id, &id)?))
    }

    pub fn create(&self, params: &PathParams, request: Req) -> Result<Dto, CrudError> {
        let parent_id = self.parent_id(params)?;
        let entity = self.mapper.to_entity(&parent_id, request);
        let created = self.service.create(&parent_id, entity)?;
        Ok(self.mapper.to_dto(&created))
    }

    pub fn update(&self, params: &PathParams, request: Req) -> Result<Dto, CrudError> {
        let (parent_id, id) = self.ids(params)?;
        let entity = self.mapper.update_entity(&id, &parent_id, request);
        let updated = self.service.update(&parent_id, &id, entity)?;
        Ok(self.mapper.to_dto(&updated))
    }

    pub fn delete(&self, params: &PathParams) -> Result<(), CrudError> {
        let (parent_id, id) = self.ids(params)?;
        self.service.delete(&parent_id, &id)
    }

    /// Parent-scoped counterpart of [`CrudEndpoint::patch`](super::CrudEndpoint::patch).
    pub fn patch(&self, params: &PathParams, payload: &Value) -> Result<Dto, CrudError>
    where
        Req: Patchable,
    {
        if Req::PATCHABLE_FIELDS.is_empty() {
            return Err(CrudError::PatchNotSupported {
                resource_type: E::RESOURCE_TYPE.to_string(),
            });
        }
        let (parent_id, id) = self.ids(params)?;
        debug!(resource_type = E::RESOURCE_TYPE, %parent_id, %id, "Patch");

        let updated = self.service.repository().transaction(Some(&id), || {
            let current = self.service.get(&parent_id, &id)?;
            let patched = patch::apply_for::<Req, E>(&current, payload)?;
            self.service.update(&parent_id, &id, patched)
        })?;
        Ok(self.mapper.to_dto(&updated))
    }
}
