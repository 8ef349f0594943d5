use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;

use crate::error::CrudError;
use crate::mapper::ResourceMapper;
use crate::page::{PageDefaults, PageRequest, PageResult};
use crate::patch::{self, Patchable};
use crate::repository::Repository;
use crate::resource::{FieldAccess, Resource};
use crate::service::CrudService;

/// Transport-neutral boundary for a single-level resource: requests in, DTOs out.
pub struct CrudEndpoint<E: Resource, R, M, Req, Dto> {
    service: CrudService<E, R>,
    mapper: M,
    page_defaults: PageDefaults,
    _io: PhantomData<fn(Req) -> Dto>,
}

impl<E, R, M, Req, Dto> CrudEndpoint<E, R, M, Req, Dto>
where
    E: Resource + FieldAccess,
    R: Repository<E>,
    M: ResourceMapper<E, Req, Dto>,
{
    pub fn new(service: CrudService<E, R>, mapper: M) -> Self {
        Self {
            service,
            mapper,
            page_defaults: PageDefaults::default(),
            _io: PhantomData,
        }
    }

    pub fn with_page_defaults(mut self, defaults: PageDefaults) -> Self {
        self.page_defaults = defaults;
        self
    }

    pub fn service(&self) -> &CrudService<E, R> {
        &self.service
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    pub fn page_defaults(&self) -> &PageDefaults {
        &self.page_defaults
    }

    pub fn list(&self, search: Option<&str>) -> Result<Vec<Dto>, CrudError> {
        let found = self.service.list(search)?;
        Ok(found.iter().map(|e| self.mapper.to_dto(e)).collect())
    }

    pub fn page(&self, request: &PageRequest, search: Option<&str>) -> Result<PageResult<Dto>, CrudError> {
        let page = self.service.page(request, search)?;
        Ok(page.map(|e| self.mapper.to_dto(&e)).into())
    }

    pub fn get(&self, id: &E::Id) -> Result<Dto, CrudError> {
        Ok(self.mapper.to_dto(&self.service.get(id)?))
    }

    pub fn get_by_ids(&self, ids: &[E::Id]) -> Result<Vec<Dto>, CrudError> {
        let found = self.service.get_by_ids(ids)?;
        Ok(found.iter().map(|e| self.mapper.to_dto(e)).collect())
    }

    pub fn create(&self, request: Req) -> Result<Dto, CrudError> {
        let created = self.service.create(self.mapper.to_entity(request))?;
        Ok(self.mapper.to_dto(&created))
    }

    pub fn update(&self, id: &E::Id, request: Req) -> Result<Dto, CrudError> {
        let updated = self
            .service
            .update(id, self.mapper.update_entity(id, request))?;
        Ok(self.mapper.to_dto(&updated))
    }

    pub fn delete(&self, id: &E::Id) -> Result<(), CrudError> {
        self.service.delete(id)
    }

    /// Merge `payload` into the stored resource and save it through the update
    /// path. Only fields `Req` declares patchable are touched; a request type
    /// with no patchable fields rejects PATCH outright.
    pub fn patch(&self, id: &E::Id, payload: &Value) -> Result<Dto, CrudError>
    where
        Req: Patchable,
    {
        if Req::PATCHABLE_FIELDS.is_empty() {
            return Err(CrudError::PatchNotSupported {
                resource_type: E::RESOURCE_TYPE.to_string(),
            });
        }
        debug!(resource_type = E::RESOURCE_TYPE, %id, "Patch");

        let repository = self.service.repository();
        let updated = repository.transaction(Some(id), || {
            let current = self.service.get(id)?;
            let patched = patch::apply_for::<Req, E>(&current, payload)?;
            self.service.update(id, patched)
        })?;
        Ok(self.mapper.to_dto(&updated))
    }
}
