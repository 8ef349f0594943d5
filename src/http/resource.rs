//! Object-level views of the endpoints that the axum handlers work against.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::{CompositeKeyEndpoint, CrudEndpoint, NestedCrudEndpoint, PathParams};
use crate::error::CrudError;
use crate::mapper::{CompositeKeyResourceMapper, NestedResourceMapper, ResourceMapper};
use crate::page::PageResult;
use crate::patch::Patchable;
use crate::repository::Repository;
use crate::resource::{FieldAccess, Resource};

/// `?search=`
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// `?page=&size=&sort=&search=`
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

/// A flat resource as seen by the router.
pub trait CrudResource: Send + Sync + 'static {
    type Id: FromStr;
    type Request: DeserializeOwned + Send + 'static;
    type Dto: Serialize + Send + 'static;

    fn list(&self, search: Option<&str>) -> Result<Vec<Self::Dto>, CrudError>;
    fn page(&self, query: &PageQuery) -> Result<PageResult<Self::Dto>, CrudError>;
    fn get(&self, id: &Self::Id) -> Result<Self::Dto, CrudError>;
    fn create(&self, request: Self::Request) -> Result<Self::Dto, CrudError>;
    fn update(&self, id: &Self::Id, request: Self::Request) -> Result<Self::Dto, CrudError>;
    fn delete(&self, id: &Self::Id) -> Result<(), CrudError>;
    fn patch(&self, id: &Self::Id, payload: &Value) -> Result<Self::Dto, CrudError>;
}

impl<E, R, M, Req, Dto> CrudResource for CrudEndpoint<E, R, M, Req, Dto>
where
    E: Resource + FieldAccess,
    E::Id: FromStr,
    R: Repository<E> + 'static,
    M: ResourceMapper<E, Req, Dto> + 'static,
    Req: DeserializeOwned + Patchable + Send + 'static,
    Dto: Serialize + Send + 'static,
{
    type Id = E::Id;
    type Request = Req;
    type Dto = Dto;

    fn list(&self, search: Option<&str>) -> Result<Vec<Dto>, CrudError> {
        CrudEndpoint::list(self, search)
    }

    fn page(&self, query: &PageQuery) -> Result<PageResult<Dto>, CrudError> {
        let request = self
            .page_defaults()
            .request(query.page, query.size, query.sort.as_deref())?;
        CrudEndpoint::page(self, &request, query.search.as_deref())
    }

    fn get(&self, id: &E::Id) -> Result<Dto, CrudError> {
        CrudEndpoint::get(self, id)
    }

    fn create(&self, request: Req) -> Result<Dto, CrudError> {
        CrudEndpoint::create(self, request)
    }

    fn update(&self, id: &E::Id, request: Req) -> Result<Dto, CrudError> {
        CrudEndpoint::update(self, id, request)
    }

    fn delete(&self, id: &E::Id) -> Result<(), CrudError> {
        CrudEndpoint::delete(self, id)
    }

    fn patch(&self, id: &E::Id, payload: &Value) -> Result<Dto, CrudError> {
        CrudEndpoint::patch(self, id, payload)
    }
}

/// A parent-scoped resource as seen by the router. Identifiers come in as
/// raw path variables.
pub trait NestedResource: Send + Sync + 'static {
    type Request: DeserializeOwned + Send + 'static;
    type Dto: Serialize + Send + 'static;

    /// Name of the child path variable.
    fn id_param(&self) -> &str;

    fn list(&self, params: &PathParams) -> Result<Vec<Self::Dto>, CrudError>;
    fn get(&self, params: &PathParams) -> Result<Self::Dto, CrudError>;
    fn create(&self, params: &PathParams, request: Self::Request) -> Result<Self::Dto, CrudError>;
    fn update(&self, params: &PathParams, request: Self::Request) -> Result<Self::Dto, CrudError>;
    fn delete(&self, params: &PathParams) -> Result<(), CrudError>;
    fn patch(&self, params: &PathParams, payload: &Value) -> Result<Self::Dto, CrudError>;
}

impl<P, E, R, PR, M, Req, Dto> NestedResource for NestedCrudEndpoint<P, E, R, PR, M, Req, Dto>
where
    P: Resource,
    P::Id: FromStr,
    E: Resource + FieldAccess,
    E::Id: FromStr,
    R: Repository<E> + 'static,
    PR: Repository<P> + 'static,
    M: NestedResourceMapper<E, Req, Dto, P::Id> + 'static,
    Req: DeserializeOwned + Patchable + Send + 'static,
    Dto: Serialize + Send + 'static,
{
    type Request = Req;
    type Dto = Dto;

    fn id_param(&self) -> &str {
        &self.path_names().id
    }

    fn list(&self, params: &PathParams) -> Result<Vec<Dto>, CrudError> {
        NestedCrudEndpoint::list(self, params)
    }

    fn get(&self, params: &PathParams) -> Result<Dto, CrudError> {
        NestedCrudEndpoint::get(self, params)
    }

    fn create(&self, params: &PathParams, request: Req) -> Result<Dto, CrudError> {
        NestedCrudEndpoint::create(self, params, request)
    }

    fn update(&self, params: &PathParams, request: Req) -> Result<Dto, CrudError> {
        NestedCrudEndpoint::update(self, params, request)
    }

    fn delete(&self, params: &PathParams) -> Result<(), CrudError> {
        NestedCrudEndpoint::delete(self, params)
    }

    fn patch(&self, params: &PathParams, payload: &Value) -> Result<Dto, CrudError> {
        NestedCrudEndpoint::patch(self, params, payload)
    }
}

impl<P, E, R, PR, M, Req, Dto, Token> NestedResource
    for CompositeKeyEndpoint<P, E, R, PR, M, Req, Dto, Token>
where
    P: Resource,
    P::Id: FromStr,
    E: Resource + FieldAccess,
    R: Repository<E> + 'static,
    PR: Repository<P> + 'static,
    M: CompositeKeyResourceMapper<E, Req, Dto, P::Id, Token> + 'static,
    Req: DeserializeOwned + Send + 'static,
    Dto: Serialize + Send + 'static,
    Token: FromStr + 'static,
{
    type Request = Req;
    type Dto = Dto;

    fn id_param(&self) -> &str {
        &self.path_names().id
    }

    fn list(&self, params: &PathParams) -> Result<Vec<Dto>, CrudError> {
        let parent_id = params.parse(&self.path_names().parent_id)?;
        CompositeKeyEndpoint::list(self, &parent_id)
    }

    fn get(&self, params: &PathParams) -> Result<Dto, CrudError> {
        let (parent_id, token) = composite_params(self.path_names(), params)?;
        CompositeKeyEndpoint::get(self, &parent_id, &token)
    }

    fn create(&self, params: &PathParams, request: Req) -> Result<Dto, CrudError> {
        let parent_id = params.parse(&self.path_names().parent_id)?;
        CompositeKeyEndpoint::create(self, &parent_id, request)
    }

    fn update(&self, params: &PathParams, request: Req) -> Result<Dto, CrudError> {
        let (parent_id, token) = composite_params(self.path_names(), params)?;
        CompositeKeyEndpoint::update(self, &parent_id, &token, request)
    }

    fn delete(&self, params: &PathParams) -> Result<(), CrudError> {
        let (parent_id, token) = composite_params(self.path_names(), params)?;
        CompositeKeyEndpoint::delete(self, &parent_id, &token)
    }

    fn patch(&self, _params: &PathParams, _payload: &Value) -> Result<Dto, CrudError> {
        Err(CrudError::PatchNotSupported {
            resource_type: E::RESOURCE_TYPE.to_string(),
        })
    }
}

fn composite_params<PI: FromStr, T: FromStr>(
    names: &crate::endpoint::PathNames,
    params: &PathParams,
) -> Result<(PI, T), CrudError> {
    Ok((params.parse(&names.parent_id)?, params.parse(&names.id)?))
}
