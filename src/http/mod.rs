//! HTTP binding for endpoints. Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! [`router`] (flat resource):
//! - `GET /all?search=` - every resource, optionally filtered
//! - `GET /?page=&size=&sort=&search=` - one page, `sort` as `field[,asc|desc]`
//! - `GET /:id`, `POST /`, `PUT /:id`, `PATCH /:id`
//! - `DELETE /:id` - `204 No Content`
//!
//! [`nested_router`] (mount under a path that captures the parent id):
//! - `GET /`, `POST /`, `GET /:id`, `PUT /:id`, `PATCH /:id`, `DELETE /:id`
//!
//! Failures render as [`ErrorBody`] JSON with the error's status code.
//! Endpoint calls run on tokio's blocking pool, since they can wait on
//! per-resource locks.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crud_rust::http;
//!
//! let app = axum::Router::new()
//!     .nest("/books", http::router(Arc::new(books)))
//!     .nest("/books/:parentId/chapters", http::nested_router(Arc::new(chapters)));
//!
//! http::serve(app, "0.0.0.0:3000").await?;
//! ```

mod resource;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::endpoint::PathParams;
use crate::error::{CrudError, ErrorBody};
use crate::page::PageResult;
use crate::repository::RepositoryError;

pub use resource::{CrudResource, NestedResource, PageQuery, SearchQuery};

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}

/// Build an axum `Router` for a flat resource.
pub fn router<T: CrudResource>(endpoint: Arc<T>) -> Router {
    Router::new()
        .route("/", get(page_handler::<T>).post(create_handler::<T>))
        .route("/all", get(list_handler::<T>))
        .route(
            "/:id",
            get(get_handler::<T>)
                .put(update_handler::<T>)
                .patch(patch_handler::<T>)
                .delete(delete_handler::<T>),
        )
        .with_state(endpoint)
}

/// Build an axum `Router` for a parent-scoped resource. Nest it under a path
/// that captures the parent id with the name the endpoint expects.
pub fn nested_router<T: NestedResource>(endpoint: Arc<T>) -> Router {
    let item = format!("/:{}", endpoint.id_param());
    Router::new()
        .route("/", get(nested_list::<T>).post(nested_create::<T>))
        .route(
            &item,
            get(nested_get::<T>)
                .put(nested_update::<T>)
                .patch(nested_patch::<T>)
                .delete(nested_delete::<T>),
        )
        .with_state(endpoint)
}

/// Serve `app` at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve(app: Router, addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

fn parse_id<T: CrudResource>(raw: String) -> Result<T::Id, CrudError> {
    PathParams::new().with("id", raw).parse("id")
}

/// Run endpoint work on the blocking pool. Endpoint calls may wait on
/// per-resource locks and must not stall the async workers.
async fn blocking<R, F>(work: F) -> Result<R, CrudError>
where
    F: FnOnce() -> Result<R, CrudError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| RepositoryError::Storage(format!("request task failed: {err}")))?
}

async fn list_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<T::Dto>>, CrudError> {
    blocking(move || endpoint.list(query.search.as_deref())).await.map(Json)
}

async fn page_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResult<T::Dto>>, CrudError> {
    blocking(move || endpoint.page(&query)).await.map(Json)
}

async fn get_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Path(id): Path<String>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.get(&parse_id::<T>(id)?)).await.map(Json)
}

async fn create_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Json(request): Json<T::Request>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.create(request)).await.map(Json)
}

async fn update_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Path(id): Path<String>,
    Json(request): Json<T::Request>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.update(&parse_id::<T>(id)?, request))
        .await
        .map(Json)
}

async fn patch_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.patch(&parse_id::<T>(id)?, &payload))
        .await
        .map(Json)
}

async fn delete_handler<T: CrudResource>(
    State(endpoint): State<Arc<T>>,
    Path(id): Path<String>,
) -> Result<StatusCode, CrudError> {
    blocking(move || endpoint.delete(&parse_id::<T>(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn nested_list<T: NestedResource>(
    State(endpoint): State<Arc<T>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Vec<T::Dto>>, CrudError> {
    blocking(move || endpoint.list(&PathParams::from(params))).await.map(Json)
}

async fn nested_get<T: NestedResource>(
    State(endpoint): State<Arc<T>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.get(&PathParams::from(params))).await.map(Json)
}

async fn nested_create<T: NestedResource>(
    State(endpoint): State<Arc<T>>,
    Path(params): Path<HashMap<String, String>>,
    Json(request): Json<T::Request>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.create(&PathParams::from(params), request))
        .await
        .map(Json)
}

async fn nested_update<T: NestedResource>(
    State(endpoint): State<Arc<T>>,
    Path(params): Path<HashMap<String, String>>,
    Json(request): Json<T::Request>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.update(&PathParams::from(params), request))
        .await
        .map(Json)
}

async fn nested_patch<T: NestedResource>(
    State(endpoint): State<Arc<T>>,
    Path(params): Path<HashMap<String, String>>,
    Json(payload): Json<Value>,
) -> Result<Json<T::Dto>, CrudError> {
    blocking(move || endpoint.patch(&PathParams::from(params), &payload))
        .await
        .map(Json)
}

async fn nested_delete<T: NestedResource>(
    State(endpoint): State<Arc<T>>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<StatusCode, CrudError> {
    blocking(move || endpoint.delete(&PathParams::from(params))).await?;
    Ok(StatusCode::NO_CONTENT)
}
