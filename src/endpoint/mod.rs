//! Transport-neutral endpoints.
//!
//! An endpoint pairs a service with a mapper: it takes request payloads and
//! raw identifiers from whatever transport is in front of it, and hands back
//! DTOs or a [`CrudError`](crate::error::CrudError). The optional `http`
//! feature binds these to axum routes.

mod composite;
mod crud;
mod nested;
mod path;

pub use composite::CompositeKeyEndpoint;
pub use crud::CrudEndpoint;
pub use nested::NestedCrudEndpoint;
pub use path::{PathNames, PathParams};
