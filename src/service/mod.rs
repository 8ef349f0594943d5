//! CRUD services: operation sequencing around a [`Repository`](crate::repository::Repository).
//!
//! A service is composed once per resource type from a repository plus
//! optional strategy functions (filter criteria, operation checks, lifecycle
//! hooks). Every strategy defaults to "permitted" or no-op; the service holds
//! no mutable state after construction.
//!
//! ## Example
//!
//! ```ignore
//! use crud_rust::{CrudService, FilterCriteria, FilterableFields, InMemoryRepository, OperationCheck};
//!
//! let books = CrudService::new(InMemoryRepository::<Book>::new().with_sequential_ids())
//!     .filter(FilterCriteria::like(FilterableFields::any_of(["title", "isbn"])))?
//!     .deletable(|book| {
//!         if book.published {
//!             OperationCheck::denied_with("Published books cannot be deleted")
//!         } else {
//!             OperationCheck::permitted()
//!         }
//!     });
//!
//! let created = books.create(Book::new("Dune"))?;
//! let found = books.list(Some("dune"))?;
//! ```

mod crud;
mod nested;

use tracing::warn;

use crate::check::OperationCheck;
use crate::error::CrudError;
use crate::filter::FilterCriteria;
use crate::resource::{FieldAccess, Resource};

pub use crud::CrudService;
pub use nested::NestedCrudService;

/// Permission gate over a resource.
pub type Check<E> = Box<dyn Fn(&E) -> OperationCheck + Send + Sync>;

/// Hook that may rewrite the resource before it is persisted.
pub type MutateHook<E> = Box<dyn Fn(&mut E) -> Result<(), CrudError> + Send + Sync>;

/// Hook that observes a resource and may veto the operation.
pub type InspectHook<E> = Box<dyn Fn(&E) -> Result<(), CrudError> + Send + Sync>;

pub(crate) fn permit_all<E>() -> Check<E> {
    Box::new(|_| OperationCheck::permitted())
}

pub(crate) fn no_op<E>() -> InspectHook<E> {
    Box::new(|_| Ok(()))
}

/// Turn a check outcome into a result, logging denials.
pub(crate) fn gate<E: Resource>(operation: &'static str, check: OperationCheck) -> Result<(), CrudError> {
    if !check.is_allowed() {
        warn!(
            resource_type = E::RESOURCE_TYPE,
            operation,
            reason = check.message().unwrap_or_default(),
            "Operation denied"
        );
    }
    check.into_result()
}

/// Fail unless every criteria field is known to `E`.
pub(crate) fn validate_criteria<E: FieldAccess>(criteria: &FilterCriteria) -> Result<(), CrudError> {
    criteria.fields().validate()?;
    match criteria.fields().keys().iter().find(|key| !E::has_field(key.as_str())) {
        Some(unknown) => Err(CrudError::invalid_argument(format!(
            "unknown filter field '{unknown}'"
        ))),
        None => Ok(()),
    }
}
