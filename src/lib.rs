//! Generic resource-lifecycle engine.
//!
//! Uniform CRUD services over any number of resource types: search filters
//! built from declared criteria, permission checks and lifecycle hooks around
//! every mutation, allowlisted PATCH, and parent-scoped (nested) resources,
//! all over a pluggable [`Repository`].

extern crate self as crud_rust;

pub mod check;
pub mod endpoint;
pub mod error;
pub mod filter;
#[cfg(feature = "http")]
pub mod http;
pub mod lock;
pub mod mapper;
pub mod page;
pub mod patch;
pub mod repository;
pub mod resource;
pub mod service;

pub use check::{OperationCheck, DEFAULT_DENIED_MESSAGE};
pub use endpoint::{CompositeKeyEndpoint, CrudEndpoint, NestedCrudEndpoint, PathNames, PathParams};
pub use error::{
    CommonErrorCode, CommonFieldErrorCode, CrudError, ErrorBody, ErrorInfo, FieldErrorInfo,
};
pub use filter::{
    FilterCriteria, FilterMatchingStrategy, FilterOperation, FilterableFields, Predicate, Target,
};
pub use lock::{InMemoryLock, InMemoryLockManager, Lock, LockError, LockGuard, LockManager};
pub use mapper::{CompositeKeyResourceMapper, NestedResourceMapper, ResourceMapper};
pub use page::{Direction, Page, PageDefaults, PageRequest, PageResult, Sort};
pub use patch::Patchable;
pub use repository::{
    InMemoryRepository, Lookup, Persist, Query, Repository, RepositoryError, Transactional,
};
pub use resource::{field_text, read_field, write_field, FieldAccess, Resource};
pub use service::{CrudService, NestedCrudService};

// Derive macros share names with their traits
pub use crud_rust_macros::{FieldAccess, Patchable, Resource};

pub use serde_json::Value;
