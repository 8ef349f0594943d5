//! Storage abstraction used by the services.
//!
//! A repository is split into capability traits ([`Lookup`], [`Query`],
//! [`Persist`], [`Transactional`]); anything implementing all four is a
//! [`Repository`].

mod error;
mod in_memory;
mod store;

pub use error::RepositoryError;
pub use in_memory::InMemoryRepository;
pub use store::{Lookup, Persist, Query, Repository, Transactional};
