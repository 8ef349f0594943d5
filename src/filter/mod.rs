//! Filter Specification Builder.
//!
//! A resource type declares its [`FilterCriteria`] once; per request,
//! [`build`] turns the client's search term into a storage [`Predicate`].
//!
//! ## Example
//!
//! ```ignore
//! use crud_rust::filter::{self, FilterCriteria, FilterableFields};
//!
//! let criteria = FilterCriteria::like(FilterableFields::concat(["first_name", "last_name"]));
//! let predicate = filter::build(&criteria, "john doe");
//! let authors = repository.find_matching(&predicate)?;
//! ```

mod criteria;
mod predicate;
mod specification;

pub use criteria::{FilterCriteria, FilterMatchingStrategy, FilterOperation, FilterableFields};
pub use predicate::{Predicate, Target};
pub use specification::build;
