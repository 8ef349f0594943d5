//! Pagination and sorting.
//!
//! Page numbers are zero-based on the way in ([`PageRequest`]) and one-based
//! on the way out ([`PageResult::current_page`]).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CrudError;
use crate::resource::{FieldAccess, Resource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Sort order for a page. The field `"id"` sorts by the resource identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    field: String,
    #[serde(default)]
    direction: Direction,
}

impl Sort {
    pub const ID: &'static str = "id";

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    pub fn by_id() -> Self {
        Self::asc(Self::ID)
    }

    /// Parse `"field"` or `"field,asc|desc"`.
    pub fn parse(raw: &str) -> Result<Self, CrudError> {
        let mut parts = raw.split(',').map(str::trim);
        let field = match parts.next() {
            Some(field) if !field.is_empty() => field,
            _ => return Err(CrudError::invalid_argument("sort field must not be empty")),
        };
        let direction = match parts.next() {
            None => Direction::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(dir) if dir.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(dir) => {
                return Err(CrudError::invalid_argument(format!(
                    "unknown sort direction '{dir}'"
                )))
            }
        };
        if parts.next().is_some() {
            return Err(CrudError::invalid_argument(format!("malformed sort '{raw}'")));
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Order two resources by this sort, falling back to the identifier so the
    /// order is total.
    pub fn compare<E: Resource + FieldAccess>(&self, a: &E, b: &E) -> Ordering {
        let primary = if self.field == Self::ID {
            a.id().cmp(&b.id())
        } else {
            compare_values(
                a.field_value(&self.field).as_ref(),
                b.field_value(&self.field).as_ref(),
            )
            .then_with(|| a.id().cmp(&b.id()))
        };
        match self.direction {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::by_id()
    }
}

/// Nulls first, numbers numerically, everything else by its text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    size: usize,
    sort: Sort,
}

impl PageRequest {
    /// Zero-based `page` of `size` elements, sorted by id ascending.
    ///
    /// The end of the page (`(page + 1) * size`) must fit in a `usize`.
    pub fn new(page: usize, size: usize) -> Result<Self, CrudError> {
        if size == 0 {
            return Err(CrudError::invalid_argument("page size must be at least 1"));
        }
        if page.checked_add(1).and_then(|n| n.checked_mul(size)).is_none() {
            return Err(CrudError::invalid_argument(format!(
                "page {page} of size {size} is out of range"
            )));
        }
        Ok(Self {
            page,
            size,
            sort: Sort::by_id(),
        })
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of a sorted result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    number: usize,
    size: usize,
    total_elements: usize,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Zero-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size)
    }

    pub fn is_last(&self) -> bool {
        self.number.saturating_add(1) >= self.total_pages()
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Client-facing page envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<D> {
    pub content: Vec<D>,
    pub total_pages: usize,
    /// One-based.
    pub current_page: usize,
    pub total_elements: usize,
    pub last: bool,
}

impl<D> From<Page<D>> for PageResult<D> {
    fn from(page: Page<D>) -> Self {
        let total_pages = page.total_pages();
        let current_page = page.number().saturating_add(1);
        let total_elements = page.total_elements();
        let last = page.is_last();
        Self {
            content: page.into_content(),
            total_pages,
            current_page,
            total_elements,
            last,
        }
    }
}

/// Paging configuration applied to requests that omit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDefaults {
    pub default_size: usize,
    /// Larger requested sizes are clamped to this.
    pub max_size: usize,
    pub sort: Sort,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 2000,
            sort: Sort::by_id(),
        }
    }
}

impl PageDefaults {
    /// Build a request from optional client parameters.
    pub fn request(
        &self,
        page: Option<usize>,
        size: Option<usize>,
        sort: Option<&str>,
    ) -> Result<PageRequest, CrudError> {
        let size = size.unwrap_or(self.default_size).min(self.max_size);
        let sort = match sort {
            Some(raw) if !raw.trim().is_empty() => Sort::parse(raw)?,
            _ => self.sort.clone(),
        };
        Ok(PageRequest::new(page.unwrap_or(0), size)?.with_sort(sort))
    }
}
