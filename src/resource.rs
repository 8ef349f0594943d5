//! Resource traits: identity plus a typed, name-keyed field table.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::CrudError;

/// Any entity managed by the engine.
///
/// The identifier is `None` until the resource is persisted (or the mapper
/// assigns one); uniqueness is the repository's business.
pub trait Resource: Clone + Send + Sync + 'static {
    /// The identifier type (e.g. `u64`, `String`, a composite key).
    type Id: Clone + Eq + Hash + Ord + Display + Debug + Send + Sync + 'static;

    /// Resource type name used in errors and logs (e.g. "Book").
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> Option<&Self::Id>;

    fn set_id(&mut self, id: Self::Id);
}

/// Typed getter/setter table keyed by field name.
///
/// Filters read through `field_value`; the patch engine writes through
/// `set_field` / `clear_field`. Usually derived with `#[derive(FieldAccess)]`.
pub trait FieldAccess {
    /// Every field name the table knows.
    const FIELDS: &'static [&'static str];

    /// The field's current value, `None` when null or unknown.
    fn field_value(&self, field: &str) -> Option<Value>;

    /// Convert `value` to the field's type and assign it.
    fn set_field(&mut self, field: &str, value: &Value) -> Result<(), CrudError>;

    /// Reset the field to its empty value.
    fn clear_field(&mut self, field: &str) -> Result<(), CrudError>;

    fn has_field(field: &str) -> bool
    where
        Self: Sized,
    {
        Self::FIELDS.contains(&field)
    }
}

/// Getter used by derived tables.
pub fn read_field<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

/// Setter conversion used by derived tables.
///
/// A string that does not fit the field type is retried as JSON text, so
/// `"42"` patches a numeric field and `"true"` a boolean one.
pub fn write_field<T: DeserializeOwned>(field: &str, value: &Value) -> Result<T, CrudError> {
    match serde_json::from_value::<T>(value.clone()) {
        Ok(converted) => Ok(converted),
        Err(err) => match value {
            Value::String(text) => {
                serde_json::from_str::<T>(text).map_err(|_| CrudError::patch(field, &err))
            }
            _ => Err(CrudError::patch(field, err)),
        },
    }
}

/// Text form of a field value for comparisons: strings as-is, scalars through
/// their JSON text, null as absent.
pub fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
