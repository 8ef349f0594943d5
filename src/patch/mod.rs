//! Allowlisted partial updates.
//!
//! A PATCH payload is a JSON object. Only keys named in the allowlist are
//! looked at: an absent key leaves the field alone, `null` clears it and any
//! other value is converted to the field's type and assigned. Keys outside
//! the allowlist are ignored silently.
//!
//! A patch either applies completely or not at all; on error the original
//! resource is untouched.

use serde_json::Value;
use tracing::debug;

use crate::error::CrudError;
use crate::resource::{FieldAccess, Resource};

/// Request types declaring which of their fields a PATCH may touch.
///
/// Usually derived with `#[derive(Patchable)]` and `#[patchable]` on fields.
pub trait Patchable {
    const PATCHABLE_FIELDS: &'static [&'static str];

    fn is_patchable(field: &str) -> bool {
        Self::PATCHABLE_FIELDS.contains(&field)
    }
}

/// Apply `payload` to a copy of `resource`, touching only `allowed` fields.
pub fn apply<E>(resource: &E, payload: &Value, allowed: &[&str]) -> Result<E, CrudError>
where
    E: Resource + FieldAccess,
{
    let Value::Object(fields) = payload else {
        return Err(CrudError::invalid_argument(
            "patch payload must be a JSON object",
        ));
    };

    let mut patched = resource.clone();
    for field in allowed {
        match fields.get(*field) {
            None => {}
            Some(Value::Null) => patched.clear_field(field)?,
            Some(value) => patched.set_field(field, value)?,
        }
    }

    let ignored = fields.keys().filter(|key| !allowed.contains(&key.as_str())).count();
    if ignored > 0 {
        debug!(
            resource_type = E::RESOURCE_TYPE,
            ignored, "Ignored non-patchable fields"
        );
    }
    Ok(patched)
}

/// [`apply`] with the allowlist declared by the request type `R`.
pub fn apply_for<R, E>(resource: &E, payload: &Value) -> Result<E, CrudError>
where
    R: Patchable,
    E: Resource + FieldAccess,
{
    apply(resource, payload, R::PATCHABLE_FIELDS)
}
