//! Storage predicates as an inspectable expression tree.
//!
//! Backends translate a [`Predicate`] into their own query language; the
//! in-memory repository evaluates it directly with [`Predicate::matches`].

use serde::{Deserialize, Serialize};

use super::FilterOperation;
use crate::resource::{field_text, FieldAccess, Resource};

/// The value a comparison runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// A single field.
    Field(String),
    /// Fields coalesced to "" and joined with one space, in order.
    Concat(Vec<String>),
    /// The resource identifier.
    Id,
}

impl Target {
    /// Resolve the target's text for `entity`. `None` is SQL null.
    pub fn resolve<E: Resource + FieldAccess>(&self, entity: &E) -> Option<String> {
        match self {
            Target::Field(name) => entity.field_value(name).as_ref().and_then(field_text),
            Target::Concat(names) => Some(
                names
                    .iter()
                    .map(|name| {
                        entity
                            .field_value(name)
                            .as_ref()
                            .and_then(field_text)
                            .unwrap_or_default()
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Target::Id => entity.id().map(|id| id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Always,
    Never,
    Compare {
        target: Target,
        operation: FilterOperation,
        value: String,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn compare(target: Target, operation: FilterOperation, value: impl Into<String>) -> Self {
        Predicate::Compare {
            target,
            operation,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn field_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(Target::Field(field.into()), FilterOperation::Equality, value)
    }

    /// `id = value`
    pub fn id_equals(value: impl Into<String>) -> Self {
        Self::compare(Target::Id, FilterOperation::Equality, value)
    }

    /// Conjunction of two predicates, flattening nested `And`s.
    pub fn and(self, other: Predicate) -> Self {
        let mut parts = match self {
            Predicate::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Predicate::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Predicate::And(parts)
    }

    /// Evaluate against an in-memory resource. An empty `And` holds, an empty
    /// `Or` does not.
    pub fn matches<E: Resource + FieldAccess>(&self, entity: &E) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Compare {
                target,
                operation,
                value,
            } => target
                .resolve(entity)
                .is_some_and(|candidate| operation.test(&candidate, value)),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(entity)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(entity)),
        }
    }
}
