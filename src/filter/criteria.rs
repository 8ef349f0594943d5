//! Declarative filter configuration, built once per resource type.

use serde::{Deserialize, Serialize};

use crate::error::CrudError;

/// How multiple filter fields combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMatchingStrategy {
    /// Exactly one field.
    Single,
    /// Fields joined with a single space, matched as one value.
    Concat,
    /// Any field matches.
    Or,
    /// Every field matches.
    And,
}

/// How a field value is compared with the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperation {
    /// Exact, case-sensitive.
    Equality,
    /// Case-insensitive substring.
    Like,
}

impl FilterOperation {
    pub fn test(&self, candidate: &str, value: &str) -> bool {
        match self {
            FilterOperation::Equality => candidate == value,
            FilterOperation::Like => candidate.to_lowercase().contains(&value.to_lowercase()),
        }
    }
}

/// Ordered field names plus the strategy combining them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterableFields")]
pub struct FilterableFields {
    keys: Vec<String>,
    strategy: FilterMatchingStrategy,
}

/// Unchecked wire form; deserialization goes through [`FilterableFields::new`].
#[derive(Deserialize)]
struct RawFilterableFields {
    keys: Vec<String>,
    strategy: FilterMatchingStrategy,
}

impl TryFrom<RawFilterableFields> for FilterableFields {
    type Error = CrudError;

    fn try_from(raw: RawFilterableFields) -> Result<Self, Self::Error> {
        Self::new(raw.keys, raw.strategy)
    }
}

impl FilterableFields {
    /// Fails when `Single` is not given exactly one field.
    pub fn new<I, S>(keys: I, strategy: FilterMatchingStrategy) -> Result<Self, CrudError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = Self {
            keys: keys.into_iter().map(Into::into).collect(),
            strategy,
        };
        fields.validate()?;
        Ok(fields)
    }

    /// Check the field count against the strategy.
    pub fn validate(&self) -> Result<(), CrudError> {
        if self.strategy == FilterMatchingStrategy::Single && self.keys.len() != 1 {
            return Err(CrudError::invalid_argument(format!(
                "SINGLE filter strategy needs exactly one field, got {}",
                self.keys.len()
            )));
        }
        Ok(())
    }

    pub fn single(key: impl Into<String>) -> Self {
        Self {
            keys: vec![key.into()],
            strategy: FilterMatchingStrategy::Single,
        }
    }

    pub fn concat<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            strategy: FilterMatchingStrategy::Concat,
        }
    }

    pub fn any_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            strategy: FilterMatchingStrategy::Or,
        }
    }

    pub fn all_of<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            strategy: FilterMatchingStrategy::And,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn strategy(&self) -> FilterMatchingStrategy {
        self.strategy
    }
}

/// Which fields a search term is matched against, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    fields: FilterableFields,
    operation: FilterOperation,
}

impl FilterCriteria {
    pub fn new(fields: FilterableFields, operation: FilterOperation) -> Self {
        Self { fields, operation }
    }

    pub fn like(fields: FilterableFields) -> Self {
        Self::new(fields, FilterOperation::Like)
    }

    pub fn equality(fields: FilterableFields) -> Self {
        Self::new(fields, FilterOperation::Equality)
    }

    pub fn fields(&self) -> &FilterableFields {
        &self.fields
    }

    pub fn operation(&self) -> FilterOperation {
        self.operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_requires_one_field() {
        assert!(FilterableFields::new(["a"], FilterMatchingStrategy::Single).is_ok());
        assert!(FilterableFields::new(Vec::<String>::new(), FilterMatchingStrategy::Single).is_err());
        assert!(FilterableFields::new(["a", "b"], FilterMatchingStrategy::Single).is_err());
        assert!(FilterableFields::new(Vec::<String>::new(), FilterMatchingStrategy::Or).is_ok());
    }

    #[test]
    fn like_is_case_insensitive_substring() {
        assert!(FilterOperation::Like.test("John Doe", "hn d"));
        assert!(FilterOperation::Like.test("John Doe", ""));
        assert!(!FilterOperation::Like.test("John", "johnny"));
    }

    #[test]
    fn equality_is_exact() {
        assert!(FilterOperation::Equality.test("John", "John"));
        assert!(!FilterOperation::Equality.test("John", "john"));
        assert!(!FilterOperation::Equality.test("John Doe", "John"));
    }

    #[test]
    fn criteria_deserializes_from_config() {
        let criteria: FilterCriteria = serde_json::from_str(
            r#"{ "fields": { "keys": ["first_name", "last_name"], "strategy": "CONCAT" }, "operation": "LIKE" }"#,
        )
        .unwrap();
        assert_eq!(criteria.fields().strategy(), FilterMatchingStrategy::Concat);
        assert_eq!(criteria.operation(), FilterOperation::Like);
    }

    #[test]
    fn config_single_needs_one_field() {
        for keys in [r#"[]"#, r#"["title", "isbn"]"#] {
            let raw = format!(
                r#"{{ "fields": {{ "keys": {keys}, "strategy": "SINGLE" }}, "operation": "EQUALITY" }}"#
            );
            let err = serde_json::from_str::<FilterCriteria>(&raw).unwrap_err();
            assert!(err.to_string().contains("exactly one field"), "{err}");
        }

        let criteria: FilterCriteria = serde_json::from_str(
            r#"{ "fields": { "keys": ["title"], "strategy": "SINGLE" }, "operation": "EQUALITY" }"#,
        )
        .unwrap();
        assert_eq!(criteria.fields().keys(), ["title".to_string()]);
    }
}
