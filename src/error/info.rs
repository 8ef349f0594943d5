//! Structured error detail attached to conflicts: a code, an optional message,
//! free-form params and per-field errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Codes used by the core for its own error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommonErrorCode {
    ResourceNotFound,
    ResourceConflict,
    InvalidArgument,
    InvalidPatch,
    MethodNotAllowed,
    InternalError,
}

impl CommonErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommonErrorCode::ResourceNotFound => "RESOURCE_NOT_FOUND",
            CommonErrorCode::ResourceConflict => "RESOURCE_CONFLICT",
            CommonErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            CommonErrorCode::InvalidPatch => "INVALID_PATCH",
            CommonErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            CommonErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Field-level error codes with their default messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommonFieldErrorCode {
    RequiredNotBlank,
    RequiredNotNull,
    NotUnique,
    InvalidEnumValue,
    Positive,
    Min,
    Max,
    Range,
    Invalid,
}

impl CommonFieldErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommonFieldErrorCode::RequiredNotBlank => "REQUIRED_NOT_BLANK",
            CommonFieldErrorCode::RequiredNotNull => "REQUIRED_NOT_NULL",
            CommonFieldErrorCode::NotUnique => "NOT_UNIQUE",
            CommonFieldErrorCode::InvalidEnumValue => "INVALID_ENUM_VALUE",
            CommonFieldErrorCode::Positive => "POSITIVE",
            CommonFieldErrorCode::Min => "MIN",
            CommonFieldErrorCode::Max => "MAX",
            CommonFieldErrorCode::Range => "RANGE",
            CommonFieldErrorCode::Invalid => "INVALID",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            CommonFieldErrorCode::RequiredNotBlank => "must not be blank",
            CommonFieldErrorCode::RequiredNotNull => "must not be null",
            CommonFieldErrorCode::NotUnique => "must be unique",
            CommonFieldErrorCode::InvalidEnumValue => "must be one of allowed values",
            CommonFieldErrorCode::Positive => "must be a positive number",
            CommonFieldErrorCode::Min => "must be greater than or equal to {min}",
            CommonFieldErrorCode::Max => "must be less than or equal to {max}",
            CommonFieldErrorCode::Range => "must be between {min} and {max}",
            CommonFieldErrorCode::Invalid => "is invalid",
        }
    }

    /// Map a validator constraint name onto a field error code.
    pub fn from_constraint(name: &str) -> Self {
        match name {
            "NotBlank" => CommonFieldErrorCode::RequiredNotBlank,
            "NotNull" => CommonFieldErrorCode::RequiredNotNull,
            "EnumValue" => CommonFieldErrorCode::InvalidEnumValue,
            "Positive" => CommonFieldErrorCode::Positive,
            "Min" => CommonFieldErrorCode::Min,
            "Max" => CommonFieldErrorCode::Max,
            "Range" => CommonFieldErrorCode::Range,
            _ => CommonFieldErrorCode::Invalid,
        }
    }

    /// Extract the message params from constraint arguments. Bounds are the
    /// trailing arguments; a range lists `max` before `min`.
    pub fn params(&self, args: &[Value]) -> Option<BTreeMap<String, Value>> {
        let mut params = BTreeMap::new();
        match self {
            CommonFieldErrorCode::Min => {
                params.insert("min".to_string(), args.last()?.clone());
            }
            CommonFieldErrorCode::Max => {
                params.insert("max".to_string(), args.last()?.clone());
            }
            CommonFieldErrorCode::Range => {
                if args.len() < 2 {
                    return None;
                }
                params.insert("min".to_string(), args[args.len() - 1].clone());
                params.insert("max".to_string(), args[args.len() - 2].clone());
            }
            _ => return None,
        }
        Some(params)
    }
}

/// One field's error inside an [`ErrorInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorInfo {
    pub code: String,
    pub message: String,
    pub rejected_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
}

impl FieldErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            rejected_value: None,
            params: None,
        }
    }

    pub fn of(code: CommonFieldErrorCode, rejected_value: Option<Value>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: code.default_message().to_string(),
            rejected_value,
            params: None,
        }
    }

    pub fn with_params(mut self, params: BTreeMap<String, Value>) -> Self {
        self.params = Some(params);
        self
    }
}

/// Structured error detail carried by a conflict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, FieldErrorInfo>>,
}

impl ErrorInfo {
    pub fn for_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            params: None,
            field_errors: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::for_code(CommonErrorCode::ResourceConflict.as_str()).with_message(message)
    }

    /// A conflict on a single field, e.g. a uniqueness violation.
    pub fn field_conflict(
        field: impl Into<String>,
        code: CommonFieldErrorCode,
        rejected_value: Option<Value>,
    ) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), FieldErrorInfo::of(code, rejected_value));
        Self::conflict("Operation cannot be completed due to a conflict.")
            .with_field_errors(field_errors)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_params(mut self, params: BTreeMap<String, Value>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_field_errors(mut self, field_errors: BTreeMap<String, FieldErrorInfo>) -> Self {
        self.field_errors = Some(field_errors);
        self
    }
}
