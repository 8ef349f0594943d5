//! Serializable error shape for transports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{CrudError, FieldErrorInfo};

/// JSON body rendered for a failed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, FieldErrorInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
}

impl From<&CrudError> for ErrorBody {
    fn from(err: &CrudError) -> Self {
        let (field_errors, params) = match err {
            CrudError::Conflict {
                detail: Some(detail),
                ..
            } => (detail.field_errors.clone(), detail.params.clone()),
            _ => (None, None),
        };

        ErrorBody {
            code: err.code(),
            message: err.to_string(),
            field_errors,
            params,
        }
    }
}
