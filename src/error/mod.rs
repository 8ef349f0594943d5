//! Error kinds surfaced by the CRUD core.
//!
//! Every service, endpoint and patch operation returns [`CrudError`]. The core
//! never decides how an error is rendered; [`CrudError::status_code`] and
//! [`ErrorBody`] exist for the transport layer to pick up.

mod body;
mod info;

use std::fmt::Display;

use thiserror::Error;

use crate::repository::RepositoryError;

pub use body::ErrorBody;
pub use info::{CommonErrorCode, CommonFieldErrorCode, ErrorInfo, FieldErrorInfo};

/// Error type for every CRUD operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrudError {
    /// An identifier (plain, composite or parent) does not resolve to a resource.
    #[error("{resource_type} (ID: {id}) not found")]
    NotFound { resource_type: String, id: String },

    /// An operation check or business rule blocked the mutation.
    #[error("{message}")]
    Conflict {
        message: String,
        detail: Option<ErrorInfo>,
    },

    /// The patch engine could not convert or assign an allowlisted field.
    #[error("failed to patch field '{field}': {reason}")]
    Patch { field: String, reason: String },

    /// Malformed input at the boundary, rejected before any repository access.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// PATCH was requested for a resource that declares no patchable fields.
    #[error("HTTP method PATCH is not supported for resource {resource_type}")]
    PatchNotSupported { resource_type: String },

    /// Opaque storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CrudError {
    pub fn not_found(resource_type: impl Into<String>, id: impl Display) -> Self {
        CrudError::NotFound {
            resource_type: resource_type.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CrudError::Conflict {
            message: message.into(),
            detail: None,
        }
    }

    /// Conflict carrying structured detail; the message is taken from the detail
    /// when it has one.
    pub fn conflict_with(detail: ErrorInfo) -> Self {
        let message = detail
            .message
            .clone()
            .unwrap_or_else(|| crate::check::DEFAULT_DENIED_MESSAGE.to_string());
        CrudError::Conflict {
            message,
            detail: Some(detail),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CrudError::InvalidArgument(message.into())
    }

    pub fn patch(field: impl Into<String>, reason: impl Display) -> Self {
        CrudError::Patch {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// A field name the accessor table does not know.
    pub fn unknown_field(field: &str) -> Self {
        CrudError::patch(field, "no such field")
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CrudError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CrudError::Conflict { .. })
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CrudError::NotFound { .. } => 404,
            CrudError::Conflict { .. } => 409,
            CrudError::Patch { .. } => 400,
            CrudError::InvalidArgument(_) => 400,
            CrudError::PatchNotSupported { .. } => 405,
            CrudError::Repository(_) => 500,
        }
    }

    /// The machine-readable code reported alongside the message.
    pub fn code(&self) -> String {
        match self {
            CrudError::NotFound { .. } => CommonErrorCode::ResourceNotFound.as_str().to_string(),
            CrudError::Conflict {
                detail: Some(detail),
                ..
            } => detail.code.clone(),
            CrudError::Conflict { detail: None, .. } => {
                CommonErrorCode::ResourceConflict.as_str().to_string()
            }
            CrudError::Patch { .. } => CommonErrorCode::InvalidPatch.as_str().to_string(),
            CrudError::InvalidArgument(_) => CommonErrorCode::InvalidArgument.as_str().to_string(),
            CrudError::PatchNotSupported { .. } => {
                CommonErrorCode::MethodNotAllowed.as_str().to_string()
            }
            CrudError::Repository(_) => CommonErrorCode::InternalError.as_str().to_string(),
        }
    }
}
