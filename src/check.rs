//! Operation checks - permission gates evaluated right before a mutation.

use crate::error::{CrudError, ErrorInfo};

/// Message used when a check denies without saying why.
pub const DEFAULT_DENIED_MESSAGE: &str = "Operation is not allowed";

/// Outcome of an `is_creatable` / `is_editable` / `is_deletable` check.
///
/// A denied check always carries a message.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCheck {
    allowed: bool,
    message: Option<String>,
    error: Option<ErrorInfo>,
}

impl OperationCheck {
    pub fn permitted() -> Self {
        Self {
            allowed: true,
            message: None,
            error: None,
        }
    }

    pub fn denied() -> Self {
        Self::denied_with(DEFAULT_DENIED_MESSAGE)
    }

    pub fn denied_with(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Deny with structured detail. The detail's message becomes the check's
    /// message, falling back to the default one.
    pub fn denied_for(error: ErrorInfo) -> Self {
        let message = error
            .message
            .clone()
            .unwrap_or_else(|| DEFAULT_DENIED_MESSAGE.to_string());
        Self {
            allowed: false,
            message: Some(message),
            error: Some(error),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// `Ok(())` when allowed, otherwise the conflict this check surfaces.
    pub fn into_result(self) -> Result<(), CrudError> {
        if self.allowed {
            return Ok(());
        }
        Err(CrudError::Conflict {
            message: self
                .message
                .unwrap_or_else(|| DEFAULT_DENIED_MESSAGE.to_string()),
            detail: self.error,
        })
    }
}

impl Default for OperationCheck {
    fn default() -> Self {
        Self::permitted()
    }
}
