//! User-facing error taxonomy
//!
//! Every failure surfaced by the Keystone core maps to one of these kinds.
//! Messages carry enough detail for the caller to correct the request
//! (entity type, identifying key, violated rule) but never echo data from a
//! foreign tenant: a row that exists in another tenant's scope is reported
//! exactly like a row that does not exist at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used across the service layer.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ApiError {
    /// Referenced entity does not exist within the caller's tenant scope.
    #[error("{entity} with identifier '{key}' not found")]
    NotFound { entity: String, key: String },

    /// Business-rule violation (duplicate key, depth exceeded, bad state
    /// transition, date ordering, ...).
    #[error("{message}")]
    Validation { message: String },

    /// Attempted creation of a business key that already exists in scope.
    #[error("{entity} with identifier '{key}' already exists")]
    Conflict { entity: String, key: String },

    /// Role lacks the required capability. Raised by the auth layer, passed
    /// through here unchanged.
    #[error("permission denied: cannot {action} {entity}")]
    PermissionDenied { action: String, entity: String },

    /// Storage failure with internal detail already logged; the message here
    /// is sanitized for external consumption.
    #[error("storage error: {message}")]
    Database { message: String },
}

impl ApiError {
    pub fn not_found(entity: impl Into<String>, key: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(entity: impl Into<String>, key: impl ToString) -> Self {
        Self::Conflict {
            entity: entity.into(),
            key: key.to_string(),
        }
    }

    pub fn permission_denied(action: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::PermissionDenied {
            action: action.into(),
            entity: entity.into(),
        }
    }

    /// Stable machine-readable code for structured responses.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::PermissionDenied { .. } => "PERMISSION_DENIED",
            ApiError::Database { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn to_http_status(&self) -> u16 {
        match self {
            ApiError::NotFound { .. } => 404,
            ApiError::Validation { .. } => 400,
            ApiError::Conflict { .. } => 409,
            ApiError::PermissionDenied { .. } => 403,
            ApiError::Database { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ApiError::not_found("Property", 9).to_http_status(), 404);
        assert_eq!(ApiError::validation("bad").to_http_status(), 400);
        assert_eq!(ApiError::conflict("Vendor", "VEN-001").to_http_status(), 409);
        assert_eq!(
            ApiError::permission_denied("delete", "Lease").to_http_status(),
            403
        );
    }

    #[test]
    fn test_messages_name_entity_and_key() {
        let err = ApiError::not_found("Unit", 12);
        assert_eq!(err.to_string(), "Unit with identifier '12' not found");
        let err = ApiError::conflict("Property", "P-01");
        assert_eq!(err.to_string(), "Property with identifier 'P-01' already exists");
    }
}
