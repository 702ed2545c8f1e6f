//! Global application error types and handlers.
//!
//! This module defines custom error types that are used across the entire
//! backend application and provides mechanisms for consistent error handling
//! and response formatting.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Name of the field that failed validation
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generic service error that can be used across all entities
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {}", summarize(.violations))]
    Validation { violations: Vec<FieldViolation> },

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("{entity} already exists: {identifier}")]
    AlreadyExists { entity: String, identifier: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },

    #[error("Email delivery failed: {message}")]
    Delivery { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    /// Validation failure carrying every collected field violation.
    pub fn validation_failed(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn already_exists(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Returns the field violations for a `Validation` error, empty otherwise.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Validation { violations } => violations,
            _ => &[],
        }
    }
}

/// Collects `validator` derive failures into field violations, one per
/// failing rule, so callers can report every problem at once.
pub fn collect_violations<T: Validate>(value: &T) -> Vec<FieldViolation> {
    match value.validate() {
        Ok(()) => Vec::new(),
        Err(validation_errors) => validation_errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldViolation::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "is invalid".to_string()),
                    )
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let error = ServiceError::validation_failed(vec![
            FieldViolation::new("email", "is invalid"),
            FieldViolation::new("password_confirmation", "doesn't match password"),
        ]);

        let rendered = error.to_string();
        assert!(rendered.contains("email: is invalid"));
        assert!(rendered.contains("password_confirmation: doesn't match password"));
    }

    #[test]
    fn test_violations_accessor() {
        let error =
            ServiceError::validation_failed(vec![FieldViolation::new("email", "is invalid")]);
        assert_eq!(error.violations().len(), 1);

        let error = ServiceError::not_found("User", "abc");
        assert!(error.violations().is_empty());
    }
}
