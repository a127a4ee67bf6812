//! Error types for schema and value operations.

use serde::Serialize;
use thiserror::Error;

use super::types::FieldId;
use crate::store::StoreError;

/// Errors returned by the schema and value managers.
#[derive(Debug, Error)]
pub enum ProfileFieldError {
    /// Caller input is malformed; nothing was changed.
    #[error("{message}")]
    Validation {
        message: String,
        /// Request parameter the message refers to, when there is one.
        field: Option<&'static str>,
    },

    /// The referenced field does not exist in the caller's realm.
    #[error("Field id {0} not found.")]
    NotFound(FieldId),

    /// Another field in the realm already has the requested name.
    #[error("A field with that name already exists.")]
    Conflict,

    /// Stored data does not match any known field kind.
    #[error("integrity fault: {0}")]
    IntegrityFault(String),

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Store(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, ProfileFieldError>;

impl ProfileFieldError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    pub fn validation_of(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), field: Some(field) }
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound(_) | Self::Conflict)
    }

    /// Structured `{message, field?}` body for the wire.
    pub fn to_payload(&self) -> ErrorPayload {
        let field = match self {
            Self::Validation { field, .. } => field.map(str::to_string),
            _ => None,
        };
        ErrorPayload { message: self.to_string(), field }
    }
}

impl From<StoreError> for ProfileFieldError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownFieldKind { field_id, code } => {
                tracing::error!(field_id, code, "stored field has an unrecognized field type");
                Self::IntegrityFault(format!("field {} has invalid field type {}", field_id, code))
            }
            other => Self::Store(other),
        }
    }
}

/// Error body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
