use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by the shared data model and keyed store.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("invalid external address: {0}")]
    InvalidAddress(String),

    #[error("invalid denomination: {0}")]
    InvalidDenom(String),

    #[error("stored value at key {key} failed to decode: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Severity classes for state errors: whether a failure is a caller mistake
/// or an indication of store corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl StateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateError::InvalidAddress(_) => ErrorKind::InvalidInput,
            StateError::InvalidDenom(_) => ErrorKind::InvalidInput,
            StateError::Corrupt { .. } => ErrorKind::Internal,
            StateError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            StateError::InvalidAddress(_) => ErrorSeverity::Error,
            StateError::InvalidDenom(_) => ErrorSeverity::Error,
            StateError::Corrupt { .. } => ErrorSeverity::Critical,
            StateError::Internal(_) => ErrorSeverity::Critical,
        }
    }
}
