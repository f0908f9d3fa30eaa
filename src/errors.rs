use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// a single field-level input problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("invalid input: {}", join_fields(.errors))]
    InvalidInput {
        errors: Vec<FieldError>,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid recipient address: {address}")]
    InvalidRecipient {
        address: String,
    },

    #[error("notification dispatch failed: {message}")]
    DispatchFailed {
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LoanError {
    /// shorthand for a single-field input error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            errors: vec![FieldError::new(field, reason)],
        }
    }

    /// field-level messages, empty for non-input errors
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            LoanError::InvalidInput { errors } => errors,
            _ => &[],
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, LoanError>;
