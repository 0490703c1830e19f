// Copyright Lattice, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use core_model::access::AccessError;
use core_model::field::FieldInputError;
use lattice_store::StoreError;
use thiserror::Error;
use tracing::error;

use crate::cast::CastError;

/// Which configured ceiling a query violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    MaxResults,
    MaxTotalResults,
}

impl Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LimitKind::MaxResults => write!(f, "maxResults"),
            LimitKind::MaxTotalResults => write!(f, "maxTotalResults"),
        }
    }
}

/// Structured payload of a limit violation, exposed so callers can render
/// an actionable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitExceeded {
    pub list: String,
    pub kind: LimitKind,
    pub limit: u64,
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0}")]
    Generic(String),

    #[error("Invalid input for '{0}': {1}")]
    Validation(String, String),

    #[error("{0}")]
    Configuration(String),

    #[error("Unique filter for field '{field}' must be {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Your request exceeded server limits: {} limit of {} on list '{}'", .0.kind, .0.limit, .0.list)]
    LimitExceeded(LimitExceeded),

    /// Mutations fail loudly on denial; read paths return neutral values
    /// instead and never produce this variant.
    #[error("Access denied for operation '{0}'")]
    AccessDenied(String),

    #[error("{0}")]
    Cast(#[from] CastError),

    #[error("{0}")]
    Access(#[from] AccessError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0} {1}")]
    WithContext(String, #[source] Box<ExecutionError>),
}

impl ExecutionError {
    pub fn with_context(self, context: String) -> ExecutionError {
        ExecutionError::WithContext(context, Box::new(self))
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> ExecutionError {
        ExecutionError::Validation(field.into(), message.into())
    }

    /// Message suitable for the caller. Store internals are masked, since
    /// they may expose column names or data involved in the failure.
    pub fn user_error_message(&self) -> String {
        match self {
            ExecutionError::Validation(_, _)
            | ExecutionError::Configuration(_)
            | ExecutionError::TypeMismatch { .. }
            | ExecutionError::LimitExceeded(_)
            | ExecutionError::AccessDenied(_) => self.to_string(),
            ExecutionError::Cast(e) => {
                error!("Cast error: {e}");
                "Unable to convert input to the expected type".to_string()
            }
            ExecutionError::WithContext(context, e) => {
                format!("{}: {}", e.user_error_message(), context)
            }
            _ => {
                error!("Operation failed: {self:?}");
                "Operation failed".to_string()
            }
        }
    }
}

impl From<FieldInputError> for ExecutionError {
    fn from(error: FieldInputError) -> Self {
        ExecutionError::Generic(error.0)
    }
}

pub trait WithContext {
    fn with_context(self, context: String) -> Self;
}

impl<T> WithContext for Result<T, ExecutionError> {
    fn with_context(self, context: String) -> Result<T, ExecutionError> {
        self.map_err(|e| e.with_context(context))
    }
}
