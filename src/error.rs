// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! The taxonomy mirrors the backend collaborator's contract: uniqueness
//! conflicts and not-found are distinct, typed conditions rather than
//! transport errors, so callers can switch on them explicitly. Status-code
//! and error-code inspection happens once, in the REST transport layer.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Uniqueness conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Backend API error: {0}")]
    BackendApi(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for uniqueness-conflict errors, which the idempotent mutations
    /// (add skill, add endorsement, send connection) swallow.
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    /// True when the backend reported the referenced row as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, AppError>;
