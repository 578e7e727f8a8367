//! Typed error enum for the service layer.

use school_assist_core::{Permission, TransitionError};
use school_assist_storage::StorageError;
use thiserror::Error;

/// Service-layer error unifying storage and authorization failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller lacks the permission for the action.
    #[error("forbidden: missing permission {0}")]
    Forbidden(Permission),

    /// Caller is not linked to a school, or is unknown.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller provided invalid input (empty text, malformed data).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A pending intent was driven through a transition its state forbids.
    #[error("pending intent: {0}")]
    InvalidTransition(#[from] TransitionError),

    /// Startup configuration could not be loaded.
    #[error("not configured: {0}")]
    NotConfigured(String),
}
