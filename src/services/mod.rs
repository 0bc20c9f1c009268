//! Services coordinating search, export, profile and session workflows.

use thiserror::Error;

use crate::forms::FormError;
use crate::repository::errors::RepositoryError;
use crate::services::export::ExportError;

pub mod auth;
pub mod export;
pub mod profile;
pub mod search;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Submitted form data cannot produce a request.
    #[error("{0}")]
    Form(#[from] FormError),

    #[error("API key is required")]
    MissingCredential,

    /// Requested page is neither loaded nor the next page in line.
    #[error("pages must be loaded sequentially")]
    Sequencing { requested: usize, next: usize },

    /// Another request of the same session has not finished yet.
    #[error("a search request is already in progress")]
    Busy,

    /// Network failure or non-success response from a collaborator.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Missing session. Please sign in again.")]
    Unauthorized,

    #[error("type constraint violation: {0}")]
    TypeConstraint(String),

    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl ServiceError {
    /// Errors raised before any request was issued because of user input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ServiceError::Form(_) | ServiceError::MissingCredential | ServiceError::TypeConstraint(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
