//! Form definitions backing the search and profile screens.

use thiserror::Error;
use validator::ValidationErrors;

pub mod profile;
pub mod search;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Please fill at least one search field")]
    EmptyQuery,

    #[error("Update at least one field.")]
    NoChanges,
}
