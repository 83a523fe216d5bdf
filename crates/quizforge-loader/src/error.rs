//! Loader error types.

use thiserror::Error;

use quizforge_core::{LoadError, ValidationError};

/// Errors that can occur while loading a question bank.
#[derive(Debug, Error)]
pub enum BankError {
    /// The document could not be fetched or parsed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The document was fetched but is not a usable bank.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl BankError {
    /// Returns `true` if loading again could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BankError::Load(e) => e.is_retryable(),
            BankError::Validation(_) => false,
        }
    }
}
