// qaspec-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::{FormatError, InfrastructureError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QaSpecError {
    // --- DOMAIN ERRORS (references, uniqueness, cycles) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, config) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for QaSpecError {
    fn from(err: std::io::Error) -> Self {
        QaSpecError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<FormatError> for QaSpecError {
    fn from(err: FormatError) -> Self {
        QaSpecError::Infrastructure(InfrastructureError::Format(err))
    }
}
