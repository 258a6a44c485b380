use crate::repositories;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing API key")]
    MissingApiKey,
    #[error("The input does not contain any rows")]
    EmptyInput,
    #[error("The daily limit of {0} lookups has been reached")]
    QuotaExhausted(u32),
    #[error("Expected {expected} results but got {actual}")]
    ResultCountMismatch { expected: usize, actual: usize },
    #[error("The batch job has already been started")]
    JobAlreadyStarted,
    #[error(transparent)]
    Repo(#[from] repositories::Error),
}

impl Error {
    /// Errors that can only be fixed by changing the setup.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::Repo(_))
    }
}
