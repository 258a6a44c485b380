use geoloc_core::{gateways::geocode::GatewayError, usecases::Error as BError};
use geoloc_gateways::csv_file::CsvFileError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Business(#[from] BError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error("A batch job is already running")]
    AlreadyRunning,
    #[error("The batch worker terminated unexpectedly")]
    WorkerPanicked,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<CsvFileError> for AppError {
    fn from(err: CsvFileError) -> Self {
        match err {
            CsvFileError::Csv(err) => Self::Csv(err),
            CsvFileError::Io(err) => Self::Io(err),
            CsvFileError::Usecase(err) => Self::Business(err),
        }
    }
}

impl From<geoloc_core::repositories::Error> for AppError {
    fn from(err: geoloc_core::repositories::Error) -> Self {
        Self::Business(err.into())
    }
}

impl AppError {
    /// Missing API key or an inaccessible quota store.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Business(err) => err.is_configuration(),
            Self::Gateway(GatewayError::MissingApiKey) => true,
            _ => false,
        }
    }
}
