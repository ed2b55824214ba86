use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open transactions file {}", path.display())]
    SourceUnavailableError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not read transaction rows")]
    ReadError(#[from] csv::Error),
    #[error("malformed transaction record on line {line}")]
    MalformedRecordError {
        line: u64,
        #[source]
        source: crate::domain::error::MalformedRecordError,
    },
    #[error(transparent)]
    AmountOverflowError(#[from] crate::domain::error::AmountOverflowError),
    #[error(transparent)]
    PersistenceError(crate::store::Error),
    #[error("could not write monthly summary to {}", path.display())]
    ExportError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("could not deliver report")]
    DeliveryError(#[from] crate::notification::Error),
}

impl From<crate::store::Error> for Error {
    fn from(err: crate::store::Error) -> Self {
        match err {
            crate::store::Error::AmountOverflow(overflow) => Error::AmountOverflowError(overflow),
            other => Error::PersistenceError(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
