use std::path::PathBuf;

use crate::{
    error::Result,
    handler::{InMemoryReportHandler, QueryReportHandler, ReportHandler},
    store::SqliteStore,
};

pub use crate::domain::transaction::DEFAULT_ANCHOR_YEAR;

pub const DEFAULT_SENDER: &str = "reports@localhost";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Which aggregation engine a run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEngine {
    InMemory,
    /// Store transactions in the SQLite file at this path and aggregate there.
    Query { database: PathBuf },
}

impl ReportEngine {
    pub fn from_database(database: Option<PathBuf>) -> Self {
        match database {
            Some(database) => ReportEngine::Query { database },
            None => ReportEngine::InMemory,
        }
    }

    pub fn build_handler(&self) -> Result<Box<dyn ReportHandler>> {
        let handler: Box<dyn ReportHandler> = match self {
            ReportEngine::InMemory => Box::new(InMemoryReportHandler::new()),
            ReportEngine::Query { database } => {
                Box::new(QueryReportHandler::new(SqliteStore::open(database)?))
            }
        };
        Ok(handler)
    }
}
