use std::fmt;

use chrono::Month;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    error::AmountOverflowError, report::MonthlyBucket, transaction::Transaction,
};

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Token scoping persisted transactions to a single ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchId(Uuid);

impl BatchId {
    pub fn new() -> Self {
        BatchId(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("transaction store is unavailable")]
    Sqlite(#[from] rusqlite::Error),
    #[error("store returned month number {0}, expected 1 to 12")]
    InvalidMonth(i64),
    #[error("store returned count {0} for a month")]
    InvalidCount(i64),
    #[error("store returned amount sum {0:?} that is not a decimal")]
    InvalidAmount(String),
    #[error(transparent)]
    AmountOverflow(#[from] AmountOverflowError),
    #[error("transaction id {0} is too large for the store")]
    IdOutOfRange(u64),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Append-only storage for transactions, shared between ingestion runs.
pub trait TransactionStore {
    fn append(&mut self, tx: &Transaction, batch: BatchId) -> Result<()>;

    /// Per-month totals of `batch`, in calendar order, only months with rows.
    fn aggregate_by_month(&self, batch: BatchId) -> Result<Vec<(Month, MonthlyBucket)>>;
}

impl<S: TransactionStore + ?Sized> TransactionStore for &mut S {
    fn append(&mut self, tx: &Transaction, batch: BatchId) -> Result<()> {
        (**self).append(tx, batch)
    }

    fn aggregate_by_month(&self, batch: BatchId) -> Result<Vec<(Month, MonthlyBucket)>> {
        (**self).aggregate_by_month(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_ids_are_unique() {
        let a = BatchId::new();
        let b = BatchId::new();

        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
