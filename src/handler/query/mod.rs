use super::ReportHandler;
use crate::{
    domain::{report::ReportResult, transaction::Transaction},
    error::Result,
    store::{BatchId, TransactionStore},
};

/// Pushes every transaction into a [`TransactionStore`] and lets the store do
/// the grouping.
///
/// Rows are tagged with the handler's [`BatchId`], so several runs can share
/// one store without seeing each other's transactions.
pub struct QueryReportHandler<S> {
    store: S,
    batch: BatchId,
}

impl<S: TransactionStore> QueryReportHandler<S> {
    /// Starts a fresh batch on `store`.
    pub fn new(store: S) -> Self {
        Self::with_batch(store, BatchId::new())
    }

    pub fn with_batch(store: S, batch: BatchId) -> Self {
        tracing::debug!(%batch, "starting transaction batch");
        QueryReportHandler { store, batch }
    }

    pub fn batch(&self) -> BatchId {
        self.batch
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: TransactionStore> ReportHandler for QueryReportHandler<S> {
    fn load(&mut self, tx: Transaction) -> Result<()> {
        self.store.append(&tx, self.batch)?;
        Ok(())
    }

    fn calculate(&self) -> Result<ReportResult> {
        let months = self.store.aggregate_by_month(self.batch)?;
        Ok(ReportResult::from_buckets(months)?)
    }
}
