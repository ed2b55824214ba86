use crate::{
    domain::{report::ReportResult, transaction::Transaction},
    error::Result,
};

pub mod memory;
pub mod query;

pub use memory::InMemoryReportHandler;
pub use query::QueryReportHandler;

/// Accumulates transactions and turns them into a [`ReportResult`].
///
/// Every implementation must give the same report for the same sequence of
/// loaded transactions.
pub trait ReportHandler {
    fn load(&mut self, tx: Transaction) -> Result<()>;

    /// Summarise everything loaded so far. Calling it again without a new
    /// [`load`](Self::load) returns an equal report.
    fn calculate(&self) -> Result<ReportResult>;
}

impl<H: ReportHandler + ?Sized> ReportHandler for Box<H> {
    fn load(&mut self, tx: Transaction) -> Result<()> {
        (**self).load(tx)
    }

    fn calculate(&self) -> Result<ReportResult> {
        (**self).calculate()
    }
}
