use super::ReportHandler;
use crate::{
    domain::{
        report::{MonthlyBucket, ReportResult},
        transaction::{Transaction, MONTHS},
    },
    error::Result,
};

/// Keeps one lazily created bucket per calendar month.
#[derive(Debug, Default)]
pub struct InMemoryReportHandler {
    buckets: [Option<MonthlyBucket>; 12],
}

impl InMemoryReportHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(&self, month: chrono::Month) -> Option<&MonthlyBucket> {
        self.buckets[month.number_from_month() as usize - 1].as_ref()
    }
}

impl ReportHandler for InMemoryReportHandler {
    fn load(&mut self, tx: Transaction) -> Result<()> {
        let index = tx.month().number_from_month() as usize - 1;
        self.buckets[index]
            .get_or_insert_with(MonthlyBucket::default)
            .record(&tx)?;
        Ok(())
    }

    fn calculate(&self) -> Result<ReportResult> {
        let buckets = MONTHS
            .iter()
            .zip(&self.buckets)
            .filter_map(|(month, bucket)| bucket.clone().map(|bucket| (*month, bucket)));

        Ok(ReportResult::from_buckets(buckets)?)
    }
}
