use chrono::Month;
use itertools::Itertools;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use super::{error::AmountOverflowError, transaction::Transaction};

/// Decimal places every average is reported with.
const AVERAGE_SCALE: u32 = 2;

/// Running counts and sums of one calendar month.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonthlyBucket {
    pub credit_count: u64,
    pub debit_count: u64,
    pub credit_sum: Decimal,
    pub debit_sum: Decimal,
}

impl MonthlyBucket {
    /// Add one transaction. The bucket is left untouched when the sum would
    /// overflow.
    pub fn record(&mut self, tx: &Transaction) -> Result<(), AmountOverflowError> {
        if tx.is_credit {
            self.credit_sum = checked_sum(self.credit_sum, tx.amount)?;
            self.credit_count += 1;
        } else {
            self.debit_sum = checked_sum(self.debit_sum, tx.amount)?;
            self.debit_count += 1;
        }
        Ok(())
    }

    pub fn n_transactions(&self) -> u64 {
        self.credit_count + self.debit_count
    }

    fn merge(&mut self, other: &MonthlyBucket) -> Result<(), AmountOverflowError> {
        self.credit_sum = checked_sum(self.credit_sum, other.credit_sum)?;
        self.debit_sum = checked_sum(self.debit_sum, other.debit_sum)?;
        self.credit_count += other.credit_count;
        self.debit_count += other.debit_count;
        Ok(())
    }
}

fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal, AmountOverflowError> {
    a.checked_add(b).ok_or(AmountOverflowError)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    pub average_credit: Decimal,
    pub average_debit: Decimal,
    pub n_transactions: u64,
}

/// Outcome of one aggregation pass, ready to be handed to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResult {
    /// Credits minus debits, never rounded.
    pub balance: Decimal,
    pub average_credit: Decimal,
    pub average_debit: Decimal,
    /// Chronological, only months that saw at least one transaction.
    pub information_per_month: Vec<MonthlySummary>,
}

impl ReportResult {
    /// Build the report from per-month buckets.
    ///
    /// Buckets are put in calendar order whatever order they arrive in, and
    /// empty buckets are left out of the monthly breakdown. Fails when the
    /// yearly totals no longer fit a [`Decimal`].
    pub fn from_buckets(
        buckets: impl IntoIterator<Item = (Month, MonthlyBucket)>,
    ) -> Result<Self, AmountOverflowError> {
        let mut totals = MonthlyBucket::default();

        let information_per_month = buckets
            .into_iter()
            .filter(|(_, bucket)| bucket.n_transactions() > 0)
            .sorted_by_key(|(month, _)| month.number_from_month())
            .map(|(month, bucket)| {
                totals.merge(&bucket)?;
                Ok(MonthlySummary {
                    month,
                    average_credit: average(bucket.credit_sum, bucket.credit_count),
                    average_debit: average(bucket.debit_sum, bucket.debit_count),
                    n_transactions: bucket.n_transactions(),
                })
            })
            .collect::<Result<Vec<_>, AmountOverflowError>>()?;

        // Both sums are non-negative, so the difference always fits.
        Ok(ReportResult {
            balance: totals.credit_sum - totals.debit_sum,
            average_credit: average(totals.credit_sum, totals.credit_count),
            average_debit: average(totals.debit_sum, totals.debit_count),
            information_per_month,
        })
    }

    pub fn total_transactions(&self) -> u64 {
        self.information_per_month
            .iter()
            .map(|month| month.n_transactions)
            .sum()
    }
}

/// `sum / count` rounded half-up to two places, zero for an empty set.
fn average(sum: Decimal, count: u64) -> Decimal {
    let mut value = if count == 0 {
        Decimal::ZERO
    } else {
        (sum / Decimal::from(count))
            .round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    };
    value.rescale(AVERAGE_SCALE);
    value
}

fn serialize_month<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(month.name())
}
