//! SQLite backed [`TransactionStore`].
//!
//! Amounts are kept as decimal text and summed by the `decimal_sum` aggregate
//! registered on every connection, so totals never pass through floating
//! point. The calendar month is stored in its own column at insert time, so
//! grouping does not depend on SQLite's date functions understanding the
//! stored year.

use std::{path::Path, str::FromStr};

use chrono::Month;
use rusqlite::{
    functions::{Aggregate, Context, FunctionFlags},
    params, Connection,
};
use rust_decimal::Decimal;

use super::{BatchId, Error, Result, TransactionStore};
use crate::domain::{
    error::AmountOverflowError,
    report::MonthlyBucket,
    transaction::{Transaction, MONTHS},
};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tx_id INTEGER NOT NULL,
        amount TEXT NOT NULL,
        occurred_on DATE NOT NULL,
        month INTEGER NOT NULL,
        is_credit BOOLEAN NOT NULL,
        batch_id TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_batch_id ON transactions (batch_id);
";

const INSERT_TRANSACTION: &str = "
    INSERT INTO transactions (tx_id, amount, occurred_on, month, is_credit, batch_id)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

const AGGREGATE_BY_MONTH: &str = "
    SELECT month,
           SUM(CASE WHEN is_credit THEN 1 ELSE 0 END),
           SUM(CASE WHEN is_credit THEN 0 ELSE 1 END),
           decimal_sum(CASE WHEN is_credit THEN amount END),
           decimal_sum(CASE WHEN is_credit THEN NULL ELSE amount END)
    FROM transactions
    WHERE batch_id = ?1
    GROUP BY month
    ORDER BY month
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::init(Connection::open(path)?)?;
        tracing::info!(path = %path.display(), "opened transaction store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        conn.create_aggregate_function(
            "decimal_sum",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            DecimalSum,
        )?;
        Ok(SqliteStore { conn })
    }

    /// Number of rows stored for `batch`.
    pub fn count(&self, batch: BatchId) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE batch_id = ?1",
            params![batch.to_string()],
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| Error::InvalidCount(count))
    }
}

impl TransactionStore for SqliteStore {
    fn append(&mut self, tx: &Transaction, batch: BatchId) -> Result<()> {
        let tx_id =
            i64::try_from(tx.sequence_id).map_err(|_| Error::IdOutOfRange(tx.sequence_id))?;

        self.conn.prepare_cached(INSERT_TRANSACTION)?.execute(params![
            tx_id,
            tx.amount.to_string(),
            tx.occurred_on,
            tx.month().number_from_month(),
            tx.is_credit,
            batch.to_string(),
        ])?;
        Ok(())
    }

    fn aggregate_by_month(&self, batch: BatchId) -> Result<Vec<(Month, MonthlyBucket)>> {
        let mut stmt = self.conn.prepare_cached(AGGREGATE_BY_MONTH)?;
        let rows = stmt.query_map(params![batch.to_string()], |row| {
            Ok(MonthRow {
                month: row.get(0)?,
                credit_count: row.get(1)?,
                debit_count: row.get(2)?,
                credit_sum: row.get(3)?,
                debit_sum: row.get(4)?,
            })
        })?;

        let months = rows
            .map(|row| row.map_err(Error::from).and_then(MonthRow::into_bucket))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(%batch, months = months.len(), "aggregated stored transactions");
        Ok(months)
    }
}

struct MonthRow {
    month: i64,
    credit_count: i64,
    debit_count: i64,
    /// `None` when `decimal_sum` overflowed.
    credit_sum: Option<String>,
    debit_sum: Option<String>,
}

impl MonthRow {
    fn into_bucket(self) -> Result<(Month, MonthlyBucket)> {
        let month = usize::try_from(self.month)
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| MONTHS.get(index))
            .copied()
            .ok_or(Error::InvalidMonth(self.month))?;

        let bucket = MonthlyBucket {
            credit_count: to_count(self.credit_count)?,
            debit_count: to_count(self.debit_count)?,
            credit_sum: to_decimal(self.credit_sum)?,
            debit_sum: to_decimal(self.debit_sum)?,
        };

        Ok((month, bucket))
    }
}

fn to_count(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| Error::InvalidCount(value))
}

fn to_decimal(value: Option<String>) -> Result<Decimal> {
    let value = value.ok_or(AmountOverflowError)?;
    Decimal::from_str(&value).map_err(|_| Error::InvalidAmount(value))
}

/// Exact sum of decimal text values, NULLs are skipped.
///
/// Yields NULL instead of failing the statement when the sum overflows, so
/// the caller can tell an overflow apart from a broken store.
struct DecimalSum;

impl Aggregate<Option<Decimal>, Option<String>> for DecimalSum {
    fn init(&self, _: &mut Context<'_>) -> rusqlite::Result<Option<Decimal>> {
        Ok(Some(Decimal::ZERO))
    }

    fn step(&self, ctx: &mut Context<'_>, sum: &mut Option<Decimal>) -> rusqlite::Result<()> {
        let Some(text) = ctx.get::<Option<String>>(0)? else {
            return Ok(());
        };

        let amount = Decimal::from_str(&text)
            .map_err(|err| rusqlite::Error::UserFunctionError(Box::new(err)))?;
        *sum = sum.and_then(|sum| sum.checked_add(amount));
        Ok(())
    }

    fn finalize(
        &self,
        _: &mut Context<'_>,
        sum: Option<Option<Decimal>>,
    ) -> rusqlite::Result<Option<String>> {
        Ok(sum.unwrap_or(Some(Decimal::ZERO)).map(|sum| sum.to_string()))
    }
}
