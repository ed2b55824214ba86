use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a single transaction line cannot be turned into a
/// [`Transaction`](crate::domain::transaction::Transaction).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("line {value:?} is not a single CSV record")]
    InvalidRecord { value: String },
    #[error("expected 3 comma separated fields, found {found}")]
    FieldCount { found: usize },
    #[error("transaction id {value:?} is not a non-negative integer")]
    InvalidId { value: String },
    #[error("date {value:?} is not a valid MM/DD date in {year}")]
    InvalidDate { value: String, year: i32 },
    #[error("amount {value:?} must start with '+' or '-'")]
    MissingSign { value: String },
    #[error("amount {value:?} is not a valid decimal")]
    InvalidAmount { value: String },
    #[error("amount {value} must be greater than zero")]
    NonPositiveAmount { value: Decimal },
}

/// Running credit or debit total no longer fits a [`Decimal`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("transaction amounts add up past the largest representable decimal")]
pub struct AmountOverflowError;

pub type Result<T> = std::result::Result<T, MalformedRecordError>;
