use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};
use csv::StringRecord;
use rust_decimal::Decimal;

use super::error::{MalformedRecordError, Result};

/// Year every `MM/DD` date is placed in when no other year is configured.
///
/// The source format carries no year, so all records of a file are treated as
/// belonging to one nominal year. 2000 is a leap year, which keeps `02/29`
/// valid.
pub const DEFAULT_ANCHOR_YEAR: i32 = 2000;

#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct Transaction {
    pub sequence_id: u64,
    pub occurred_on: NaiveDate,
    /// Always strictly positive, the direction lives in `is_credit`.
    pub amount: Decimal,
    pub is_credit: bool,
}

impl Transaction {
    /// Parse one `<id>,<MM/DD>,<sign><amount>` line.
    ///
    /// Quoting and trimming follow the same rules as rows read from a file
    /// with [`crate::csv::read`].
    pub fn parse_line(line: &str, anchor_year: i32) -> Result<Self> {
        let mut records = crate::csv::reader_builder()
            .has_headers(false)
            .from_reader(line.as_bytes())
            .into_records();

        match (records.next(), records.next()) {
            (Some(Ok(record)), None) => Self::from_record(&record, anchor_year),
            (None, _) => Err(MalformedRecordError::FieldCount { found: 0 }),
            _ => Err(MalformedRecordError::InvalidRecord {
                value: line.to_owned(),
            }),
        }
    }

    /// Build a transaction from a CSV row, which must have exactly 3 fields.
    pub fn from_record(record: &StringRecord, anchor_year: i32) -> Result<Self> {
        match record.iter().collect::<Vec<_>>().as_slice() {
            [id, date, amount] => Self::from_fields(id, date, amount, anchor_year),
            fields => Err(MalformedRecordError::FieldCount {
                found: fields.len(),
            }),
        }
    }

    /// Build a transaction from the three already split fields of a row.
    pub fn from_fields(id: &str, date: &str, amount: &str, anchor_year: i32) -> Result<Self> {
        let sequence_id = parse_id(id.trim())?;
        let occurred_on = parse_date(date.trim(), anchor_year)?;
        let (amount, is_credit) = parse_signed_amount(amount.trim())?;

        Ok(Transaction {
            sequence_id,
            occurred_on,
            amount,
            is_credit,
        })
    }

    pub fn month(&self) -> Month {
        month_of(self.occurred_on)
    }
}

pub(crate) fn month_of(date: NaiveDate) -> Month {
    // `month0` is always within 0..12
    MONTHS[date.month0() as usize]
}

pub(crate) const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

fn parse_id(value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| MalformedRecordError::InvalidId {
            value: value.to_owned(),
        })
}

fn parse_date(value: &str, year: i32) -> Result<NaiveDate> {
    let invalid = || MalformedRecordError::InvalidDate {
        value: value.to_owned(),
        year,
    };

    let (month, day) = value.split_once('/').ok_or_else(invalid)?;
    if !is_two_digit_field(month) || !is_two_digit_field(day) {
        return Err(invalid());
    }

    let month = month.parse().map_err(|_| invalid())?;
    let day = day.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn is_two_digit_field(value: &str) -> bool {
    (1..=2).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_signed_amount(value: &str) -> Result<(Decimal, bool)> {
    let (digits, is_credit) = if let Some(rest) = value.strip_prefix('+') {
        (rest, true)
    } else if let Some(rest) = value.strip_prefix('-') {
        (rest, false)
    } else {
        return Err(MalformedRecordError::MissingSign {
            value: value.to_owned(),
        });
    };

    let amount = Decimal::from_str(digits).map_err(|_| MalformedRecordError::InvalidAmount {
        value: value.to_owned(),
    })?;

    if amount <= Decimal::ZERO {
        return Err(MalformedRecordError::NonPositiveAmount { value: amount });
    }

    Ok((amount, is_credit))
}
