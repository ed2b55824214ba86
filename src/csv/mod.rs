use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim, Writer};

use crate::{
    domain::{report::MonthlySummary, transaction::Transaction},
    error::{Error, Result},
};

/// Lazily parsed [`Transaction`]s of one CSV source.
///
/// The first line is a header and is skipped. Rows are parsed as they are
/// pulled, so the source is consumed exactly once and cannot be rewound.
/// Callers are expected to stop at the first `Err`.
pub struct TransactionReader<R> {
    records: StringRecordsIntoIter<R>,
    anchor_year: i32,
}

impl<R: Read> Iterator for TransactionReader<R> {
    type Item = Result<Transaction>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };

        Some(parse_record(&record, self.anchor_year))
    }
}

/// Builder shared by file reads and single line parsing, so both accept the
/// same quoting and whitespace.
pub(crate) fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.flexible(true).trim(Trim::All);
    builder
}

/// Parse [`Transaction`]s from a reader, placing every date in `anchor_year`.
pub fn read<R: Read>(reader: R, anchor_year: i32) -> TransactionReader<R> {
    let records = reader_builder()
        .has_headers(true)
        .from_reader(reader)
        .into_records();

    TransactionReader {
        records,
        anchor_year,
    }
}

/// Open `path` and parse it with [`read`].
pub fn open(path: &Path, anchor_year: i32) -> Result<TransactionReader<File>> {
    let file = File::open(path).map_err(|source| Error::SourceUnavailableError {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(read(file, anchor_year))
}

fn parse_record(record: &StringRecord, anchor_year: i32) -> Result<Transaction> {
    let line = record.position().map(|pos| pos.line()).unwrap_or_default();

    Transaction::from_record(record, anchor_year)
        .map_err(|source| Error::MalformedRecordError { line, source })
}

/// Write the monthly breakdown of a report as CSV rows.
pub fn write_summary(months: &[MonthlySummary], writer: impl Write) -> csv::Result<()> {
    let mut writer = Writer::from_writer(writer);

    for month in months {
        writer.serialize(month)?;
    }

    writer.flush()?;
    Ok(())
}
