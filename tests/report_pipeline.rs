use std::io::Write;

use chrono::Month;
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;
use txns_report::{
    config::ReportEngine,
    error::Error,
    handler::{InMemoryReportHandler, QueryReportHandler},
    notification::{EmailReportNotification, Mailer, Message, Result as DeliveryResult},
    pipeline::{process_transaction_file, GenerateReportCommand},
    store::SqliteStore,
};

#[derive(Default)]
struct CapturingMailer {
    sent: Vec<Message>,
}

impl Mailer for CapturingMailer {
    fn deliver(&mut self, message: &Message) -> DeliveryResult<()> {
        self.sent.push(message.clone());
        Ok(())
    }
}

fn transactions_file(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Id,Date,Transaction").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

fn command(file: &NamedTempFile) -> GenerateReportCommand {
    GenerateReportCommand {
        filepath: file.path().to_path_buf(),
        receivers: vec!["test@example.com".to_owned()],
    }
}

/// Rows spread over every month out of calendar order, with uneven cents.
fn generated_rows(count: u32) -> Vec<String> {
    (0..count)
        .map(|id| {
            let month = (id * 7) % 12 + 1;
            let day = id % 28 + 1;
            let sign = if id % 3 == 0 { '-' } else { '+' };
            let cents = (id * 37) % 20_000 + 1;
            format!("{id},{month:02}/{day:02},{sign}{}.{:02}", cents / 100, cents % 100)
        })
        .collect()
}

#[test]
fn engines_agree_on_a_generated_file() {
    let file = transactions_file(&generated_rows(500));
    let command = command(&file);

    let mut memory_mail = EmailReportNotification::new(CapturingMailer::default());
    let memory = process_transaction_file(
        &mut InMemoryReportHandler::new(),
        &mut memory_mail,
        &command,
        2000,
    )
    .unwrap();

    let mut query_mail = EmailReportNotification::new(CapturingMailer::default());
    let query = process_transaction_file(
        &mut QueryReportHandler::new(SqliteStore::open_in_memory().unwrap()),
        &mut query_mail,
        &command,
        2000,
    )
    .unwrap();

    assert_eq!(memory, query);
    assert_eq!(format!("{memory:?}"), format!("{query:?}"));
    assert_eq!(memory_mail.mailer().sent, query_mail.mailer().sent);
    assert_eq!(memory.total_transactions(), 500);
    assert_eq!(memory.information_per_month.len(), 12);
    assert_eq!(memory.information_per_month[0].month, Month::January);
    assert_eq!(memory.information_per_month[11].month, Month::December);
}

#[test]
fn query_engine_on_disk_keeps_runs_apart() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ReportEngine::Query {
        database: dir.path().join("transactions.db"),
    };
    let first = transactions_file(&["0,03/01,+10".to_owned()]);
    let second = transactions_file(&["0,04/01,-5.50".to_owned(), "1,04/02,-4.50".to_owned()]);

    let mut mail = EmailReportNotification::new(CapturingMailer::default());
    let first = process_transaction_file(
        &mut engine.build_handler().unwrap(),
        &mut mail,
        &command(&first),
        2000,
    )
    .unwrap();
    let second = process_transaction_file(
        &mut engine.build_handler().unwrap(),
        &mut mail,
        &command(&second),
        2000,
    )
    .unwrap();

    assert_eq!(first.balance, dec!(10));
    assert_eq!(second.balance, dec!(-10.00));
    assert_eq!(second.average_debit.to_string(), "5.00");
    assert_eq!(second.information_per_month.len(), 1);
    assert_eq!(second.information_per_month[0].month, Month::April);
    assert_eq!(mail.mailer().sent.len(), 2);
}

#[test]
fn malformed_line_aborts_without_delivery() {
    let file = transactions_file(&["0,01/01,+10".to_owned(), "abc,13/45,10".to_owned()]);
    let mut mail = EmailReportNotification::new(CapturingMailer::default());

    let err = process_transaction_file(
        &mut InMemoryReportHandler::new(),
        &mut mail,
        &command(&file),
        2000,
    )
    .unwrap_err();

    assert!(matches!(err, Error::MalformedRecordError { line: 3, .. }));
    assert!(mail.mailer().sent.is_empty());
}

#[test]
fn empty_receivers_is_a_delivery_error() {
    let file = transactions_file(&["0,01/01,+10".to_owned()]);
    let mut mail = EmailReportNotification::new(CapturingMailer::default());
    let command = GenerateReportCommand {
        receivers: Vec::new(),
        ..command(&file)
    };

    let err = process_transaction_file(&mut InMemoryReportHandler::new(), &mut mail, &command, 2000)
        .unwrap_err();

    assert!(matches!(err, Error::DeliveryError(_)));
}
