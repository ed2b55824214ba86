//! Delivery of a finished [`ReportResult`].
//!
//! A [`Notification`] decides what the report looks like for its channel. The
//! email flavour renders a plain text message and hands it to a [`Mailer`],
//! which owns the actual transport.

use std::{
    fmt::Write as _,
    io::{self, Write},
};

use itertools::Itertools;
use thiserror::Error;

use crate::domain::report::ReportResult;

pub const REPORT_SUBJECT: &str = "Transaction Report";

#[derive(Debug, Error)]
pub enum Error {
    #[error("report has no recipients")]
    NoRecipients,
    #[error("could not write message")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait Notification {
    fn send(&mut self, report: &ReportResult, receivers: &[String]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub body: String,
    pub receivers: Vec<String>,
}

/// Transport for rendered messages.
pub trait Mailer {
    fn deliver(&mut self, message: &Message) -> Result<()>;
}

impl<M: Mailer + ?Sized> Mailer for &mut M {
    fn deliver(&mut self, message: &Message) -> Result<()> {
        (**self).deliver(message)
    }
}

pub struct EmailReportNotification<M> {
    mailer: M,
}

impl<M: Mailer> EmailReportNotification<M> {
    pub fn new(mailer: M) -> Self {
        EmailReportNotification { mailer }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }
}

impl<M: Mailer> Notification for EmailReportNotification<M> {
    fn send(&mut self, report: &ReportResult, receivers: &[String]) -> Result<()> {
        if receivers.is_empty() {
            return Err(Error::NoRecipients);
        }

        let message = Message {
            subject: REPORT_SUBJECT.to_owned(),
            body: render(report),
            receivers: receivers.to_vec(),
        };

        self.mailer.deliver(&message)?;
        tracing::info!(receivers = %receivers.iter().join(", "), "report delivered");
        Ok(())
    }
}

/// Plain text body of a report email.
pub fn render(report: &ReportResult) -> String {
    let mut body = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(body, "Total balance: {}", report.balance);
    let _ = writeln!(body, "Average credit amount: {}", report.average_credit);
    let _ = writeln!(body, "Average debit amount: {}", report.average_debit);

    if !report.information_per_month.is_empty() {
        let _ = writeln!(body);
        let _ = writeln!(
            body,
            "{:<10} {:>14} {:>14} {:>12}",
            "Month", "Avg credit", "Avg debit", "Transactions"
        );
        for month in &report.information_per_month {
            let _ = writeln!(
                body,
                "{:<10} {:>14} {:>14} {:>12}",
                month.month.name(),
                month.average_credit.to_string(),
                month.average_debit.to_string(),
                month.n_transactions
            );
        }
    }

    body
}

/// Writes each message, headers first, to `out` instead of handing it to a
/// mail server.
pub struct OutboxMailer<W> {
    sender: String,
    out: W,
}

impl<W: Write> OutboxMailer<W> {
    pub fn new(sender: impl Into<String>, out: W) -> Self {
        OutboxMailer {
            sender: sender.into(),
            out,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Mailer for OutboxMailer<W> {
    fn deliver(&mut self, message: &Message) -> Result<()> {
        writeln!(self.out, "From: {}", self.sender)?;
        writeln!(self.out, "To: {}", message.receivers.iter().join(", "))?;
        writeln!(self.out, "Subject: {}", message.subject)?;
        writeln!(self.out)?;
        write!(self.out, "{}", message.body)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Month;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::report::MonthlySummary;

    #[derive(Default)]
    struct FakeMailer {
        sent: Vec<Message>,
    }

    impl Mailer for FakeMailer {
        fn deliver(&mut self, message: &Message) -> Result<()> {
            self.sent.push(message.clone());
            Ok(())
        }
    }

    fn report() -> ReportResult {
        ReportResult {
            balance: dec!(1000),
            average_credit: dec!(200.00),
            average_debit: dec!(100.00),
            information_per_month: vec![MonthlySummary {
                month: Month::December,
                average_credit: dec!(10.00),
                average_debit: dec!(0.00),
                n_transactions: 1,
            }],
        }
    }

    #[test]
    fn send_hands_rendered_message_to_mailer() {
        let mut notification = EmailReportNotification::new(FakeMailer::default());
        let receivers = vec!["test@example.com".to_owned()];

        notification.send(&report(), &receivers).unwrap();

        let sent = &notification.mailer().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Transaction Report");
        assert_eq!(sent[0].receivers, receivers);
        assert!(sent[0].body.contains("Total balance: 1000"));
        assert!(sent[0].body.contains("December"));
    }

    #[test]
    fn send_without_receivers_fails() {
        let mut notification = EmailReportNotification::new(FakeMailer::default());

        let err = notification.send(&report(), &[]).unwrap_err();

        assert!(matches!(err, Error::NoRecipients));
        assert!(notification.mailer().sent.is_empty());
    }

    #[test]
    fn render_omits_month_table_for_empty_report() {
        let body = render(&ReportResult {
            balance: dec!(0),
            average_credit: dec!(0.00),
            average_debit: dec!(0.00),
            information_per_month: Vec::new(),
        });

        assert_eq!(
            body,
            "Total balance: 0\nAverage credit amount: 0.00\nAverage debit amount: 0.00\n"
        );
    }

    #[test]
    fn outbox_writes_headers_and_body() {
        let mut mailer = OutboxMailer::new("reports@example.com", Vec::new());

        mailer
            .deliver(&Message {
                subject: "Transaction Report".to_owned(),
                body: "hello\n".to_owned(),
                receivers: vec!["a@example.com".to_owned(), "b@example.com".to_owned()],
            })
            .unwrap();

        let out = String::from_utf8(mailer.into_inner()).unwrap();
        assert_eq!(
            out,
            "From: reports@example.com\nTo: a@example.com, b@example.com\nSubject: Transaction Report\n\nhello\n"
        );
    }
}
