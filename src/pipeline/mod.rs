use std::path::PathBuf;

use crate::{
    csv,
    domain::report::ReportResult,
    error::Result,
    handler::ReportHandler,
    notification::Notification,
};

/// What a single run should report on and who gets the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReportCommand {
    pub filepath: PathBuf,
    pub receivers: Vec<String>,
}

/// Read the command's file into `handler`, calculate the report once and
/// send it through `notification`.
///
/// The first failing step aborts the run: nothing is sent unless every record
/// was loaded and the report was calculated.
pub fn process_transaction_file<H, N>(
    handler: &mut H,
    notification: &mut N,
    command: &GenerateReportCommand,
    anchor_year: i32,
) -> Result<ReportResult>
where
    H: ReportHandler + ?Sized,
    N: Notification + ?Sized,
{
    let mut loaded = 0u64;
    for tx in csv::open(&command.filepath, anchor_year)? {
        handler.load(tx?)?;
        loaded += 1;
    }
    tracing::info!(path = %command.filepath.display(), loaded, "transactions loaded");

    let report = handler.calculate()?;
    tracing::debug!(
        balance = %report.balance,
        months = report.information_per_month.len(),
        "report calculated"
    );

    notification.send(&report, &command.receivers)?;
    Ok(report)
}
