use std::{error::Error as _, fs::File, io, path::PathBuf, process::ExitCode};

use clap::Parser;
use txns_report::{
    config::{ReportEngine, DEFAULT_ANCHOR_YEAR, DEFAULT_LOG_LEVEL, DEFAULT_SENDER},
    csv,
    error::{Error, Result},
    logging,
    notification::{EmailReportNotification, OutboxMailer},
    pipeline::{process_transaction_file, GenerateReportCommand},
};

#[derive(Parser, Debug)]
#[command(name = "txns-report", version, about = "Send a monthly summary of a transactions file")]
struct Cli {
    /// CSV file with an `Id,Date,Transaction` header
    filepath: PathBuf,

    /// Addresses the report is sent to
    #[arg(required = true)]
    receivers: Vec<String>,

    /// SQLite file to aggregate in; aggregates in memory when absent
    #[arg(long, env = "TXNS_REPORT_DATABASE")]
    database: Option<PathBuf>,

    /// Year every MM/DD date is placed in
    #[arg(long, env = "TXNS_REPORT_YEAR", default_value_t = DEFAULT_ANCHOR_YEAR)]
    year: i32,

    /// From address of the report email
    #[arg(long, env = "TXNS_REPORT_SENDER", default_value = DEFAULT_SENDER)]
    sender: String,

    /// Also write the monthly breakdown as CSV to this path
    #[arg(long)]
    export: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "report run failed");
            let mut message = format!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(&format!("\n  caused by: {cause}"));
                source = cause.source();
            }
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = GenerateReportCommand {
        filepath: cli.filepath,
        receivers: cli.receivers,
    };

    let mut handler = ReportEngine::from_database(cli.database).build_handler()?;
    let mailer = OutboxMailer::new(cli.sender, io::stdout());
    let mut notification = EmailReportNotification::new(mailer);

    let report = process_transaction_file(&mut handler, &mut notification, &command, cli.year)?;

    if let Some(path) = cli.export {
        File::create(&path)
            .map_err(::csv::Error::from)
            .and_then(|file| csv::write_summary(&report.information_per_month, file))
            .map_err(|source| Error::ExportError {
                path: path.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), "monthly summary exported");
    }

    Ok(())
}
