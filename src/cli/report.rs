//! CLI commands for reports

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::Datelike;
use clap::Subcommand;

use super::args::{parse_date, today};
use crate::config::Settings;
use crate::error::{SleekError, SleekResult};
use crate::reports::BusinessSummary;
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Invoiced, collected, outstanding and expenses for a period
    Summary {
        /// Start date (YYYY-MM-DD), defaults to the start of this year
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,
        /// Write CSV to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> SleekResult<()> {
    match cmd {
        ReportCommands::Summary { from, to, output } => {
            let end_date = match to.as_deref() {
                Some(t) => parse_date(t)?,
                None => today(),
            };
            let start_date = match from.as_deref() {
                Some(f) => parse_date(f)?,
                None => end_date.with_ordinal(1).unwrap_or(end_date),
            };

            let summary = BusinessSummary::generate(storage, start_date, end_date)?;

            if let Some(path) = output {
                let file = File::create(&path).map_err(|e| {
                    SleekError::Export(format!("Failed to create file {}: {}", path.display(), e))
                })?;
                summary.export_csv(BufWriter::new(file))?;
                println!("Summary exported to: {}", path.display());
            } else {
                print!("{}", summary.format_terminal(&settings.currency_symbol));
            }
        }
    }
    Ok(())
}
