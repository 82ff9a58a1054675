//! CLI commands for data export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Subcommand;

use crate::error::{SleekError, SleekResult};
use crate::export::{export_clients_csv, export_invoices_csv};
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export clients to CSV (re-importable with `client import`)
    Clients {
        /// Output file path, stdout when omitted
        output: Option<PathBuf>,
        /// Include archived clients
        #[arg(short, long)]
        all: bool,
    },
    /// Export invoices with totals to CSV
    Invoices {
        /// Output file path, stdout when omitted
        output: Option<PathBuf>,
    },
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> SleekResult<()> {
    match cmd {
        ExportCommands::Clients { output, all } => {
            let writer = open_output(output.as_ref())?;
            let count = export_clients_csv(storage, writer, all)?;
            report_written(count, "client(s)", output.as_ref());
        }
        ExportCommands::Invoices { output } => {
            let writer = open_output(output.as_ref())?;
            let count = export_invoices_csv(storage, writer)?;
            report_written(count, "invoice(s)", output.as_ref());
        }
    }
    Ok(())
}

fn open_output(output: Option<&PathBuf>) -> SleekResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                SleekError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn report_written(count: usize, what: &str, output: Option<&PathBuf>) {
    // Stay quiet on stdout so the CSV can be piped
    if let Some(path) = output {
        println!("Exported {} {} to: {}", count, what, path.display());
    }
}
