use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use sleek_invoices::cli::{
    handle_client_command, handle_config_command, handle_estimate_command,
    handle_expense_command, handle_export_command, handle_image_command,
    handle_invoice_command, handle_report_command, handle_secret_command, ClientCommands,
    ConfigArgs, EstimateCommands, ExpenseCommands, ExportCommands, ImageCommands,
    InvoiceCommands, ReportCommands, SecretCommands,
};
use sleek_invoices::config::{Settings, SleekPaths};
use sleek_invoices::display::format_audit_entries;
use sleek_invoices::logging;
use sleek_invoices::services::{EstimateService, InvoiceService};
use sleek_invoices::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "sleek",
    version,
    about = "Invoicing and small-business bookkeeping from the command line",
    long_about = "SleekInvoices keeps clients, invoices, estimates, payments and \
                  expenses in plain JSON files, with CSV import/export and an \
                  audit trail of every change."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this data directory instead of the default
    #[arg(long, global = true, env = "SLEEK_INVOICES_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, settings and default expense categories
    Init,

    /// Show or change configuration
    Config(ConfigArgs),

    /// Client management commands
    #[command(subcommand)]
    Client(ClientCommands),

    /// Invoice management commands
    #[command(subcommand, alias = "inv")]
    Invoice(InvoiceCommands),

    /// Estimate management commands
    #[command(subcommand, alias = "est")]
    Estimate(EstimateCommands),

    /// Expense tracking commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Encrypt or decrypt stored secrets
    #[command(subcommand)]
    Secret(SecretCommands),

    /// Check and optimize logo or receipt images
    #[command(subcommand)]
    Image(ImageCommands),

    /// Export data to CSV
    #[command(subcommand)]
    Export(ExportCommands),

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let paths = match cli.data_dir {
        Some(dir) => SleekPaths::with_base_dir(dir),
        None => SleekPaths::new()?,
    };

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("SleekInvoices - invoicing and bookkeeping from the command line");
            println!();
            println!("Run 'sleek init' to get started, or 'sleek --help' for usage.");
            return Ok(());
        }
    };

    let mut settings = Settings::load_or_create(&paths)?;

    match command {
        Commands::Init => {
            let already = paths.is_initialized();
            initialize_storage(&paths)?;
            if already {
                println!("Already initialized at: {}", paths.base_dir().display());
            } else {
                println!("Initialized SleekInvoices at: {}", paths.base_dir().display());
                println!();
                println!("Next steps:");
                println!("  sleek config --business-name \"Your Business\"");
                println!("  sleek client add \"First Client\" --email billing@example.com");
            }
        }
        Commands::Config(args) => handle_config_command(&paths, &mut settings, args)?,
        Commands::Secret(cmd) => handle_secret_command(&paths, &mut settings, cmd)?,
        Commands::Image(cmd) => handle_image_command(&settings, cmd)?,
        Commands::Client(cmd) => {
            let storage = open_storage(paths, &settings)?;
            handle_client_command(&storage, cmd)?;
        }
        Commands::Invoice(cmd) => {
            let storage = open_storage(paths, &settings)?;
            handle_invoice_command(&storage, &settings, cmd)?;
        }
        Commands::Estimate(cmd) => {
            let storage = open_storage(paths, &settings)?;
            handle_estimate_command(&storage, &settings, cmd)?;
        }
        Commands::Expense(cmd) => {
            let storage = open_storage(paths, &settings)?;
            handle_expense_command(&storage, &settings, cmd)?;
        }
        Commands::Export(cmd) => {
            let storage = open_storage(paths, &settings)?;
            handle_export_command(&storage, cmd)?;
        }
        Commands::Report(cmd) => {
            let storage = open_storage(paths, &settings)?;
            handle_report_command(&storage, &settings, cmd)?;
        }
        Commands::Audit { count } => {
            let storage = open_storage(paths, &settings)?;
            let entries = storage.audit().read_recent(count)?;
            println!("{}", format_audit_entries(&entries));
        }
    }

    Ok(())
}

/// Load every collection, then apply date-driven status changes (overdue
/// invoices, lapsed estimates)
fn open_storage(paths: SleekPaths, settings: &Settings) -> Result<Storage> {
    if !paths.is_initialized() {
        bail!(
            "No SleekInvoices data at {}. Run 'sleek init' first.",
            paths.base_dir().display()
        );
    }

    let storage = Storage::open(paths)?;
    let today = chrono::Local::now().date_naive();

    let overdue = InvoiceService::new(&storage, settings).refresh_overdue(today)?;
    let expired = EstimateService::new(&storage, settings).expire_due(today)?;
    if !overdue.is_empty() || !expired.is_empty() {
        debug!(
            overdue = overdue.len(),
            expired = expired.len(),
            "refreshed document statuses"
        );
    }
    Ok(storage)
}
