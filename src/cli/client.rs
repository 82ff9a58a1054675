//! Client CLI commands
//!
//! Implements CLI commands for client management and CSV import.

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::{format_client_details, format_client_list, format_import_result};
use crate::error::{SleekError, SleekResult};
use crate::import::generate_sample_csv;
use crate::services::{ClientChanges, ClientService, NewClient};
use crate::storage::Storage;

/// Client subcommands
#[derive(Subcommand)]
pub enum ClientCommands {
    /// Add a new client
    Add {
        /// Client name
        name: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        /// Company name
        #[arg(short, long)]
        company: Option<String>,
        /// VAT number (e.g. DE811907980)
        #[arg(long)]
        vat: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List clients
    List {
        /// Include archived clients
        #[arg(short, long)]
        all: bool,
    },
    /// Show client details
    Show {
        /// Client name or ID
        client: String,
    },
    /// Edit a client (pass an empty string to clear a field)
    Edit {
        /// Client name or ID
        client: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        vat: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Archive a client (or restore it with --undo)
    Archive {
        /// Client name or ID
        client: String,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a client with no invoices or estimates
    Delete {
        /// Client name or ID
        client: String,
    },
    /// Import clients from a CSV file
    Import {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Print a sample import file
    SampleCsv,
}

/// Handle a client command
pub fn handle_client_command(storage: &Storage, cmd: ClientCommands) -> SleekResult<()> {
    let service = ClientService::new(storage);

    match cmd {
        ClientCommands::Add {
            name,
            email,
            phone,
            address,
            company,
            vat,
            notes,
        } => {
            let client = service.create(NewClient {
                name,
                email,
                phone,
                address,
                company_name: company,
                vat_number: vat,
                notes,
            })?;

            println!("Created client: {}", client.name);
            if let Some(email) = &client.email {
                println!("  Email: {}", email);
            }
            println!("  ID: {}", client.id);
        }

        ClientCommands::List { all } => {
            let clients = service.list(all)?;
            print!("{}", format_client_list(&clients));
        }

        ClientCommands::Show { client } => {
            let found = service.require(&client)?;
            print!("{}", format_client_details(&found));
        }

        ClientCommands::Edit {
            client,
            name,
            email,
            phone,
            address,
            company,
            vat,
            notes,
        } => {
            let found = service.require(&client)?;
            let changes = ClientChanges {
                name,
                email,
                phone,
                address,
                company_name: company,
                vat_number: vat,
                notes,
            };

            if changes == ClientChanges::default() {
                println!("No changes specified. Use --name, --email, ... to edit fields.");
                return Ok(());
            }

            let updated = service.update(found.id, changes)?;
            println!("Updated client: {}", updated.name);
        }

        ClientCommands::Archive { client, undo } => {
            let found = service.require(&client)?;
            let updated = service.set_archived(found.id, !undo)?;
            if undo {
                println!("Restored client: {}", updated.name);
            } else {
                println!("Archived client: {}", updated.name);
            }
        }

        ClientCommands::Delete { client } => {
            let found = service.require(&client)?;
            let deleted = service.delete(found.id)?;
            println!("Deleted client: {}", deleted.name);
        }

        ClientCommands::Import { file } => {
            let content = std::fs::read_to_string(&file).map_err(|e| {
                SleekError::Import(format!("Failed to read {}: {}", file.display(), e))
            })?;

            let outcome = service.import_csv(&content)?;
            print!("{}", format_import_result(&outcome.result, outcome.created.len()));

            if !outcome.result.success {
                return Err(SleekError::Import(format!(
                    "{} could not be imported",
                    file.display()
                )));
            }
        }

        ClientCommands::SampleCsv => {
            print!("{}", generate_sample_csv());
        }
    }

    Ok(())
}
