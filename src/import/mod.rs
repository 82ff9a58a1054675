//! CSV client import
//!
//! Parsing is a pure function of the input text: it never touches storage.
//! Row-level problems are reported as data in [`ClientImportResult`]; only
//! file-level problems (empty file, no name column) flip `success` to false.
//!
//! Rows are numbered by the file line they start on, so the header is row 1
//! and blank lines or multi-line quoted fields shift later rows accordingly.

pub mod headers;
pub mod validators;

use std::collections::{HashMap, HashSet};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::models::Client;

pub use headers::{match_header, normalize_header, ClientField, ColumnMap};
use validators::{is_valid_email, is_valid_phone, is_valid_vat, normalize_vat};

/// Which part of the file an [`ImportError`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportField {
    /// The header row or the file as a whole
    Header,
    Name,
    Email,
    Phone,
    Vat,
}

impl std::fmt::Display for ImportField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ImportField::Header => "header",
            ImportField::Name => "name",
            ImportField::Email => "email",
            ImportField::Phone => "phone",
            ImportField::Vat => "vat",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub field: ImportField,
    pub message: String,
}

impl ImportError {
    fn new(row: usize, field: ImportField, message: impl Into<String>) -> Self {
        Self {
            row,
            field,
            message: message.into(),
        }
    }
}

/// A row skipped because its email was already seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRow {
    pub row: usize,
    pub email: String,
    /// Row that first used the email, or `None` when it belongs to a stored client
    pub first_row: Option<usize>,
}

/// A validated client ready to be stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedClient {
    pub row: usize,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub notes: Option<String>,
    pub vat_number: Option<String>,
}

impl ImportedClient {
    pub fn to_client(&self) -> Client {
        let mut client = Client::new(self.name.clone());
        client.email = self.email.clone();
        client.phone = self.phone.clone();
        client.address = self.address.clone();
        client.company_name = self.company_name.clone();
        client.vat_number = self.vat_number.clone();
        client.notes = self.notes.clone().unwrap_or_default();
        client
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientImportResult {
    pub success: bool,
    pub clients: Vec<ImportedClient>,
    pub errors: Vec<ImportError>,
    pub duplicates: Vec<DuplicateRow>,
    /// Data rows read, excluding the header and blank rows
    pub total_rows: usize,
    /// Rows that produced no client (validation failures and duplicates)
    pub invalid_rows: usize,
}

impl ClientImportResult {
    fn file_error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![ImportError::new(1, ImportField::Header, message)],
            ..Self::default()
        }
    }

    pub fn valid_rows(&self) -> usize {
        self.clients.len()
    }
}

/// Parse client rows from CSV text
pub fn parse_csv(text: &str) -> ClientImportResult {
    parse_csv_with_existing(text, std::iter::empty::<&str>())
}

/// Parse client rows, also treating `existing_emails` as already taken
///
/// Email comparison is case-insensitive and ignores surrounding whitespace.
pub fn parse_csv_with_existing<I, S>(text: &str, existing_emails: I) -> ClientImportResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return ClientImportResult::file_error("CSV file is empty");
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let mut records = reader.records();
    let lines = LineIndex::new(text);

    let header = match records.next() {
        Some(Ok(header)) => header,
        Some(Err(e)) => {
            return ClientImportResult::file_error(format!("Could not read header row: {}", e))
        }
        None => return ClientImportResult::file_error("CSV file is empty"),
    };

    let columns = ColumnMap::from_headers(header.iter());
    if !columns.has(ClientField::Name) {
        return ClientImportResult::file_error(format!(
            "Missing required column: name (accepted headers: {})",
            ClientField::Name.synonyms().join(", ")
        ));
    }

    let existing: HashSet<String> = existing_emails
        .into_iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    let mut result = ClientImportResult {
        success: true,
        ..ClientImportResult::default()
    };
    let mut seen_emails: HashMap<String, usize> = HashMap::new();

    for (index, record) in records.enumerate() {
        // Text input with flexible record lengths leaves nothing to fail on
        // per row; a reader error here means the file itself is broken
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                return ClientImportResult::file_error(format!("Could not read CSV: {}", e))
            }
        };
        let row = lines.row_of(&record).unwrap_or(index + 2);

        if record.iter().all(str::is_empty) {
            continue;
        }
        result.total_rows += 1;

        let client = match parse_row(row, &record, &columns) {
            Ok(client) => client,
            Err(errors) => {
                result.invalid_rows += 1;
                result.errors.extend(errors);
                continue;
            }
        };

        if let Some(email) = &client.email {
            let key = email.to_lowercase();
            if existing.contains(&key) {
                result.invalid_rows += 1;
                result.duplicates.push(DuplicateRow {
                    row,
                    email: email.clone(),
                    first_row: None,
                });
                continue;
            }
            if let Some(first_row) = seen_emails.get(&key) {
                result.invalid_rows += 1;
                result.duplicates.push(DuplicateRow {
                    row,
                    email: email.clone(),
                    first_row: Some(*first_row),
                });
                continue;
            }
            seen_emails.insert(key, row);
        }

        result.clients.push(client);
    }

    result
}

/// Maps record start offsets to 1-based file lines
struct LineIndex<'a> {
    text: &'a str,
    newlines: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let newlines = text
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { text, newlines }
    }

    fn row_of(&self, record: &StringRecord) -> Option<usize> {
        // The reader positions a record where the previous one ended, before
        // any blank lines it skipped on the way
        let start = usize::try_from(record.position()?.byte()).ok()?;
        let rest = self.text.get(start..)?;
        let offset = start + (rest.len() - rest.trim_start_matches(['\r', '\n']).len());
        Some(self.newlines.partition_point(|&nl| nl < offset) + 1)
    }
}

/// Validate one data row, returning every failing field
fn parse_row(
    row: usize,
    record: &StringRecord,
    columns: &ColumnMap,
) -> Result<ImportedClient, Vec<ImportError>> {
    let value = |field: ClientField| -> Option<String> {
        columns
            .index_of(field)
            .and_then(|index| record.get(index))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut errors = Vec::new();

    let name = value(ClientField::Name).unwrap_or_default();
    if name.is_empty() {
        errors.push(ImportError::new(row, ImportField::Name, "Name is required"));
    }

    let email = value(ClientField::Email);
    if let Some(email) = &email {
        if !is_valid_email(email) {
            errors.push(ImportError::new(
                row,
                ImportField::Email,
                format!("Invalid email address: {}", email),
            ));
        }
    }

    let phone = value(ClientField::Phone);
    if let Some(phone) = &phone {
        if !is_valid_phone(phone) {
            errors.push(ImportError::new(
                row,
                ImportField::Phone,
                format!("Invalid phone number: {}", phone),
            ));
        }
    }

    let vat_number = value(ClientField::Vat);
    if let Some(vat) = &vat_number {
        if !is_valid_vat(vat) {
            errors.push(ImportError::new(
                row,
                ImportField::Vat,
                format!("Invalid VAT number: {}", vat),
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ImportedClient {
        row,
        name,
        email,
        phone,
        address: value(ClientField::Address),
        company_name: value(ClientField::Company),
        notes: value(ClientField::Notes),
        vat_number: vat_number.map(|v| normalize_vat(&v)),
    })
}

/// A small template file showing every recognised column
pub fn generate_sample_csv() -> String {
    let header: Vec<&str> = ClientField::ALL
        .iter()
        .map(ClientField::canonical_header)
        .collect();

    let rows = [
        [
            "Jane Cooper",
            "jane@cooperdesign.com",
            "+1 (555) 201-3344",
            "42 Market Street, San Francisco, CA 94105",
            "Cooper Design Studio",
            "Prefers invoices on the 1st",
            "",
        ],
        [
            "Lukas Weber",
            "lukas.weber@weber-gmbh.de",
            "+49 30 1234567",
            "Friedrichstrasse 12, 10117 Berlin",
            "Weber GmbH",
            "",
            "DE811907980",
        ],
        [
            "Amelia Hart",
            "amelia@hartandco.co.uk",
            "020 7946 0958",
            "1 Canada Square, London E14 5AB",
            "Hart & Co",
            "Net 15 terms agreed",
            "GB123456789",
        ],
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    // Writing to a Vec cannot fail
    let _ = writer.write_record(&header);
    for row in &rows {
        let _ = writer.write_record(row);
    }
    writer
        .into_inner()
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}
