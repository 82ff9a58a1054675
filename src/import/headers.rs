//! Header normalization and synonym matching for client CSV files

use serde::Serialize;

/// Client attributes a CSV column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientField {
    Name,
    Email,
    Phone,
    Address,
    Company,
    Notes,
    Vat,
}

impl ClientField {
    pub const ALL: [ClientField; 7] = [
        ClientField::Name,
        ClientField::Email,
        ClientField::Phone,
        ClientField::Address,
        ClientField::Company,
        ClientField::Notes,
        ClientField::Vat,
    ];

    /// Header written by the sample file and by client export
    pub fn canonical_header(&self) -> &'static str {
        match self {
            ClientField::Name => "name",
            ClientField::Email => "email",
            ClientField::Phone => "phone",
            ClientField::Address => "address",
            ClientField::Company => "company",
            ClientField::Notes => "notes",
            ClientField::Vat => "vat_number",
        }
    }

    /// Accepted header spellings, already normalized
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            ClientField::Name => &[
                "name",
                "client name",
                "full name",
                "contact name",
                "client",
                "customer",
                "customer name",
            ],
            ClientField::Email => &["email", "email address", "e mail", "mail", "contact email"],
            ClientField::Phone => &["phone", "phone number", "telephone", "tel", "mobile", "cell"],
            ClientField::Address => &[
                "address",
                "street address",
                "billing address",
                "street",
                "location",
            ],
            ClientField::Company => &[
                "company",
                "company name",
                "business",
                "business name",
                "organization",
                "organisation",
            ],
            ClientField::Notes => &["notes", "note", "comments", "comment", "description"],
            ClientField::Vat => &["vat", "vat number", "vat id", "tax id", "vat no", "tax number"],
        }
    }
}

impl std::fmt::Display for ClientField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_header())
    }
}

/// Lowercase a raw header, drop BOM and quotes, turn `_ - .` into spaces and
/// collapse runs of whitespace
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .map(|c| match c {
            '_' | '-' | '.' => ' ',
            other => other,
        })
        .collect();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The client field a header names, if any
pub fn match_header(raw: &str) -> Option<ClientField> {
    let normalized = normalize_header(raw);
    ClientField::ALL
        .into_iter()
        .find(|field| field.synonyms().contains(&normalized.as_str()))
}

/// Column index for each field; the first matching column wins
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: Vec<(ClientField, usize)>,
}

impl ColumnMap {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut columns: Vec<(ClientField, usize)> = Vec::new();
        for (index, header) in headers.into_iter().enumerate() {
            if let Some(field) = match_header(header) {
                if !columns.iter().any(|(f, _)| *f == field) {
                    columns.push((field, index));
                }
            }
        }
        Self { columns }
    }

    pub fn index_of(&self, field: ClientField) -> Option<usize> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, index)| *index)
    }

    pub fn has(&self, field: ClientField) -> bool {
        self.index_of(field).is_some()
    }
}
