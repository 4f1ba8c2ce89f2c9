//! Client CSV import.
//!
//! Rows are validated one by one into [`ValidatedRow`]s. Invalid rows stay in
//! the batch, in source order, so callers can show them next to their
//! errors; only valid rows reach the [`ImportSink`].

pub mod validate;

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ImportConfig, RowCapPolicy};
use crate::error::ErrorCode;
use crate::model::ClientRecord;
use crate::source::{ImportSink, SourceError};

/// Columns of the client import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientField {
    Name,
    Email,
    Phone,
    Birthday,
    Address,
    Tags,
}

impl ClientField {
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Birthday,
        Self::Address,
        Self::Tags,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Birthday => "birthday",
            Self::Address => "address",
            Self::Tags => "tags",
        }
    }

    #[must_use]
    pub const fn is_required_column(self) -> bool {
        matches!(self, Self::Name | Self::Email)
    }

    fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|field| header.eq_ignore_ascii_case(field.as_str()))
    }
}

impl fmt::Display for ClientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell values of one CSV row, as read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClientRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birthday: String,
    pub address: String,
    pub tags: String,
}

impl RawClientRow {
    fn set(&mut self, field: ClientField, value: &str) {
        let slot = match field {
            ClientField::Name => &mut self.name,
            ClientField::Email => &mut self.email,
            ClientField::Phone => &mut self.phone,
            ClientField::Birthday => &mut self.birthday,
            ClientField::Address => &mut self.address,
            ClientField::Tags => &mut self.tags,
        };
        *slot = value.to_string();
    }
}

/// One input row with its verdict.
///
/// Serializes with an extra `is_valid` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
    /// 1-based line in the source file.
    pub line: u64,
    pub raw: RawClientRow,
    /// Present exactly when `errors` is empty.
    pub record: Option<ClientRecord>,
    pub errors: BTreeMap<ClientField, String>,
}

impl ValidatedRow {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flag a cell whose bytes were not UTF-8. Its raw value is a lossy decode.
    fn reject_encoding(&mut self, field: ClientField) {
        self.errors
            .insert(field, "value is not valid UTF-8".to_string());
        self.record = None;
    }
}

impl Serialize for ValidatedRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut row = serializer.serialize_struct("ValidatedRow", 5)?;
        row.serialize_field("line", &self.line)?;
        row.serialize_field("is_valid", &self.is_valid())?;
        row.serialize_field("raw", &self.raw)?;
        row.serialize_field("record", &self.record)?;
        row.serialize_field("errors", &self.errors)?;
        row.end()
    }
}

/// Check every field of a row, collecting one error per failing field.
#[must_use]
pub fn validate_row(raw: RawClientRow, line: u64, today: NaiveDate) -> ValidatedRow {
    let mut errors = BTreeMap::new();

    let name = validate::validate_name(&raw.name)
        .map_err(|e| errors.insert(ClientField::Name, e))
        .ok();
    let email = validate::validate_email(&raw.email)
        .map_err(|e| errors.insert(ClientField::Email, e))
        .ok();
    let phone = validate::validate_phone(&raw.phone)
        .map_err(|e| errors.insert(ClientField::Phone, e))
        .ok();
    let birthday = validate::validate_birthday(&raw.birthday, today)
        .map_err(|e| errors.insert(ClientField::Birthday, e))
        .ok();
    let address = validate::validate_address(&raw.address)
        .map_err(|e| errors.insert(ClientField::Address, e))
        .ok();
    let tags = validate::parse_tags(&raw.tags)
        .map_err(|e| errors.insert(ClientField::Tags, e))
        .ok();

    let record = match (name, email, phone, birthday, address, tags) {
        (Some(name), Some(email), Some(phone), Some(birthday), Some(address), Some(tags)) => {
            Some(ClientRecord {
                name,
                email,
                phone,
                birthday,
                address,
                tags,
            })
        }
        _ => None,
    };

    ValidatedRow {
        line,
        raw,
        record,
        errors,
    }
}

/// File-level import failures. Row problems never end up here.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(ClientField),

    #[error("file has {count} rows; the limit is {max}")]
    TooManyRows { count: usize, max: usize },
}

impl ImportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Csv(_) => ErrorCode::CsvMalformed,
            Self::MissingColumn(_) => ErrorCode::CsvMissingColumn,
            Self::TooManyRows { .. } => ErrorCode::ImportRowCapExceeded,
        }
    }
}

/// Validated rows of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportBatch {
    pub rows: Vec<ValidatedRow>,
    /// Rows dropped by the `truncate` overflow policy.
    pub truncated: usize,
}

/// Outcome of sending a batch to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub submitted: usize,
    pub imported: usize,
    pub failed: usize,
    pub skipped_invalid: usize,
}

impl ImportBatch {
    #[must_use]
    pub fn valid_records(&self) -> Vec<ClientRecord> {
        self.rows.iter().filter_map(|r| r.record.clone()).collect()
    }

    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_valid()).count()
    }

    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.rows.len() - self.valid_count()
    }

    /// Send the valid rows to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the sink's error when the request as a whole fails.
    pub fn submit<S: ImportSink + ?Sized>(&self, sink: &mut S) -> Result<ImportSummary, SourceError> {
        let records = self.valid_records();
        let skipped_invalid = self.invalid_count();
        if records.is_empty() {
            warn!(skipped_invalid, "no valid rows to import");
            return Ok(ImportSummary {
                skipped_invalid,
                ..ImportSummary::default()
            });
        }

        let counts = sink.import_clients(&records)?;
        let summary = ImportSummary {
            submitted: records.len(),
            imported: counts.imported,
            failed: counts.failed,
            skipped_invalid,
        };
        info!(
            submitted = summary.submitted,
            imported = summary.imported,
            failed = summary.failed,
            skipped_invalid,
            "client import submitted"
        );
        Ok(summary)
    }
}

/// Read and validate a client CSV.
///
/// The first row is the header. Column names are matched case-insensitively
/// and unknown columns are ignored.
///
/// # Errors
///
/// Fails on unreadable CSV, a missing `name`/`email` column, or, under the
/// `reject` policy, more than `config.max_rows` data rows.
pub fn parse_clients<R: Read>(
    reader: R,
    today: NaiveDate,
    config: &ImportConfig,
) -> Result<ImportBatch, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<Option<ClientField>> = csv_reader
        .byte_headers()?
        .iter()
        .map(|header| ClientField::from_header(&String::from_utf8_lossy(header)))
        .collect();
    for required in ClientField::ALL.into_iter().filter(|f| f.is_required_column()) {
        if !columns.contains(&Some(required)) {
            return Err(ImportError::MissingColumn(required));
        }
    }

    let mut batch = ImportBatch::default();
    let mut count = 0_usize;
    // Byte records: a badly encoded cell is a row error, not a file error.
    for result in csv_reader.byte_records() {
        let record = result?;
        count += 1;
        if count > config.max_rows {
            continue;
        }

        let mut raw = RawClientRow::default();
        let mut not_utf8 = Vec::new();
        for (field, bytes) in columns.iter().zip(record.iter()) {
            let Some(field) = field else {
                continue;
            };
            if std::str::from_utf8(bytes).is_err() {
                not_utf8.push(*field);
            }
            raw.set(*field, &String::from_utf8_lossy(bytes));
        }
        let line = record.position().map_or(0, csv::Position::line);
        let mut row = validate_row(raw, line, today);
        for field in not_utf8 {
            row.reject_encoding(field);
        }
        if !row.is_valid() {
            debug!(line, errors = row.errors.len(), "invalid client row");
        }
        batch.rows.push(row);
    }

    if count > config.max_rows {
        match config.on_overflow {
            RowCapPolicy::Reject => {
                warn!(count, max = config.max_rows, "import file over row limit");
                return Err(ImportError::TooManyRows {
                    count,
                    max: config.max_rows,
                });
            }
            RowCapPolicy::Truncate => {
                batch.truncated = count - config.max_rows;
                warn!(
                    dropped = batch.truncated,
                    max = config.max_rows,
                    "import file truncated to row limit"
                );
            }
        }
    }

    debug!(
        rows = batch.rows.len(),
        invalid = batch.invalid_count(),
        "client CSV parsed"
    );
    Ok(batch)
}
