//! Upload parsing.
//!
//! Every supported format is reduced to a [`RawTable`] (normalized header names
//! plus loosely typed cells). The table is then validated against the columns a
//! given operation needs and converted into [`SampleInput`](crate::models::SampleInput)
//! rows.
//!
//! | Format | Parser | Notes |
//! |--------|--------|-------|
//! | CSV    | [`csv_parser`] | UTF-8, header row, BOM tolerated |
//! | JSON   | [`json_parser`] | array of records or object of columns |
//! | PDF    | [`pdf_parser`] | first text table carrying the required header |
//! | Excel  | [`excel_parser`] | first worksheet, header row |

pub mod csv_parser;
pub mod excel_parser;
pub mod json_parser;
pub mod pdf_parser;
pub mod table;

pub use crate::models::FileFormat;
pub use table::{Cell, RawTable};

/// Columns every upload-and-calculate table must carry.
pub const SAMPLE_COLUMNS: [&str; 6] = ["latitude", "longitude", "arsenic", "cadmium", "lead", "zinc"];

/// Columns every hotspot prediction table must carry.
pub const LOCATION_COLUMNS: [&str; 2] = ["latitude", "longitude"];

/// Errors raised while turning an uploaded file into samples.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("Unsupported file type: {0}. Please upload a CSV, JSON, PDF, or Excel file.")]
    UnsupportedFormat(String),

    #[error("Error processing {format} file: {message}")]
    Malformed { format: FileFormat, message: String },

    #[error("No data tables found in the PDF.")]
    NoTable,

    #[error("Missing required columns. Data must contain: {}", required.join(", "))]
    MissingColumns {
        required: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("Row {row}: invalid value '{value}' in column '{column}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: {column} {value} is out of range")]
    OutOfRange {
        row: usize,
        column: String,
        value: f64,
    },
}

impl ParseError {
    pub(crate) fn malformed(format: FileFormat, message: impl ToString) -> Self {
        ParseError::Malformed {
            format,
            message: message.to_string(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Decide the upload format from the declared content type, falling back to
/// the file extension when the client sent no specific type.
pub fn detect_format(content_type: Option<&str>, file_name: Option<&str>) -> ParseResult<FileFormat> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_lowercase())
        .filter(|ct| !ct.is_empty());

    match mime.as_deref() {
        Some("text/csv") | Some("application/csv") => return Ok(FileFormat::Csv),
        Some("application/json") | Some("text/json") => return Ok(FileFormat::Json),
        Some("application/pdf") => return Ok(FileFormat::Pdf),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        | Some("application/vnd.ms-excel") => return Ok(FileFormat::Excel),
        Some("application/octet-stream") | None => {}
        Some(other) => return Err(ParseError::UnsupportedFormat(other.to_string())),
    }

    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => Ok(FileFormat::Csv),
        Some("json") => Ok(FileFormat::Json),
        Some("pdf") => Ok(FileFormat::Pdf),
        Some("xlsx") | Some("xls") => Ok(FileFormat::Excel),
        _ => Err(ParseError::UnsupportedFormat(
            mime.unwrap_or_else(|| "unknown".to_string()),
        )),
    }
}

/// Parse raw upload bytes into a table.
///
/// `required` is only consulted by the PDF parser, which uses it to locate the
/// header line among the extracted text.
pub fn parse_table(format: FileFormat, bytes: &[u8], required: &[&str]) -> ParseResult<RawTable> {
    match format {
        FileFormat::Csv => csv_parser::parse_csv(bytes),
        FileFormat::Json => json_parser::parse_json(bytes),
        FileFormat::Pdf => pdf_parser::parse_pdf(bytes, required),
        FileFormat::Excel => excel_parser::parse_excel(bytes),
    }
}
