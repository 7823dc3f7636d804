//! Upload batches: one per uploaded file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::sample::BatchId;

/// Upload file formats understood by the ingest layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Json,
    Pdf,
    Excel,
}

impl FileFormat {
    /// Human-readable name used in error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            FileFormat::Csv => "CSV",
            FileFormat::Json => "JSON",
            FileFormat::Pdf => "PDF",
            FileFormat::Excel => "Excel",
        }
    }

    /// Lowercase identifier used for storage.
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Json => "json",
            FileFormat::Pdf => "pdf",
            FileFormat::Excel => "excel",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "pdf" => Ok(FileFormat::Pdf),
            "excel" | "xlsx" | "xls" => Ok(FileFormat::Excel),
            other => Err(format!("Unknown file format: {}", other)),
        }
    }
}

/// Batch metadata supplied by the ingest service before storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBatch {
    pub file_name: String,
    pub format: FileFormat,
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub checksum: String,
}

/// A stored upload batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadBatch {
    pub batch_id: BatchId,
    pub file_name: String,
    pub format: FileFormat,
    pub checksum: String,
    pub sample_count: usize,
    pub uploaded_at: DateTime<Utc>,
}
