//! Upload handling shared by the two file-based endpoints.

use crate::models::{FileFormat, SampleInput};
use crate::parsing::{self, ParseResult, LOCATION_COLUMNS, SAMPLE_COLUMNS};

pub const UPLOAD_AND_CALCULATE: &str = "upload_and_calculate";
pub const PREDICT_HOTSPOTS: &str = "predict_hotspots";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";
pub const NO_FILE_MESSAGE: &str = "No file uploaded. Expected a multipart field named \"file\".";

/// What an uploaded table is used for. Decides the required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// Full samples: location plus all four metals.
    Samples,
    /// Locations for hotspot prediction; metals optional.
    Locations,
}

impl UploadKind {
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            UploadKind::Samples => &SAMPLE_COLUMNS,
            UploadKind::Locations => &LOCATION_COLUMNS,
        }
    }

    pub fn operation(self) -> &'static str {
        match self {
            UploadKind::Samples => UPLOAD_AND_CALCULATE,
            UploadKind::Locations => PREDICT_HOTSPOTS,
        }
    }
}

/// Parse uploaded bytes into rows for `kind`.
///
/// CPU bound for PDF and Excel input; callers on the runtime should run it
/// under `spawn_blocking`.
pub fn parse_upload(kind: UploadKind, format: FileFormat, bytes: &[u8]) -> ParseResult<Vec<SampleInput>> {
    let table = parsing::parse_table(format, bytes, kind.required_columns())?;
    match kind {
        UploadKind::Samples => table.to_samples(),
        UploadKind::Locations => table.to_locations(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ParseError;

    #[test]
    fn test_samples_need_every_metal() {
        let csv = b"latitude,longitude,arsenic,cadmium,lead\n28.7,77.1,15,4,12\n";
        let err = parse_upload(UploadKind::Samples, FileFormat::Csv, csv).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumns { ref missing, .. } if missing == &["zinc"]));
    }

    #[test]
    fn test_locations_accept_partial_metals() {
        let csv = b"latitude,longitude,lead\n28.7,77.1,\n19.0,72.8,30\n";
        let rows = parse_upload(UploadKind::Locations, FileFormat::Csv, csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].concentrations.is_empty());
        assert_eq!(rows[1].concentrations.lead, Some(30.0));
        assert_eq!(rows[1].concentrations.zinc, None);
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(UploadKind::Samples.operation(), UPLOAD_AND_CALCULATE);
        assert_eq!(UploadKind::Locations.required_columns(), &["latitude", "longitude"]);
    }
}
