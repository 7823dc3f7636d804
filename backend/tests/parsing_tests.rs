//! Upload parsing across formats.

use hpi_rust::models::{FileFormat, MetalConcentrations};
use hpi_rust::parsing::{self, detect_format, ParseError, SAMPLE_COLUMNS};
use hpi_rust::routes::ingest::{parse_upload, UploadKind};

const TWO_ROW_CSV: &str = "latitude,longitude,arsenic,cadmium,lead,zinc\n\
                           28.7041,77.1025,15,4,12,5500\n\
                           19.0760,72.8777,5,1,4,2000\n";

#[test]
fn test_csv_two_rows() {
    let rows = parse_upload(UploadKind::Samples, FileFormat::Csv, TWO_ROW_CSV.as_bytes()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].latitude, 28.7041);
    assert_eq!(rows[1].concentrations.zinc, Some(2000.0));
}

#[test]
fn test_csv_headers_are_case_and_space_insensitive() {
    let csv = "\u{feff} Latitude ,LONGITUDE,Arsenic,Cadmium,Lead,Zinc\n1,2,3,4,5,6\n";
    let rows = parse_upload(UploadKind::Samples, FileFormat::Csv, csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].concentrations.cadmium, Some(4.0));
}

#[test]
fn test_csv_empty_metal_cells_are_not_measured() {
    let csv = "latitude,longitude,arsenic,cadmium,lead,zinc\n10,20,,NA,3,\n";
    let rows = parse_upload(UploadKind::Samples, FileFormat::Csv, csv.as_bytes()).unwrap();
    let c = rows[0].concentrations;
    assert_eq!((c.arsenic, c.cadmium, c.lead, c.zinc), (None, None, Some(3.0), None));
}

#[test]
fn test_csv_header_only_is_empty() {
    let csv = "latitude,longitude,arsenic,cadmium,lead,zinc\n";
    let rows = parse_upload(UploadKind::Samples, FileFormat::Csv, csv.as_bytes()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_csv_missing_column() {
    let csv = "latitude,longitude,arsenic,cadmium,lead\n1,2,3,4,5\n";
    let err = parse_upload(UploadKind::Samples, FileFormat::Csv, csv.as_bytes()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Missing required columns"));
    assert!(message.contains("latitude, longitude, arsenic, cadmium, lead, zinc"));
}

#[test]
fn test_invalid_values_name_row_and_column() {
    let csv = "latitude,longitude,arsenic,cadmium,lead,zinc\n1,2,3,4,5,6\n1,2,abc,4,5,6\n";
    let err = parse_upload(UploadKind::Samples, FileFormat::Csv, csv.as_bytes()).unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidValue {
            row: 2,
            column: "arsenic".to_string(),
            value: "abc".to_string(),
        }
    );

    let csv = "latitude,longitude,arsenic,cadmium,lead,zinc\n,2,3,4,5,6\n";
    let err = parse_upload(UploadKind::Samples, FileFormat::Csv, csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ParseError::MissingValue { row: 1, ref column } if column == "latitude"));

    let csv = "latitude,longitude\n91,2\n";
    let err = parse_upload(UploadKind::Locations, FileFormat::Csv, csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ParseError::OutOfRange { row: 1, .. }));
}

#[test]
fn test_json_records_and_columns_agree() {
    let records = br#"[
        {"latitude": 28.7, "longitude": 77.1, "arsenic": 15, "cadmium": 4, "lead": 12, "zinc": 5500},
        {"latitude": 19.0, "longitude": 72.8, "arsenic": 5, "cadmium": 1, "lead": 4, "zinc": 2000}
    ]"#;
    let columns = br#"{
        "latitude": [28.7, 19.0], "longitude": [77.1, 72.8],
        "arsenic": [15, 5], "cadmium": [4, 1], "lead": [12, 4], "zinc": [5500, 2000]
    }"#;

    let from_records = parse_upload(UploadKind::Samples, FileFormat::Json, records).unwrap();
    let from_columns = parse_upload(UploadKind::Samples, FileFormat::Json, columns).unwrap();
    assert_eq!(from_records, from_columns);
    assert_eq!(from_records.len(), 2);
}

#[test]
fn test_json_null_metal_is_not_measured() {
    let json = br#"[{"latitude": 1, "longitude": 2, "arsenic": null, "cadmium": 1, "lead": 2, "zinc": 3}]"#;
    let rows = parse_upload(UploadKind::Samples, FileFormat::Json, json).unwrap();
    assert_eq!(rows[0].concentrations.arsenic, None);
}

#[test]
fn test_json_malformed() {
    let err = parse_upload(UploadKind::Samples, FileFormat::Json, b"{not json").unwrap_err();
    assert!(err.to_string().starts_with("Error processing JSON file"));

    let err = parse_upload(UploadKind::Samples, FileFormat::Json, b"42").unwrap_err();
    assert!(matches!(err, ParseError::Malformed { format: FileFormat::Json, .. }));
}

#[test]
fn test_pdf_text_table() {
    let text = "Monitoring results\n\
                latitude longitude arsenic cadmium lead zinc\n\
                28.7 77.1 15 4 12 5500\n\
                footer text\n";
    let table = parsing::pdf_parser::extract_table(text, &SAMPLE_COLUMNS).unwrap();
    let rows = table.to_samples().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].concentrations.lead, Some(12.0));
}

fn fixture(name: &str) -> Vec<u8> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("reading {}: {}", path.display(), e))
}

fn assert_reference_rows(rows: &[hpi_rust::models::SampleInput]) {
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].latitude, 28.7041);
    assert_eq!(rows[0].longitude, 77.1025);
    assert_eq!(
        rows[0].concentrations,
        MetalConcentrations::new(15.0, 4.0, 12.0, 5500.0)
    );
    assert_eq!(rows[1].latitude, 19.076);
    assert_eq!(
        rows[1].concentrations,
        MetalConcentrations::new(5.0, 1.0, 4.0, 2000.0)
    );
}

#[test]
fn test_excel_workbook() {
    let rows = parse_upload(UploadKind::Samples, FileFormat::Excel, &fixture("samples.xlsx")).unwrap();
    assert_reference_rows(&rows);
}

#[test]
fn test_pdf_document() {
    // Title line above the table and a page footer below it.
    let rows = parse_upload(UploadKind::Samples, FileFormat::Pdf, &fixture("samples.pdf")).unwrap();
    assert_reference_rows(&rows);
}

#[test]
fn test_pdf_document_as_locations() {
    let rows = parse_upload(UploadKind::Locations, FileFormat::Pdf, &fixture("samples.pdf")).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(!rows[1].concentrations.is_empty());
}

#[test]
fn test_binary_garbage_is_malformed() {
    let err = parse_upload(UploadKind::Samples, FileFormat::Pdf, b"not a pdf").unwrap_err();
    assert!(matches!(err, ParseError::Malformed { format: FileFormat::Pdf, .. }));

    let err = parse_upload(UploadKind::Samples, FileFormat::Excel, b"not a workbook").unwrap_err();
    assert!(err.to_string().starts_with("Error processing Excel file"));
}

#[test]
fn test_detect_format_table() {
    let cases = [
        (Some("text/csv"), None, Ok(FileFormat::Csv)),
        (Some("application/json"), None, Ok(FileFormat::Json)),
        (Some("application/pdf"), None, Ok(FileFormat::Pdf)),
        (Some("application/vnd.ms-excel"), None, Ok(FileFormat::Excel)),
        (None, Some("data.xls"), Ok(FileFormat::Excel)),
        (Some("application/octet-stream"), Some("data.json"), Ok(FileFormat::Json)),
    ];
    for (content_type, name, expected) in cases {
        assert_eq!(detect_format(content_type, name), expected, "{:?} {:?}", content_type, name);
    }

    let err = detect_format(Some("image/png"), Some("photo.png")).unwrap_err();
    assert!(err.to_string().contains("Unsupported file type: image/png"));
}
