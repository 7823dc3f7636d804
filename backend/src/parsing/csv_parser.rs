//! CSV uploads.

use super::{Cell, FileFormat, ParseError, ParseResult, RawTable};

/// Parse a UTF-8 CSV document whose first record is the header.
///
/// Fully blank records are skipped. Records with a different field count
/// than the header are rejected.
pub fn parse_csv(bytes: &[u8]) -> ParseResult<RawTable> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::malformed(FileFormat::Csv, e))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseError::malformed(FileFormat::Csv, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ParseError::malformed(FileFormat::Csv, e))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(RawTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_csv() {
        let csv = "latitude,longitude,arsenic,cadmium,lead,zinc\n\
                   28.7,77.1,15.0,4.0,12.0,5500\n\
                   19.0,72.8,5.0,1.0,4.0,2000";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);

        let samples = table.to_samples().unwrap();
        assert_eq!(samples[0].latitude, 28.7);
        assert_eq!(samples[1].concentrations.zinc, Some(2000.0));
    }

    #[test]
    fn test_parse_csv_with_bom_and_padded_headers() {
        let csv = "\u{feff} Latitude , Longitude \n 1.5 , 2.5 \n\n";
        let table = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.headers(), &["latitude".to_string(), "longitude".to_string()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_parse_csv_rejects_ragged_rows() {
        let csv = "latitude,longitude\n1.0,2.0,3.0\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("Error processing CSV file"));
    }

    #[test]
    fn test_parse_csv_rejects_invalid_utf8() {
        let err = parse_csv(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { format: FileFormat::Csv, .. }));
    }

    #[test]
    fn test_header_only_csv_yields_empty_table() {
        let table = parse_csv(b"latitude,longitude,arsenic,cadmium,lead,zinc\n").unwrap();
        assert!(table.is_empty());
        assert!(table.to_samples().unwrap().is_empty());
    }
}
