//! Excel uploads (`.xlsx` and legacy `.xls`), read with calamine.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use super::{Cell, FileFormat, ParseError, ParseResult, RawTable};

/// Parse the first worksheet; its first row is the header.
pub fn parse_excel(bytes: &[u8]) -> ParseResult<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::malformed(FileFormat::Excel, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ParseError::malformed(FileFormat::Excel, "workbook has no worksheets"))?
        .map_err(|e| ParseError::malformed(FileFormat::Excel, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string()).collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(excel_cell).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| *c != Cell::Empty))
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn excel_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from_text(s),
        other => Cell::from_text(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_cell_conversion() {
        assert_eq!(excel_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(excel_cell(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(excel_cell(&Data::String(" 7 ".to_string())), Cell::Text("7".to_string()));
        assert_eq!(excel_cell(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn test_parse_excel_rejects_non_workbook() {
        let err = parse_excel(b"latitude,longitude\n1,2\n").unwrap_err();
        assert!(err.to_string().starts_with("Error processing Excel file"));
    }
}
