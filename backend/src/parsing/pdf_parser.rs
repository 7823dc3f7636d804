//! PDF uploads.
//!
//! Text is extracted from the document and scanned for the first line whose
//! tokens include every required column. That line becomes the header. A later
//! line is a row when it has one token per header and numeric latitude and
//! longitude; anything else (page footers, repeated headers, captions) is text
//! around the table and is skipped.

use super::{Cell, FileFormat, ParseError, ParseResult, RawTable};

pub fn parse_pdf(bytes: &[u8], required: &[&str]) -> ParseResult<RawTable> {
    // pdf-extract panics on some malformed documents instead of returning an error.
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ParseError::malformed(FileFormat::Pdf, "document could not be read"))?
        .map_err(|e| ParseError::malformed(FileFormat::Pdf, e))?;
    extract_table(&text, required)
}

/// Locate a table in extracted PDF text.
pub fn extract_table(text: &str, required: &[&str]) -> ParseResult<RawTable> {
    let mut lines = text.lines().map(tokenize).filter(|tokens| !tokens.is_empty());

    let headers: Vec<String> = lines
        .by_ref()
        .map(|tokens| tokens.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>())
        .find(|tokens| required.iter().all(|r| tokens.iter().any(|t| t == r)))
        .ok_or(ParseError::NoTable)?;

    let coordinates: Vec<usize> = ["latitude", "longitude"]
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == name))
        .collect();

    let rows: Vec<Vec<Cell>> = lines
        .filter(|tokens| is_table_row(tokens, headers.len(), &coordinates))
        .map(|tokens| tokens.into_iter().map(Cell::from_text).collect())
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_table_row(tokens: &[&str], width: usize, coordinates: &[usize]) -> bool {
    tokens.len() == width
        && coordinates
            .iter()
            .all(|&i| tokens[i].parse::<f64>().is_ok_and(f64::is_finite))
}
