//! JSON uploads.
//!
//! Two layouts are accepted:
//!
//! - records: `[{"latitude": 1.0, "longitude": 2.0, ...}, ...]`
//! - columns: `{"latitude": [1.0, ...], "longitude": [2.0, ...]}`, where each
//!   column may also be an index-keyed object (`{"0": 1.0, "1": ...}`).

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{Cell, FileFormat, ParseError, ParseResult, RawTable};

pub fn parse_json(bytes: &[u8]) -> ParseResult<RawTable> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ParseError::malformed(FileFormat::Json, e))?;

    match value {
        Value::Array(records) => from_records(&records),
        Value::Object(columns) => from_columns(&columns),
        _ => Err(ParseError::malformed(
            FileFormat::Json,
            "expected an array of records or an object of columns",
        )),
    }
}

fn from_records(records: &[Value]) -> ParseResult<RawTable> {
    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| {
            ParseError::malformed(FileFormat::Json, format!("record {} is not an object", i + 1))
        })?;
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(object);
    }

    let rows = objects
        .iter()
        .map(|object| {
            headers
                .iter()
                .map(|h| object.get(h).map(json_cell).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

fn from_columns(columns: &Map<String, Value>) -> ParseResult<RawTable> {
    let headers: Vec<String> = columns.keys().cloned().collect();
    let mut cells: Vec<BTreeMap<RowKey, Cell>> = Vec::with_capacity(headers.len());

    for (name, column) in columns {
        let values: BTreeMap<RowKey, Cell> = match column {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (RowKey::Position(i), json_cell(v)))
                .collect(),
            Value::Object(items) => items
                .iter()
                .map(|(k, v)| (RowKey::parse(k), json_cell(v)))
                .collect(),
            _ => {
                return Err(ParseError::malformed(
                    FileFormat::Json,
                    format!("column '{}' must be an array or an object", name),
                ))
            }
        };
        cells.push(values);
    }

    let mut keys: Vec<&RowKey> = cells.iter().flat_map(|c| c.keys()).collect();
    keys.sort();
    keys.dedup();

    let rows = keys
        .into_iter()
        .map(|key| {
            cells
                .iter()
                .map(|column| column.get(key).cloned().unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Row index of a column-oriented document; numeric keys sort numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum RowKey {
    Position(usize),
    Label(String),
}

impl RowKey {
    fn parse(key: &str) -> Self {
        key.parse()
            .map(RowKey::Position)
            .unwrap_or_else(|_| RowKey::Label(key.to_string()))
    }
}

fn json_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::String(s) => Cell::from_text(s),
        other => Cell::Text(other.to_string()),
    }
}
