//! Format-neutral table produced by every parser.

use super::{ParseError, ParseResult, LOCATION_COLUMNS, SAMPLE_COLUMNS};
use crate::models::{Metal, MetalConcentrations, SampleInput};

/// Tokens treated as "no measurement".
const MISSING_TOKENS: [&str; 6] = ["na", "n/a", "nan", "null", "none", "-"];

/// A loosely typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from raw text, trimming whitespace.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Interpret the cell as a number.
    ///
    /// `Ok(None)` for empty cells and missing-value markers, `Err` with the
    /// offending text when the cell holds something non-numeric.
    pub fn as_f64(&self) -> Result<Option<f64>, String> {
        match self {
            Cell::Empty => Ok(None),
            Cell::Number(n) if n.is_finite() => Ok(Some(*n)),
            Cell::Number(_) => Ok(None),
            Cell::Text(text) => {
                if MISSING_TOKENS.contains(&text.to_lowercase().as_str()) {
                    return Ok(None);
                }
                text.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| text.clone())
            }
        }
    }
}

/// Header names plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create a table. Header names are trimmed and lower-cased.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Fail with [`ParseError::MissingColumns`] unless every `required` column exists.
    pub fn require_columns(&self, required: &[&str]) -> ParseResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::MissingColumns {
                required: required.iter().map(|c| c.to_string()).collect(),
                missing,
            })
        }
    }

    /// Convert to samples for index calculation. All six columns must exist.
    pub fn to_samples(&self) -> ParseResult<Vec<SampleInput>> {
        self.require_columns(&SAMPLE_COLUMNS)?;
        self.convert_rows()
    }

    /// Convert to locations for hotspot prediction. Metal columns are optional.
    pub fn to_locations(&self) -> ParseResult<Vec<SampleInput>> {
        self.require_columns(&LOCATION_COLUMNS)?;
        self.convert_rows()
    }

    fn convert_rows(&self) -> ParseResult<Vec<SampleInput>> {
        let lat_idx = self.column_index("latitude");
        let lon_idx = self.column_index("longitude");
        let metal_idx: Vec<(Metal, Option<usize>)> = Metal::ALL
            .into_iter()
            .map(|m| (m, self.column_index(m.column())))
            .collect();

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let row_number = i + 1;
                let latitude = self.required_number(row, row_number, "latitude", lat_idx)?;
                let longitude = self.required_number(row, row_number, "longitude", lon_idx)?;
                check_range(row_number, "latitude", latitude, 90.0)?;
                check_range(row_number, "longitude", longitude, 180.0)?;

                let mut concentrations = MetalConcentrations::default();
                for (metal, idx) in &metal_idx {
                    let value = match idx {
                        Some(idx) => cell_number(row, *idx, row_number, metal.column())?,
                        None => None,
                    };
                    concentrations.set(*metal, value);
                }

                Ok(SampleInput::new(latitude, longitude, concentrations))
            })
            .collect()
    }

    fn required_number(
        &self,
        row: &[Cell],
        row_number: usize,
        column: &str,
        idx: Option<usize>,
    ) -> ParseResult<f64> {
        idx.map(|idx| cell_number(row, idx, row_number, column))
            .transpose()?
            .flatten()
            .ok_or_else(|| ParseError::MissingValue {
                row: row_number,
                column: column.to_string(),
            })
    }
}

fn cell_number(row: &[Cell], idx: usize, row_number: usize, column: &str) -> ParseResult<Option<f64>> {
    row.get(idx)
        .unwrap_or(&Cell::Empty)
        .as_f64()
        .map_err(|value| ParseError::InvalidValue {
            row: row_number,
            column: column.to_string(),
            value,
        })
}

fn check_range(row_number: usize, column: &str, value: f64, bound: f64) -> ParseResult<()> {
    if (-bound..=bound).contains(&value) {
        Ok(())
    } else {
        Err(ParseError::OutOfRange {
            row: row_number,
            column: column.to_string(),
            value,
        })
    }
}
