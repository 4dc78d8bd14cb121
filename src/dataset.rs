//! # Dataset Store
//!
//! The booking dataset is a headed CSV file loaded once at startup. Rows are
//! addressed by position, which is also the id of the matching vector in the
//! index. The columns used by analytics are parsed into typed fields; every
//! column, typed or not, is kept verbatim so a row can be rendered back in
//! full.
//!
//! A blank cell is a missing value. Missing rates and years are `None` and
//! are skipped by the aggregates; a blank cancellation flag reads as not
//! canceled.
//!
//! Each column gets one JSON type, inferred over the whole file: integer when
//! every cell is an integer, float when every cell is numeric or some are
//! missing, text otherwise.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::{Map, Number, Value};
use thiserror::Error;

pub const HOTEL_COLUMN: &str = "hotel";
pub const IS_CANCELED_COLUMN: &str = "is_canceled";
pub const ARRIVAL_YEAR_COLUMN: &str = "arrival_date_year";
pub const ARRIVAL_MONTH_COLUMN: &str = "arrival_date_month";
pub const ADR_COLUMN: &str = "adr";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
}

/// One booking. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct BookingRecord {
    pub hotel: String,
    pub is_canceled: bool,
    pub arrival_date_year: Option<i32>,
    pub arrival_date_month: String,
    /// Average daily rate
    pub adr: Option<f64>,
    values: Vec<String>,
}

/// Positions of the typed columns inside a row.
struct ColumnLayout {
    hotel: usize,
    is_canceled: usize,
    year: usize,
    month: usize,
    adr: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            hotel: find(HOTEL_COLUMN)?,
            is_canceled: find(IS_CANCELED_COLUMN)?,
            year: find(ARRIVAL_YEAR_COLUMN)?,
            month: find(ARRIVAL_MONTH_COLUMN)?,
            adr: find(ADR_COLUMN)?,
        })
    }
}

/// JSON type used to render every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    fn infer<'a>(cells: impl Iterator<Item = &'a str>) -> Self {
        let mut kind = ColumnKind::Integer;
        for cell in cells {
            if cell.is_empty() {
                if kind == ColumnKind::Integer {
                    kind = ColumnKind::Float;
                }
            } else if kind == ColumnKind::Integer && cell.parse::<i64>().is_err() {
                kind = if cell.parse::<f64>().is_ok() { ColumnKind::Float } else { ColumnKind::Text };
            } else if kind == ColumnKind::Float && cell.parse::<f64>().is_err() {
                kind = ColumnKind::Text;
            }

            if kind == ColumnKind::Text {
                break;
            }
        }
        kind
    }

    fn render(self, cell: &str) -> Value {
        if cell.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnKind::Integer => cell
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(cell.to_string())),
            ColumnKind::Float => cell
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ColumnKind::Text => Value::String(cell.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct DatasetStore {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    records: Vec<BookingRecord>,
}

impl DatasetStore {
    pub fn load_from_file(path: &Path) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let layout = ColumnLayout::from_headers(&columns)?;

        let mut records = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let raw = result?;
            records.push(parse_record(&raw, &layout, &columns, row)?);
        }

        let kinds = (0..columns.len())
            .map(|idx| {
                ColumnKind::infer(
                    records
                        .iter()
                        .map(|r| r.values.get(idx).map(String::as_str).unwrap_or("")),
                )
            })
            .collect();

        Ok(Self { columns, kinds, records })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.kinds.get(idx).copied()
    }

    pub fn records(&self) -> &[BookingRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&BookingRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render the row at `position` as a JSON object keyed by column name,
    /// in header order.
    pub fn row_json(&self, position: usize) -> Option<Map<String, Value>> {
        let record = self.records.get(position)?;
        Some(
            self.columns
                .iter()
                .zip(self.kinds.iter())
                .zip(record.values.iter())
                .map(|((column, kind), cell)| (column.clone(), kind.render(cell)))
                .collect(),
        )
    }
}

fn parse_record(
    raw: &StringRecord,
    layout: &ColumnLayout,
    columns: &[String],
    row: usize,
) -> Result<BookingRecord, DatasetError> {
    let cell = |idx: usize| raw.get(idx).unwrap_or("");
    let invalid = |idx: usize| DatasetError::InvalidValue {
        column: columns[idx].clone(),
        row,
        value: cell(idx).to_string(),
    };

    let is_canceled = parse_flag(cell(layout.is_canceled)).ok_or_else(|| invalid(layout.is_canceled))?;
    let arrival_date_year = parse_year(cell(layout.year)).ok_or_else(|| invalid(layout.year))?;
    let adr = parse_rate(cell(layout.adr)).ok_or_else(|| invalid(layout.adr))?;

    Ok(BookingRecord {
        hotel: cell(layout.hotel).to_string(),
        is_canceled,
        arrival_date_year,
        arrival_date_month: cell(layout.month).to_string(),
        adr,
        values: raw.iter().map(|v| v.to_string()).collect(),
    })
}

// Only a flag equal to 1 marks a cancellation.
fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "" => Some(false),
        "true" | "True" => Some(true),
        "false" | "False" => Some(false),
        other => other.parse::<f64>().ok().map(|v| v == 1.0),
    }
}

// Exported datasets sometimes carry integer columns as floats ("2017.0").
fn parse_year(value: &str) -> Option<Option<i32>> {
    if value.is_empty() {
        return Some(None);
    }
    value
        .parse::<i32>()
        .ok()
        .or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && v.abs() <= i32::MAX as f64)
                .map(|v| v as i32)
        })
        .map(Some)
}

fn parse_rate(value: &str) -> Option<Option<f64>> {
    if value.is_empty() {
        return Some(None);
    }
    match value.parse::<f64>() {
        Ok(rate) if rate.is_nan() => Some(None),
        Ok(rate) if rate.is_finite() => Some(Some(rate)),
        _ => None,
    }
}
