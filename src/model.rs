use chrono::{NaiveDateTime, NaiveTime};
use serde_json::Value;

/// Format used when a date cell is sent to the destination as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for time-of-day cells that carry no date.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// A literal cell value read from the source workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text, including the displayed form of cell errors.
    Text(String),
    /// Any numeric value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Date and time value.
    Date(NaiveDateTime),
    /// Time of day without a date part.
    Time(NaiveTime),
    /// Cell without a value.
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Converts the cell into the JSON value sent with a raw values write.
    ///
    /// Empty cells become `""` so the destination cell is cleared rather than
    /// left untouched.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Text(value) => Value::String(value.clone()),
            CellValue::Number(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(value.to_string())),
            CellValue::Bool(value) => Value::Bool(*value),
            CellValue::Date(value) => Value::String(value.format(DATE_FORMAT).to_string()),
            CellValue::Time(value) => Value::String(value.format(TIME_FORMAT).to_string()),
            CellValue::Empty => Value::String(String::new()),
        }
    }
}

/// Zero-based cell position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Dimensions of a grid, in cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSize {
    pub rows: u32,
    pub columns: u32,
}

/// One sheet of the source workbook, trimmed to its used range.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSheet {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Position of `rows[0][0]` within the source sheet.
    pub origin: CellRef,
    /// Row-major cell values; every row has the same width.
    pub rows: Vec<Vec<CellValue>>,
}

impl SourceSheet {
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn width(&self) -> u32 {
        self.rows.first().map(|row| row.len() as u32).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width() == 0
    }

    /// Number of rows and columns the destination needs to hold this sheet at
    /// its original position.
    pub fn required_size(&self) -> GridSize {
        if self.is_empty() {
            return GridSize::default();
        }
        GridSize {
            rows: self.origin.row + self.height(),
            columns: self.origin.column + self.width(),
        }
    }
}

/// A sheet that exists in the destination spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSheetRef {
    pub name: String,
    pub remote_id: i64,
}
