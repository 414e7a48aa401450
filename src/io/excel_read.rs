use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use tracing::debug;

use crate::error::{CopyError, Result};
use crate::model::{CellRef, CellValue, SourceSheet, TIME_FORMAT};

const MILLIS_PER_DAY: i64 = 86_400_000;
const LEAP_BUG_DAY: i64 = 60;

/// Reads every sheet of the workbook at `path`, in the order the file stores
/// them.
///
/// The format is detected from the file extension, so any workbook calamine
/// understands can be copied.
pub fn read_workbook(path: &Path) -> Result<Vec<SourceSheet>> {
    if !path.is_file() {
        return Err(CopyError::SourceNotFound(path.to_path_buf()));
    }

    let format_error = |source| CopyError::SourceFormat {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(format_error)?;
    let names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = match workbook.worksheet_range(&name) {
            Some(range) => range.map_err(format_error)?,
            None => Range::empty(),
        };
        let sheet = sheet_from_range(name, &range);
        debug!(
            sheet = %sheet.name,
            rows = sheet.height(),
            columns = sheet.width(),
            "read sheet"
        );
        sheets.push(sheet);
    }

    Ok(sheets)
}

/// Trims `range` to the cells that hold a value and converts them.
fn sheet_from_range(name: String, range: &Range<DataType>) -> SourceSheet {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let cells: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (row_idx, row) in cells.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            bounds = Some(match bounds {
                None => (row_idx, row_idx, col_idx, col_idx),
                Some((top, bottom, left, right)) => (
                    top.min(row_idx),
                    bottom.max(row_idx),
                    left.min(col_idx),
                    right.max(col_idx),
                ),
            });
        }
    }

    let Some((top, bottom, left, right)) = bounds else {
        return SourceSheet {
            name,
            origin: CellRef::default(),
            rows: Vec::new(),
        };
    };

    let rows = cells[top..=bottom]
        .iter()
        .map(|row| {
            (left..=right)
                .map(|col_idx| row.get(col_idx).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect();

    SourceSheet {
        name,
        origin: CellRef::new(start_row + top as u32, start_col + left as u32),
        rows,
    }
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::Empty => CellValue::Empty,
        DataType::DateTime(serial) => {
            serial_value(*serial).unwrap_or_else(|| CellValue::Text(cell.to_string()))
        }
        other => CellValue::Text(other.to_string()),
    }
}

/// Converts a 1900-system date serial into the value the source displays.
///
/// Serials below 1 are plain times of day. The 1900 system counts a
/// non-existent 1900-02-29 as day 60, so days before it sit one day off the
/// 1899-12-30 epoch and day 60 itself has no calendar date.
fn serial_value(serial: f64) -> Option<CellValue> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY as f64).round() as i64;
    let days = millis / MILLIS_PER_DAY;
    let time_millis = millis % MILLIS_PER_DAY;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(
        (time_millis / 1000) as u32,
        ((time_millis % 1000) * 1_000_000) as u32,
    )?;

    match days {
        0 => Some(CellValue::Time(time)),
        LEAP_BUG_DAY => Some(CellValue::Text(format!(
            "1900-02-29 {}",
            time.format(TIME_FORMAT)
        ))),
        _ => {
            let epoch = if days < LEAP_BUG_DAY {
                NaiveDate::from_ymd_opt(1899, 12, 31)?
            } else {
                NaiveDate::from_ymd_opt(1899, 12, 30)?
            };
            let date = epoch.checked_add_signed(TimeDelta::try_days(days)?)?;
            Some(CellValue::Date(date.and_time(time)))
        }
    }
}
