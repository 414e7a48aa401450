//! A1 notation helpers.

use crate::model::CellRef;

/// Converts a zero-based column index into its letter name (`0` → `A`,
/// `26` → `AA`).
pub fn column_name(index: u32) -> String {
    let mut remaining = u64::from(index) + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        let offset = ((remaining - 1) % 26) as u8;
        letters.push(b'A' + offset);
        remaining = (remaining - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Formats a single cell reference such as `B3`.
pub fn cell_name(cell: CellRef) -> String {
    format!("{}{}", column_name(cell.column), cell.row + 1)
}

/// Quotes a sheet title for use in a range, doubling embedded apostrophes.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Formats the range covering `height` × `width` cells starting at `origin`
/// on the sheet titled `title`, e.g. `'Sales'!A1:C10`.
pub fn block_range(title: &str, origin: CellRef, height: u32, width: u32) -> String {
    let end = CellRef::new(
        origin.row + height.saturating_sub(1),
        origin.column + width.saturating_sub(1),
    );
    format!(
        "{}!{}:{}",
        quote_sheet_title(title),
        cell_name(origin),
        cell_name(end)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        let cases = [
            (0, "A"),
            (1, "B"),
            (2, "C"),
            (25, "Z"),
            (26, "AA"),
            (27, "AB"),
            (28, "AC"),
            (701, "ZZ"),
            (702, "AAA"),
        ];
        for (index, expected) in cases {
            assert_eq!(column_name(index), expected, "column {index}");
        }
    }

    #[test]
    fn block_range_is_anchored_at_origin() {
        assert_eq!(
            block_range("Sheet1", CellRef::new(0, 0), 100, 3),
            "'Sheet1'!A1:C100"
        );
        assert_eq!(
            block_range("Q1 Sales", CellRef::new(2, 1), 1, 27),
            "'Q1 Sales'!B3:AB3"
        );
    }

    #[test]
    fn apostrophes_in_titles_are_doubled() {
        assert_eq!(quote_sheet_title("Bob's data"), "'Bob''s data'");
    }
}
