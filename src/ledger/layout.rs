//! The persisted layout of a period partition.
//!
//! ```text
//!      A  B              C        D      E         F      G           I             J
//!  1      January 2025
//!  2                                                                  MONTH TOTAL:  4500
//!  3      Week 2 (06/01 - 12/01)
//!  4      Date           Product  Store  Quantity  Price  Total
//!  5      2025-01-06     X        A      2         1000   2000
//!  6      WEEK TOTAL:                                     2000
//!  7
//!  8      Week 3 (13/01 - 19/01)
//!  ...
//! ```
//!
//! Column B is the label column: it holds week labels, the header's `Date`, the dates of data
//! rows and the week-total sentinel. Nothing else marks where a block starts or ends.

use crate::model::RowCol;

/// Label column (B). Also the first column of a block.
pub const LABEL_COL: usize = 1;
pub const STORE_COL: usize = 3;
/// Value column (G): row totals, and block totals on sentinel rows.
pub const TOTAL_COL: usize = 6;

/// The fixed column schema of every week block, written from `LABEL_COL` onwards.
pub const HEADER: [&str; 6] = ["Date", "Product", "Store", "Quantity", "Price", "Total"];

/// The header cell above the store column. Never counted as a store name.
pub const STORE_HEADER: &str = "Store";

pub const WEEK_TOTAL_LABEL: &str = "WEEK TOTAL:";
pub const MONTH_TOTAL_LABEL: &str = "MONTH TOTAL:";

/// Where the partition's display title goes.
pub const TITLE_CELL: RowCol = RowCol::new(0, 1);

/// The period-total sentinel (I2); the value sits in the next cell (J2).
pub const PERIOD_TOTAL_CELL: RowCol = RowCol::new(1, 8);

/// Rows above the first block: the title row and the period summary row.
pub const PREAMBLE_ROWS: usize = 2;

/// True for a cell that opens a week-total row, as the locator sees it.
pub(crate) fn starts_week_total(cell: &str) -> bool {
    cell.starts_with(WEEK_TOTAL_LABEL)
}

/// True for a cell that is the week-total sentinel, ignoring case and surrounding space.
pub(crate) fn is_week_total(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case(WEEK_TOTAL_LABEL)
}

/// True for a label-column cell that is some structural sentinel rather than data.
pub(crate) fn is_sentinel(cell: &str) -> bool {
    let cell = cell.trim();
    cell.eq_ignore_ascii_case(WEEK_TOTAL_LABEL) || cell.eq_ignore_ascii_case(MONTH_TOTAL_LABEL)
}

/// The cells of a week-total row, from `LABEL_COL` to `TOTAL_COL`.
pub(crate) fn week_total_row(total: impl ToString) -> Vec<String> {
    let mut row = vec![String::new(); TOTAL_COL - LABEL_COL + 1];
    row[0] = WEEK_TOTAL_LABEL.to_string();
    row[TOTAL_COL - LABEL_COL] = total.to_string();
    row
}

/// Pads `cells` with `LABEL_COL` blanks on the left so they can be appended as a whole row.
pub(crate) fn offset_row<S: ToString>(cells: &[S]) -> Vec<String> {
    let mut row = vec![String::new(); LABEL_COL];
    row.extend(cells.iter().map(|c| c.to_string()));
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert!(starts_week_total("WEEK TOTAL:"));
        assert!(starts_week_total("WEEK TOTAL: (edited)"));
        assert!(!starts_week_total(" WEEK TOTAL:"));
        assert!(is_week_total(" week total: "));
        assert!(!is_week_total("WEEK TOTAL: (edited)"));
        assert!(is_sentinel("MONTH TOTAL:"));
        assert!(!is_sentinel("2025-01-06"));
        assert!(!is_sentinel(""));
    }

    #[test]
    fn test_week_total_row() {
        let row = week_total_row(0);
        assert_eq!(row.len(), HEADER.len());
        assert_eq!(row[0], WEEK_TOTAL_LABEL);
        assert_eq!(row[5], "0");
    }

    #[test]
    fn test_offset_row() {
        assert_eq!(offset_row(&["Week 1"]), vec!["", "Week 1"]);
    }
}
