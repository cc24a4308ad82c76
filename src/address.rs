//! Spreadsheet cell addressing (`A1`-style).
//!
//! Columns are 1-based and rendered with bijective base-26 letters: `1 → A`, `26 → Z`,
//! `27 → AA`, up to the last workbook column `16384 → XFD`. Anything outside `1..=MAX_COLUMN`
//! is rejected instead of being mis-addressed.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{ConfigError, ConfigResult};

/// Last column addressable in a workbook (`XFD`).
pub const MAX_COLUMN: usize = 16_384;

/// Number of rows above the first data row. The first data row is spreadsheet row 2.
pub const HEADER_ROW_OFFSET: usize = 2;

/// Convert a 1-based column index to its letters.
///
/// ```
/// use spreadsheet_validation::address::column_letter;
///
/// assert_eq!(column_letter(1).unwrap(), "A");
/// assert_eq!(column_letter(8).unwrap(), "H");
/// assert_eq!(column_letter(28).unwrap(), "AB");
/// assert!(column_letter(0).is_err());
/// ```
pub fn column_letter(column: usize) -> ConfigResult<String> {
    check_column(column)?;
    Ok(letters(column))
}

/// Convert column letters (case-insensitive) back to a 1-based column index.
pub fn column_index(letters: &str) -> ConfigResult<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::InvalidRuleOption {
            rule: "column",
            message: format!("'{letters}' is not a column reference"),
        });
    }

    let mut column: usize = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        column = column.saturating_mul(26).saturating_add(digit);
    }
    check_column(column)?;
    Ok(column)
}

/// Reject columns that have no spreadsheet address.
pub fn check_column(column: usize) -> ConfigResult<()> {
    if column == 0 || column > MAX_COLUMN {
        return Err(ConfigError::UnsupportedColumn {
            column,
            max: MAX_COLUMN,
        });
    }
    Ok(())
}

// Total for any column >= 1; callers bound-check first.
pub(crate) fn letters(column: usize) -> String {
    let mut out = Vec::new();
    let mut n = column;
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A single cell location: 1-based column and 1-based spreadsheet row.
///
/// Only the `(column, row)` pair is stored; the `B2` form is derived on display and is also
/// the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellAddress {
    column: usize,
    row: usize,
}

impl CellAddress {
    /// Create an address, rejecting columns outside `1..=MAX_COLUMN` and row 0.
    pub fn new(column: usize, row: usize) -> ConfigResult<Self> {
        check_column(column)?;
        if row == 0 {
            return Err(ConfigError::InvalidRuleOption {
                rule: "address",
                message: "rows are 1-based".to_string(),
            });
        }
        Ok(Self { column, row })
    }

    // Column already checked by the owning rule chain.
    pub(crate) fn from_checked(column: usize, row: usize) -> Self {
        Self { column, row }
    }

    /// Address of a data cell given its column and the position of its row among the data rows.
    pub fn for_data_row(column: usize, data_index: usize) -> ConfigResult<Self> {
        Self::new(column, data_index + HEADER_ROW_OFFSET)
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Column letters of this address.
    pub fn column_letter(&self) -> String {
        letters(self.column)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", letters(self.column), self.row)
    }
}

impl Serialize for CellAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letter_columns() {
        assert_eq!(column_letter(1).unwrap(), "A");
        assert_eq!(column_letter(2).unwrap(), "B");
        assert_eq!(column_letter(8).unwrap(), "H");
        assert_eq!(column_letter(26).unwrap(), "Z");
    }

    #[test]
    fn single_letters_are_a_bijection() {
        let all: Vec<String> = (1..=26).map(|c| column_letter(c).unwrap()).collect();
        for (i, l) in all.iter().enumerate() {
            assert_eq!(l.len(), 1);
            assert_eq!(column_index(l).unwrap(), i + 1);
        }
        let distinct: std::collections::HashSet<&String> = all.iter().collect();
        assert_eq!(distinct.len(), 26);
    }

    #[test]
    fn multi_letter_columns() {
        assert_eq!(column_letter(27).unwrap(), "AA");
        assert_eq!(column_letter(28).unwrap(), "AB");
        assert_eq!(column_letter(52).unwrap(), "AZ");
        assert_eq!(column_letter(702).unwrap(), "ZZ");
        assert_eq!(column_letter(703).unwrap(), "AAA");
        assert_eq!(column_letter(MAX_COLUMN).unwrap(), "XFD");
    }

    #[test]
    fn letters_round_trip_through_index() {
        assert_eq!(column_index("a").unwrap(), 1);
        assert_eq!(column_index("AA").unwrap(), 27);
        assert_eq!(column_index("XFD").unwrap(), MAX_COLUMN);
        assert!(column_index("XFE").is_err());
        assert!(column_index("A1").is_err());
        assert!(column_index("").is_err());
    }

    #[test]
    fn out_of_range_columns_are_rejected() {
        assert!(matches!(
            column_letter(0),
            Err(ConfigError::UnsupportedColumn { column: 0, .. })
        ));
        assert!(matches!(
            column_letter(MAX_COLUMN + 1),
            Err(ConfigError::UnsupportedColumn { .. })
        ));
    }

    #[test]
    fn data_rows_start_at_spreadsheet_row_two() {
        let addr = CellAddress::for_data_row(2, 0).unwrap();
        assert_eq!(addr.to_string(), "B2");
        assert_eq!(addr.row(), 2);

        let addr = CellAddress::for_data_row(28, 9).unwrap();
        assert_eq!(addr.to_string(), "AB11");
    }

    #[test]
    fn address_serializes_as_a1_string() {
        let addr = CellAddress::new(8, 5).unwrap();
        assert_eq!(serde_json::to_string(&addr).unwrap(), "\"H5\"");
        assert!(CellAddress::new(1, 0).is_err());
    }
}
