//! Projection of grid rows into named records.

use crate::address::HEADER_ROW_OFFSET;
use crate::schema::HeaderMapping;
use crate::types::{Record, Value};

use super::headers::header_text;

/// Split a grid into its header row and data rows. An empty grid has an empty header row.
pub fn split_grid(grid: &[Vec<Value>]) -> (&[Value], &[Vec<Value>]) {
    match grid.split_first() {
        Some((headers, rows)) => (headers.as_slice(), rows),
        None => (&[], &[]),
    }
}

/// Convert every data row of `grid` into a [`Record`].
///
/// The cell under each candidate header is keyed by the header's mapped field name, or by the
/// header text itself when the mapping does not know it. Short rows read as [`Value::Null`].
/// The first data row is spreadsheet row 2. When `skip_blank_rows` is set, rows whose cells are
/// all blank are dropped without renumbering the rows after them.
pub fn map_rows(grid: &[Vec<Value>], mapping: &HeaderMapping, skip_blank_rows: bool) -> Vec<Record> {
    let (headers, rows) = split_grid(grid);
    let keys: Vec<String> = headers
        .iter()
        .map(|h| {
            let label = header_text(h);
            match mapping.field_for(&label) {
                Some(field) => field.to_string(),
                None => label,
            }
        })
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| !(skip_blank_rows && row.iter().all(Value::is_blank)))
        .map(|(idx0, row)| {
            let mut record = Record::new(idx0 + HEADER_ROW_OFFSET);
            for (col0, key) in keys.iter().enumerate() {
                let value = row.get(col0).cloned().unwrap_or(Value::Null);
                record.insert(key.clone(), value);
            }
            record
        })
        .collect()
}
