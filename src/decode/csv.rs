//! CSV decoding.

use std::io::Read;
use std::path::Path;

use crate::error::DecodeResult;
use crate::types::{RawGrid, Value};

/// CSV-specific decode settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter (default `,`).
    pub delimiter: u8,
    /// Tag data cells written as plain decimal numbers (`10`, `-2.5`, `0.75`) as [`Value::Number`].
    /// Anything else, such as `007`, `+3` or `1e5`, stays text. The header row is always text.
    pub infer_numbers: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_numbers: true,
        }
    }
}

/// Decode a CSV file into a raw grid.
pub fn decode_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> DecodeResult<RawGrid> {
    let rdr = builder(options).from_path(path)?;
    read_grid(rdr, options)
}

/// Decode CSV from any reader.
///
/// The first record is the header row. Records may have differing lengths; short rows are left
/// short and read as null by the row mapper.
pub fn decode_csv_from_reader<R: Read>(reader: R, options: &CsvOptions) -> DecodeResult<RawGrid> {
    read_grid(builder(options).from_reader(reader), options)
}

fn builder(options: &CsvOptions) -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(false).flexible(true).delimiter(options.delimiter);
    b
}

fn read_grid<R: Read>(mut rdr: csv::Reader<R>, options: &CsvOptions) -> DecodeResult<RawGrid> {
    let mut grid: RawGrid = Vec::new();
    for (idx0, result) in rdr.records().enumerate() {
        let record = result?;
        let is_header = idx0 == 0;
        let row = record
            .iter()
            .enumerate()
            .map(|(col0, raw)| {
                // Spreadsheet exports often start with a UTF-8 BOM.
                let raw = if is_header && col0 == 0 {
                    raw.trim_start_matches('\u{feff}')
                } else {
                    raw
                };
                convert_field(raw, options.infer_numbers && !is_header)
            })
            .collect();
        grid.push(row);
    }
    Ok(grid)
}

fn convert_field(raw: &str, infer_numbers: bool) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if infer_numbers && is_plain_decimal(raw.trim()) {
        if let Ok(n) = raw.trim().parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
    }
    Value::Text(raw.to_string())
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?`
fn is_plain_decimal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    let int_ok = match int.as_bytes() {
        [b'0'] => true,
        [first, rest @ ..] => (b'1'..=b'9').contains(first) && rest.iter().all(u8::is_ascii_digit),
        [] => false,
    };
    int_ok && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}
