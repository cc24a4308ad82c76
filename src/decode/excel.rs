#![cfg(feature = "excel")]

//! Workbook decoding (`.xlsx`, `.xls`, `.ods`, ...) via `calamine`.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};
use chrono::{Days, NaiveDate};

use crate::error::{DecodeError, DecodeResult};
use crate::types::{RawGrid, Value};

use super::SheetSelection;

/// Decode one sheet of a workbook file into a raw grid.
///
/// The first non-empty row of the sheet becomes the header row, so headers below empty rows are
/// still found. A title row above the headers is not skipped. Rows are numbered from the header
/// row, not from the sheet's row 1. Leading empty columns are padded back in, so column letters
/// match the sheet.
pub fn decode_excel_from_path(path: impl AsRef<Path>, sheet: &SheetSelection) -> DecodeResult<RawGrid> {
    let mut workbook = open_workbook_auto(path)?;
    decode_sheet(&mut workbook, sheet)
}

/// Decode one sheet of an in-memory workbook.
pub fn decode_excel_from_bytes(bytes: &[u8], sheet: &SheetSelection) -> DecodeResult<RawGrid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    decode_sheet(&mut workbook, sheet)
}

fn decode_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>, sheet: &SheetSelection) -> DecodeResult<RawGrid> {
    let name = match sheet {
        SheetSelection::First => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DecodeError::Malformed {
                message: "workbook has no sheets".to_string(),
            })?,
        SheetSelection::Named(name) => name.clone(),
    };

    let range = workbook.worksheet_range(&name)?;
    Ok(grid_from_range(&range))
}

fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let col_offset = range.start().map(|(_, c)| c as usize).unwrap_or(0);

    let mut grid: RawGrid = Vec::new();
    let rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| convert_cell(c) == Value::Null));
    for row in rows {
        let mut out = vec![Value::Null; col_offset];
        out.extend(row.iter().map(convert_cell));
        grid.push(out);
    }
    grid
}

// Day zero of the 1900 date system as used by serial dates after February 1900.
fn excel_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    excel_epoch()?.checked_add_days(Days::new(serial.floor() as u64))
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => Value::Number(dt.as_f64()),
        Data::DateTime(dt) => serial_to_date(dt.as_f64())
            .map(Value::Date)
            .unwrap_or_else(|| Value::Number(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Value::Date)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => Value::Text(e.to_string()),
    }
}
