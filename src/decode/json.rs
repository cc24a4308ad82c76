//! JSON decoding.
//!
//! Supported inputs:
//! - A JSON array of row arrays: `[["CODE","QTY"], ["ABC", 10]]`
//! - Newline-delimited row arrays: `["CODE","QTY"]\n["ABC",10]\n`
//!
//! Scalars map onto [`Value`] by their JSON type. Nested arrays and objects inside a row are
//! rejected as malformed.

use std::fs;
use std::path::Path;

use crate::error::{DecodeError, DecodeResult};
use crate::types::{RawGrid, Value};

/// Decode a JSON file into a raw grid.
pub fn decode_json_from_path(path: impl AsRef<Path>) -> DecodeResult<RawGrid> {
    let text = fs::read_to_string(path)?;
    decode_json_from_str(&text)
}

/// Decode JSON text into a raw grid.
pub fn decode_json_from_str(input: &str) -> DecodeResult<RawGrid> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Malformed {
            message: "json input is empty".to_string(),
        });
    }

    // A single document first, then NDJSON.
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => rows_from_values(&items),
        Ok(_) => Err(DecodeError::Malformed {
            message: "json must be an array of row arrays, or one row array per line".to_string(),
        }),
        Err(e) if !trimmed.contains('\n') => Err(e.into()),
        Err(_) => {
            let mut values = Vec::new();
            for (i, line) in trimmed.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| DecodeError::Malformed {
                    message: format!("invalid ndjson at line {}: {}", i + 1, e),
                })?;
                values.push(v);
            }
            rows_from_values(&values)
        }
    }
}

fn rows_from_values(values: &[serde_json::Value]) -> DecodeResult<RawGrid> {
    values
        .iter()
        .enumerate()
        .map(|(idx0, v)| {
            let row_num = idx0 + 1;
            let cells = v.as_array().ok_or_else(|| DecodeError::Malformed {
                message: format!("row {row_num} is not a json array"),
            })?;
            cells
                .iter()
                .enumerate()
                .map(|(col0, cell)| convert_json_value(row_num, col0 + 1, cell))
                .collect::<DecodeResult<Vec<Value>>>()
        })
        .collect()
}

fn convert_json_value(row: usize, column: usize, v: &serde_json::Value) -> DecodeResult<Value> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| DecodeError::Malformed {
            message: format!("row {row}, column {column}: number {n} is not representable"),
        }),
        serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(DecodeError::Malformed {
            message: format!("row {row}, column {column}: nested values are not cells"),
        }),
    }
}
