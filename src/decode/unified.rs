//! Unified decode entrypoint.
//!
//! [`decode_from_path`] turns an uploaded file into a [`RawGrid`]. If [`DecodeOptions::format`]
//! is `None`, the format is inferred from the file extension.

use std::path::Path;

use crate::error::{DecodeError, DecodeResult};
use crate::types::RawGrid;

use super::csv::{CsvOptions, decode_csv_from_path, decode_csv_from_reader};
use super::json::{decode_json_from_path, decode_json_from_str};

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values. Decoded like CSV with a tab delimiter.
    Tsv,
    /// JSON array of row arrays, or one row array per line.
    Json,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl DecodeFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "txt" => Some(Self::Csv),
            "tsv" => Some(Self::Tsv),
            "json" | "ndjson" => Some(Self::Json),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Which sheet of a workbook to decode. Multi-sheet documents are not validated as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// The first sheet (default).
    #[default]
    First,
    /// A single named sheet.
    Named(String),
}

/// Options controlling decoding.
///
/// Use [`Default`] for common cases.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<DecodeFormat>,
    /// Workbook sheet to read.
    pub sheet: SheetSelection,
    /// CSV-specific settings. For [`DecodeFormat::Tsv`] the delimiter is always a tab.
    pub csv: CsvOptions,
}

impl DecodeOptions {
    /// The configured format, or the one implied by `path`'s extension.
    pub fn resolve_format(&self, path: &Path) -> DecodeResult<DecodeFormat> {
        match self.format {
            Some(f) => Ok(f),
            None => infer_format_from_path(path),
        }
    }

    fn tsv(&self) -> CsvOptions {
        CsvOptions {
            delimiter: b'\t',
            ..self.csv.clone()
        }
    }
}

/// Decode a file into a raw grid.
///
/// ```no_run
/// use spreadsheet_validation::decode::{decode_from_path, DecodeOptions};
///
/// # fn main() -> Result<(), spreadsheet_validation::DecodeError> {
/// let grid = decode_from_path("coupons.csv", &DecodeOptions::default())?;
/// println!("rows={}", grid.len());
/// # Ok(())
/// # }
/// ```
pub fn decode_from_path(path: impl AsRef<Path>, options: &DecodeOptions) -> DecodeResult<RawGrid> {
    let path = path.as_ref();
    match options.resolve_format(path)? {
        DecodeFormat::Csv => decode_csv_from_path(path, &options.csv),
        DecodeFormat::Tsv => decode_csv_from_path(path, &options.tsv()),
        DecodeFormat::Json => decode_json_from_path(path),
        DecodeFormat::Excel => decode_excel_dispatch(path, options),
    }
}

/// Decode an in-memory upload whose format is already known.
pub fn decode_bytes(bytes: &[u8], format: DecodeFormat, options: &DecodeOptions) -> DecodeResult<RawGrid> {
    match format {
        DecodeFormat::Csv => decode_csv_from_reader(bytes, &options.csv),
        DecodeFormat::Tsv => decode_csv_from_reader(bytes, &options.tsv()),
        DecodeFormat::Json => {
            let text = std::str::from_utf8(bytes).map_err(|e| DecodeError::Malformed {
                message: format!("json input is not utf-8: {e}"),
            })?;
            decode_json_from_str(text)
        }
        DecodeFormat::Excel => {
            #[cfg(feature = "excel")]
            {
                super::excel::decode_excel_from_bytes(bytes, &options.sheet)
            }

            #[cfg(not(feature = "excel"))]
            {
                Err(excel_disabled())
            }
        }
    }
}

fn infer_format_from_path(path: &Path) -> DecodeResult<DecodeFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DecodeError::UnsupportedFormat {
            message: format!("cannot infer format: path has no extension ({})", path.display()),
        })?;

    DecodeFormat::from_extension(ext).ok_or_else(|| DecodeError::UnsupportedFormat {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn decode_excel_dispatch(path: &Path, options: &DecodeOptions) -> DecodeResult<RawGrid> {
    #[cfg(feature = "excel")]
    {
        super::excel::decode_excel_from_path(path, &options.sheet)
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = (path, options);
        Err(excel_disabled())
    }
}

#[cfg(not(feature = "excel"))]
fn excel_disabled() -> DecodeError {
    DecodeError::UnsupportedFormat {
        message: "workbook decoding not enabled (enable cargo feature 'excel')".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_come_from_extensions() {
        assert_eq!(DecodeFormat::from_extension("CSV"), Some(DecodeFormat::Csv));
        assert_eq!(DecodeFormat::from_extension("tsv"), Some(DecodeFormat::Tsv));
        assert_eq!(DecodeFormat::from_extension("ndjson"), Some(DecodeFormat::Json));
        assert_eq!(DecodeFormat::from_extension("xlsx"), Some(DecodeFormat::Excel));
        assert_eq!(DecodeFormat::from_extension("parquet"), None);
    }

    #[test]
    fn unknown_extensions_are_unsupported() {
        let err = decode_from_path("upload.pdf", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));

        let err = decode_from_path("upload", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn bytes_decode_with_explicit_format() {
        let grid = decode_bytes(b"A,B\n1,2\n", DecodeFormat::Csv, &DecodeOptions::default()).unwrap();
        assert_eq!(grid.len(), 2);
        let grid = decode_bytes(b"A\tB\n1\t2\n", DecodeFormat::Tsv, &DecodeOptions::default()).unwrap();
        assert_eq!(grid[1], vec![crate::types::Value::Number(1.0), crate::types::Value::Number(2.0)]);
        let grid = decode_bytes(br#"[["A"],[1]]"#, DecodeFormat::Json, &DecodeOptions::default()).unwrap();
        assert_eq!(grid.len(), 2);
    }
}
