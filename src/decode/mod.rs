//! Decoders that turn an uploaded file into a [`crate::types::RawGrid`].
//!
//! Most callers should use [`decode_from_path`] (from [`unified`]) which picks the decoder by
//! file extension (or by [`DecodeOptions::format`]). Format-specific functions live under
//! [`csv`], [`json`] and, with the `excel` feature, `excel`.
//!
//! Decoders assign each cell's [`crate::types::Value`] tag. A decode failure is a
//! [`crate::DecodeError`], which callers must keep apart from a validation report.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod unified;

pub use csv::{CsvOptions, decode_csv_from_path, decode_csv_from_reader};
#[cfg(feature = "excel")]
pub use excel::{decode_excel_from_bytes, decode_excel_from_path};
pub use json::{decode_json_from_path, decode_json_from_str};
pub use unified::{DecodeFormat, DecodeOptions, SheetSelection, decode_bytes, decode_from_path};
