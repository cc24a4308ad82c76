//! `spreadsheet-validation` checks an uploaded spreadsheet against a declarative schema before its
//! data is trusted downstream.
//!
//! A decoded upload is a [`types::RawGrid`]: the first row holds the candidate headers and every
//! following row is data. Validation runs in two stages:
//!
//! - **Headers**: every expected header label must appear in the header row. Missing labels are
//!   reported as `Expected header in column <letters>: <label>`, and row validation is skipped.
//! - **Cells**: each data row becomes a [`types::Record`] and every schema field runs its
//!   [`rules::RuleChain`]. The first failing rule of a chain becomes a [`validation::CellError`]
//!   addressed by spreadsheet cell (`B2`, `AA17`, ...). The first data row is row 2.
//!
//! Both stages end up in a [`validation::ValidationReport`]. A file that cannot be decoded at all
//! is a [`DecodeError`], never a report.
//!
//! ## Supported uploads
//!
//! Decoders live in [`decode`] and are picked by file extension:
//!
//! - **CSV**: `.csv`, `.txt`, and `.tsv` (tab-delimited)
//! - **JSON**: `.json` (array of row arrays) and `.ndjson` (one row array per line)
//! - **Workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! ## Quick example
//!
//! ```
//! use spreadsheet_validation::rules::{RangeConfig, Rule, RuleChain, RuleConfig};
//! use spreadsheet_validation::schema::{HeaderEntry, HeaderMapping, Schema};
//! use spreadsheet_validation::types::Value;
//! use spreadsheet_validation::validation::SpreadsheetValidator;
//!
//! # fn main() -> Result<(), spreadsheet_validation::ConfigError> {
//! let mapping = HeaderMapping::new(vec![
//!     HeaderEntry::new("CODE", "code", 1),
//!     HeaderEntry::new("QTY", "quantity", 2),
//! ])?;
//! let schema = Schema::new(vec![
//!     RuleChain::new("code", 1, vec![Rule::required(RuleConfig::default())])?,
//!     RuleChain::new(
//!         "quantity",
//!         2,
//!         vec![
//!             Rule::required(RuleConfig::default()),
//!             Rule::number(RuleConfig::default()),
//!             Rule::number_range(RangeConfig::new(1.0, 99999.0))?,
//!         ],
//!     )?,
//! ])?;
//! let validator = SpreadsheetValidator::new(mapping, schema)?;
//!
//! let report = validator.validate(&[
//!     vec![Value::text("CODE"), Value::text("QTY")],
//!     vec![Value::text("ABC"), Value::Number(0.0)],
//! ]);
//! assert_eq!(report.cells[0].cell.to_string(), "B2");
//! assert_eq!(report.cells[0].error_message, "Value must be between 1 and 99999");
//! # Ok(())
//! # }
//! ```
//!
//! ## Schemas as JSON
//!
//! [`schema::SchemaDefinition`] reads the same configuration from a JSON document, and
//! [`presets`] ships the coupon template.
//!
//! ## Modules
//!
//! - [`address`]: column letters and cell addresses
//! - [`types`]: tagged cell values, raw grids, records
//! - [`rules`]: atomic rules and rule chains
//! - [`schema`]: header mappings, schemas, JSON definitions
//! - [`validation`]: the pipeline stages, the report, and [`validation::SpreadsheetValidator`]
//! - [`decode`]: CSV, JSON and workbook decoders
//! - [`execution`]: parallel record validation on a rayon pool
//! - [`observability`]: observers for reports and decode failures
//! - [`session`]: request tokens and the latest-report slot
//! - [`error`]: configuration and decode errors

pub mod address;
pub mod decode;
pub mod error;
pub mod execution;
pub mod observability;
pub mod presets;
pub mod rules;
pub mod schema;
pub mod session;
pub mod types;
pub mod validation;

pub use error::{ConfigError, ConfigResult, DecodeError, DecodeResult};
pub use validation::{SpreadsheetValidator, ValidationOptions, ValidationReport};
