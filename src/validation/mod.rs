//! The validation pipeline.
//!
//! A raw grid flows through [`validate_headers`] and, if the headers are intact, [`map_rows`]
//! and [`validate_records`], and ends in a [`ValidationReport`] built by [`aggregate`].
//! [`SpreadsheetValidator`] wires the stages together with a fixed header mapping and schema.

pub mod headers;
pub mod records;
pub mod report;
pub mod rows;
pub mod validator;

pub use headers::{HeaderStrictness, header_text, validate_headers};
pub use records::{validate_record, validate_records};
pub use report::{CellError, HeaderError, ValidationReport, aggregate};
pub use rows::{map_rows, split_grid};
pub use validator::{SpreadsheetValidator, ValidationOptions};
