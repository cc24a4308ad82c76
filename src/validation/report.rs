//! The validation report handed to the presentation layer.

use serde::Serialize;

use crate::address::CellAddress;
use crate::types::Value;

/// A missing (or, in strict mode, unexpected) header, e.g.
/// `Expected header in column B: QUANTIDADE`.
pub type HeaderError = String;

/// A content failure addressed to one spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellError {
    pub cell: CellAddress,
    pub value: Value,
    pub error_message: String,
}

/// Result of one validation run.
///
/// A report exists only once input has been validated; an empty report means "validated, no
/// errors found". Callers that have not validated yet hold `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Header errors, in expected-header order.
    pub headers: Vec<HeaderError>,
    /// Cell errors, row-major then declared-field order. Empty when `headers` is not.
    pub cells: Vec<CellError>,
}

impl ValidationReport {
    /// `true` when neither headers nor cells failed.
    pub fn is_valid(&self) -> bool {
        self.headers.is_empty() && self.cells.is_empty()
    }

    pub fn has_header_errors(&self) -> bool {
        !self.headers.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.headers.len() + self.cells.len()
    }

    /// Cell errors for one spreadsheet row.
    pub fn cells_in_row(&self, row: usize) -> impl Iterator<Item = &CellError> {
        self.cells.iter().filter(move |e| e.cell.row() == row)
    }

    /// Serialize as `{"headers": [...], "cells": [{"cell", "value", "errorMessage"}]}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Merge header and cell errors into one report.
///
/// Cell errors are dropped when any header error exists: with a wrong column layout, content
/// errors would point at the wrong cells.
pub fn aggregate(headers: Vec<HeaderError>, cells: Vec<CellError>) -> ValidationReport {
    let cells = if headers.is_empty() { cells } else { Vec::new() };
    ValidationReport { headers, cells }
}
