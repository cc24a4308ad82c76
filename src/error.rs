use thiserror::Error;

/// Convenience result type for schema/validator construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience result type for decoding an uploaded file into a raw grid.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A defect in how a schema, header mapping or rule was authored.
///
/// These are programming-time errors: the validator refuses to be built rather than silently
/// skipping the offending field. Content problems in the data never surface here; they end up in
/// a [`crate::validation::ValidationReport`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A schema field is not produced by the header mapping, so it could never receive a value.
    #[error("schema field '{field}' is not mapped by any expected header")]
    UnknownField { field: String },

    /// The same field name was declared twice.
    #[error("field '{field}' is declared more than once")]
    DuplicateField { field: String },

    /// The same header label was declared twice in the header mapping.
    #[error("header '{label}' is declared more than once")]
    DuplicateHeader { label: String },

    /// Columns are 1-based; zero has no spreadsheet address.
    #[error("field '{field}' uses column 0 (columns are 1-based)")]
    InvalidColumn { field: String },

    /// The column cannot be expressed as a spreadsheet address.
    #[error("column {column} is beyond the last addressable column ({max})")]
    UnsupportedColumn { column: usize, max: usize },

    /// A rule definition omitted an option the rule cannot work without.
    #[error("rule '{rule}' requires option '{option}'")]
    MissingRuleOption {
        rule: &'static str,
        option: &'static str,
    },

    /// A rule option is present but unusable (wrong type, non-finite, malformed date, ...).
    #[error("rule '{rule}' has an invalid option: {message}")]
    InvalidRuleOption { rule: &'static str, message: String },

    /// The pattern given to a `matches` rule does not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A range rule whose lower bound is above its upper bound.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    /// Execution settings that cannot be honoured (zero chunk size, zero threads).
    #[error("invalid execution options: {message}")]
    InvalidExecution { message: String },

    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A schema definition document is not valid JSON or does not match the expected shape.
    #[error("invalid schema definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// A schema definition file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The uploaded file could not be turned into a raw grid.
///
/// This is the "could not read file" state, kept apart from "read the file, but its content is
/// invalid" (which is a [`crate::validation::ValidationReport`] with errors).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input was read but does not have a tabular shape.
    #[error("malformed input: {message}")]
    Malformed { message: String },

    /// The input format could not be determined or is not compiled in.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_name_the_offender() {
        let err = ConfigError::MissingRuleOption {
            rule: "numberRange",
            option: "max",
        };
        assert_eq!(err.to_string(), "rule 'numberRange' requires option 'max'");

        let err = ConfigError::UnsupportedColumn {
            column: 20_000,
            max: 16_384,
        };
        assert!(err.to_string().contains("20000"));
    }

    #[test]
    fn decode_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DecodeError = io.into();
        assert!(matches!(err, DecodeError::Io(_)));
        assert!(err.to_string().starts_with("io error"));
    }
}
