//! The configured validation façade.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::decode::{DecodeOptions, decode_from_path};
use crate::error::{ConfigResult, DecodeError, DecodeResult};
use crate::execution::{ExecutionEngine, ExecutionMetrics, ExecutionObserver, ExecutionOptions};
use crate::observability::{
    ValidationContext, ValidationObserver, ValidationSeverity, ValidationStats, severity_for_error,
};
use crate::schema::{HeaderMapping, Schema};
use crate::session::{RequestToken, ValidationOutcome, ValidationRequest, ValidationResponse};
use crate::types::{RawGrid, Value};

use super::headers::{HeaderStrictness, validate_headers};
use super::records::validate_records;
use super::report::{ValidationReport, aggregate};
use super::rows::map_rows;

/// Options controlling a [`SpreadsheetValidator`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ValidationOptions {
    /// Whether unexpected extra headers are errors.
    pub header_strictness: HeaderStrictness,
    /// Drop fully blank data rows (rows after them keep their spreadsheet numbers).
    pub skip_blank_rows: bool,
    /// Validate records on a thread pool. `None` validates sequentially on the caller's thread.
    pub execution: Option<ExecutionOptions>,
    /// Optional observer for reports and decode failures.
    pub observer: Option<Arc<dyn ValidationObserver>>,
    /// Severity threshold at which `on_alert` is invoked for decode failures.
    pub alert_at_or_above: ValidationSeverity,
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("header_strictness", &self.header_strictness)
            .field("skip_blank_rows", &self.skip_blank_rows)
            .field("execution", &self.execution)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            header_strictness: HeaderStrictness::Lenient,
            skip_blank_rows: true,
            execution: None,
            observer: None,
            alert_at_or_above: ValidationSeverity::Critical,
        }
    }
}

/// A header mapping, a schema and options, checked for consistency once and reused per upload.
///
/// ```
/// use spreadsheet_validation::rules::{Rule, RuleChain, RuleConfig};
/// use spreadsheet_validation::schema::{HeaderEntry, HeaderMapping, Schema};
/// use spreadsheet_validation::types::Value;
/// use spreadsheet_validation::validation::SpreadsheetValidator;
///
/// # fn main() -> Result<(), spreadsheet_validation::ConfigError> {
/// let mapping = HeaderMapping::new(vec![HeaderEntry::new("CODE", "code", 1)])?;
/// let schema = Schema::new(vec![RuleChain::new(
///     "code",
///     1,
///     vec![Rule::required(RuleConfig::default())],
/// )?])?;
/// let validator = SpreadsheetValidator::new(mapping, schema)?;
///
/// let report = validator.validate(&[
///     vec![Value::text("CODE")],
///     vec![Value::Null],
///     vec![Value::text("ABC")],
/// ]);
/// assert_eq!(report.cells.len(), 1);
/// assert_eq!(report.cells[0].cell.to_string(), "A2");
/// # Ok(())
/// # }
/// ```
pub struct SpreadsheetValidator {
    mapping: HeaderMapping,
    schema: Schema,
    options: ValidationOptions,
    engine: Option<ExecutionEngine>,
}

impl fmt::Debug for SpreadsheetValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadsheetValidator")
            .field("headers", &self.mapping.len())
            .field("fields", &self.schema.len())
            .field("options", &self.options)
            .field("engine", &self.engine)
            .finish()
    }
}

impl SpreadsheetValidator {
    /// Build a validator with default options.
    pub fn new(mapping: HeaderMapping, schema: Schema) -> ConfigResult<Self> {
        Self::with_options(mapping, schema, ValidationOptions::default())
    }

    /// Build a validator.
    ///
    /// Fails if a schema field is not produced by the mapping, or the execution engine cannot
    /// be built.
    pub fn with_options(mapping: HeaderMapping, schema: Schema, options: ValidationOptions) -> ConfigResult<Self> {
        schema.check_against(&mapping)?;
        let engine = options.execution.clone().map(ExecutionEngine::new).transpose()?;
        Ok(Self {
            mapping,
            schema,
            options,
            engine,
        })
    }

    /// Attach an observer to the execution engine. No effect for sequential validators.
    pub fn with_execution_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.engine = self.engine.map(|e| e.with_observer(observer));
        self
    }

    /// Metrics of the execution engine, when one is configured.
    pub fn execution_metrics(&self) -> Option<Arc<ExecutionMetrics>> {
        self.engine.as_ref().map(ExecutionEngine::metrics)
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate a raw grid (first row headers, the rest data).
    pub fn validate(&self, grid: &[Vec<Value>]) -> ValidationReport {
        self.validate_with_context(grid, &ValidationContext::default())
    }

    /// Validate a raw grid, reporting to the observer under `ctx`.
    pub fn validate_with_context(&self, grid: &[Vec<Value>], ctx: &ValidationContext) -> ValidationReport {
        let span = tracing::debug_span!("validate", rows = grid.len().saturating_sub(1));
        let _enter = span.enter();

        let candidate = grid.first().map(Vec::as_slice).unwrap_or(&[]);
        let expected = self.mapping.expected_headers();
        let headers = validate_headers(&expected, candidate, self.options.header_strictness);

        let cells = if headers.is_empty() {
            let records = map_rows(grid, &self.mapping, self.options.skip_blank_rows);
            match &self.engine {
                Some(engine) => engine.validate_records(&self.schema, &records),
                None => validate_records(&self.schema, &records),
            }
        } else {
            tracing::debug!(header_errors = headers.len(), "header mismatch, skipping rows");
            Vec::new()
        };

        let report = aggregate(headers, cells);
        if let Some(obs) = &self.options.observer {
            obs.on_report(
                ctx,
                ValidationStats {
                    rows: grid.len().saturating_sub(1),
                    header_errors: report.headers.len(),
                    cell_errors: report.cells.len(),
                },
            );
        }
        report
    }

    /// Decode the file at `path` and validate it.
    ///
    /// A decode failure is returned as `Err` (and reported via `on_failure`, plus `on_alert` at or
    /// above the configured threshold); it never becomes a report.
    pub fn validate_path(&self, path: impl AsRef<Path>, decode: &DecodeOptions) -> DecodeResult<ValidationReport> {
        let path = path.as_ref();
        let format = match decode.resolve_format(path) {
            Ok(f) => f,
            Err(e) => {
                self.report_failure(
                    &ValidationContext {
                        path: Some(path.to_path_buf()),
                        ..Default::default()
                    },
                    &e,
                );
                return Err(e);
            }
        };

        let ctx = ValidationContext::for_path(path, format);
        let decode = DecodeOptions {
            format: Some(format),
            ..decode.clone()
        };
        match decode_from_path(path, &decode) {
            Ok(grid) => Ok(self.validate_with_context(&grid, &ctx)),
            Err(e) => {
                self.report_failure(&ctx, &e);
                Err(e)
            }
        }
    }

    /// Validate a request and pair the report with its token.
    pub fn handle(&self, request: ValidationRequest) -> ValidationResponse {
        self.respond(request.token, Ok(request.grid))
    }

    /// Turn a decode result into a response for `token`.
    pub fn respond(&self, token: RequestToken, decoded: DecodeResult<RawGrid>) -> ValidationResponse {
        let ctx = ValidationContext {
            token: Some(token),
            ..Default::default()
        };
        let outcome = match decoded {
            Ok(grid) => ValidationOutcome::Validated(self.validate_with_context(&grid, &ctx)),
            Err(e) => {
                self.report_failure(&ctx, &e);
                ValidationOutcome::Unreadable {
                    message: e.to_string(),
                }
            }
        };
        ValidationResponse { token, outcome }
    }

    fn report_failure(&self, ctx: &ValidationContext, e: &DecodeError) {
        let sev = severity_for_error(e);
        tracing::warn!(?sev, error = %e, "upload could not be decoded");
        if let Some(obs) = &self.options.observer {
            obs.on_failure(ctx, sev, e);
            if sev >= self.options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}
