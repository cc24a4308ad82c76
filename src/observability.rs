//! Observer hooks for validation outcomes.
//!
//! A [`ValidationObserver`] is told about every finished report and every upload that could not
//! be decoded. Decode failures at or above [`crate::validation::ValidationOptions::alert_at_or_above`]
//! are additionally raised through [`ValidationObserver::on_alert`].

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::decode::DecodeFormat;
use crate::error::DecodeError;
use crate::session::RequestToken;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    /// Clean report.
    Info,
    /// Content errors in some cells.
    Warning,
    /// Wrong header layout, or an unreadable upload.
    Error,
    /// I/O or other infrastructure failures.
    Critical,
}

/// Where the validated grid came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Source file, when validating from a path.
    pub path: Option<PathBuf>,
    /// Decoder used, when the core decoded the upload itself.
    pub format: Option<DecodeFormat>,
    /// Request the run belongs to, when driven through a session.
    pub token: Option<RequestToken>,
}

impl ValidationContext {
    pub fn for_path(path: impl AsRef<Path>, format: DecodeFormat) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            format: Some(format),
            token: None,
        }
    }

    fn source(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => "<memory>".to_string(),
        }
    }
}

/// Summary of a finished report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    /// Data rows seen (blank rows included).
    pub rows: usize,
    pub header_errors: usize,
    pub cell_errors: usize,
}

impl ValidationStats {
    pub fn severity(&self) -> ValidationSeverity {
        if self.header_errors > 0 {
            ValidationSeverity::Error
        } else if self.cell_errors > 0 {
            ValidationSeverity::Warning
        } else {
            ValidationSeverity::Info
        }
    }
}

/// Observer interface for validation outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ValidationObserver: Send + Sync {
    /// Called when a report has been produced (clean or not).
    fn on_report(&self, _ctx: &ValidationContext, _stats: ValidationStats) {}

    /// Called when an upload could not be decoded.
    fn on_failure(&self, _ctx: &ValidationContext, _severity: ValidationSeverity, _error: &DecodeError) {}

    /// Called when a decode failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ValidationObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn ValidationObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ValidationObserver for CompositeObserver {
    fn on_report(&self, ctx: &ValidationContext, stats: ValidationStats) {
        for o in &self.observers {
            o.on_report(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs validation events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ValidationObserver for StdErrObserver {
    fn on_report(&self, ctx: &ValidationContext, stats: ValidationStats) {
        eprintln!(
            "[validate][{:?}] source={} rows={} header_errors={} cell_errors={}",
            stats.severity(),
            ctx.source(),
            stats.rows,
            stats.header_errors,
            stats.cell_errors
        );
    }

    fn on_failure(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        eprintln!(
            "[validate][{:?}] format={:?} source={} err={}",
            severity,
            ctx.format,
            ctx.source(),
            error
        );
    }

    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        eprintln!(
            "[ALERT][validate][{:?}] format={:?} source={} err={}",
            severity,
            ctx.format,
            ctx.source(),
            error
        );
    }
}

/// Emits validation events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ValidationObserver for TracingObserver {
    fn on_report(&self, ctx: &ValidationContext, stats: ValidationStats) {
        match stats.severity() {
            ValidationSeverity::Info => tracing::info!(
                source = %ctx.source(),
                rows = stats.rows,
                "spreadsheet validated without errors"
            ),
            _ => tracing::warn!(
                source = %ctx.source(),
                rows = stats.rows,
                header_errors = stats.header_errors,
                cell_errors = stats.cell_errors,
                "spreadsheet failed validation"
            ),
        }
    }

    fn on_failure(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        tracing::error!(
            source = %ctx.source(),
            format = ?ctx.format,
            ?severity,
            %error,
            "could not read spreadsheet"
        );
    }
}

/// Appends validation events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ValidationObserver for FileObserver {
    fn on_report(&self, ctx: &ValidationContext, stats: ValidationStats) {
        self.append_line(&format!(
            "{} report severity={:?} source={} rows={} header_errors={} cell_errors={}",
            unix_ts(),
            stats.severity(),
            ctx.source(),
            stats.rows,
            stats.header_errors,
            stats.cell_errors
        ));
    }

    fn on_failure(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.source(),
            error
        ));
    }

    fn on_alert(&self, ctx: &ValidationContext, severity: ValidationSeverity, error: &DecodeError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.source(),
            error
        ));
    }
}

/// Severity of a decode failure: I/O problems are critical, malformed content is an error.
pub fn severity_for_error(e: &DecodeError) -> ValidationSeverity {
    match e {
        DecodeError::Io(_) => ValidationSeverity::Critical,
        DecodeError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ValidationSeverity::Critical,
            _ => ValidationSeverity::Error,
        },
        DecodeError::Json(err) if err.is_io() => ValidationSeverity::Critical,
        #[cfg(feature = "excel")]
        DecodeError::Excel(_) => ValidationSeverity::Error,
        _ => ValidationSeverity::Error,
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_severity_escalates_with_error_kind() {
        let clean = ValidationStats { rows: 3, ..Default::default() };
        let cells = ValidationStats { rows: 3, cell_errors: 1, ..Default::default() };
        let headers = ValidationStats { rows: 3, header_errors: 1, ..Default::default() };
        assert_eq!(clean.severity(), ValidationSeverity::Info);
        assert_eq!(cells.severity(), ValidationSeverity::Warning);
        assert_eq!(headers.severity(), ValidationSeverity::Error);
    }

    #[test]
    fn io_failures_are_critical() {
        let io = DecodeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x"));
        assert_eq!(severity_for_error(&io), ValidationSeverity::Critical);

        let malformed = DecodeError::Malformed { message: "no rows".into() };
        assert_eq!(severity_for_error(&malformed), ValidationSeverity::Error);
    }

    #[test]
    fn file_observer_appends_lines() {
        let path = std::env::temp_dir().join(format!(
            "spreadsheet-validation-observer-{}.log",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let obs = FileObserver::new(&path);
        obs.on_report(&ValidationContext::default(), ValidationStats { rows: 1, ..Default::default() });
        obs.on_report(&ValidationContext::default(), ValidationStats { rows: 2, cell_errors: 1, ..Default::default() });

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("severity=Warning"));
        let _ = std::fs::remove_file(&path);
    }
}
