use std::sync::{Arc, Mutex};

use spreadsheet_validation::decode::{DecodeFormat, DecodeOptions};
use spreadsheet_validation::observability::{
    CompositeObserver, ValidationContext, ValidationObserver, ValidationSeverity, ValidationStats,
};
use spreadsheet_validation::presets::coupon_validator;
use spreadsheet_validation::{DecodeError, ValidationOptions};

#[derive(Default)]
struct RecordingObserver {
    reports: Mutex<Vec<(ValidationContext, ValidationStats)>>,
    failures: Mutex<Vec<ValidationSeverity>>,
    alerts: Mutex<Vec<ValidationSeverity>>,
}

impl ValidationObserver for RecordingObserver {
    fn on_report(&self, ctx: &ValidationContext, stats: ValidationStats) {
        self.reports.lock().unwrap().push((ctx.clone(), stats));
    }

    fn on_failure(&self, _ctx: &ValidationContext, severity: ValidationSeverity, _error: &DecodeError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &ValidationContext, severity: ValidationSeverity, _error: &DecodeError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options(obs: Arc<RecordingObserver>, alert_at_or_above: ValidationSeverity) -> ValidationOptions {
    ValidationOptions {
        observer: Some(obs),
        alert_at_or_above,
        ..Default::default()
    }
}

#[test]
fn observer_receives_failure_and_alert_on_missing_file() {
    let obs = Arc::new(RecordingObserver::default());
    let v = coupon_validator(options(obs.clone(), ValidationSeverity::Critical)).unwrap();

    let _ = v
        .validate_path("tests/fixtures/does_not_exist.json", &DecodeOptions::default())
        .unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![ValidationSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![ValidationSeverity::Critical]);
    assert!(obs.reports.lock().unwrap().is_empty());
}

#[test]
fn malformed_input_is_below_default_alert_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let v = coupon_validator(options(obs.clone(), ValidationSeverity::Critical)).unwrap();

    // A CSV file forced through the JSON decoder.
    let opts = DecodeOptions {
        format: Some(DecodeFormat::Json),
        ..Default::default()
    };
    let _ = v.validate_path("tests/fixtures/coupons_valid.csv", &opts).unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![ValidationSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn reports_carry_path_format_and_counts() {
    let obs = Arc::new(RecordingObserver::default());
    let v = coupon_validator(options(obs.clone(), ValidationSeverity::Critical)).unwrap();

    let report = v
        .validate_path("tests/fixtures/coupons_invalid.csv", &DecodeOptions::default())
        .unwrap();

    let reports = obs.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    let (ctx, stats) = &reports[0];
    assert_eq!(ctx.format, Some(DecodeFormat::Csv));
    assert!(ctx.path.as_ref().unwrap().ends_with("coupons_invalid.csv"));
    assert_eq!(stats.rows, 4);
    assert_eq!(stats.cell_errors, report.cells.len());
    assert_eq!(stats.severity(), ValidationSeverity::Warning);
}

#[test]
fn composite_observer_fans_out() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn ValidationObserver>> = vec![a.clone(), b.clone()];
    let composite = Arc::new(CompositeObserver::new(observers));
    let v = coupon_validator(ValidationOptions {
        observer: Some(composite),
        alert_at_or_above: ValidationSeverity::Error,
        ..Default::default()
    })
    .unwrap();

    let _ = v
        .validate_path("tests/fixtures/coupons.unknown", &DecodeOptions::default())
        .unwrap_err();

    for obs in [&a, &b] {
        assert_eq!(*obs.failures.lock().unwrap(), vec![ValidationSeverity::Error]);
        assert_eq!(*obs.alerts.lock().unwrap(), vec![ValidationSeverity::Error]);
    }
}
