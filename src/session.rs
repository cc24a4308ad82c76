//! Request/response pairing for uploads.
//!
//! Each upload takes a [`RequestToken`] from a [`ReportSlot`]. The validation response carries the
//! token back, and the slot keeps it only if no newer upload has started since. A slow response to
//! an earlier upload can therefore never overwrite the report of a later one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::types::RawGrid;
use crate::validation::ValidationReport;

/// Identifies one upload. Tokens from the same slot increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A decoded upload waiting to be validated.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub token: RequestToken,
    pub grid: RawGrid,
}

/// What came back for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ValidationOutcome {
    /// The file could not be decoded into a grid.
    Unreadable { message: String },
    /// The grid was validated; the report may still hold errors.
    Validated(ValidationReport),
}

/// Response paired with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResponse {
    pub token: RequestToken,
    pub outcome: ValidationOutcome,
}

/// Observable state of a [`ReportSlot`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    /// No upload has started.
    Empty,
    /// An upload is in flight; nothing validated yet.
    Pending(RequestToken),
    /// The latest upload could not be read.
    Unreadable { token: RequestToken, message: String },
    /// The latest upload was validated.
    Validated { token: RequestToken, report: ValidationReport },
}

/// Holds the report for the most recent upload.
#[derive(Debug)]
pub struct ReportSlot {
    generation: AtomicU64,
    state: Mutex<SlotState>,
}

impl Default for ReportSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSlot {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: Mutex::new(SlotState::Empty),
        }
    }

    /// Start a new upload. Any earlier token becomes stale and the previous report is cleared.
    pub fn begin(&self) -> RequestToken {
        let mut state = self.lock();
        let token = RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        *state = SlotState::Pending(token);
        token
    }

    /// Whether `token` belongs to the most recent upload.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Accept `response` if it answers the most recent upload. Stale responses are dropped and
    /// `false` is returned.
    pub fn complete(&self, response: ValidationResponse) -> bool {
        let mut state = self.lock();
        if !self.is_current(response.token) {
            tracing::debug!(
                token = response.token.0,
                current = self.generation.load(Ordering::SeqCst),
                "discarding stale validation response"
            );
            return false;
        }

        *state = match response.outcome {
            ValidationOutcome::Unreadable { message } => SlotState::Unreadable {
                token: response.token,
                message,
            },
            ValidationOutcome::Validated(report) => SlotState::Validated {
                token: response.token,
                report,
            },
        };
        true
    }

    /// The current report, or `None` while nothing has been validated for the latest upload.
    pub fn report(&self) -> Option<ValidationReport> {
        match &*self.lock() {
            SlotState::Validated { report, .. } => Some(report.clone()),
            _ => None,
        }
    }

    pub fn state(&self) -> SlotState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validated(token: RequestToken, report: ValidationReport) -> ValidationResponse {
        ValidationResponse {
            token,
            outcome: ValidationOutcome::Validated(report),
        }
    }

    fn header_failure() -> ValidationReport {
        ValidationReport {
            headers: vec!["Expected header in column A: CODE".to_string()],
            cells: Vec::new(),
        }
    }

    #[test]
    fn nothing_is_reported_before_a_response() {
        let slot = ReportSlot::new();
        assert_eq!(slot.state(), SlotState::Empty);
        let t = slot.begin();
        assert_eq!(slot.state(), SlotState::Pending(t));
        assert!(slot.report().is_none());
    }

    #[test]
    fn current_response_is_accepted() {
        let slot = ReportSlot::new();
        let t = slot.begin();
        assert!(slot.complete(validated(t, ValidationReport::default())));
        let report = slot.report().unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn stale_response_is_discarded() {
        let slot = ReportSlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(first < second);

        assert!(slot.complete(validated(second, ValidationReport::default())));
        assert!(!slot.complete(validated(first, header_failure())));
        assert!(slot.report().unwrap().is_valid());
    }

    #[test]
    fn new_upload_clears_previous_report() {
        let slot = ReportSlot::new();
        let t = slot.begin();
        slot.complete(validated(t, header_failure()));
        assert!(slot.report().is_some());

        let _ = slot.begin();
        assert!(slot.report().is_none());
        assert!(!slot.is_current(t));
    }

    #[test]
    fn unreadable_state_is_distinct_from_report() {
        let slot = ReportSlot::new();
        let t = slot.begin();
        assert!(slot.complete(ValidationResponse {
            token: t,
            outcome: ValidationOutcome::Unreadable {
                message: "csv error".to_string(),
            },
        }));
        assert!(slot.report().is_none());
        assert!(matches!(slot.state(), SlotState::Unreadable { token, .. } if token == t));
    }
}
