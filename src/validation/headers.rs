//! Header row verification.

use crate::address::letters;
use crate::types::Value;

/// Whether extra, unexpected headers are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderStrictness {
    /// Only missing expected headers are errors.
    #[default]
    Lenient,
    /// Unexpected (non-blank) candidate headers are errors too.
    Strict,
}

/// Text used to compare a header cell with the expected labels.
///
/// Text is taken verbatim (no trimming, no case folding); other cells use their display form,
/// so a numeric header `2024` compares as `"2024"`.
pub fn header_text(cell: &Value) -> String {
    cell.to_string()
}

/// Check the candidate header row against the expected labels.
///
/// For each expected label at 1-based position *i* that appears nowhere in `candidate`, emits
/// `Expected header in column <letters(i)>: <label>`, in expected order. With
/// [`HeaderStrictness::Strict`], each non-blank candidate header that is not expected then emits
/// `Unexpected header in column <letters(j)>: <label>` for its own position *j*.
pub fn validate_headers<S: AsRef<str>>(
    expected: &[S],
    candidate: &[Value],
    strictness: HeaderStrictness,
) -> Vec<String> {
    let expected: Vec<&str> = expected.iter().map(|e| e.as_ref()).collect();
    let candidate: Vec<String> = candidate.iter().map(header_text).collect();

    let mut errors: Vec<String> = expected
        .iter()
        .enumerate()
        .filter(|(_, label)| !candidate.iter().any(|c| c.as_str() == **label))
        .map(|(idx0, label)| format!("Expected header in column {}: {label}", letters(idx0 + 1)))
        .collect();

    if strictness == HeaderStrictness::Strict {
        for (idx0, label) in candidate.iter().enumerate() {
            if label.is_empty() || expected.contains(&label.as_str()) {
                continue;
            }
            errors.push(format!(
                "Unexpected header in column {}: {label}",
                letters(idx0 + 1)
            ));
        }
    }

    errors
}
