use crate::types::{GridError, GridResult, MonthWindow};
use chrono::{DateTime, Utc};

/// Minimum fraction of batches whose acquisition time must fall inside the
/// requested month
pub const MIN_COVERAGE: f64 = 0.95;

/// Vet a batch manifest against the requested month window.
///
/// Two independent guards, checked in order:
/// 1. every timestamp outside [start, end) is a manifest/month mismatch;
/// 2. an in-window fraction below `MIN_COVERAGE` is a mixed manifest.
///
/// Both conditions carry distinct errors so callers can tell a wrong month
/// from a contaminated manifest. No record-level filtering happens here; this
/// gate only vets the batch manifest, and records are filtered later by
/// `delta_time` in the extractor.
pub fn validate_coverage(window: &MonthWindow, stamps: &[DateTime<Utc>]) -> GridResult<()> {
    if stamps.is_empty() {
        return Err(GridError::InvalidArgument(
            "no batch timestamps to validate".to_string(),
        ));
    }

    if stamps.iter().all(|dt| !window.contains(*dt)) {
        return Err(GridError::OutOfRange(format!(
            "all batch timestamps are outside the requested month ranging from {} to {}",
            window.start, window.end
        )));
    }

    let in_window = stamps.iter().filter(|dt| window.contains(**dt)).count();
    let fraction = in_window as f64 / stamps.len() as f64;
    if fraction < MIN_COVERAGE {
        return Err(GridError::InsufficientCoverage(format!(
            "majority of batch timestamps are not in the requested month {}-{:02} \
             ({} of {} in window)",
            window.year(),
            window.month(),
            in_window,
            stamps.len()
        )));
    }

    log::debug!(
        "month coverage ok: {}/{} batch timestamps inside {} to {}",
        in_window,
        stamps.len(),
        window.start,
        window.end
    );
    Ok(())
}
