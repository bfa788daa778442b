//! Verification classification.
//!
//! A pure function from (normalized metadata, content digest, history) to a
//! verdict. No I/O, no side effects — the caller loads the history and
//! records the outcome.
//!
//! Three checks feed the decision: whether the digest was seen before,
//! whether a capture time was recovered, and whether a full GPS pair was
//! recovered. Reuse dominates: a duplicate submission is `Reused` no matter
//! how complete its metadata is. The individual check outcomes are still
//! reported for diagnostic display.

use crate::history::{HistoryEntry, contains_hash};
use crate::types::{CheckOutcome, PhotoMetadata, VerificationResult, VerificationStatus};

const REASON_REUSED: &str = "This image hash matches a previous submission.";
const REASON_VERIFIED: &str = "Capture time and GPS location are present.";
const REASON_SUSPICIOUS: &str = "Missing capture time or GPS location metadata.";

/// Classify one submission.
///
/// Total over its inputs: every (reused, time, location) combination maps to
/// exactly one of the three statuses.
pub fn classify(
    metadata: &PhotoMetadata,
    hash: &str,
    history: &[HistoryEntry],
) -> VerificationResult {
    let reused = contains_hash(history, hash);
    let time_check = if metadata.capture_time.is_some() {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Fail
    };
    let location_check = if metadata.gps.is_complete() {
        CheckOutcome::Pass
    } else {
        CheckOutcome::Fail
    };

    let (status, reason) = if reused {
        (VerificationStatus::Reused, REASON_REUSED)
    } else if time_check.passed() && location_check.passed() {
        (VerificationStatus::Verified, REASON_VERIFIED)
    } else {
        (VerificationStatus::Suspicious, REASON_SUSPICIOUS)
    };

    VerificationResult {
        status,
        reason: reason.to_string(),
        time_check,
        location_check,
        reused,
    }
}
