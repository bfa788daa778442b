//! CLI output formatting.
//!
//! Every view follows the same two-level contract: a header line carrying
//! the entity's identity and verdict, then indented context lines with the
//! supporting detail. Format functions are pure — they return `Vec<String>`
//! and do no I/O — with thin `print_*` wrappers over stdout.
//!
//! ## Check
//!
//! ```text
//! IMG_1234.jpg — Verified
//!     Reason: Capture time and GPS location are present.
//!     SHA-256: 9f86d081884c7d65...
//!     Checks: time pass, location pass
//!     Capture time: 14 May 2023, 10:22
//!     GPS: 6.50000° N, 3.30000° E
//!     Location: Lagos, Nigeria
//!     Device: Nikon Z6
//!     Metadata: Complete
//! ```
//!
//! ## History
//!
//! ```text
//! History (3 checks: 1 verified, 1 suspicious, 1 reused)
//! 001 IMG_1234.jpg — Verified
//!     Checked: 2023-05-14T10:22:31.118Z
//!     SHA-256: 9f86d081884c7d65...
//! ```

use crate::check::CheckReport;
use crate::history::HistoryEntry;
use crate::record::{FieldMap, RawRecord, gps_related};
use crate::types::VerificationStatus;

const INDENT: &str = "    ";
const NOT_AVAILABLE: &str = "Not available";

// ============================================================================
// Check report
// ============================================================================

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let verification = &report.verification;
    let mut lines = vec![
        format!("{} — {}", report.file_name, verification.status.label()),
        format!("{INDENT}Reason: {}", verification.reason),
        format!("{INDENT}SHA-256: {}", report.hash),
        format!(
            "{INDENT}Checks: time {}, location {}",
            verification.time_check.label(),
            verification.location_check.label()
        ),
        format!(
            "{INDENT}Capture time: {}",
            report
                .metadata
                .capture_time
                .as_deref()
                .unwrap_or(NOT_AVAILABLE)
        ),
        format!(
            "{INDENT}GPS: {}",
            report
                .metadata
                .gps
                .format()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        ),
    ];
    if let Some(location) = &report.metadata.location_name {
        lines.push(format!("{INDENT}Location: {location}"));
    }
    lines.push(format!(
        "{INDENT}Device: {}",
        report.metadata.device.as_deref().unwrap_or(NOT_AVAILABLE)
    ));
    lines.push(format!(
        "{INDENT}Metadata: {}",
        report.metadata.completeness().label()
    ));
    lines
}

pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{line}");
    }
}

// ============================================================================
// History
// ============================================================================

/// Per-status totals for the history header line.
fn status_counts(entries: &[HistoryEntry]) -> (usize, usize, usize) {
    let verified = entries
        .iter()
        .filter(|e| e.status == VerificationStatus::Verified)
        .count();
    let suspicious = entries
        .iter()
        .filter(|e| e.status == VerificationStatus::Suspicious)
        .count();
    let reused = entries
        .iter()
        .filter(|e| e.status == VerificationStatus::Reused)
        .count();
    (verified, suspicious, reused)
}

pub fn format_history(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["History is empty".to_string()];
    }

    let (verified, suspicious, reused) = status_counts(entries);
    let plural = if entries.len() == 1 { "check" } else { "checks" };
    let mut lines = vec![format!(
        "History ({} {plural}: {verified} verified, {suspicious} suspicious, {reused} reused)",
        entries.len()
    )];

    for (index, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "{:03} {} — {}",
            index + 1,
            entry.file_name,
            entry.status.label()
        ));
        lines.push(format!("{INDENT}Checked: {}", entry.checked_at));
        lines.push(format!("{INDENT}SHA-256: {}", entry.hash));
        if let Some(location) = &entry.metadata.location_name {
            lines.push(format!("{INDENT}Location: {location}"));
        }
    }
    lines
}

pub fn print_history(entries: &[HistoryEntry]) {
    for line in format_history(entries) {
        println!("{line}");
    }
}

// ============================================================================
// Inspect
// ============================================================================

/// Raw-record dump for debugging extraction: each sub-record in turn, then
/// the GPS-related subset and the decoder's pre-resolved pair.
pub fn format_inspect(
    file_name: &str,
    record: &RawRecord,
    resolved_gps: Option<(f64, f64)>,
) -> Vec<String> {
    let mut lines = vec![format!("Metadata record: {file_name}")];

    let sections: [(&str, &FieldMap); 4] = [
        ("Root fields", &record.root),
        ("GPS sub-record", &record.gps),
        ("EXIF sub-record", &record.exif),
        ("XMP sub-record", &record.xmp),
    ];
    for (title, fields) in sections {
        lines.push(format!("{title}"));
        if fields.is_empty() {
            lines.push(format!("{INDENT}(none)"));
        } else {
            for (key, value) in fields {
                lines.push(format!("{INDENT}{key}: {value}"));
            }
        }
    }

    lines.push("GPS-related fields".to_string());
    let related = gps_related(&record.root);
    if related.is_empty() {
        lines.push(format!("{INDENT}(none)"));
    } else {
        for (key, value) in related {
            lines.push(format!("{INDENT}{key}: {value}"));
        }
    }

    match resolved_gps {
        Some((latitude, longitude)) => {
            lines.push(format!("Pre-resolved GPS: {latitude:.5}, {longitude:.5}"));
        }
        None => lines.push("Pre-resolved GPS: (none)".to_string()),
    }
    lines
}

pub fn print_inspect(file_name: &str, record: &RawRecord, resolved_gps: Option<(f64, f64)>) {
    for line in format_inspect(file_name, record, resolved_gps) {
        println!("{line}");
    }
}
