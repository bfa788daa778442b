//! The submission pipeline: one photograph in, one recorded verdict out.
//!
//! ```text
//! read bytes ── sniff format ──┬── hash + preview ──┐
//!                              └── decode + extract ─┴── classify ── record
//! ```
//!
//! Hashing/preview and decode/extract have no data dependency, so they run
//! as the two arms of a `rayon::join`; classification needs both and runs
//! after. The history is read-modify-write around the classification: the
//! verdict is computed against the history *before* this submission, then
//! the new entry is prepended and saved.
//!
//! Failure policy follows the error taxonomy: only an unreadable file is an
//! error (and leaves the history untouched). Everything downstream degrades
//! — sparse metadata flows into the verdict, a failed preview records no
//! preview, and a failed history save surfaces as a warning on the report
//! while the session continues with the in-memory state.

use crate::config::Config;
use crate::decode::{self, DecodeError};
use crate::geocode::{self, ReverseGeocoder};
use crate::history::{self, HistoryEntry, HistoryStore};
use crate::types::{PhotoMetadata, VerificationResult};
use crate::{extract, hash, preview, verify};
use chrono::{SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported file type (expected JPEG or PNG): {0}")]
    UnsupportedFormat(PathBuf),
    #[error("unable to read image metadata: {0}")]
    Decode(#[from] DecodeError),
}

/// Outcome of one submission, ready for display.
#[derive(Debug)]
pub struct CheckReport {
    pub file_name: String,
    pub hash: String,
    pub metadata: PhotoMetadata,
    pub verification: VerificationResult,
    /// Set when the history could not be persisted; the check itself stands.
    pub save_warning: Option<String>,
}

/// Accepted input containers, sniffed from magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

/// Magic-number sniff. This is the validation gate in front of the core:
/// anything that is not a JPEG or PNG is rejected before decoding starts.
pub fn sniff_format(bytes: &[u8]) -> Option<ImageKind> {
    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageKind::Jpeg)
    } else if bytes.starts_with(&PNG_MAGIC) {
        Some(ImageKind::Png)
    } else {
        None
    }
}

/// Run the full pipeline for one file and record the outcome.
pub fn run_check(
    path: &Path,
    store: &HistoryStore,
    geocoder: Option<&dyn ReverseGeocoder>,
    config: &Config,
) -> Result<CheckReport, CheckError> {
    let bytes = std::fs::read(path)?;
    if sniff_format(&bytes).is_none() {
        return Err(CheckError::UnsupportedFormat(path.to_path_buf()));
    }

    let ((digest, preview_url), decoded) = rayon::join(
        || {
            (
                hash::sha256_hex(&bytes),
                preview::preview_data_url(&bytes, config.preview.max_edge),
            )
        },
        || decode::decode(&bytes),
    );
    let decoded = decoded?;

    let mut metadata = extract::extract(&decoded.record, decoded.gps.as_ref());
    if let Some(geocoder) = geocoder {
        geocode::attach_location_name(&mut metadata, geocoder);
    }

    let existing = store.load();
    let verification = verify::classify(&metadata, &digest, &existing);

    let entry = HistoryEntry {
        id: Uuid::new_v4().to_string(),
        hash: digest.clone(),
        file_name: file_name_of(path),
        preview_url,
        checked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        status: verification.status,
        reason: verification.reason.clone(),
        metadata: metadata.clone(),
    };
    let updated = history::prepend_capped(existing, entry);
    let save_warning = store.save(&updated).err().map(|err| {
        format!(
            "unable to save history to {}: {err}",
            store.path().display()
        )
    });

    Ok(CheckReport {
        file_name: file_name_of(path),
        hash: digest,
        metadata,
        verification,
        save_warning,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
