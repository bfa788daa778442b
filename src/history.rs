//! Persisted check history.
//!
//! A single JSON file holds the audit trail: an array of entries, newest
//! first, capped at [`HISTORY_CAPACITY`]. The file is the whole lifecycle —
//! loaded at session start, rewritten after every mutation, removed on
//! clear. Entries are immutable once created; the only mutations are
//! prepend-with-truncate and full clear.
//!
//! ## Durability over strictness
//!
//! The history is an aid, not a ledger of record, so every storage failure
//! degrades instead of propagating:
//!
//! - absent file, unreadable file, or structurally invalid JSON → empty
//!   history (`load` never errors);
//! - entries written by older builds may lack `locationName` or
//!   `previewUrl`, or carry coordinates as numeric strings — both load fine
//!   (see the lenient fields on [`PhotoMetadata`](crate::types::PhotoMetadata));
//! - a failed save is reported to the caller as a plain `io::Result` and the
//!   session continues on the in-memory state.
//!
//! There is no lock around the file. Two concurrent processes can race and
//! the last writer wins; a single active session is the supported shape.

use crate::types::{PhotoMetadata, VerificationStatus};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of entries kept. Prepending beyond this drops the oldest.
pub const HISTORY_CAPACITY: usize = 20;

/// File name of the history slot inside the data directory.
const HISTORY_FILENAME: &str = "history.json";

/// One recorded submission.
///
/// Field names follow the durable camelCase layout; unknown keys in stored
/// payloads (e.g. a legacy `completeness` inside `metadata`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique token for this submission (UUID v4).
    pub id: String,
    /// Content digest, the dedup key.
    pub hash: String,
    #[serde(default)]
    pub file_name: String,
    /// Small embedded preview (`data:image/png;base64,…`), when one could
    /// be generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    /// RFC 3339 instant of the check.
    #[serde(default)]
    pub checked_at: String,
    pub status: VerificationStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub metadata: PhotoMetadata,
}

/// Handle to the durable history slot.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default slot: `<user data dir>/photoproof/history.json`, falling back
    /// to the working directory when the platform has no data dir.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("photoproof").join(HISTORY_FILENAME))
            .unwrap_or_else(|| PathBuf::from(HISTORY_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored sequence, newest first.
    ///
    /// Absent or corrupt durable state is an empty history, never an error.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Persist the given sequence, replacing the slot's contents.
    ///
    /// Callers treat a failure as a warning and keep the in-memory state —
    /// a broken disk should not end the session.
    pub fn save(&self, entries: &[HistoryEntry]) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
    }

    /// Remove all persisted entries. Clearing an already-empty slot is fine.
    pub fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Membership test over a loaded sequence, used for duplicate detection.
pub fn contains_hash(entries: &[HistoryEntry], hash: &str) -> bool {
    entries.iter().any(|entry| entry.hash == hash)
}

/// Prepend an entry and truncate to capacity. Pure; the caller saves.
pub fn prepend_capped(entries: Vec<HistoryEntry>, entry: HistoryEntry) -> Vec<HistoryEntry> {
    let mut updated = Vec::with_capacity(entries.len() + 1);
    updated.push(entry);
    updated.extend(entries);
    updated.truncate(HISTORY_CAPACITY);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GpsCoordinates;
    use std::fs;
    use tempfile::TempDir;

    fn entry(id: &str, hash: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            hash: hash.to_string(),
            file_name: format!("{id}.jpg"),
            preview_url: None,
            checked_at: "2023-05-14T10:22:00Z".to_string(),
            status: VerificationStatus::Verified,
            reason: "Capture time and GPS location are present.".to_string(),
            metadata: PhotoMetadata {
                capture_time: Some("14 May 2023, 10:22".to_string()),
                gps: GpsCoordinates {
                    latitude: Some(6.5),
                    longitude: Some(3.3),
                },
                device: Some("Nikon Z6".to_string()),
                location_name: None,
            },
        }
    }

    fn store(dir: &TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("history.json"))
    }

    // =========================================================================
    // Load tolerance
    // =========================================================================

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).load().is_empty());
    }

    #[test]
    fn load_corrupt_json_returns_empty() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        fs::write(s.path(), "not json at all").unwrap();
        assert!(s.load().is_empty());
    }

    #[test]
    fn load_wrong_shape_returns_empty() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        fs::write(s.path(), r#"{"version": 3}"#).unwrap();
        assert!(s.load().is_empty());
    }

    #[test]
    fn load_tolerates_legacy_entries() {
        // No previewUrl, no locationName, string coordinates, and a stored
        // completeness field that current builds derive instead.
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        fs::write(
            s.path(),
            r#"[{
                "id": "legacy-1",
                "hash": "abc123",
                "fileName": "old.jpg",
                "checkedAt": "2022-01-01T00:00:00Z",
                "status": "Suspicious",
                "reason": "Missing capture time or GPS location metadata.",
                "metadata": {
                    "captureTime": null,
                    "gps": {"latitude": "6.5", "longitude": "3.3"},
                    "device": null,
                    "completeness": "Partial"
                }
            }]"#,
        )
        .unwrap();

        let entries = s.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].preview_url, None);
        assert_eq!(entries[0].metadata.location_name, None);
        assert_eq!(entries[0].metadata.gps.latitude, Some(6.5));
        assert_eq!(entries[0].metadata.gps.longitude, Some(3.3));
    }

    // =========================================================================
    // Save / load round-trip
    // =========================================================================

    #[test]
    fn save_then_load_preserves_order_and_content() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let entries = vec![entry("b", "hash-b"), entry("a", "hash-a")];

        s.save(&entries).unwrap();
        assert_eq!(s.load(), entries);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let s = HistoryStore::new(dir.path().join("nested").join("deep").join("history.json"));
        s.save(&[entry("a", "h")]).unwrap();
        assert_eq!(s.load().len(), 1);
    }

    #[test]
    fn save_uses_camel_case_layout() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&[entry("a", "h")]).unwrap();
        let raw = fs::read_to_string(s.path()).unwrap();
        assert!(raw.contains("\"fileName\""));
        assert!(raw.contains("\"checkedAt\""));
        assert!(raw.contains("\"captureTime\""));
        // Derived, never persisted.
        assert!(!raw.contains("completeness"));
    }

    // =========================================================================
    // Clear
    // =========================================================================

    #[test]
    fn clear_removes_the_slot() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.save(&[entry("a", "h")]).unwrap();
        s.clear().unwrap();
        assert!(s.load().is_empty());
    }

    #[test]
    fn clear_on_empty_slot_is_ok() {
        let dir = TempDir::new().unwrap();
        store(&dir).clear().unwrap();
    }

    // =========================================================================
    // Capacity and membership
    // =========================================================================

    #[test]
    fn prepend_puts_newest_first() {
        let entries = prepend_capped(vec![entry("old", "h1")], entry("new", "h2"));
        assert_eq!(entries[0].id, "new");
        assert_eq!(entries[1].id, "old");
    }

    #[test]
    fn prepend_beyond_capacity_drops_the_oldest() {
        let mut entries = Vec::new();
        for i in 0..HISTORY_CAPACITY {
            entries = prepend_capped(entries, entry(&format!("e{i}"), &format!("h{i}")));
        }
        assert_eq!(entries.len(), HISTORY_CAPACITY);

        let entries = prepend_capped(entries, entry("e20", "h20"));
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        assert_eq!(entries[0].id, "e20");
        // e0 was the oldest and is gone.
        assert!(entries.iter().all(|e| e.id != "e0"));
    }

    #[test]
    fn contains_hash_matches_exactly() {
        let entries = vec![entry("a", "hash-a"), entry("b", "hash-b")];
        assert!(contains_hash(&entries, "hash-a"));
        assert!(contains_hash(&entries, "hash-b"));
        assert!(!contains_hash(&entries, "hash-c"));
        assert!(!contains_hash(&entries, "HASH-A"));
    }

    #[test]
    fn contains_hash_on_empty_history() {
        assert!(!contains_hash(&[], "anything"));
    }
}
