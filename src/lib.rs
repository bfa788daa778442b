//! # Photoproof
//!
//! A command-line photo authenticity checker. Point it at a JPEG or PNG and
//! it answers one question from the file alone: does this look like a
//! photograph straight off a camera, or has its provenance been stripped?
//!
//! # Architecture: One Pipeline, Three Signals
//!
//! Every check runs the same pipeline over the file bytes:
//!
//! ```text
//! 1. Decode     bytes     →  raw record      (EXIF/XMP → loose key/value fields)
//! 2. Extract    record    →  metadata        (capture time, GPS, device)
//! 3. Hash       bytes     →  digest          (SHA-256 identity for dedup)
//! 4. Classify   all three →  verdict         (Verified / Suspicious / Reused)
//! 5. Record     verdict   →  history.json    (capped, newest-first audit trail)
//! ```
//!
//! Hashing and metadata extraction are independent and run in parallel; the
//! classifier waits for both.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`decode`] | EXIF/XMP decoding into a loosely-typed record (kamadak-exif + quick-xml) |
//! | [`record`] | The loose record model and the first-present field resolver |
//! | [`normalize`] | Coordinate and timestamp normalization, hemisphere sign rules |
//! | [`extract`] | Per-field fallback chains producing normalized metadata |
//! | [`hash`] | SHA-256 content digest |
//! | [`verify`] | The pure three-state classifier |
//! | [`history`] | Capacity-bounded persisted history with dedup lookup |
//! | [`preview`] | Embedded preview thumbnails for history entries |
//! | [`geocode`] | Reverse-geocoding collaborator (Nominatim) |
//! | [`check`] | The submission pipeline tying everything together |
//! | [`config`] | `config.toml` loading and validation |
//! | [`output`] | CLI output formatting — pure format functions |
//! | [`types`] | Shared serialized types |
//!
//! # Design Decisions
//!
//! ## Trust the Tags, Detect Absence
//!
//! EXIF is trivially editable, and photoproof does not pretend otherwise.
//! The verdict detects *missing* provenance signals, not forged ones: a
//! photo with no capture time and no GPS fix looks like an export, a
//! screenshot, or a scrape, and that is worth flagging. Cryptographic
//! authenticity is a different tool's job.
//!
//! ## One Normalizer for Every Coordinate Shape
//!
//! Decoders emit GPS coordinates as plain numbers, rationals, compass
//! strings, or degree/minute/second triples, under half a dozen key
//! spellings. All shape handling is concentrated in [`normalize`] and all
//! key fallback chains in [`extract`] — a new decoder quirk is one new
//! branch or one new candidate key, never a change sprinkled across callers.
//! Absence is always a real `None`: a coordinate of `0.0` is a position on
//! the equator, not a missing value.
//!
//! ## Degrade, Don't Fail
//!
//! Only an unreadable file fails a check. Missing or garbled metadata
//! degrades field-by-field into the completeness tier; a corrupt history
//! file loads as empty; a failed history write warns and continues; a dead
//! geocoding service means no place name. The classifier always receives a
//! well-formed, possibly sparse, input.
//!
//! ## The History Is an Audit Trail, Not a Database
//!
//! A single JSON file, newest-first, capped at 20 entries, rewritten in full
//! after every check. Entries are immutable; the only operations are
//! prepend-with-truncate and clear. Duplicate detection is a linear scan
//! over at most 20 digests — a database would be pure ceremony.

pub mod check;
pub mod config;
pub mod decode;
pub mod extract;
pub mod geocode;
pub mod hash;
pub mod history;
pub mod normalize;
pub mod output;
pub mod preview;
pub mod record;
pub mod types;
pub mod verify;
