//! Loosely-typed metadata records.
//!
//! Metadata decoders disagree about almost everything: tag naming
//! (`GPSLatitude` vs `latitude` vs `exif:GPSLatitude`), nesting (flat record
//! vs dedicated `gps`/`exif`/`xmp` sub-records), and value shape (number,
//! rational, string, rational triple). This module models that mess once so
//! the extractor can stay declarative:
//!
//! - [`RawValue`] is the tagged union of every value shape a decoder may
//!   emit. New shapes are one new variant plus one branch in the normalizer,
//!   not scattered type checks.
//! - [`RawRecord`] holds the flat root fields plus the three conventional
//!   sub-records (any of which may be empty).
//! - [`first_present`] is the single "first present value wins" lookup used
//!   for every fallback chain. Presence means the key exists in the map —
//!   a value that later normalizes to `0.0` is still present.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;

/// One decoded metadata value, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Plain number (already a decimal, or an integer tag value).
    Number(f64),
    /// Free text, including compass-annotated coordinate strings
    /// ("40.7128 N", XMP's "40,43.77N").
    Text(String),
    /// EXIF rational.
    Ratio { numerator: f64, denominator: f64 },
    /// Ordered values, typically a [degrees, minutes, seconds] triple.
    Sequence(Vec<RawValue>),
    /// A timestamp the decoder already parsed into a calendar instant.
    DateTime(NaiveDateTime),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => write!(f, "{s:?}"),
            RawValue::Ratio {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator}"),
            RawValue::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            RawValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Key/value fields from one record or sub-record.
///
/// A `BTreeMap` keeps `inspect` output deterministic.
pub type FieldMap = BTreeMap<String, RawValue>;

/// A full parsed-metadata record as emitted by a decoder.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    /// Flat top-level fields.
    pub root: FieldMap,
    /// Dedicated GPS sub-record, if the decoder produced one.
    pub gps: FieldMap,
    /// EXIF sub-record, if namespaced by the decoder.
    pub exif: FieldMap,
    /// XMP sub-record (keys keep their `exif:`/`tiff:` prefixes).
    pub xmp: FieldMap,
}

impl RawRecord {
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.gps.is_empty() && self.exif.is_empty() && self.xmp.is_empty()
    }
}

/// The GPS pair a decoder already resolved to signed decimal degrees.
///
/// Values here carry their hemisphere sign; the extractor never re-applies
/// reference letters to them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedGps {
    pub latitude: f64,
    pub longitude: f64,
}

/// First present value among an ordered list of candidate keys.
///
/// The generic lookup behind every per-field fallback chain: candidates are
/// tried in order, and the first key present in the map wins regardless of
/// what it normalizes to later.
pub fn first_present<'a>(fields: &'a FieldMap, keys: &[&str]) -> Option<&'a RawValue> {
    keys.iter().find_map(|key| fields.get(*key))
}

/// Root fields whose key mentions GPS or a coordinate axis, for the
/// `inspect` dump.
pub fn gps_related(fields: &FieldMap) -> Vec<(&String, &RawValue)> {
    fields
        .iter()
        .filter(|(key, _)| {
            let lower = key.to_lowercase();
            lower.contains("gps") || lower.contains("latitude") || lower.contains("longitude")
        })
        .collect()
}
