//! Metadata extraction: raw record → normalized [`PhotoMetadata`].
//!
//! The extractor is a set of per-field fallback chains over the loosely-keyed
//! record, each candidate passed through the normalizers in `normalize`.
//! Every field degrades independently to absent; this module never fails.
//!
//! ## Resolution priority
//!
//! - **Capture time**: `DateTimeOriginal` → `CreateDate`/`DateTimeDigitized`
//!   → `ModifyDate`/`DateTime` (first value that *parses* wins, not just the
//!   first present — a present-but-garbled tag falls through).
//! - **Coordinates**: the decoder's pre-resolved pair (already signed) →
//!   dedicated GPS sub-record → tagged root keys (including `exif:`/`xmp:`
//!   namespaced variants) → EXIF sub-record → XMP sub-record.
//! - **Reference letters**: root → EXIF sub-record → XMP sub-record → GPS
//!   sub-record; applied per the sign rules in `normalize` (unsigned
//!   magnitudes only).
//! - **Device**: trimmed `"{Make} {Model}"`, absent when both are empty.

use crate::normalize::{
    CompassRef, NormalizedCoordinate, apply_reference, format_capture_time, normalize_coordinate,
    parse_exif_datetime,
};
use crate::record::{FieldMap, RawRecord, RawValue, ResolvedGps, first_present};
use crate::types::{GpsCoordinates, PhotoMetadata};

/// Capture-time candidates, in priority order. The second and third logical
/// fields go by different names depending on the decoder's tag vocabulary.
const CAPTURE_TIME_KEYS: [&str; 5] = [
    "DateTimeOriginal",
    "CreateDate",
    "DateTimeDigitized",
    "ModifyDate",
    "DateTime",
];

/// Which coordinate axis a lookup targets; key lists differ only by name.
#[derive(Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn sub_record_keys(self) -> &'static [&'static str] {
        match self {
            Axis::Latitude => &["latitude", "Latitude"],
            Axis::Longitude => &["longitude", "Longitude"],
        }
    }

    fn root_keys(self) -> &'static [&'static str] {
        match self {
            Axis::Latitude => &[
                "GPSLatitude",
                "latitude",
                "Latitude",
                "exif:GPSLatitude",
                "xmp:GPSLatitude",
            ],
            Axis::Longitude => &[
                "GPSLongitude",
                "longitude",
                "Longitude",
                "exif:GPSLongitude",
                "xmp:GPSLongitude",
            ],
        }
    }

    fn tagged_keys(self) -> &'static [&'static str] {
        match self {
            Axis::Latitude => &["GPSLatitude", "latitude", "Latitude"],
            Axis::Longitude => &["GPSLongitude", "longitude", "Longitude"],
        }
    }

    fn root_ref_keys(self) -> &'static [&'static str] {
        match self {
            Axis::Latitude => &[
                "GPSLatitudeRef",
                "exif:GPSLatitudeRef",
                "xmp:GPSLatitudeRef",
            ],
            Axis::Longitude => &[
                "GPSLongitudeRef",
                "exif:GPSLongitudeRef",
                "xmp:GPSLongitudeRef",
            ],
        }
    }

    fn tagged_ref_keys(self) -> &'static [&'static str] {
        match self {
            Axis::Latitude => &["GPSLatitudeRef"],
            Axis::Longitude => &["GPSLongitudeRef"],
        }
    }

    fn sub_record_ref_keys(self) -> &'static [&'static str] {
        match self {
            Axis::Latitude => &["latitudeRef", "LatitudeRef"],
            Axis::Longitude => &["longitudeRef", "LongitudeRef"],
        }
    }

    fn resolved(self, pair: &ResolvedGps) -> f64 {
        match self {
            Axis::Latitude => pair.latitude,
            Axis::Longitude => pair.longitude,
        }
    }
}

/// Extract normalized metadata from a parsed record, preferring the
/// decoder's pre-resolved GPS pair when one exists.
///
/// Malformed or missing fields degrade to absent; completeness follows from
/// the fields. Total decode failure is the decoder's error to raise, never
/// this function's — an empty record extracts to an all-absent result.
pub fn extract(record: &RawRecord, resolved_gps: Option<&ResolvedGps>) -> PhotoMetadata {
    let capture_time = CAPTURE_TIME_KEYS
        .iter()
        .find_map(|key| record.root.get(*key).and_then(parse_exif_datetime))
        .map(|instant| format_capture_time(&instant));

    let latitude = coordinate(record, resolved_gps, Axis::Latitude);
    let longitude = coordinate(record, resolved_gps, Axis::Longitude);

    PhotoMetadata {
        capture_time,
        gps: GpsCoordinates {
            latitude,
            longitude,
        },
        device: device_string(&record.root),
        location_name: None,
    }
}

/// One signed coordinate: magnitude chain, then reference-letter sign
/// correction.
fn coordinate(record: &RawRecord, resolved_gps: Option<&ResolvedGps>, axis: Axis) -> Option<f64> {
    let magnitude = resolved_gps
        .and_then(|pair| NormalizedCoordinate::pre_signed(axis.resolved(pair)))
        .or_else(|| coordinate_magnitude(record, axis));
    apply_reference(magnitude, reference(record, axis))
}

/// Magnitude fallback chain over the record's shapes. Each candidate source
/// is normalized independently; an unparseable value falls through to the
/// next source rather than ending the chain.
fn coordinate_magnitude(record: &RawRecord, axis: Axis) -> Option<NormalizedCoordinate> {
    lookup(&record.gps, axis.sub_record_keys())
        .or_else(|| lookup(&record.root, axis.root_keys()))
        .or_else(|| lookup(&record.exif, axis.tagged_keys()))
        .or_else(|| lookup(&record.xmp, axis.tagged_keys()))
}

fn lookup(fields: &FieldMap, keys: &[&str]) -> Option<NormalizedCoordinate> {
    first_present(fields, keys).and_then(normalize_coordinate)
}

fn reference(record: &RawRecord, axis: Axis) -> Option<CompassRef> {
    first_present(&record.root, axis.root_ref_keys())
        .or_else(|| first_present(&record.exif, axis.tagged_ref_keys()))
        .or_else(|| first_present(&record.xmp, axis.tagged_ref_keys()))
        .or_else(|| first_present(&record.gps, axis.sub_record_ref_keys()))
        .and_then(CompassRef::parse)
}

/// Trimmed `"{Make} {Model}"`, absent when nothing remains.
fn device_string(root: &FieldMap) -> Option<String> {
    let make = text_field(root, "Make");
    let model = text_field(root, "Model");
    let device = format!("{} {}", make, model).trim().to_string();
    (!device.is_empty()).then_some(device)
}

fn text_field(fields: &FieldMap, key: &str) -> String {
    match fields.get(key) {
        Some(RawValue::Text(text)) => text.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
        None => String::new(),
    }
}
