//! Coordinate and timestamp normalization.
//!
//! Converts the shape-polymorphic values a metadata decoder emits into
//! usable numbers and instants. All shape handling lives here; the
//! extractor only chains lookups.
//!
//! ## Coordinates
//!
//! A coordinate magnitude can arrive as a plain number, an EXIF rational, a
//! compass-annotated string ("40.7128 N", "6 30 0 N", XMP's "40,43.77N"), or
//! a [degrees, minutes, seconds] sequence. [`normalize_coordinate`] resolves
//! all of them to decimal degrees and records whether the value already
//! carried its own hemisphere sign.
//!
//! ## Sign resolution
//!
//! EXIF stores hemisphere separately (`GPSLatitudeRef` = N/S,
//! `GPSLongitudeRef` = E/W). [`apply_reference`] applies that letter to
//! magnitudes that arrived unsigned, and leaves self-signed values alone —
//! a string that said "74.0060 W" is already negative and must not be
//! negated twice.
//!
//! No non-finite value ever leaves this module.

use crate::record::RawValue;
use chrono::{NaiveDate, NaiveDateTime};

/// A coordinate magnitude in decimal degrees.
///
/// `self_signed` marks values whose source carried its own hemisphere
/// (a compass letter inside a string); reference letters never re-sign them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedCoordinate {
    pub degrees: f64,
    pub self_signed: bool,
}

impl NormalizedCoordinate {
    fn unsigned(degrees: f64) -> Option<Self> {
        degrees.is_finite().then_some(Self {
            degrees,
            self_signed: false,
        })
    }

    /// A value that is already signed and must not be re-signed, such as a
    /// decoder's pre-resolved GPS pair.
    pub fn pre_signed(degrees: f64) -> Option<Self> {
        degrees.is_finite().then_some(Self {
            degrees,
            self_signed: true,
        })
    }
}

/// Hemisphere reference letter from `GPSLatitudeRef` / `GPSLongitudeRef`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassRef {
    North,
    South,
    East,
    West,
}

impl CompassRef {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(CompassRef::North),
            'S' => Some(CompassRef::South),
            'E' => Some(CompassRef::East),
            'W' => Some(CompassRef::West),
            _ => None,
        }
    }

    /// Parse a reference field. Only textual values qualify; the first
    /// compass letter wins ("N", "North", "W 84° ..." all resolve).
    pub fn parse(value: &RawValue) -> Option<Self> {
        match value {
            RawValue::Text(text) => text.chars().find_map(Self::from_char),
            _ => None,
        }
    }

    fn is_negative(self) -> bool {
        matches!(self, CompassRef::South | CompassRef::West)
    }
}

/// Normalize one raw coordinate value to a decimal-degree magnitude.
///
/// Shape recognition, in order: finite number, rational, compass string,
/// [deg, min, sec?] sequence. Everything else — and any non-finite
/// intermediate — is absent.
pub fn normalize_coordinate(value: &RawValue) -> Option<NormalizedCoordinate> {
    match value {
        RawValue::Number(n) => NormalizedCoordinate::unsigned(*n),
        RawValue::Ratio {
            numerator,
            denominator,
        } => NormalizedCoordinate::unsigned(ratio_to_degrees(*numerator, *denominator)?),
        RawValue::Text(text) => parse_coordinate_text(text),
        RawValue::Sequence(items) if items.len() >= 2 => {
            let degrees = scalar_degrees(&items[0])?;
            let minutes = scalar_degrees(&items[1])?;
            let seconds = match items.get(2) {
                Some(item) => scalar_degrees(item)?,
                None => 0.0,
            };
            NormalizedCoordinate::unsigned(degrees + minutes / 60.0 + seconds / 3600.0)
        }
        _ => None,
    }
}

/// Combine a magnitude with a separately-resolved reference letter.
///
/// S/W force the magnitude negative and N/E force it positive — but only
/// when the magnitude arrived unsigned. An absent reference leaves the
/// value's own sign untouched.
pub fn apply_reference(
    coordinate: Option<NormalizedCoordinate>,
    reference: Option<CompassRef>,
) -> Option<f64> {
    let coordinate = coordinate?;
    let signed = match reference {
        Some(r) if !coordinate.self_signed => {
            if r.is_negative() {
                -coordinate.degrees.abs()
            } else {
                coordinate.degrees.abs()
            }
        }
        _ => coordinate.degrees,
    };
    signed.is_finite().then_some(signed)
}

/// Numeric value of a scalar inside a coordinate sequence: number, rational,
/// or numeric text.
fn scalar_degrees(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(n) => n.is_finite().then_some(*n),
        RawValue::Ratio {
            numerator,
            denominator,
        } => ratio_to_degrees(*numerator, *denominator),
        RawValue::Text(text) => {
            let parsed = text.trim().parse::<f64>().ok()?;
            parsed.is_finite().then_some(parsed)
        }
        _ => None,
    }
}

fn ratio_to_degrees(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !numerator.is_finite() {
        return None;
    }
    let quotient = numerator / denominator;
    quotient.is_finite().then_some(quotient)
}

/// Parse a free-text coordinate: one to three numeric tokens, optionally a
/// compass letter anywhere in the string.
///
/// `"40.7128 N"` → 40.7128 (self-signed), `"6 30 0"` → 6.5 (unsigned),
/// `"40,43.77N"` (XMP GPSCoordinate layout) → 40.7295 (self-signed),
/// `"74.0060 W"` → -74.0060 (self-signed).
fn parse_coordinate_text(text: &str) -> Option<NormalizedCoordinate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let direction = trimmed.chars().find_map(CompassRef::from_char);
    let tokens = numeric_tokens(trimmed);
    if tokens.is_empty() {
        return None;
    }

    let mut degrees = match tokens.len() {
        1 => tokens[0],
        2 => tokens[0] + tokens[1] / 60.0,
        _ => tokens[0] + tokens[1] / 60.0 + tokens[2] / 3600.0,
    };

    if matches!(direction, Some(r) if r.is_negative()) {
        degrees = -degrees.abs();
    }

    degrees.is_finite().then_some(NormalizedCoordinate {
        degrees,
        self_signed: direction.is_some(),
    })
}

/// Extract decimal tokens (`-?\d+(\.\d+)?`) from a string, in order.
fn numeric_tokens(text: &str) -> Vec<f64> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let start = i;
        let mut j = i;
        if bytes[j] == b'-' {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j == digits_start {
            i = start + 1;
            continue;
        }
        let mut end = j;
        if j + 1 < bytes.len() && bytes[j] == b'.' && bytes[j + 1].is_ascii_digit() {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            end = j;
        }
        if let Ok(value) = text[start..end].parse::<f64>()
            && value.is_finite()
        {
            tokens.push(value);
        }
        i = end;
    }
    tokens
}

/// Parse an EXIF timestamp value to a calendar instant.
///
/// Decoder-parsed instants pass through unchanged. Text in the canonical
/// EXIF `"YYYY:MM:DD HH:MM:SS"` layout has the date colons rewritten to
/// dashes and the segments rejoined with `T`; a bare date gets midnight.
/// Anything else is absent.
pub fn parse_exif_datetime(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::DateTime(dt) => Some(*dt),
        RawValue::Text(text) => parse_datetime_text(text),
        _ => None,
    }
}

fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (date_part, time_part) = match trimmed.split_once(' ') {
        Some((date, time)) => (date, Some(time)),
        None => (trimmed, None),
    };
    let date = date_part.replace(':', "-");
    match time_part {
        Some(time) => {
            NaiveDateTime::parse_from_str(&format!("{date}T{time}"), "%Y-%m-%dT%H:%M:%S").ok()
        }
        None => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
    }
}

/// Display formatting for capture time: medium date, short time.
pub fn format_capture_time(instant: &NaiveDateTime) -> String {
    instant.format("%-d %b %Y, %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numerator: f64, denominator: f64) -> RawValue {
        RawValue::Ratio {
            numerator,
            denominator,
        }
    }

    // =========================================================================
    // Coordinate shapes
    // =========================================================================

    #[test]
    fn number_passes_through() {
        let coord = normalize_coordinate(&RawValue::Number(6.5)).unwrap();
        assert_eq!(coord.degrees, 6.5);
        assert!(!coord.self_signed);
    }

    #[test]
    fn non_finite_number_is_absent() {
        assert_eq!(normalize_coordinate(&RawValue::Number(f64::NAN)), None);
        assert_eq!(normalize_coordinate(&RawValue::Number(f64::INFINITY)), None);
    }

    #[test]
    fn ratio_divides() {
        let coord = normalize_coordinate(&ratio(13.0, 2.0)).unwrap();
        assert_eq!(coord.degrees, 6.5);
    }

    #[test]
    fn ratio_with_zero_denominator_is_absent() {
        assert_eq!(normalize_coordinate(&ratio(13.0, 0.0)), None);
    }

    #[test]
    fn sequence_combines_degrees_minutes_seconds() {
        let dms = RawValue::Sequence(vec![
            RawValue::Number(6.0),
            RawValue::Number(30.0),
            RawValue::Number(0.0),
        ]);
        let coord = normalize_coordinate(&dms).unwrap();
        assert!((coord.degrees - 6.5).abs() < 1e-9);
        assert!(!coord.self_signed);
    }

    #[test]
    fn sequence_seconds_default_to_zero() {
        let dm = RawValue::Sequence(vec![RawValue::Number(6.0), RawValue::Number(30.0)]);
        let coord = normalize_coordinate(&dm).unwrap();
        assert!((coord.degrees - 6.5).abs() < 1e-9);
    }

    #[test]
    fn sequence_of_ratios_combines() {
        let dms = RawValue::Sequence(vec![ratio(40.0, 1.0), ratio(26.0, 1.0), ratio(4614.0, 100.0)]);
        let coord = normalize_coordinate(&dms).unwrap();
        assert!((coord.degrees - (40.0 + 26.0 / 60.0 + 46.14 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn sequence_with_unparseable_member_is_absent() {
        let dms = RawValue::Sequence(vec![RawValue::Number(6.0), ratio(1.0, 0.0)]);
        assert_eq!(normalize_coordinate(&dms), None);
    }

    #[test]
    fn short_sequence_is_absent() {
        assert_eq!(
            normalize_coordinate(&RawValue::Sequence(vec![RawValue::Number(6.0)])),
            None
        );
    }

    #[test]
    fn datetime_is_not_a_coordinate() {
        let dt = NaiveDate::from_ymd_opt(2023, 5, 14)
            .unwrap()
            .and_hms_opt(10, 22, 0)
            .unwrap();
        assert_eq!(normalize_coordinate(&RawValue::DateTime(dt)), None);
    }

    // =========================================================================
    // Coordinate strings
    // =========================================================================

    #[test]
    fn string_with_north_letter_is_self_signed() {
        let coord = normalize_coordinate(&RawValue::Text("40.7128 N".to_string())).unwrap();
        assert!((coord.degrees - 40.7128).abs() < 1e-9);
        assert!(coord.self_signed);
    }

    #[test]
    fn string_with_west_letter_negates() {
        let coord = normalize_coordinate(&RawValue::Text("74.0060 W".to_string())).unwrap();
        assert!((coord.degrees + 74.0060).abs() < 1e-9);
        assert!(coord.self_signed);
    }

    #[test]
    fn xmp_gps_coordinate_layout_parses() {
        // XMP encodes "degrees,decimal-minutes + hemisphere".
        let coord = normalize_coordinate(&RawValue::Text("40,43.77N".to_string())).unwrap();
        assert!((coord.degrees - (40.0 + 43.77 / 60.0)).abs() < 1e-9);
        assert!(coord.self_signed);
    }

    #[test]
    fn string_dms_with_south_letter() {
        let coord = normalize_coordinate(&RawValue::Text("33 52 7.68 S".to_string())).unwrap();
        let expected = -(33.0 + 52.0 / 60.0 + 7.68 / 3600.0);
        assert!((coord.degrees - expected).abs() < 1e-9);
    }

    #[test]
    fn bare_numeric_string_is_unsigned() {
        let coord = normalize_coordinate(&RawValue::Text("6.5".to_string())).unwrap();
        assert_eq!(coord.degrees, 6.5);
        assert!(!coord.self_signed);
    }

    #[test]
    fn string_without_numbers_is_absent() {
        assert_eq!(normalize_coordinate(&RawValue::Text("North".to_string())), None);
        assert_eq!(normalize_coordinate(&RawValue::Text("   ".to_string())), None);
    }

    #[test]
    fn negative_string_with_west_letter_does_not_flip_positive() {
        let coord = normalize_coordinate(&RawValue::Text("-74.0060 W".to_string())).unwrap();
        assert!((coord.degrees + 74.0060).abs() < 1e-9);
    }

    // =========================================================================
    // Reference application
    // =========================================================================

    #[test]
    fn south_and_west_references_force_non_positive() {
        for magnitude in [6.5, 0.0, 151.2] {
            let coord = NormalizedCoordinate::unsigned(magnitude);
            let signed = apply_reference(coord, Some(CompassRef::South)).unwrap();
            assert!(signed <= 0.0);
            let signed = apply_reference(coord, Some(CompassRef::West)).unwrap();
            assert!(signed <= 0.0);
        }
    }

    #[test]
    fn north_and_east_references_force_non_negative() {
        let coord = NormalizedCoordinate::unsigned(-6.5);
        assert_eq!(apply_reference(coord, Some(CompassRef::North)), Some(6.5));
        assert_eq!(apply_reference(coord, Some(CompassRef::East)), Some(6.5));
    }

    #[test]
    fn absent_reference_keeps_own_sign() {
        let coord = NormalizedCoordinate::unsigned(-74.006);
        assert_eq!(apply_reference(coord, None), Some(-74.006));
    }

    #[test]
    fn self_signed_values_are_never_re_signed() {
        // "74.0060 W" already negated itself; a stray N ref must not flip it.
        let coord = normalize_coordinate(&RawValue::Text("74.0060 W".to_string()));
        let signed = apply_reference(coord, Some(CompassRef::North)).unwrap();
        assert!((signed + 74.0060).abs() < 1e-9);

        // And a redundant W ref must not double-negate.
        let coord = normalize_coordinate(&RawValue::Text("74.0060 W".to_string()));
        let signed = apply_reference(coord, Some(CompassRef::West)).unwrap();
        assert!((signed + 74.0060).abs() < 1e-9);
    }

    #[test]
    fn absent_magnitude_stays_absent() {
        assert_eq!(apply_reference(None, Some(CompassRef::South)), None);
    }

    // =========================================================================
    // Reference parsing
    // =========================================================================

    #[test]
    fn compass_ref_parses_letters_case_insensitively() {
        assert_eq!(
            CompassRef::parse(&RawValue::Text("n".to_string())),
            Some(CompassRef::North)
        );
        assert_eq!(
            CompassRef::parse(&RawValue::Text("West".to_string())),
            Some(CompassRef::West)
        );
    }

    #[test]
    fn compass_ref_rejects_non_text() {
        assert_eq!(CompassRef::parse(&RawValue::Number(1.0)), None);
    }

    // =========================================================================
    // Timestamps
    // =========================================================================

    #[test]
    fn exif_datetime_layout_parses() {
        let parsed =
            parse_exif_datetime(&RawValue::Text("2023:05:14 10:22:00".to_string())).unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2023, 5, 14)
                .unwrap()
                .and_hms_opt(10, 22, 0)
                .unwrap()
        );
    }

    #[test]
    fn bare_exif_date_gets_midnight() {
        let parsed = parse_exif_datetime(&RawValue::Text("2023:05:14".to_string())).unwrap();
        assert_eq!(
            parsed,
            NaiveDate::from_ymd_opt(2023, 5, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn decoder_parsed_instant_passes_through() {
        let dt = NaiveDate::from_ymd_opt(2021, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(parse_exif_datetime(&RawValue::DateTime(dt)), Some(dt));
    }

    #[test]
    fn invalid_datetime_text_is_absent() {
        assert_eq!(
            parse_exif_datetime(&RawValue::Text("not a date".to_string())),
            None
        );
        assert_eq!(
            parse_exif_datetime(&RawValue::Text("2023:13:45 99:99:99".to_string())),
            None
        );
        assert_eq!(parse_exif_datetime(&RawValue::Number(1684059720.0)), None);
    }

    #[test]
    fn capture_time_formatting() {
        let dt = NaiveDate::from_ymd_opt(2023, 5, 14)
            .unwrap()
            .and_hms_opt(10, 22, 0)
            .unwrap();
        assert_eq!(format_capture_time(&dt), "14 May 2023, 10:22");

        let single_digit_day = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(7, 5, 0)
            .unwrap();
        assert_eq!(format_capture_time(&single_digit_day), "3 Jan 2024, 07:05");
    }
}
