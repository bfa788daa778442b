//! Metadata decoding: image bytes → loosely-typed [`RawRecord`].
//!
//! This is the adapter in front of the normalization engine. The heavy
//! lifting — TIFF/IFD tag decoding — is delegated to `kamadak-exif`; XMP
//! packets embedded in JPEG APP1 segments are located by a marker walk and
//! parsed with `quick-xml`. The output is deliberately loose: a flat field
//! map plus conventional sub-records, leaving all shape interpretation to
//! the extractor.
//!
//! The decoder also pre-resolves a signed GPS pair from the GPS IFD's
//! rational triples and reference letters when both axes are present. That
//! pair is authoritative when it exists; the extractor falls back to the
//! record's fields otherwise.
//!
//! An image with no embedded metadata decodes to an *empty record*. Only a
//! container that cannot be parsed at all raises [`DecodeError`], so callers
//! can distinguish "no metadata" from "unreadable file."

use crate::record::{FieldMap, RawRecord, RawValue, ResolvedGps};
use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("unreadable image container: {0}")]
    Unreadable(String),
}

/// Decoder output: the raw record plus the pre-resolved GPS pair, if any.
#[derive(Debug, Clone, Default)]
pub struct DecodedMetadata {
    pub record: RawRecord,
    pub gps: Option<ResolvedGps>,
}

/// XMP packets in JPEG APP1 segments announce themselves with this URI.
const XMP_MARKER: &[u8] = b"http://ns.adobe.com/xap/1.0/";

/// Decode embedded metadata from JPEG or PNG bytes.
pub fn decode(bytes: &[u8]) -> Result<DecodedMetadata, DecodeError> {
    let mut decoded = DecodedMetadata::default();

    match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => {
            populate_exif_fields(&exif, &mut decoded.record.root);
            decoded.gps = resolve_gps(&exif);
        }
        // A readable image without EXIF is an empty record, not a failure.
        Err(exif::Error::NotFound(_)) | Err(exif::Error::BlankValue(_)) => {}
        Err(err) => return Err(DecodeError::Unreadable(err.to_string())),
    }

    if let Some(packet) = find_xmp_packet(bytes) {
        for (key, value) in parse_xmp_fields(packet) {
            // The XMP sub-record keeps local names ("GPSLatitude"); the root
            // keeps the qualified form ("exif:GPSLatitude"). EXIF-decoded
            // values already in the root take priority.
            if let Some((_, local)) = key.split_once(':') {
                decoded
                    .record
                    .xmp
                    .entry(local.to_string())
                    .or_insert_with(|| value.clone());
            }
            decoded.record.root.entry(key).or_insert(value);
        }
    }

    Ok(decoded)
}

/// Convert every primary-IFD field into the flat root map under its tag
/// name. Thumbnail-IFD duplicates are skipped.
fn populate_exif_fields(exif: &exif::Exif, root: &mut FieldMap) {
    for field in exif.fields() {
        if field.ifd_num != exif::In::PRIMARY {
            continue;
        }
        let name = field.tag.to_string();
        // Unknown tags render as "Tag(Context, NNNN)" — nothing downstream
        // can key on those.
        if name.starts_with("Tag(") {
            continue;
        }
        if let Some(value) = convert_value(&name, &field.value) {
            root.insert(name, value);
        }
    }
}

fn is_datetime_tag(name: &str) -> bool {
    matches!(name, "DateTimeOriginal" | "DateTimeDigitized" | "DateTime")
}

/// EXIF value → [`RawValue`], preserving the shape the tag actually used.
fn convert_value(tag_name: &str, value: &exif::Value) -> Option<RawValue> {
    use exif::Value;
    match value {
        Value::Ascii(lines) => {
            let text = lines
                .iter()
                .map(|line| String::from_utf8_lossy(line))
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }
            if is_datetime_tag(tag_name)
                && let Some(instant) = parse_ascii_datetime(lines)
            {
                return Some(RawValue::DateTime(instant));
            }
            Some(RawValue::Text(text))
        }
        Value::Byte(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::Short(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::Long(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::SByte(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::SShort(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::SLong(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::Float(v) => numbers(v.iter().map(|&n| f64::from(n))),
        Value::Double(v) => numbers(v.iter().copied()),
        Value::Rational(v) => ratios(v.iter().map(|r| (f64::from(r.num), f64::from(r.denom)))),
        Value::SRational(v) => ratios(v.iter().map(|r| (f64::from(r.num), f64::from(r.denom)))),
        _ => None,
    }
}

fn numbers(values: impl Iterator<Item = f64>) -> Option<RawValue> {
    let mut collected: Vec<RawValue> = values.map(RawValue::Number).collect();
    match collected.len() {
        0 => None,
        1 => collected.pop(),
        _ => Some(RawValue::Sequence(collected)),
    }
}

fn ratios(values: impl Iterator<Item = (f64, f64)>) -> Option<RawValue> {
    let mut collected: Vec<RawValue> = values
        .map(|(numerator, denominator)| RawValue::Ratio {
            numerator,
            denominator,
        })
        .collect();
    match collected.len() {
        0 => None,
        1 => collected.pop(),
        _ => Some(RawValue::Sequence(collected)),
    }
}

/// Parse an Ascii datetime field through the EXIF library's own parser, so
/// the record carries a real instant instead of a string when possible.
fn parse_ascii_datetime(lines: &[Vec<u8>]) -> Option<chrono::NaiveDateTime> {
    let line = lines.iter().find(|line| !line.is_empty())?;
    let parsed = exif::DateTime::from_ascii(line).ok()?;
    NaiveDate::from_ymd_opt(
        i32::from(parsed.year),
        u32::from(parsed.month),
        u32::from(parsed.day),
    )?
    .and_hms_opt(
        u32::from(parsed.hour),
        u32::from(parsed.minute),
        u32::from(parsed.second),
    )
}

/// Signed decimal pair from the GPS IFD, when both axes resolve.
fn resolve_gps(exif: &exif::Exif) -> Option<ResolvedGps> {
    let latitude = axis_degrees(exif, exif::Tag::GPSLatitude, exif::Tag::GPSLatitudeRef, 'S')?;
    let longitude = axis_degrees(
        exif,
        exif::Tag::GPSLongitude,
        exif::Tag::GPSLongitudeRef,
        'W',
    )?;
    Some(ResolvedGps {
        latitude,
        longitude,
    })
}

fn axis_degrees(
    exif: &exif::Exif,
    tag: exif::Tag,
    ref_tag: exif::Tag,
    negative: char,
) -> Option<f64> {
    let field = exif.get_field(tag, exif::In::PRIMARY)?;
    let magnitude = rational_degrees(&field.value)?;
    let reference = exif.get_field(ref_tag, exif::In::PRIMARY)?;
    let reference = reference.display_value().to_string();
    let signed = if reference.contains(negative) {
        -magnitude
    } else {
        magnitude
    };
    signed.is_finite().then_some(signed)
}

/// Degrees from a GPS rational: a full [d, m, s] triple, a [d, m] pair, or
/// a single pre-combined rational.
fn rational_degrees(value: &exif::Value) -> Option<f64> {
    let rationals = match value {
        exif::Value::Rational(rationals) if !rationals.is_empty() => rationals,
        _ => return None,
    };
    let degrees = match rationals.len() {
        1 => rationals[0].to_f64(),
        2 => rationals[0].to_f64() + rationals[1].to_f64() / 60.0,
        _ => {
            rationals[0].to_f64()
                + rationals[1].to_f64() / 60.0
                + rationals[2].to_f64() / 3600.0
        }
    };
    degrees.is_finite().then_some(degrees)
}

/// Walk JPEG segments for an APP1 XMP packet. Returns the XML payload.
///
/// Stops at start-of-scan — metadata segments precede entropy-coded data.
fn find_xmp_packet(bytes: &[u8]) -> Option<&[u8]> {
    if bytes.len() < 4 || bytes[0..2] != [0xFF, 0xD8] {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        match marker {
            0xD8 | 0x00 => {
                i += 2;
            }
            0xD0..=0xD7 => {
                i += 2;
            }
            0xD9 | 0xDA => return None,
            _ => {
                let length = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
                if length < 2 || i + 2 + length > bytes.len() {
                    return None;
                }
                let segment = &bytes[i + 4..i + 2 + length];
                if marker == 0xE1
                    && segment.len() > XMP_MARKER.len()
                    && segment.starts_with(XMP_MARKER)
                    && segment[XMP_MARKER.len()] == 0
                {
                    return Some(&segment[XMP_MARKER.len() + 1..]);
                }
                i += 2 + length;
            }
        }
    }
    None
}

/// Namespaced metadata properties from an XMP packet, both attribute-style
/// (`<rdf:Description exif:GPSLatitude="…">`) and element-style
/// (`<exif:GPSLatitude>…</exif:GPSLatitude>`).
fn parse_xmp_fields(xmp: &[u8]) -> FieldMap {
    let mut fields = FieldMap::new();
    let mut reader = Reader::from_reader(xmp);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current_element: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                for attr in e.attributes().flatten() {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                    if !is_metadata_key(&key) {
                        continue;
                    }
                    if let Ok(value) = attr.unescape_value() {
                        let value = value.trim().to_string();
                        if !value.is_empty() {
                            fields.insert(key, RawValue::Text(value));
                        }
                    }
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                current_element = is_metadata_key(&name).then_some(name);
            }
            Ok(Event::Text(ref t)) => {
                if let Some(name) = current_element.take()
                    && let Ok(text) = t.unescape()
                {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        fields.entry(name).or_insert(RawValue::Text(text));
                    }
                }
            }
            Ok(Event::End(_)) => current_element = None,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }
    fields
}

/// Only well-known metadata namespaces are harvested; `xmlns:` declarations
/// and RDF structure attributes are not field data.
fn is_metadata_key(key: &str) -> bool {
    let Some((prefix, local)) = key.split_once(':') else {
        return false;
    };
    !local.is_empty() && matches!(prefix, "exif" | "tiff" | "xmp" | "photoshop" | "dc")
}
