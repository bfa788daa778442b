//! Shared domain types.
//!
//! These types cross module boundaries and are serialized into the history
//! file and the `--json` report, so their wire shape is part of the durable
//! layout: camelCase keys, optional fields defaulting to absent so that
//! entries written by older builds still load.

use serde::{Deserialize, Serialize};

/// GPS position in signed decimal degrees (positive = N/E, negative = S/W).
///
/// Either component may be individually absent — partial extraction is a
/// legal outcome, not an error. A coordinate of exactly `0.0` is present;
/// absence is only ever `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

impl GpsCoordinates {
    /// Both components present. Finiteness is enforced at extraction time,
    /// so a present component is always a usable number.
    pub fn is_complete(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Human-readable rendering: `"6.50000° N, 3.30000° E"`.
    ///
    /// Returns `None` unless both components are present.
    pub fn format(&self) -> Option<String> {
        let (lat, lon) = (self.latitude?, self.longitude?);
        let lat_dir = if lat >= 0.0 { "N" } else { "S" };
        let lon_dir = if lon >= 0.0 { "E" } else { "W" };
        Some(format!(
            "{:.5}° {}, {:.5}° {}",
            lat.abs(),
            lat_dir,
            lon.abs(),
            lon_dir
        ))
    }
}

/// Coarse summary of which metadata categories were recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completeness {
    Complete,
    Partial,
    Missing,
}

impl Completeness {
    pub fn label(&self) -> &'static str {
        match self {
            Completeness::Complete => "Complete",
            Completeness::Partial => "Partial",
            Completeness::Missing => "Missing",
        }
    }
}

/// Normalized metadata for one photograph.
///
/// Every field degrades independently to absent; a sparse value is always
/// well-formed. Completeness is derived via [`PhotoMetadata::completeness`]
/// and never stored, so it cannot drift from the fields it summarizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    /// Capture instant, formatted for display ("14 May 2023, 10:22").
    #[serde(default)]
    pub capture_time: Option<String>,
    #[serde(default)]
    pub gps: GpsCoordinates,
    /// Trimmed `"{Make} {Model}"` device string.
    #[serde(default)]
    pub device: Option<String>,
    /// Reverse-geocoded place name, attached by the geocode collaborator
    /// after extraction. Older history entries may lack this key entirely.
    #[serde(default)]
    pub location_name: Option<String>,
}

impl PhotoMetadata {
    /// Completeness tier over the three metadata categories
    /// (capture time, GPS pair, device).
    pub fn completeness(&self) -> Completeness {
        let time = self.capture_time.is_some();
        let gps = self.gps.is_complete();
        let device = self.device.is_some();
        match (time, gps, device) {
            (true, true, true) => Completeness::Complete,
            (false, false, false) => Completeness::Missing,
            _ => Completeness::Partial,
        }
    }
}

/// Outward verdict of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Suspicious,
    Reused,
}

impl VerificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Suspicious => "Suspicious",
            VerificationStatus::Reused => "Reused",
        }
    }
}

/// Result of a single diagnostic check (capture time or location).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    Pass,
    Fail,
}

impl CheckOutcome {
    pub fn passed(self) -> bool {
        self == CheckOutcome::Pass
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Pass => "pass",
            CheckOutcome::Fail => "fail",
        }
    }
}

/// Full classification of one submission.
///
/// Invariant: `status == Reused` iff `reused`; otherwise `status` is
/// `Verified` iff both checks pass, else `Suspicious`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub reason: String,
    pub time_check: CheckOutcome,
    pub location_check: CheckOutcome,
    pub reused: bool,
}

/// Legacy history entries occasionally carry coordinates as numeric strings
/// (an artifact of older serializers). Accept number or numeric string and
/// degrade anything else to absent rather than rejecting the whole payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientCoordinate {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<LenientCoordinate>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| match value {
            LenientCoordinate::Number(n) => Some(n),
            LenientCoordinate::Text(s) => s.trim().parse::<f64>().ok(),
            LenientCoordinate::Other(_) => None,
        })
        .filter(|n| n.is_finite()))
}
