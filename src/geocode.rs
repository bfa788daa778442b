//! Reverse geocoding: signed coordinates → display name.
//!
//! A collaborator, not part of the verification core: it runs after
//! extraction, only when a full finite GPS pair exists, and every failure
//! mode — network error, non-success status, malformed body, timeout —
//! degrades to "no name". A check never fails or blocks because a geocoding
//! service is down.

use crate::types::PhotoMetadata;
use serde::Deserialize;
use std::time::Duration;

/// Resolves coordinates to a human-readable place name.
pub trait ReverseGeocoder {
    /// Best-effort lookup; `None` on any failure.
    fn locate(&self, latitude: f64, longitude: f64) -> Option<String>;
}

/// OpenStreetMap Nominatim `reverse` client.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub const DEFAULT_ENDPOINT: &'static str = "https://nominatim.openstreetmap.org/reverse";

    /// Build a client with a hard timeout. Returns `None` when the HTTP
    /// client cannot be constructed (no TLS backend, bad proxy env) — the
    /// caller simply runs without geocoding.
    pub fn new(endpoint: String, timeout: Duration) -> Option<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("photoproof/", env!("CARGO_PKG_VERSION")))
            .build()
            .ok()?;
        Some(Self { client, endpoint })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn locate(&self, latitude: f64, longitude: f64) -> Option<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2"),
                ("zoom", "18"),
                ("addressdetails", "0"),
                ("accept-language", "en"),
            ])
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .ok()?;

        if !response.status().is_success() {
            return None;
        }
        let body: ReverseResponse = response.json().ok()?;
        body.display_name.filter(|name| !name.trim().is_empty())
    }
}

/// Attach a place name when — and only when — both coordinates are present
/// and finite. The metadata is otherwise left unchanged.
pub fn attach_location_name(metadata: &mut PhotoMetadata, geocoder: &dyn ReverseGeocoder) {
    let (Some(latitude), Some(longitude)) = (metadata.gps.latitude, metadata.gps.longitude) else {
        return;
    };
    if !latitude.is_finite() || !longitude.is_finite() {
        return;
    }
    metadata.location_name = geocoder.locate(latitude, longitude);
}
