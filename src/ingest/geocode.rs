//! ArcGIS World Geocoding Service client.
//!
//! Resolves a free-text "city, state" to a WGS84 point using
//!   {base}/findAddressCandidates?SingleLine=...&f=json&maxLocations=1
//!
//! State may be a full name or a postal abbreviation; disambiguation is left
//! to the provider. One request per call, no retry.

use crate::model::{AlertError, Coordinates};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Serde structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CandidatesResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    location: CandidateLocation,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Deserialize)]
struct CandidateLocation {
    x: f64,
    y: f64,
}

// ---------------------------------------------------------------------------
// URL construction and parsing
// ---------------------------------------------------------------------------

/// Builds the candidate lookup URL for `"{city}, {state}"`.
pub fn build_geocode_url(base_url: &str, city: &str, state: &str) -> String {
    let single_line = format!("{}, {}", city, state);
    format!(
        "{}/findAddressCandidates?SingleLine={}&f=json&maxLocations=1&outFields=Match_addr",
        base_url,
        urlencoding::encode(&single_line)
    )
}

/// Parses a `findAddressCandidates` body. The first candidate is the
/// provider's best match.
///
/// # Errors
/// `LocationNotFound` for an empty candidate list, a malformed body, or a
/// candidate outside the valid coordinate range.
pub fn parse_geocode_response(json: &str, location: &str) -> Result<Coordinates, AlertError> {
    let response: CandidatesResponse = serde_json::from_str(json).map_err(|e| {
        AlertError::LocationNotFound(format!("{} (malformed geocoder response: {})", location, e))
    })?;

    let best = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AlertError::LocationNotFound(location.to_string()))?;

    debug!("Best geocode candidate for {} scored {:?}", location, best.score);

    // ArcGIS reports x = longitude, y = latitude.
    Coordinates::new(best.location.y, best.location.x)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolves `city`, `state` to coordinates.
    ///
    /// # Errors
    /// - `InvalidLocation` if either part is blank after trimming.
    /// - `LocationNotFound` if the provider has no usable match.
    /// - `ProviderUnavailable` on network failure, timeout or non-2xx.
    pub fn resolve(&self, city: &str, state: &str) -> Result<Coordinates, AlertError> {
        let (city, state) = (city.trim(), state.trim());
        if city.is_empty() || state.is_empty() {
            return Err(AlertError::InvalidLocation(
                "city and state must both be non-empty".to_string(),
            ));
        }

        let location = format!("{}, {}", city, state);
        let url = build_geocode_url(&self.base_url, city, state);
        info!("Getting coordinates for {}", location);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| AlertError::ProviderUnavailable(format!("geocoder request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AlertError::ProviderUnavailable(format!(
                "geocoder returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .map_err(|e| AlertError::ProviderUnavailable(format!("geocoder body unreadable: {}", e)))?;

        parse_geocode_response(&body, &location)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
