//! Shared data types for the weather alert engine.
//!
//! Everything here is plain data: coordinates, the zone identifiers that
//! cover them, the classified `WeatherAlert`, and the `AlertError` taxonomy
//! returned by every public operation.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error kinds surfaced by the alert engine.
///
/// `InvalidLocation` and `LocationNotFound` are caller problems. The
/// provider variants are upstream problems and are logged with enough detail
/// to tell them apart from bugs. `Parse` only ever describes a single record
/// and is absorbed by the ingest layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlertError {
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("could not determine coordinates for {0}")]
    LocationNotFound(String),

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("zone lookup failed for {coordinates}: {reason}")]
    ZoneLookupFailed {
        coordinates: Coordinates,
        reason: String,
    },

    #[error("all alert endpoints failed for [{}]", .identifiers.join(", "))]
    AllEndpointsFailed {
        identifiers: Vec<String>,
        last_error: Option<String>,
    },

    #[error("malformed alert record: {0}")]
    Parse(String),
}

impl AlertError {
    /// Short machine-readable name, used in HTTP error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AlertError::InvalidLocation(_) => "InvalidLocation",
            AlertError::LocationNotFound(_) => "LocationNotFound",
            AlertError::ProviderUnavailable(_) => "ProviderUnavailable",
            AlertError::ZoneLookupFailed { .. } => "ZoneLookupFailed",
            AlertError::AllEndpointsFailed { .. } => "AllEndpointsFailed",
            AlertError::Parse(_) => "ParseError",
        }
    }

    /// True when the caller supplied a location we cannot resolve.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AlertError::InvalidLocation(_) | AlertError::LocationNotFound(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Coordinates and zones
// ---------------------------------------------------------------------------

/// WGS84 point. Only constructible with in-range values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AlertError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if !lat_ok || !lon_ok {
            return Err(AlertError::LocationNotFound(format!(
                "coordinates out of range: {}, {}",
                latitude, longitude
            )));
        }

        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Area codes (forecast zone, county) covering a point, in lookup order
/// and without duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneIdentifiers {
    codes: Vec<String>,
}

impl ZoneIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a code unless it is blank or already present.
    pub fn insert(&mut self, code: &str) {
        let code = code.trim();
        if code.is_empty() || self.codes.iter().any(|c| c == code) {
            return;
        }
        self.codes.push(code.to_string());
    }

    /// Adds the identifier at the end of a provider resource URL,
    /// e.g. `https://api.weather.gov/zones/county/ILC143` → `ILC143`.
    pub fn insert_from_url(&mut self, url: &str) {
        if let Some(last) = url.trim_end_matches('/').rsplit('/').next() {
            self.insert(last);
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

fn lookup<T: Copy>(table: &[(&str, T)], value: &str) -> Option<T> {
    let value = value.trim();
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
        .map(|(_, v)| *v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Unknown,
    Minor,
    Moderate,
    Severe,
    Extreme,
}

const SEVERITY_TABLE: &[(&str, Severity)] = &[
    ("unknown", Severity::Unknown),
    ("minor", Severity::Minor),
    ("moderate", Severity::Moderate),
    ("severe", Severity::Severe),
    ("extreme", Severity::Extreme),
];

impl Severity {
    /// Maps provider vocabulary; anything unrecognised is `Unknown`.
    pub fn from_provider(value: &str) -> Self {
        lookup(SEVERITY_TABLE, value).unwrap_or(Severity::Unknown)
    }

    pub const fn rank(self) -> u16 {
        match self {
            Severity::Unknown => 0,
            Severity::Minor => 1,
            Severity::Moderate => 2,
            Severity::Severe => 3,
            Severity::Extreme => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Severity::Unknown => "UNKNOWN",
            Severity::Minor => "MINOR",
            Severity::Moderate => "MODERATE",
            Severity::Severe => "SEVERE",
            Severity::Extreme => "EXTREME",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Unknown,
    Future,
    Expected,
    Immediate,
}

// "Past" is real provider vocabulary but carries no actionability.
const URGENCY_TABLE: &[(&str, Urgency)] = &[
    ("unknown", Urgency::Unknown),
    ("past", Urgency::Unknown),
    ("future", Urgency::Future),
    ("expected", Urgency::Expected),
    ("immediate", Urgency::Immediate),
];

impl Urgency {
    pub fn from_provider(value: &str) -> Self {
        lookup(URGENCY_TABLE, value).unwrap_or(Urgency::Unknown)
    }

    pub const fn rank(self) -> u16 {
        match self {
            Urgency::Unknown => 0,
            Urgency::Future => 1,
            Urgency::Expected => 2,
            Urgency::Immediate => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Urgency::Unknown => "UNKNOWN",
            Urgency::Future => "FUTURE",
            Urgency::Expected => "EXPECTED",
            Urgency::Immediate => "IMMEDIATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Certainty {
    Unknown,
    Unlikely,
    Possible,
    Likely,
    Observed,
}

const CERTAINTY_TABLE: &[(&str, Certainty)] = &[
    ("unknown", Certainty::Unknown),
    ("unlikely", Certainty::Unlikely),
    ("possible", Certainty::Possible),
    ("likely", Certainty::Likely),
    ("observed", Certainty::Observed),
];

impl Certainty {
    pub fn from_provider(value: &str) -> Self {
        lookup(CERTAINTY_TABLE, value).unwrap_or(Certainty::Unknown)
    }

    pub const fn rank(self) -> u16 {
        match self {
            Certainty::Unknown => 0,
            Certainty::Unlikely => 1,
            Certainty::Possible => 2,
            Certainty::Likely => 3,
            Certainty::Observed => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Certainty::Unknown => "UNKNOWN",
            Certainty::Unlikely => "UNLIKELY",
            Certainty::Possible => "POSSIBLE",
            Certainty::Likely => "LIKELY",
            Certainty::Observed => "OBSERVED",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(Severity, Urgency, Certainty);

// ---------------------------------------------------------------------------
// WeatherAlert
// ---------------------------------------------------------------------------

/// One active alert as published by the alerts provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherAlert {
    /// Provider-assigned id; the deduplication key within a fetch.
    pub id: String,
    /// Area codes (zone, county or SAME) whose query returned this alert.
    pub area_codes: Vec<String>,
    pub event: String,
    pub headline: String,
    pub description: String,
    pub instruction: String,
    pub severity: Severity,
    pub urgency: Urgency,
    pub certainty: Certainty,
    pub onset: Option<DateTime<Utc>>,
    /// `None` means the alert never expires.
    pub expires: Option<DateTime<Utc>>,
}

impl WeatherAlert {
    /// True iff an expiration is present and `now` is strictly after it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires {
            Some(expires) => now > expires,
            None => false,
        }
    }

    /// `severity*100 + urgency*10 + certainty`, in [0, 434].
    pub fn importance_score(&self) -> u16 {
        self.severity.rank() * 100 + self.urgency.rank() * 10 + self.certainty.rank()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
