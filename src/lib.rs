//! weatherbox: most-important weather alert for a US location.
//!
//! # Module structure
//!
//! ```text
//! weatherbox
//! ├── model       — shared data types (Coordinates, WeatherAlert, AlertError, …)
//! ├── config      — service configuration loader (weatherbox.toml)
//! ├── ingest
//! │   ├── geocode — ArcGIS geocoder: city/state → coordinates
//! │   ├── nws     — api.weather.gov: zones + alerts with endpoint fallback
//! │   └── fixtures (test only) — representative API response payloads
//! ├── alert
//! │   ├── parse   — provider records → classified alerts
//! │   └── select  — expiry filtering and importance ranking
//! ├── service     — public operations (geocode → fetch → select)
//! └── endpoint    — HTTP API: GET /weather-alert/{state}/{city}
//! ```

// Public modules
pub mod alert;
pub mod config;
pub mod endpoint;
pub mod ingest;
pub mod model;
pub mod service;

pub use model::{AlertError, Certainty, Coordinates, Severity, Urgency, WeatherAlert, ZoneIdentifiers};
pub use service::WeatherAlertService;
