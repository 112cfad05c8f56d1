//! Classifier: turns provider alert records into `WeatherAlert`s.
//!
//! Parsing happens in two steps. `parse_alert_collection` checks the
//! FeatureCollection envelope (a broken envelope fails the whole endpoint),
//! then each feature is parsed on its own. A feature that is structurally
//! broken is dropped and counted rather than failing its siblings.

use crate::model::{AlertError, Certainty, Severity, Urgency, WeatherAlert};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Serde structures for the alert GeoJSON
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Value>,
}

#[derive(Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Properties {
    id: String,
    event: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    instruction: Option<String>,
    severity: Option<String>,
    urgency: Option<String>,
    certainty: Option<String>,
    onset: Option<String>,
    expires: Option<String>,
    #[serde(default)]
    affected_zones: Option<Vec<String>>,
    #[serde(default)]
    geocode: Option<Geocode>,
}

#[derive(Deserialize, Default)]
struct Geocode {
    #[serde(rename = "SAME", default)]
    same: Option<Vec<String>>,
    #[serde(rename = "UGC", default)]
    ugc: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Structurally valid record
// ---------------------------------------------------------------------------

/// A feature that passed structural parsing, with the area coverage the
/// provider attached to it. Coverage is only used for filtering wide
/// (statewide/national) feeds down to one area code.
#[derive(Debug, Clone)]
pub struct RawAlert {
    alert: WeatherAlert,
    ugc_codes: Vec<String>,
    same_codes: Vec<String>,
}

impl RawAlert {
    pub fn id(&self) -> &str {
        &self.alert.id
    }

    /// True if the record lists `ugc` in `geocode.UGC` or `affectedZones`.
    pub fn covers_ugc(&self, ugc: &str) -> bool {
        self.ugc_codes.iter().any(|c| c.eq_ignore_ascii_case(ugc))
    }

    /// True if the record lists `same` in `geocode.SAME`.
    pub fn covers_same(&self, same: &str) -> bool {
        self.same_codes.iter().any(|c| c == same)
    }

    /// Finishes the alert, tagging it with the area code that fetched it.
    pub fn into_alert(self, area_code: &str) -> WeatherAlert {
        let mut alert = self.alert;
        alert.area_codes = vec![area_code.to_string()];
        alert
    }
}

/// Result of parsing one alerts payload.
#[derive(Debug, Default)]
pub struct ParsedCollection {
    pub records: Vec<RawAlert>,
    /// Features dropped for structural problems.
    pub dropped: usize,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a FeatureCollection body.
///
/// # Errors
/// `AlertError::Parse` if the body is not JSON or has no `features` array.
/// Individual bad features never produce an error here.
pub fn parse_alert_collection(json: &str) -> Result<ParsedCollection, AlertError> {
    let collection: FeatureCollection = serde_json::from_str(json)
        .map_err(|e| AlertError::Parse(format!("alert collection: {}", e)))?;

    let mut parsed = ParsedCollection::default();

    for feature in &collection.features {
        match parse_record(feature) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                debug!("Dropping alert record: {}", e);
                parsed.dropped += 1;
            }
        }
    }

    if parsed.dropped > 0 {
        warn!(
            "Dropped {} of {} malformed alert records",
            parsed.dropped,
            collection.features.len()
        );
    }

    Ok(parsed)
}

/// Parses one alert feature into a `WeatherAlert` tagged with `area_code`.
pub fn parse_alert(feature: &Value, area_code: &str) -> Result<WeatherAlert, AlertError> {
    parse_record(feature).map(|record| record.into_alert(area_code))
}

fn parse_record(feature: &Value) -> Result<RawAlert, AlertError> {
    let feature = Feature::deserialize(feature)
        .map_err(|e| AlertError::Parse(format!("alert feature: {}", e)))?;
    let props = feature.properties;

    if props.id.trim().is_empty() {
        return Err(AlertError::Parse("alert feature has an empty id".to_string()));
    }

    let onset = match props.onset.as_deref() {
        Some(raw) => parse_timestamp(raw)
            .map_err(|e| debug!("Alert {}: ignoring onset: {}", props.id, e))
            .ok(),
        None => None,
    };

    // A bad expiry keeps the alert, as "no expiration".
    let expires = match props.expires.as_deref() {
        Some(raw) => match parse_timestamp(raw) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!("Alert {}: {}; treating as no expiration", props.id, e);
                None
            }
        },
        None => None,
    };

    let geocode = props.geocode.unwrap_or_default();
    let mut ugc_codes = geocode.ugc.unwrap_or_default();
    ugc_codes.extend(
        props
            .affected_zones
            .unwrap_or_default()
            .iter()
            .filter_map(|url| url.trim_end_matches('/').rsplit('/').next())
            .map(str::to_string),
    );

    let alert = WeatherAlert {
        id: props.id,
        area_codes: Vec::new(),
        event: props.event.unwrap_or_default(),
        headline: props.headline.unwrap_or_default(),
        description: props.description.unwrap_or_default(),
        instruction: props.instruction.unwrap_or_default(),
        severity: Severity::from_provider(props.severity.as_deref().unwrap_or("")),
        urgency: Urgency::from_provider(props.urgency.as_deref().unwrap_or("")),
        certainty: Certainty::from_provider(props.certainty.as_deref().unwrap_or("")),
        onset,
        expires,
    };

    Ok(RawAlert {
        alert,
        ugc_codes,
        same_codes: geocode.same.unwrap_or_default(),
    })
}

/// Parses an ISO 8601 timestamp with offset into UTC. A trailing `Z` is
/// accepted.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AlertError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AlertError::Parse(format!("bad timestamp '{}': {}", raw, e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_zone_fixture_classifies_fields() {
        let parsed = parse_alert_collection(fixture_zone_alerts_json()).expect("fixture should parse");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.dropped, 0);

        let flood = parsed.records[0].clone().into_alert("ILZ032");
        assert_eq!(flood.id, "urn:oid:2.49.0.1.840.0.flood.1");
        assert_eq!(flood.event, "Flood Warning");
        assert_eq!(flood.severity, Severity::Severe);
        assert_eq!(flood.urgency, Urgency::Expected);
        assert_eq!(flood.certainty, Certainty::Likely);
        assert_eq!(flood.importance_score(), 323);
        assert_eq!(flood.area_codes, vec!["ILZ032".to_string()]);
        assert_eq!(
            flood.expires,
            Some(Utc.with_ymd_and_hms(2099, 5, 3, 17, 0, 0).unwrap()),
            "offset timestamps are normalised to UTC"
        );
    }

    #[test]
    fn test_null_instruction_defaults_to_empty() {
        let parsed = parse_alert_collection(fixture_zone_alerts_json()).unwrap();
        let wind = parsed.records[1].clone().into_alert("ILZ032");
        assert_eq!(wind.event, "Wind Advisory");
        assert!(wind.instruction.is_empty());
    }

    #[test]
    fn test_malformed_records_are_dropped_and_counted() {
        let parsed = parse_alert_collection(fixture_alerts_with_malformed_records_json())
            .expect("envelope is valid");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.dropped, 2);
    }

    #[test]
    fn test_unparseable_expiration_keeps_alert_without_expiry() {
        let parsed = parse_alert_collection(fixture_alerts_with_malformed_records_json()).unwrap();
        let alert = parsed
            .records
            .into_iter()
            .find(|r| r.id() == "urn:oid:badexpiry.2")
            .expect("alert with bad expiry must survive")
            .into_alert("X");

        assert_eq!(alert.expires, None);
        assert_eq!(alert.onset, None);
        assert_eq!(alert.severity, Severity::Unknown);
        assert!(!alert.is_expired(Utc::now()));
    }

    #[test]
    fn test_broken_envelope_is_an_error() {
        assert!(matches!(
            parse_alert_collection("<html>502 Bad Gateway</html>"),
            Err(AlertError::Parse(_))
        ));
        assert!(parse_alert_collection(r#"{"type": "FeatureCollection"}"#).is_err());
    }

    #[test]
    fn test_coverage_from_geocode_and_affected_zones() {
        let parsed = parse_alert_collection(fixture_area_alerts_json()).unwrap();
        let heat = &parsed.records[0];
        assert!(heat.covers_ugc("ILZ032"));
        assert!(heat.covers_ugc("ilz029"));
        assert!(heat.covers_same("017143"));
        assert!(!heat.covers_ugc("ILZ014"));
    }

    #[test]
    fn test_parse_alert_single_feature() {
        let feature = serde_json::json!({
            "properties": {
                "id": "urn:oid:single",
                "severity": "Minor",
                "urgency": "Future",
                "certainty": "Unlikely",
                "expires": "2030-01-01T00:00:00Z"
            }
        });
        let alert = parse_alert(&feature, "ILC143").expect("feature should parse");
        assert_eq!(alert.importance_score(), 111);
        assert_eq!(alert.headline, "");
        assert_eq!(alert.area_codes, vec!["ILC143".to_string()]);

        let missing = serde_json::json!({ "id": "no-properties" });
        assert!(matches!(parse_alert(&missing, "X"), Err(AlertError::Parse(_))));
    }

    #[test]
    fn test_highest_provider_vocabulary_scores_434() {
        let feature = serde_json::json!({
            "properties": {
                "id": "urn:oid:top",
                "severity": "Extreme",
                "urgency": "Immediate",
                "certainty": "Observed"
            }
        });
        let alert = parse_alert(&feature, "ILZ032").expect("feature should parse");
        assert_eq!(alert.importance_score(), 434);
    }
}
