//! Test fixtures: representative payloads from api.weather.gov and the
//! ArcGIS geocoder.
//!
//! Structurally complete but trimmed to the fields the parsers read. The
//! alert payloads are GeoJSON FeatureCollections as returned by
//!   https://api.weather.gov/alerts/active/zone/{zoneId}
//!
//! Alert feature shape:
//!   features[].properties
//!     .id                           — urn:oid string, dedupe key
//!     .event / .headline / .description / .instruction (nullable)
//!     .severity / .urgency / .certainty — CAP vocabulary strings
//!     .onset / .expires             — ISO 8601 with offset (nullable)
//!     .affectedZones[]              — zone resource URLs
//!     .geocode.SAME[] / .geocode.UGC[]
//!
//! Expiration times are far in the future (2099) unless a fixture is
//! specifically about expired alerts, so tests do not rot.

/// `/points/40.6936,-89.5890` (Peoria, IL): forecast zone ILZ032, county ILC143.
#[cfg(test)]
pub(crate) fn fixture_points_json() -> &'static str {
    r#"{
      "id": "https://api.weather.gov/points/40.6936,-89.589",
      "type": "Feature",
      "properties": {
        "cwa": "ILX",
        "gridId": "ILX",
        "forecastZone": "https://api.weather.gov/zones/forecast/ILZ032",
        "county": "https://api.weather.gov/zones/county/ILC143",
        "fireWeatherZone": "https://api.weather.gov/zones/fire/ILZ032",
        "timeZone": "America/Chicago"
      }
    }"#
}

/// Offshore point: the provider answers but links no zones.
#[cfg(test)]
pub(crate) fn fixture_points_missing_zones_json() -> &'static str {
    r#"{
      "type": "Feature",
      "properties": { "cwa": null, "forecastZone": null, "county": null }
    }"#
}

/// Forecast zone ILZ032: a Flood Warning (Severe/Expected/Likely) and a
/// Wind Advisory (Moderate/Expected/Likely).
#[cfg(test)]
pub(crate) fn fixture_zone_alerts_json() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.flood.1",
          "type": "Feature",
          "properties": {
            "id": "urn:oid:2.49.0.1.840.0.flood.1",
            "affectedZones": [
              "https://api.weather.gov/zones/forecast/ILZ032",
              "https://api.weather.gov/zones/county/ILC143"
            ],
            "geocode": { "SAME": ["017143"], "UGC": ["ILZ032", "ILC143"] },
            "onset": "2099-05-01T12:00:00-05:00",
            "expires": "2099-05-03T12:00:00-05:00",
            "severity": "Severe",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Flood Warning",
            "headline": "Flood Warning issued for the Illinois River at Peoria",
            "description": "The Illinois River at Peoria is expected to rise above flood stage.",
            "instruction": "Turn around, don't drown."
          }
        },
        {
          "id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1.840.0.wind.2",
          "type": "Feature",
          "properties": {
            "id": "urn:oid:2.49.0.1.840.0.wind.2",
            "affectedZones": ["https://api.weather.gov/zones/forecast/ILZ032"],
            "geocode": { "SAME": ["017143"], "UGC": ["ILZ032"] },
            "onset": "2099-05-01T18:00:00-05:00",
            "expires": "2099-05-02T06:00:00-05:00",
            "severity": "Moderate",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Wind Advisory",
            "headline": "Wind Advisory issued for Peoria County",
            "description": "West winds 25 to 35 mph with gusts up to 50 mph.",
            "instruction": null
          }
        }
      ]
    }"#
}

/// County ILC143: repeats the Flood Warning from the zone feed and adds a
/// Frost Advisory.
#[cfg(test)]
pub(crate) fn fixture_county_alerts_json() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:2.49.0.1.840.0.flood.1",
            "geocode": { "SAME": ["017143"], "UGC": ["ILZ032", "ILC143"] },
            "onset": "2099-05-01T12:00:00-05:00",
            "expires": "2099-05-03T12:00:00-05:00",
            "severity": "Severe",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Flood Warning",
            "headline": "Flood Warning issued for the Illinois River at Peoria",
            "description": "The Illinois River at Peoria is expected to rise above flood stage.",
            "instruction": "Turn around, don't drown."
          }
        },
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:2.49.0.1.840.0.frost.3",
            "geocode": { "SAME": ["017143"], "UGC": ["ILC143"] },
            "onset": null,
            "expires": "2099-05-02T09:00:00-05:00",
            "severity": "Minor",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Frost Advisory",
            "headline": "Frost Advisory issued for Peoria County",
            "description": "Temperatures as low as 32 will result in frost formation.",
            "instruction": "Take steps now to protect tender plants from the cold."
          }
        }
      ]
    }"#
}

/// One good record, one without `properties`, one without an `id`, and one
/// whose `expires` is garbage. Two records survive parsing.
#[cfg(test)]
pub(crate) fn fixture_alerts_with_malformed_records_json() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:good.1",
            "expires": "2099-01-01T00:00:00+00:00",
            "severity": "Extreme",
            "certainty": "Observed",
            "urgency": "Immediate",
            "event": "Tornado Warning",
            "headline": "Tornado Warning"
          }
        },
        { "type": "Feature" },
        { "type": "Feature", "properties": { "event": "Nameless" } },
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:badexpiry.2",
            "expires": "next tuesday",
            "onset": "also not a date",
            "severity": "bogus",
            "certainty": "Possible",
            "urgency": "Future",
            "event": "Special Weather Statement"
          }
        }
      ]
    }"#
}

/// Statewide `/alerts/active/area/IL` feed: only the first alert covers
/// ILZ032, the second is for Cook County.
#[cfg(test)]
pub(crate) fn fixture_area_alerts_json() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:area.heat.10",
            "affectedZones": ["https://api.weather.gov/zones/forecast/ILZ032"],
            "geocode": { "SAME": ["017143"], "UGC": ["ILZ029", "ILZ032"] },
            "expires": "2099-07-01T20:00:00-05:00",
            "severity": "Moderate",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Heat Advisory",
            "headline": "Heat Advisory issued for central Illinois"
          }
        },
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:area.lakeshore.11",
            "affectedZones": ["https://api.weather.gov/zones/forecast/ILZ014"],
            "geocode": { "SAME": ["017031"], "UGC": ["ILZ014"] },
            "expires": "2099-07-01T20:00:00-05:00",
            "severity": "Severe",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Lakeshore Flood Warning",
            "headline": "Lakeshore Flood Warning issued for Cook County"
          }
        }
      ]
    }"#
}

/// National `/alerts/active` feed, matched by SAME code.
#[cfg(test)]
pub(crate) fn fixture_national_alerts_json() -> &'static str {
    r#"{
      "type": "FeatureCollection",
      "features": [
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:national.sc.20",
            "geocode": { "SAME": ["045019"], "UGC": ["SCZ050"] },
            "expires": "2099-09-10T08:00:00-04:00",
            "severity": "Extreme",
            "certainty": "Likely",
            "urgency": "Immediate",
            "event": "Hurricane Warning",
            "headline": "Hurricane Warning issued for Charleston County"
          }
        },
        {
          "type": "Feature",
          "properties": {
            "id": "urn:oid:national.tx.21",
            "geocode": { "SAME": ["048201"], "UGC": ["TXZ213"] },
            "expires": "2099-09-10T08:00:00-05:00",
            "severity": "Severe",
            "certainty": "Likely",
            "urgency": "Expected",
            "event": "Flash Flood Warning",
            "headline": "Flash Flood Warning issued for Harris County"
          }
        }
      ]
    }"#
}

#[cfg(test)]
pub(crate) fn fixture_empty_alerts_json() -> &'static str {
    r#"{ "type": "FeatureCollection", "features": [], "title": "Current watches, warnings, and advisories" }"#
}

/// ArcGIS `findAddressCandidates` for "Peoria, IL".
#[cfg(test)]
pub(crate) fn fixture_geocode_json() -> &'static str {
    r#"{
      "spatialReference": { "wkid": 4326, "latestWkid": 4326 },
      "candidates": [
        {
          "address": "Peoria, Illinois",
          "location": { "x": -89.58899, "y": 40.69365 },
          "score": 100,
          "attributes": { "Match_addr": "Peoria, Illinois" }
        },
        {
          "address": "Peoria, Arizona",
          "location": { "x": -112.2374, "y": 33.5806 },
          "score": 88,
          "attributes": { "Match_addr": "Peoria, Arizona" }
        }
      ]
    }"#
}

#[cfg(test)]
pub(crate) fn fixture_geocode_empty_json() -> &'static str {
    r#"{ "spatialReference": { "wkid": 4326, "latestWkid": 4326 }, "candidates": [] }"#
}
