//! api.weather.gov alert source.
//!
//! Two query shapes are used:
//!   {base}/points/{lat},{lon}       — forecast zone + county covering a point
//!   {base}/alerts/active/...        — active alerts, several endpoint shapes
//!
//! Every area code is queried on its own worker. For each code an ordered,
//! fixed list of endpoint variants is tried, each at most once, until one
//! returns alerts. A failing code is logged and skipped; only when every
//! code fails does the whole fetch fail.

use crate::alert::parse::{parse_alert_collection, RawAlert};
use crate::ingest::FetchBudget;
use crate::model::{AlertError, Coordinates, WeatherAlert, ZoneIdentifiers};
use log::{debug, error, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use threadpool::ThreadPool;

/// How often the collector re-checks the budget while waiting on workers.
const COLLECT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Points lookup
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PointsResponse {
    properties: PointProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    forecast_zone: Option<String>,
    county: Option<String>,
}

/// `{base}/points/{lat},{lon}` with four decimal places; the provider
/// redirects anything more precise.
pub fn build_points_url(base_url: &str, coordinates: &Coordinates) -> String {
    format!("{}/points/{}", base_url, coordinates)
}

/// Extracts the forecast zone and county codes from a points response, in
/// that order.
pub fn parse_points_response(json: &str) -> Result<ZoneIdentifiers, String> {
    let response: PointsResponse =
        serde_json::from_str(json).map_err(|e| format!("malformed points response: {}", e))?;

    let mut ids = ZoneIdentifiers::new();
    for url in [&response.properties.forecast_zone, &response.properties.county]
        .into_iter()
        .flatten()
    {
        ids.insert_from_url(url);
    }

    if ids.is_empty() {
        return Err("points response names no forecast zone or county".to_string());
    }
    Ok(ids)
}

// ---------------------------------------------------------------------------
// Area codes
// ---------------------------------------------------------------------------

/// State FIPS → USPS code, for translating SAME codes to county UGC codes.
const STATE_FIPS: &[(&str, &str)] = &[
    ("01", "AL"), ("02", "AK"), ("04", "AZ"), ("05", "AR"), ("06", "CA"),
    ("08", "CO"), ("09", "CT"), ("10", "DE"), ("11", "DC"), ("12", "FL"),
    ("13", "GA"), ("15", "HI"), ("16", "ID"), ("17", "IL"), ("18", "IN"),
    ("19", "IA"), ("20", "KS"), ("21", "KY"), ("22", "LA"), ("23", "ME"),
    ("24", "MD"), ("25", "MA"), ("26", "MI"), ("27", "MN"), ("28", "MS"),
    ("29", "MO"), ("30", "MT"), ("31", "NE"), ("32", "NV"), ("33", "NH"),
    ("34", "NJ"), ("35", "NM"), ("36", "NY"), ("37", "NC"), ("38", "ND"),
    ("39", "OH"), ("40", "OK"), ("41", "OR"), ("42", "PA"), ("44", "RI"),
    ("45", "SC"), ("46", "SD"), ("47", "TN"), ("48", "TX"), ("49", "UT"),
    ("50", "VT"), ("51", "VA"), ("53", "WA"), ("54", "WV"), ("55", "WI"),
    ("56", "WY"), ("60", "AS"), ("66", "GU"), ("69", "MP"), ("72", "PR"),
    ("78", "VI"),
];

/// A query key, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaCode {
    /// NWS UGC code: two letters, `Z` or `C`, three digits (`ILZ032`).
    Ugc(String),
    /// Six-digit SAME code (`PSSCCC`) and, when the state is known, the
    /// matching county UGC code.
    Same { code: String, county_ugc: Option<String> },
    /// Anything else. No endpoint variant applies.
    Other(String),
}

impl AreaCode {
    pub fn parse(raw: &str) -> Self {
        let code = raw.trim().to_ascii_uppercase();
        let bytes = code.as_bytes();

        let is_ugc = bytes.len() == 6
            && bytes[..2].iter().all(u8::is_ascii_alphabetic)
            && matches!(bytes[2], b'Z' | b'C')
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if is_ugc {
            return AreaCode::Ugc(code);
        }

        if bytes.len() == 6 && bytes.iter().all(u8::is_ascii_digit) {
            let county_ugc = STATE_FIPS
                .iter()
                .find(|(fips, _)| *fips == &code[1..3])
                .map(|(_, usps)| format!("{}C{}", usps, &code[3..]));
            return AreaCode::Same { code, county_ugc };
        }

        AreaCode::Other(code)
    }

    /// UGC code usable with the zone-shaped endpoints.
    pub fn ugc(&self) -> Option<&str> {
        match self {
            AreaCode::Ugc(code) => Some(code),
            AreaCode::Same { county_ugc, .. } => county_ugc.as_deref(),
            AreaCode::Other(_) => None,
        }
    }

    pub fn same(&self) -> Option<&str> {
        match self {
            AreaCode::Same { code, .. } => Some(code),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint variants
// ---------------------------------------------------------------------------

/// One shape of alerts query. `VARIANT_CHAIN` fixes the order they are
/// tried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointVariant {
    /// `/alerts/active/zone/{ugc}`
    ZonePath,
    /// `/alerts/active?zone={ugc}`
    ZoneParam,
    /// `/alerts/active/area/{state}`, filtered to the UGC code
    AreaFiltered,
    /// `/alerts/active`, filtered to the SAME code
    SameFiltered,
}

pub const VARIANT_CHAIN: [EndpointVariant; 4] = [
    EndpointVariant::ZonePath,
    EndpointVariant::ZoneParam,
    EndpointVariant::AreaFiltered,
    EndpointVariant::SameFiltered,
];

/// Which records of a response belong to the area being queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Ugc(String),
    Same(String),
}

impl RecordFilter {
    fn keeps(&self, record: &RawAlert) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Ugc(ugc) => record.covers_ugc(ugc),
            RecordFilter::Same(same) => record.covers_same(same),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertQuery {
    pub variant: EndpointVariant,
    pub url: String,
    pub filter: RecordFilter,
}

impl EndpointVariant {
    /// Builds the request for `area`, or `None` if this shape does not apply
    /// to it.
    pub fn build(self, base_url: &str, area: &AreaCode) -> Option<AlertQuery> {
        let (url, filter) = match self {
            EndpointVariant::ZonePath => {
                let ugc = area.ugc()?;
                (format!("{}/alerts/active/zone/{}", base_url, ugc), RecordFilter::All)
            }
            EndpointVariant::ZoneParam => {
                let ugc = area.ugc()?;
                (format!("{}/alerts/active?zone={}", base_url, ugc), RecordFilter::All)
            }
            EndpointVariant::AreaFiltered => {
                let ugc = area.ugc()?;
                (
                    format!("{}/alerts/active/area/{}", base_url, &ugc[..2]),
                    RecordFilter::Ugc(ugc.to_string()),
                )
            }
            EndpointVariant::SameFiltered => {
                let same = area.same()?;
                (
                    format!("{}/alerts/active", base_url),
                    RecordFilter::Same(same.to_string()),
                )
            }
        };

        Some(AlertQuery {
            variant: self,
            url,
            filter,
        })
    }
}

// ---------------------------------------------------------------------------
// Single area code
// ---------------------------------------------------------------------------

/// Alerts retrieved for one area code.
#[derive(Debug, Clone, Default)]
pub struct AreaAlerts {
    pub alerts: Vec<WeatherAlert>,
    pub dropped_records: usize,
}

fn run_query(client: &Client, query: &AlertQuery) -> Result<(Vec<RawAlert>, usize), AlertError> {
    let response = client
        .get(&query.url)
        .send()
        .map_err(|e| AlertError::ProviderUnavailable(format!("{}: {}", query.url, e)))?;

    if !response.status().is_success() {
        return Err(AlertError::ProviderUnavailable(format!(
            "{} returned {}",
            query.url,
            response.status()
        )));
    }

    let body = response
        .text()
        .map_err(|e| AlertError::ProviderUnavailable(format!("{}: {}", query.url, e)))?;
    let parsed = parse_alert_collection(&body)?;

    let records = parsed
        .records
        .into_iter()
        .filter(|r| query.filter.keeps(r))
        .collect();
    Ok((records, parsed.dropped))
}

/// Walks `VARIANT_CHAIN` for one area code until a variant returns alerts.
///
/// A variant that succeeds with zero alerts still counts: if nothing better
/// turns up, the code succeeds with an empty list. The code only fails when
/// no applicable variant succeeded at all.
pub fn fetch_area_alerts(client: &Client, base_url: &str, code: &str) -> Result<AreaAlerts, AlertError> {
    let area = AreaCode::parse(code);
    let mut empty_success = false;
    let mut dropped_records = 0;
    let mut last_error = None;

    for variant in VARIANT_CHAIN {
        let Some(query) = variant.build(base_url, &area) else {
            continue;
        };

        info!("Trying endpoint: {}", query.url);
        match run_query(client, &query) {
            Ok((records, dropped)) => {
                dropped_records += dropped;
                if !records.is_empty() {
                    let alerts = records.into_iter().map(|r| r.into_alert(code)).collect();
                    return Ok(AreaAlerts {
                        alerts,
                        dropped_records,
                    });
                }
                debug!("{:?} returned no alerts for {}", variant, code);
                empty_success = true;
            }
            Err(e) => {
                warn!("Failed to fetch alerts from {}: {}", query.url, e);
                last_error = Some(e);
            }
        }
    }

    if empty_success {
        return Ok(AreaAlerts {
            alerts: Vec::new(),
            dropped_records,
        });
    }

    Err(last_error.unwrap_or_else(|| {
        AlertError::ProviderUnavailable(format!("no endpoint variant applies to area code '{}'", code))
    }))
}

// ---------------------------------------------------------------------------
// Multi-code fetch
// ---------------------------------------------------------------------------

/// Combined result of querying several area codes.
#[derive(Debug, Clone, Default)]
pub struct AlertFetch {
    /// Union of all successful codes, deduplicated by alert id. Order is
    /// code order, then provider order.
    pub alerts: Vec<WeatherAlert>,
    /// Alerts per successful code, before deduplication.
    pub by_area: BTreeMap<String, Vec<WeatherAlert>>,
    /// Codes that failed or did not finish within the budget.
    pub failed: Vec<String>,
    pub dropped_records: usize,
}

/// Merges per-code results, keeping the first copy of each alert id and
/// recording every area code that returned it.
fn dedupe_alerts<'a>(per_area: impl IntoIterator<Item = &'a Vec<WeatherAlert>>) -> Vec<WeatherAlert> {
    let mut merged: Vec<WeatherAlert> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for alerts in per_area {
        for alert in alerts {
            match index_by_id.get(&alert.id) {
                Some(&i) => {
                    for code in &alert.area_codes {
                        if !merged[i].area_codes.contains(code) {
                            merged[i].area_codes.push(code.clone());
                        }
                    }
                }
                None => {
                    index_by_id.insert(alert.id.clone(), merged.len());
                    merged.push(alert.clone());
                }
            }
        }
    }

    merged
}

type WorkerResult = (usize, Result<AreaAlerts, AlertError>);

pub struct AlertSource {
    client: Client,
    base_url: String,
    max_workers: usize,
}

impl AlertSource {
    pub fn new(client: Client, base_url: &str, max_workers: usize) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_workers: max_workers.max(1),
        }
    }

    /// Looks up the forecast zone and county covering `coordinates`.
    ///
    /// # Errors
    /// `ZoneLookupFailed` if the request fails or names no zones.
    pub fn lookup_zones(&self, coordinates: &Coordinates) -> Result<ZoneIdentifiers, AlertError> {
        let url = build_points_url(&self.base_url, coordinates);
        info!("Looking up zones for {}", coordinates);

        let failed = |reason: String| AlertError::ZoneLookupFailed {
            coordinates: *coordinates,
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("{} returned {}", url, response.status())));
        }

        let body = response.text().map_err(|e| failed(e.to_string()))?;
        parse_points_response(&body).map_err(failed)
    }

    /// Queries every code concurrently on a bounded pool and joins the
    /// results.
    ///
    /// Codes are independent: a failure or timeout on one is logged and
    /// reported in `AlertFetch::failed`. If the budget runs out, workers that
    /// have not started are skipped and in-flight ones are abandoned.
    ///
    /// # Errors
    /// `AllEndpointsFailed` when no code succeeded, including when the budget
    /// ran out before any finished.
    pub fn fetch_alerts(&self, codes: &[String], budget: &FetchBudget) -> Result<AlertFetch, AlertError> {
        if codes.is_empty() {
            return Err(AlertError::AllEndpointsFailed {
                identifiers: Vec::new(),
                last_error: Some("no area codes to query".to_string()),
            });
        }

        let pool = ThreadPool::new(self.max_workers.min(codes.len()));
        let abandoned = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<WorkerResult>();

        for (index, code) in codes.iter().enumerate() {
            let tx = tx.clone();
            let client = self.client.clone();
            let base_url = self.base_url.clone();
            let code = code.clone();
            let abandoned = Arc::clone(&abandoned);

            pool.execute(move || {
                if abandoned.load(Ordering::SeqCst) {
                    return;
                }
                let result = fetch_area_alerts(&client, &base_url, &code);
                // The collector may have stopped listening.
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut results: Vec<Option<Result<AreaAlerts, AlertError>>> =
            codes.iter().map(|_| None).collect();
        let mut received = 0;

        while received < codes.len() {
            if budget.is_exhausted() {
                warn!(
                    "Fetch budget exhausted with {} of {} area codes outstanding",
                    codes.len() - received,
                    codes.len()
                );
                abandoned.store(true, Ordering::SeqCst);
                break;
            }

            let wait = budget
                .remaining()
                .map_or(COLLECT_POLL_INTERVAL, |r| r.min(COLLECT_POLL_INTERVAL));

            match rx.recv_timeout(wait) {
                Ok((index, result)) => {
                    results[index] = Some(result);
                    received += 1;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let mut fetch = AlertFetch::default();
        let mut last_error = None;

        for (code, result) in codes.iter().zip(results) {
            match result {
                Some(Ok(area)) => {
                    fetch.dropped_records += area.dropped_records;
                    fetch.by_area.entry(code.clone()).or_default().extend(area.alerts);
                }
                Some(Err(e)) => {
                    warn!("Failed to fetch alerts for area code {}: {}", code, e);
                    last_error = Some(e.to_string());
                    fetch.failed.push(code.clone());
                }
                None => {
                    warn!("Area code {} did not finish before the fetch budget ran out", code);
                    last_error.get_or_insert_with(|| format!("{} timed out or was cancelled", code));
                    fetch.failed.push(code.clone());
                }
            }
        }

        if fetch.by_area.is_empty() {
            error!("All endpoints failed for area codes [{}]", codes.join(", "));
            return Err(AlertError::AllEndpointsFailed {
                identifiers: codes.to_vec(),
                last_error,
            });
        }

        // Preserve code order for the union.
        let ordered = codes.iter().filter_map(|c| fetch.by_area.get(c));
        fetch.alerts = dedupe_alerts(ordered);

        if fetch.dropped_records > 0 {
            info!("Dropped {} malformed alert records", fetch.dropped_records);
        }

        Ok(fetch)
    }

    /// Zone lookup followed by `fetch_alerts` over the covering codes.
    pub fn fetch_alerts_for_point(
        &self,
        coordinates: &Coordinates,
        budget: &FetchBudget,
    ) -> Result<AlertFetch, AlertError> {
        let zones = self.lookup_zones(coordinates)?;
        info!(
            "Getting weather alerts for {} (areas: {})",
            coordinates,
            zones.as_slice().join(", ")
        );
        self.fetch_alerts(zones.as_slice(), budget)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
