//! Public operations of the alert engine.
//!
//! `WeatherAlertService` wires geocoder → alert source → classifier →
//! selection and adds nothing on top: each stage's most specific error is
//! returned unchanged. The service holds no per-request state, so one
//! instance can be shared across threads.

use crate::alert::select::{select_most_important, select_most_important_per_group};
use crate::config::ServiceConfig;
use crate::ingest::geocode::Geocoder;
use crate::ingest::nws::{AlertFetch, AlertSource};
use crate::ingest::{build_http_client, FetchBudget};
use crate::model::{AlertError, Coordinates, WeatherAlert};
use chrono::Utc;
use log::{error, info};
use std::collections::BTreeMap;

pub struct WeatherAlertService {
    config: ServiceConfig,
    geocoder: Geocoder,
    source: AlertSource,
}

impl WeatherAlertService {
    pub fn new(config: ServiceConfig) -> Result<Self, AlertError> {
        let client = build_http_client(&config)?;
        let geocoder = Geocoder::new(client.clone(), &config.geocoder_base_url);
        let source = AlertSource::new(client, &config.alerts_base_url, config.max_concurrent_queries);

        Ok(Self {
            config,
            geocoder,
            source,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Fresh budget from the configured fetch timeout.
    pub fn default_budget(&self) -> FetchBudget {
        FetchBudget::with_timeout(self.config.fetch_timeout())
    }

    pub fn get_coordinates(&self, city: &str, state: &str) -> Result<Coordinates, AlertError> {
        self.geocoder.resolve(city, state)
    }

    /// All active alerts covering `coordinates`, deduplicated.
    pub fn get_alerts_for_coordinates(&self, coordinates: &Coordinates) -> Result<Vec<WeatherAlert>, AlertError> {
        self.fetch_for_coordinates(coordinates, &self.default_budget())
            .map(|fetch| fetch.alerts)
    }

    /// Like `get_alerts_for_coordinates`, with the caller's budget and the
    /// full per-area breakdown.
    pub fn fetch_for_coordinates(
        &self,
        coordinates: &Coordinates,
        budget: &FetchBudget,
    ) -> Result<AlertFetch, AlertError> {
        self.source
            .fetch_alerts_for_point(coordinates, budget)
            .inspect_err(|e| error!("Error getting weather alerts for {}: {}", coordinates, e))
    }

    pub fn get_alerts_for_location(&self, city: &str, state: &str) -> Result<Vec<WeatherAlert>, AlertError> {
        let coordinates = self.get_coordinates(city, state)?;
        self.get_alerts_for_coordinates(&coordinates)
    }

    /// Most important non-expired alert at `coordinates`, if any.
    pub fn get_most_important_alert_for_coordinates(
        &self,
        coordinates: &Coordinates,
    ) -> Result<Option<WeatherAlert>, AlertError> {
        let alerts = self.get_alerts_for_coordinates(coordinates)?;
        let selected = select_most_important(&alerts, Utc::now()).cloned();

        match &selected {
            Some(alert) => info!(
                "Most important alert for {}: {} (score {})",
                coordinates,
                alert.event,
                alert.importance_score()
            ),
            None => info!("No active alerts for {}", coordinates),
        }
        Ok(selected)
    }

    pub fn get_most_important_alert_for_location(
        &self,
        city: &str,
        state: &str,
    ) -> Result<Option<WeatherAlert>, AlertError> {
        let coordinates = self.get_coordinates(city, state)?;
        self.get_most_important_alert_for_coordinates(&coordinates)
    }

    // -----------------------------------------------------------------------
    // Batch mode keyed by SAME code
    // -----------------------------------------------------------------------

    /// Alerts for each SAME code, fetched concurrently.
    pub fn get_alerts_for_same_codes(&self, same_codes: &[String]) -> Result<AlertFetch, AlertError> {
        self.source.fetch_alerts(same_codes, &self.default_budget())
    }

    /// Most important non-expired alert per SAME code. Every requested code
    /// is a key of the result; codes that failed or have no active alert map
    /// to `None`.
    pub fn get_most_important_alerts(
        &self,
        same_codes: &[String],
    ) -> Result<BTreeMap<String, Option<WeatherAlert>>, AlertError> {
        let mut fetch = self.get_alerts_for_same_codes(same_codes)?;
        for code in same_codes {
            fetch.by_area.entry(code.clone()).or_default();
        }

        let selected = select_most_important_per_group(&fetch.by_area, Utc::now())
            .into_iter()
            .map(|(code, alert)| (code, alert.cloned()))
            .collect();
        Ok(selected)
    }
}
