/// Upstream provider clients.
///
/// - `geocode` — ArcGIS geocoder: city/state → coordinates.
/// - `nws`     — api.weather.gov: point → zones → alerts, with endpoint
///   fallback and a bounded worker pool.
/// - `fixtures` (test only) — representative provider payloads.

pub mod geocode;
pub mod nws;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::config::ServiceConfig;
use crate::model::AlertError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Builds the shared blocking HTTP client. The per-query timeout applies to
/// every request made through it.
pub fn build_http_client(config: &ServiceConfig) -> Result<Client, AlertError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.query_timeout())
        .build()
        .map_err(|e| AlertError::ProviderUnavailable(format!("failed to build HTTP client: {}", e)))
}

// ---------------------------------------------------------------------------
// Fetch budget
// ---------------------------------------------------------------------------

/// Cancellation flag shared between a caller and an in-progress fetch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outer limit on a multi-query fetch: an optional deadline and an optional
/// cancellation token. When either trips, the fetch stops waiting and keeps
/// whatever already completed.
#[derive(Debug, Clone, Default)]
pub struct FetchBudget {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl FetchBudget {
    /// No deadline, no cancellation.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// True once the deadline has passed or the token was cancelled.
    pub fn is_exhausted(&self) -> bool {
        let cancelled = self.cancel.as_ref().is_some_and(CancelToken::is_cancelled);
        let timed_out = self.deadline.is_some_and(|d| Instant::now() >= d);
        cancelled || timed_out
    }

    /// Time left before the deadline, `None` if there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}
