//! HTTP endpoint for weather alert lookups
//!
//! Thin adapter over `WeatherAlertService`. Requests are handled on a small
//! worker pool so one slow upstream lookup does not block other clients.
//!
//! Endpoints:
//! - GET /weather-alert/{state}/{city} - Most important active alert
//! - GET /health - Service health check

use crate::model::{AlertError, Coordinates, WeatherAlert};
use crate::service::WeatherAlertService;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use threadpool::ThreadPool;

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Location plus the selected alert. Alert fields are `null` when there is
/// no active alert.
#[derive(Debug, Serialize, PartialEq)]
pub struct WeatherAlertResponse {
    pub city: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub headline: Option<String>,
    pub event: Option<String>,
    pub severity: Option<String>,
    pub urgency: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS UTC`
    pub expires: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

impl WeatherAlertResponse {
    pub fn new(city: &str, state: &str, coordinates: &Coordinates, alert: Option<&WeatherAlert>) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

        Self {
            city: city.to_string(),
            state: state.to_string(),
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            headline: alert.map(|a| a.headline.clone()),
            event: alert.map(|a| a.event.clone()),
            severity: alert.map(|a| a.severity.label().to_string()),
            urgency: alert.map(|a| a.urgency.label().to_string()),
            expires: alert
                .and_then(|a| a.expires)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
            description: alert.map(|a| a.description.clone()),
            instruction: alert.and_then(|a| non_empty(&a.instruction)),
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Status code and JSON body for a request path. Split from the server loop
/// so routing can be tested without sockets.
pub fn route(service: &WeatherAlertService, method: &str, url: &str) -> (u16, serde_json::Value) {
    let path = url.split('?').next().unwrap_or("");

    if method != "GET" {
        return (405, serde_json::json!({ "error": "Method not allowed" }));
    }

    if path == "/health" {
        return handle_health();
    }

    if let Some(rest) = path.strip_prefix("/weather-alert/") {
        let segments: Vec<&str> = rest.trim_end_matches('/').split('/').collect();
        if let [state, city] = segments.as_slice() {
            let (Ok(state), Ok(city)) = (urlencoding::decode(state), urlencoding::decode(city)) else {
                return (400, serde_json::json!({ "error": "Malformed path encoding" }));
            };
            return handle_weather_alert(service, &state, &city);
        }
    }

    (
        404,
        serde_json::json!({
            "error": "Not found",
            "available_endpoints": ["/health", "/weather-alert/{state}/{city}"]
        }),
    )
}

/// Handle /health endpoint
fn handle_health() -> (u16, serde_json::Value) {
    (
        200,
        serde_json::json!({
            "status": "ok",
            "service": "weatherbox",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

/// Handle /weather-alert/{state}/{city}
fn handle_weather_alert(service: &WeatherAlertService, state: &str, city: &str) -> (u16, serde_json::Value) {
    let result = service.get_coordinates(city, state).and_then(|coordinates| {
        service
            .get_most_important_alert_for_coordinates(&coordinates)
            .map(|alert| WeatherAlertResponse::new(city, state, &coordinates, alert.as_ref()))
    });

    match result.and_then(|body| {
        serde_json::to_value(&body).map_err(|e| AlertError::Parse(format!("response encoding: {}", e)))
    }) {
        Ok(body) => (200, body),
        Err(e) => error_response(&e),
    }
}

/// Maps an engine error to a status and a body naming only the error kind
/// and message.
pub fn error_response(err: &AlertError) -> (u16, serde_json::Value) {
    let status = if err.is_client_error() {
        warn!("Lookup rejected: {}", err);
        404
    } else {
        error!("Lookup failed ({}): {}", err.kind(), err);
        500
    };

    (status, serde_json::json!({ "error": err.kind(), "detail": err.to_string() }))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(port: u16, service: WeatherAlertService) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    let workers = service.config().max_concurrent_queries;
    info!("HTTP endpoint listening on http://0.0.0.0:{}", port);
    info!("   GET /weather-alert/{{state}}/{{city}} - Most important active alert");
    info!("   GET /health - Service health check");

    serve(server, service, workers);
    Ok(())
}

/// Accept loop. Runs until the server is dropped.
pub fn serve(server: tiny_http::Server, service: WeatherAlertService, workers: usize) {
    let service = Arc::new(service);
    let pool = ThreadPool::new(workers.max(1));

    for request in server.incoming_requests() {
        let service = Arc::clone(&service);
        pool.execute(move || {
            let method = request.method().to_string();
            let url = request.url().to_string();
            let (status, body) = route(&service, &method, &url);
            info!("{} {} -> {}", method, url, status);

            if let Err(e) = request.respond(create_response(status, &body)) {
                warn!("Failed to send response: {}", e);
            }
        });
    }
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: &serde_json::Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(json).unwrap_or_else(|_| "{}".to_string());

    let mut response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));
    if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;
    use crate::model::tests::alert;
    use crate::model::{Certainty, Severity, Urgency};
    use chrono::{TimeZone, Utc};

    fn offline_service() -> WeatherAlertService {
        WeatherAlertService::new(ServiceConfig {
            alerts_base_url: "http://127.0.0.1:9".to_string(),
            geocoder_base_url: "http://127.0.0.1:9".to_string(),
            query_timeout_secs: 1,
            ..ServiceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_response_with_alert() {
        let coords = Coordinates::new(40.6936, -89.589).unwrap();
        let mut a = alert("a", Severity::Severe, Urgency::Expected, Certainty::Likely);
        a.expires = Some(Utc.with_ymd_and_hms(2099, 5, 3, 17, 0, 0).unwrap());
        a.instruction = "Move to higher ground.".to_string();

        let response = WeatherAlertResponse::new("Peoria", "IL", &coords, Some(&a));

        assert_eq!(response.severity.as_deref(), Some("SEVERE"));
        assert_eq!(response.urgency.as_deref(), Some("EXPECTED"));
        assert_eq!(response.expires.as_deref(), Some("2099-05-03 17:00:00 UTC"));
        assert_eq!(response.instruction.as_deref(), Some("Move to higher ground."));
    }

    #[test]
    fn test_response_without_alert_has_null_fields() {
        let coords = Coordinates::new(40.6936, -89.589).unwrap();
        let response = WeatherAlertResponse::new("Peoria", "IL", &coords, None);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["city"], "Peoria");
        assert_eq!(json["latitude"], 40.6936);
        for field in ["headline", "event", "severity", "urgency", "expires", "description", "instruction"] {
            assert!(json[field].is_null(), "{} should be null", field);
        }
    }

    #[test]
    fn test_health_route() {
        let (status, body) = route(&offline_service(), "GET", "/health");
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[test]
    fn test_unknown_route_and_method() {
        let service = offline_service();
        assert_eq!(route(&service, "GET", "/site/05568500").0, 404);
        assert_eq!(route(&service, "GET", "/weather-alert/IL").0, 404);
        assert_eq!(route(&service, "POST", "/weather-alert/IL/Peoria").0, 405);
    }

    #[test]
    fn test_blank_city_maps_to_404() {
        let (status, body) = route(&offline_service(), "GET", "/weather-alert/IL/%20");
        assert_eq!(status, 404);
        assert_eq!(body["error"], "InvalidLocation");
    }

    #[test]
    fn test_upstream_failure_maps_to_500_without_internals() {
        let (status, body) = route(&offline_service(), "GET", "/weather-alert/IL/Peoria");
        assert_eq!(status, 500);
        assert_eq!(body["error"], "ProviderUnavailable");
        assert!(body.get("backtrace").is_none());
    }
}
