/// HTTP client for the CarbonWise emissions backend.
///
/// Uses the synchronous `ureq` client. Every endpoint goes through
/// [`CarbonClient::request`], which:
///
/// - sends JSON with a `Content-Type: application/json` header,
/// - turns non-2xx statuses into [`ApiError::Status`],
/// - turns a JSON object with an `error` field into [`ApiError::Backend`],
/// - records the call in the request log.
///
/// One attempt per call. There is no retry, backoff or client-side timeout;
/// a hung backend hangs the caller.
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::error::ApiError;
use super::types::{
    AnnualImpact, BreakEvenResult, BreakEvenVehicle, CarbonScore, Country, GreenwashingReport,
    GreenwashingSubject, GridData, HealthStatus, LifecycleResult, Methodology, RecommendRequest,
    RecommendResponse, Recommendation, SensitivityEntry, SingleComparison, Vehicle, VehicleKey,
};
use crate::config::CarbonConfig;
use crate::diagnostics::logger;

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// HTTP verbs the backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Synchronous backend client. Cheap to clone; the agent pools connections.
#[derive(Debug, Clone)]
pub struct CarbonClient {
    base_url: String,
    agent: ureq::Agent,
    log_requests: bool,
}

impl Default for CarbonClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CarbonClient {
    /// Client for `base_url` with request logging disabled.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().build(),
            log_requests: false,
        }
    }

    /// Build a client from the resolved config.
    pub fn from_config(config: &CarbonConfig) -> Self {
        let mut client = Self::new(&config.api.base_url);
        client.log_requests = config.logging.enabled;
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Uniform request path
    // -----------------------------------------------------------------------

    /// Issue one request and return the parsed JSON body.
    ///
    /// `query` values are URL-encoded by `ureq`.
    pub fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let started = Instant::now();

        let result = self.send(method, &url, endpoint, query, body);

        if self.log_requests {
            logger::log_request(
                method.as_str(),
                endpoint,
                &result,
                started.elapsed().as_millis() as u64,
            );
        }

        result
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut req = self
            .agent
            .request(method.as_str(), url)
            .set("Content-Type", "application/json");
        for (key, value) in query {
            req = req.query(key, value);
        }

        let sent = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };

        let resp = match sent {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let detail = resp
                    .into_json::<Value>()
                    .ok()
                    .and_then(|v| backend_error_message(&v));
                return Err(ApiError::Status { status, detail });
            }
            Err(ureq::Error::Transport(t)) => {
                return Err(ApiError::Transport {
                    url: url.to_string(),
                    message: t.to_string(),
                });
            }
        };

        let value: Value = resp.into_json().map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if let Some(message) = backend_error_message(&value) {
            return Err(ApiError::Backend(message));
        }

        Ok(value)
    }

    fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let value = self.request(Method::Get, endpoint, query, None)?;
        decode(endpoint, value)
    }

    fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Input(e.to_string()))?;
        let value = self.request(Method::Post, endpoint, &[], Some(&body))?;
        decode(endpoint, value)
    }

    // -----------------------------------------------------------------------
    // Typed endpoints
    // -----------------------------------------------------------------------

    /// `GET /`
    pub fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get("/", &[])
    }

    /// `GET /vehicles`: the full vehicle list.
    pub fn vehicles(&self) -> Result<Vec<Vehicle>, ApiError> {
        self.get("/vehicles", &[])
    }

    /// `GET /vehicle-detail?brand=&model=&year=`
    pub fn vehicle_detail(&self, key: &VehicleKey) -> Result<Vehicle, ApiError> {
        self.get(
            "/vehicle-detail",
            &[
                ("brand", key.brand.clone()),
                ("model", key.model.clone()),
                ("year", key.year.to_string()),
            ],
        )
    }

    /// `POST /lifecycle`
    pub fn lifecycle(
        &self,
        key: &VehicleKey,
        country: &str,
        grid_year: i32,
    ) -> Result<LifecycleResult, ApiError> {
        self.post(
            "/lifecycle",
            &json!({
                "brand": key.brand,
                "model": key.model,
                "vehicle_year": key.year,
                "country": country,
                "grid_year": grid_year,
            }),
        )
    }

    /// `POST /compare-multiple`: lifecycles for several vehicles at once.
    /// Vehicles the backend cannot resolve are silently left out.
    pub fn compare_multiple(
        &self,
        country: &str,
        year: i32,
        vehicles: &[VehicleKey],
    ) -> Result<Vec<LifecycleResult>, ApiError> {
        self.post(
            "/compare-multiple",
            &json!({
                "country": country,
                "year": year,
                "vehicles": vehicles,
            }),
        )
    }

    /// `POST /recommend`
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Vec<Recommendation>, ApiError> {
        let resp: RecommendResponse = self.post("/recommend", request)?;
        Ok(resp.into_vec())
    }

    /// `POST /break-even`
    pub fn break_even(
        &self,
        country: &str,
        year: i32,
        ev: &VehicleKey,
        ice: &VehicleKey,
    ) -> Result<BreakEvenResult, ApiError> {
        self.post(
            "/break-even",
            &json!({
                "country": country,
                "year": year,
                "ev": BreakEvenVehicle::from(ev),
                "ice": BreakEvenVehicle::from(ice),
            }),
        )
    }

    /// `POST /greenwashing`. `search_web` is only sent when set.
    pub fn greenwashing(
        &self,
        lifecycle: &LifecycleResult,
        vehicle: &GreenwashingSubject,
        search_web: bool,
    ) -> Result<GreenwashingReport, ApiError> {
        let mut body = json!({
            "lifecycle": lifecycle,
            "vehicle": vehicle,
        });
        if search_web {
            body["searchWeb"] = Value::Bool(true);
        }
        self.post("/greenwashing", &body)
    }

    /// `POST /carbon-score`
    pub fn carbon_score(&self, total_g_per_km: f64) -> Result<CarbonScore, ApiError> {
        self.post("/carbon-score", &json!({ "total_g_per_km": total_g_per_km }))
    }

    /// `POST /annual-impact`
    pub fn annual_impact(
        &self,
        total_g_per_km: f64,
        annual_km: f64,
    ) -> Result<AnnualImpact, ApiError> {
        self.post(
            "/annual-impact",
            &json!({ "total_g_per_km": total_g_per_km, "annual_km": annual_km }),
        )
    }

    /// `POST /grid-sensitivity`: the same vehicle evaluated in each country.
    pub fn grid_sensitivity(
        &self,
        key: &VehicleKey,
        countries: &[String],
        year: i32,
    ) -> Result<Vec<SensitivityEntry>, ApiError> {
        self.post(
            "/grid-sensitivity",
            &json!({
                "brand": key.brand,
                "model": key.model,
                "vehicle_year": key.year,
                "countries": countries,
                "year": year,
            }),
        )
    }

    /// `GET /methodology`
    pub fn methodology(&self) -> Result<Methodology, ApiError> {
        self.get("/methodology", &[])
    }

    /// `GET /grid-data`
    pub fn grid_data(&self) -> Result<GridData, ApiError> {
        self.get("/grid-data", &[])
    }

    /// `GET /countries`
    pub fn countries(&self) -> Result<Vec<Country>, ApiError> {
        self.get("/countries", &[])
    }

    /// `GET /compare?brand=&model=&year=&country=`: single-vehicle summary.
    pub fn compare(&self, key: &VehicleKey, country: &str) -> Result<SingleComparison, ApiError> {
        self.get(
            "/compare",
            &[
                ("brand", key.brand.clone()),
                ("model", key.model.clone()),
                ("year", key.year.to_string()),
                ("country", country.to_string()),
            ],
        )
    }
}

/// Extract the backend's `error` field, if the body is an object carrying one.
fn backend_error_message(value: &Value) -> Option<String> {
    let err = value.as_object()?.get("error")?;
    match err {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_trailing_slash() {
        let client = CarbonClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn default_client_points_at_localhost() {
        assert_eq!(CarbonClient::default().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn client_from_config_follows_logging_flag() {
        let mut config = CarbonConfig::default();
        config.api.base_url = "http://backend:8080".to_string();
        config.logging.enabled = false;
        let client = CarbonClient::from_config(&config);
        assert_eq!(client.base_url(), "http://backend:8080");
        assert!(!client.log_requests);
    }

    #[test]
    fn backend_error_message_detection() {
        assert_eq!(
            backend_error_message(&json!({"error": "Vehicle not found"})),
            Some("Vehicle not found".to_string())
        );
        assert_eq!(backend_error_message(&json!({"error": null})), None);
        assert_eq!(backend_error_message(&json!([{"error": "x"}])), None);
        assert_eq!(backend_error_message(&json!({"total_g_per_km": 1.0})), None);
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) is closed on any sane test machine.
        let client = CarbonClient::new("http://127.0.0.1:9");
        let err = client.health_check().unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }), "got {err:?}");
    }
}
