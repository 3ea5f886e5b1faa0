//! In-process stand-in for the CarbonWise backend.
//!
//! Runs a `tiny_http` server on an ephemeral port in a background thread,
//! records every request it sees, and answers from a canned data set.
#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{Value, json};
use tiny_http::{Header, Response, Server};

/// One request as the stub received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub body: Value,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

pub struct Stub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests to `path`, in arrival order.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path() == path)
            .collect()
    }
}

/// Start a stub answering with `handler(method, url, body) -> (status, json)`.
pub fn spawn<F>(handler: F) -> Stub
where
    F: Fn(&str, &str, &Value) -> (u16, Value) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("stub server must bind");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("stub server listens on TCP");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&requests);

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let body = serde_json::from_str(&raw).unwrap_or(Value::Null);
            let method = request.method().to_string();
            let url = request.url().to_string();

            let (status, reply) = handler(&method, &url, &body);
            log.lock().unwrap().push(Recorded { method, url, body });

            let response = Response::from_string(reply.to_string())
                .with_status_code(status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json").unwrap(),
                );
            let _ = request.respond(response);
        }
    });

    Stub {
        base_url: format!("http://{addr}"),
        requests,
    }
}

/// Stub serving [`canned`].
pub fn backend() -> Stub {
    spawn(canned)
}

// ---------------------------------------------------------------------------
// Canned backend
// ---------------------------------------------------------------------------

pub fn vehicles() -> Value {
    json!([
        {"brand": "Tesla", "model": "Model 3", "Year": 2023, "type": "EV", "electric_wh_per_km": 150.0},
        {"brand": "Nissan", "model": "Leaf", "Year": 2022.0, "type": "EV"},
        {"brand": "Toyota", "model": "Corolla", "Year": 2023, "type": "ICE", "co2_wltp_gpkm": 120.0},
        {"brand": "Toyota", "model": "Prius", "Year": "2021", "type": "HEV"},
        {"brand": "Broken", "model": "Car", "Year": 2020, "type": "ICE"}
    ])
}

fn lifecycle_for(brand: &str) -> (u16, Value) {
    match brand {
        "Tesla" => (200, json!({"total_g_per_km": 100.0, "manufacturing_g_per_km": 40.0, "operational_g_per_km": 60.0, "battery_kwh": 60})),
        "Toyota" => (200, json!({"total_g_per_km": 140.0, "manufacturing_g_per_km": 20.0, "operational_g_per_km": 120.0})),
        // 200 with an error field
        "Nissan" => (200, json!({"error": "No data for year"})),
        _ => (500, json!({"error": "Vehicle not found"})),
    }
}

fn grid_data() -> Value {
    json!({
        "US": {
            "2021": {"raw": 380.0, "corrected": 400.0},
            "2022": {"raw": 370.0, "corrected": 390.0},
            "2023": {"raw": 360.0, "corrected": 380.0}
        },
        "DE": {
            "2022": {"raw": 360.0, "corrected": 382.0},
            "2023": {"raw": 350.0, "corrected": 371.0},
            "2024": {"raw": null, "corrected": 365.0}
        }
    })
}

/// Answers every endpoint the client knows about.
pub fn canned(method: &str, url: &str, body: &Value) -> (u16, Value) {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        ("GET", "/") => (200, json!({"status": "CarbonWise API running"})),
        ("GET", "/vehicles") => (200, vehicles()),
        ("GET", "/vehicle-detail") => {
            let found = vehicles()
                .as_array()
                .and_then(|all| {
                    all.iter()
                        .find(|v| url.contains(&format!("brand={}", v["brand"].as_str().unwrap_or(""))))
                        .cloned()
                })
                .unwrap_or(json!({"error": "Vehicle not found"}));
            (200, found)
        }
        ("POST", "/lifecycle") => lifecycle_for(body["brand"].as_str().unwrap_or("")),
        // Unresolvable vehicles are dropped from the list
        ("POST", "/compare-multiple") => {
            let results: Vec<Value> = body["vehicles"]
                .as_array()
                .into_iter()
                .flatten()
                .map(|v| lifecycle_for(v["brand"].as_str().unwrap_or("")))
                .filter(|(status, reply)| *status == 200 && reply.get("error").is_none())
                .map(|(_, reply)| reply)
                .collect();
            (200, json!(results))
        }
        ("POST", "/break-even") => (
            200,
            json!({
                "break_even_km": 50000.0,
                "ev_manufacturing_g_per_km": 40.0,
                "ev_operational_g_per_km": 60.0,
                "ev_total_g_per_km": 100.0,
                "ice_manufacturing_g_per_km": 20.0,
                "ice_operational_g_per_km": 120.0,
                "ice_total_g_per_km": 140.0
            }),
        ),
        ("POST", "/recommend") => (
            200,
            json!({"recommended": [
                {"vehicle": "Tesla Model 3 (2023)", "powertrain": "EV", "operational_g_per_km": 60.0,
                 "manufacturing_g_per_km": 40.0, "total_g_per_km": 100.0, "personalized_total_kg": 11680.0},
                {"vehicle": "Toyota Prius (2021)", "powertrain": "HEV", "operational_g_per_km": 95.0,
                 "manufacturing_g_per_km": 25.0, "total_g_per_km": 120.0}
            ]}),
        ),
        ("POST", "/greenwashing") => (
            200,
            json!({
                "is_greenwashing_risk": true,
                "risk_level": "Medium",
                "indicators": ["Claims carbon neutrality"],
                "findings": [],
                "transparency_score": 55.0
            }),
        ),
        ("POST", "/carbon-score") => (200, json!({"score": 72.0, "category": "Good"})),
        ("POST", "/annual-impact") => {
            let total = body["total_g_per_km"].as_f64().unwrap_or(0.0);
            let km = body["annual_km"].as_f64().unwrap_or(0.0);
            let kg = total * km / 1000.0;
            (200, json!({"annual_kg": kg, "annual_tons": kg / 1000.0, "equivalent": "about 80 trees"}))
        }
        ("POST", "/grid-sensitivity") => {
            let rows: Vec<Value> = body["countries"]
                .as_array()
                .map(|cs| {
                    cs.iter()
                        .enumerate()
                        .map(|(i, c)| json!({"country": c, "total_g_per_km": 80.0 + i as f64 * 10.0}))
                        .collect()
                })
                .unwrap_or_default();
            (200, Value::Array(rows))
        }
        ("GET", "/grid-data") => (200, grid_data()),
        ("GET", "/countries") => (
            200,
            json!([{"code": "US", "name": "United States"}, {"code": "DE", "name": "Germany"}]),
        ),
        ("GET", "/methodology") => (200, json!({"lifetime_km": 278600, "source": "ICCT 2021"})),
        ("GET", "/compare") => (
            200,
            json!({"brand": "Tesla", "model": "Model 3", "per_km_g": 100.0, "lifetime_kg": 27860.0}),
        ),
        _ => (404, json!({"error": "no such endpoint"})),
    }
}
