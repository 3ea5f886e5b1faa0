//! Embedded web dashboard for carbonwise.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard with one tab per analysis page
//! - JSON API endpoints that call the backend and return view models
//!
//! Launched via `carbonwise web` (default: `http://127.0.0.1:9750`).

mod api;
mod frontend;
mod query;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use serde_json::Value;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::{ApiError, CarbonClient, Vehicle};
use crate::config::CarbonConfig;
use crate::dashboard::compare::ComparePage;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything the dashboard keeps between requests. Owned by the serve
/// loop, so requests mutate it one at a time.
pub struct Dashboard {
    pub(crate) config: CarbonConfig,
    pub(crate) client: CarbonClient,
    vehicles: Option<Vec<Vehicle>>,
    pub(crate) compare: ComparePage,
}

impl Dashboard {
    pub fn new(config: CarbonConfig) -> Self {
        let client = CarbonClient::from_config(&config);
        let compare = ComparePage::new(config.defaults.country.clone(), config.defaults.grid_year);
        Self {
            config,
            client,
            vehicles: None,
            compare,
        }
    }

    /// The vehicle list, fetched on first use and kept afterwards. A failed
    /// fetch is not cached.
    pub(crate) fn vehicles(&mut self) -> Result<&[Vehicle], ApiError> {
        if self.vehicles.is_none() {
            self.vehicles = Some(self.client.vehicles()?);
        }
        Ok(self.vehicles.as_deref().unwrap_or_default())
    }

    /// Route one request. `Ok(None)` means no route matched.
    pub fn handle(&mut self, method: &Method, url: &str, body: Option<&str>) -> Result<Option<Value>> {
        // Strip query string for path matching
        let path = url.split('?').next().unwrap_or(url);
        let body = body.unwrap_or("{}");

        let value = match (method, path) {
            (&Method::Get, "/api/health") => api::get_health(self)?,
            (&Method::Get, "/api/vehicles/cascade") => api::get_cascade(self, url)?,

            // Lifecycle comparison
            (&Method::Get, "/api/compare") => api::get_compare(self, url)?,
            (&Method::Post, "/api/compare/toggle") => api::post_compare_toggle(self, body)?,
            (&Method::Post, "/api/compare/remove") => api::post_compare_remove(self, body)?,

            // Analysis pages
            (&Method::Post, "/api/break-even") => api::post_break_even(self, body)?,
            (&Method::Post, "/api/recommend") => api::post_recommend(self, body)?,
            (&Method::Post, "/api/greenwashing") => api::post_greenwashing(self, body)?,
            (&Method::Get, "/api/grid") => api::get_grid(self, url)?,
            (&Method::Get, "/api/countries") => api::get_countries(self)?,
            (&Method::Get, "/api/detail") => api::get_detail(self, url)?,
            (&Method::Post, "/api/annual-impact") => api::post_annual_impact(self, body)?,

            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Handles requests sequentially, which also
/// serializes every mutation of the comparison selection. Errors are
/// reported per request without stopping the server.
pub fn serve(addr: &str, open: bool, config: CarbonConfig) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("carbonwise dashboard running at http://{addr}");
    println!("Backend: {}", config.api.base_url);
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    let mut dashboard = Dashboard::new(config);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let (resp, status) = if matches!(
            (&method, url.split('?').next()),
            (&Method::Get, Some("/" | "/index.html"))
        ) {
            (serve_frontend(), 200)
        } else {
            match dashboard.handle(&method, &url, body.as_deref()) {
                Ok(Some(value)) => (json_response(200, &value), 200),
                Ok(None) => (not_found(), 404),
                Err(e) => {
                    let status = error_status(&e);
                    let body = serde_json::json!({ "error": format!("{e:#}") });
                    (json_response(status, &body), status)
                }
            }
        };
        let _ = request.respond(resp);

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

/// HTTP status for a failed handler: bad input is the caller's fault, a
/// backend failure is a bad gateway, anything else is ours.
pub fn error_status(err: &anyhow::Error) -> u16 {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Input(_)) => 400,
        Some(_) => 502,
        None => 500,
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let html = frontend::INDEX_HTML;
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn json_response(status: u16, value: &Value) -> Response<Cursor<Vec<u8>>> {
    Response::from_data(value.to_string().into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

/// JSON content type header.
fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_dashboard() -> Dashboard {
        let mut config = CarbonConfig::default();
        config.api.base_url = "http://127.0.0.1:9".to_string();
        config.logging.enabled = false;
        Dashboard::new(config)
    }

    #[test]
    fn error_status_mapping() {
        let input: anyhow::Error = ApiError::Input("bad".into()).into();
        assert_eq!(error_status(&input), 400);
        let backend: anyhow::Error = ApiError::Backend("Vehicle not found".into()).into();
        assert_eq!(error_status(&backend), 502);
        let status: anyhow::Error = ApiError::Status {
            status: 500,
            detail: None,
        }
        .into();
        assert_eq!(error_status(&status), 502);
        assert_eq!(error_status(&anyhow::anyhow!("boom")), 500);
    }

    #[test]
    fn context_keeps_api_error_downcastable() {
        let err = Err::<(), _>(ApiError::Input("x".into()))
            .context("while parsing")
            .unwrap_err();
        assert_eq!(error_status(&err), 400);
    }

    #[test]
    fn unknown_route_is_none() {
        let mut d = offline_dashboard();
        assert!(d.handle(&Method::Get, "/api/nope", None).unwrap().is_none());
        assert!(d.handle(&Method::Delete, "/api/compare", None).unwrap().is_none());
    }

    #[test]
    fn bad_unit_is_rejected_before_any_backend_call() {
        let mut d = offline_dashboard();
        let err = d
            .handle(&Method::Get, "/api/compare?unit=furlongs", None)
            .unwrap_err();
        assert_eq!(error_status(&err), 400);
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let mut d = offline_dashboard();
        let err = d
            .handle(&Method::Post, "/api/compare/toggle", Some("{not json"))
            .unwrap_err();
        assert_eq!(error_status(&err), 400);
    }

    #[test]
    fn unreachable_backend_maps_to_bad_gateway() {
        let mut d = offline_dashboard();
        let err = d
            .handle(&Method::Get, "/api/vehicles/cascade", None)
            .unwrap_err();
        assert_eq!(error_status(&err), 502);
    }
}
