//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns the JSON value
//! to send back. Backend failures surface as [`ApiError`] so the server
//! can map them to a status code.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::{ApiError, RecommendFilters, RecommendRequest, VehicleKey};
use crate::dashboard::break_even::BreakEvenPage;
use crate::dashboard::cascade::{CascadeSelection, VehicleFilter};
use crate::dashboard::compare::Unit;
use crate::dashboard::grid::GridView;
use crate::dashboard::selection::ToggleOutcome;
use crate::dashboard::{greenwashing, input, recommend, vehicle_detail};

use super::Dashboard;
use super::query;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// A vehicle as the frontend posts it.
#[derive(Debug, Deserialize)]
struct VehicleRef {
    brand: String,
    model: String,
    year: i32,
}

impl VehicleRef {
    fn key(&self) -> Result<VehicleKey, ApiError> {
        input::vehicle_parts(&self.brand, &self.model, self.year)
    }
}

/// `POST /api/compare/remove`: by position or by vehicle.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoveRequest {
    Index { index: usize },
    Vehicle(VehicleRef),
}

#[derive(Debug, Deserialize)]
struct BreakEvenRequest {
    ev: VehicleRef,
    ice: VehicleRef,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    grid_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RecommendBody {
    daily_km: f64,
    years: u32,
    #[serde(default)]
    filters: RecommendFilters,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    grid_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GreenwashingRequest {
    #[serde(flatten)]
    vehicle: VehicleRef,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    grid_year: Option<i32>,
    #[serde(default, rename = "searchWeb", alias = "search_web")]
    search_web: bool,
}

#[derive(Debug, Deserialize)]
struct AnnualImpactRequest {
    total_g_per_km: f64,
    #[serde(default)]
    annual_km: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a JSON body; malformed bodies are input errors.
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Input(format!("invalid request body: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("failed to serialize JSON response")
}

impl Dashboard {
    fn country_or_default(&self, country: Option<&str>) -> Result<String, ApiError> {
        input::country(country.unwrap_or(&self.config.defaults.country))
    }

    fn grid_year_or_default(&self, year: Option<i32>) -> i32 {
        year.unwrap_or(self.config.defaults.grid_year)
    }

    /// Make sure the comparison page has the vehicle list.
    fn ensure_compare_vehicles(&mut self) -> Result<(), ApiError> {
        if self.compare.vehicles.is_empty() {
            let vehicles = self.vehicles()?.to_vec();
            self.compare.vehicles = vehicles;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/health`: backend reachability plus the active defaults.
pub fn get_health(d: &mut Dashboard) -> Result<Value> {
    let backend = match d.client.health_check() {
        Ok(status) => json!({ "ok": true, "status": status.summary() }),
        Err(e) => json!({ "ok": false, "error": e.to_string() }),
    };
    Ok(json!({
        "backend": backend,
        "base_url": d.client.base_url(),
        "defaults": d.config.defaults,
        "logging": d.config.logging.enabled,
    }))
}

/// `GET /api/vehicles/cascade?brand=&model=&powertrain=&consumption=1`
pub fn get_cascade(d: &mut Dashboard, url: &str) -> Result<Value> {
    let filter = VehicleFilter {
        powertrain: query::param(url, "powertrain").map(|p| crate::api::Powertrain::parse(&p)),
        require_consumption: query::flag(url, "consumption"),
    };
    let mut selection = CascadeSelection::default();
    selection.set_brand(query::param(url, "brand"));
    selection.set_model(query::param(url, "model"));

    let vehicles = d.vehicles()?;
    to_json(&selection.options(vehicles, &filter))
}

/// `GET /api/compare?unit=&country=&grid_year=`: current comparison view.
/// Changing country or grid year clears the selection, since the attached
/// lifecycles were computed for the old grid.
pub fn get_compare(d: &mut Dashboard, url: &str) -> Result<Value> {
    if let Some(raw) = query::param(url, "unit") {
        d.compare.unit =
            Unit::parse(&raw).ok_or_else(|| ApiError::Input(format!("unknown unit '{raw}'")))?;
    }
    let country = query::param(url, "country")
        .map(|c| input::country(&c))
        .transpose()?;
    let grid_year = query::parsed::<i32>(url, "grid_year");
    if let Some(c) = country
        && c != d.compare.country
    {
        d.compare.country = c;
        d.compare.selection.clear();
    }
    if let Some(y) = grid_year
        && y != d.compare.grid_year
    {
        d.compare.grid_year = y;
        d.compare.selection.clear();
    }

    d.ensure_compare_vehicles()?;
    to_json(&d.compare.view())
}

/// `POST /api/compare/toggle`: body `{brand, model, year}`.
pub fn post_compare_toggle(d: &mut Dashboard, body: &str) -> Result<Value> {
    let key = parse_body::<VehicleRef>(body)?.key()?;
    d.ensure_compare_vehicles()?;
    let outcome = d.compare.toggle(&d.client, key)?;
    Ok(json!({
        "outcome": match outcome {
            ToggleOutcome::Removed => "removed",
            ToggleOutcome::Ignored => "ignored",
            ToggleOutcome::Pending => "pending",
            ToggleOutcome::Added => "added",
        },
        "view": to_json(&d.compare.view())?,
    }))
}

/// `POST /api/compare/remove`: body `{index}` or `{brand, model, year}`.
pub fn post_compare_remove(d: &mut Dashboard, body: &str) -> Result<Value> {
    let removed = match parse_body::<RemoveRequest>(body)? {
        RemoveRequest::Index { index } => d.compare.selection.remove_index(index),
        RemoveRequest::Vehicle(v) => d.compare.selection.remove_key(&v.key()?),
    };
    Ok(json!({
        "removed": removed.map(|e| e.key),
        "view": to_json(&d.compare.view())?,
    }))
}

/// `POST /api/break-even`: body `{ev, ice, country?, grid_year?}`.
pub fn post_break_even(d: &mut Dashboard, body: &str) -> Result<Value> {
    let req: BreakEvenRequest = parse_body(body)?;
    let country = d.country_or_default(req.country.as_deref())?;
    let grid_year = d.grid_year_or_default(req.grid_year);
    let (ev, ice) = (req.ev.key()?, req.ice.key()?);

    let mut page = BreakEvenPage::default();
    for (cascade, key) in [(&mut page.ev, &ev), (&mut page.ice, &ice)] {
        cascade.set_brand(Some(key.brand.clone()));
        cascade.set_model(Some(key.model.clone()));
        cascade.set_year(Some(key.year));
    }
    let client = d.client.clone();
    let vehicles = d.vehicles()?;
    to_json(&page.calculate(&client, vehicles, &country, grid_year)?)
}

/// `POST /api/recommend`: body `{daily_km, years, filters, country?, grid_year?}`.
pub fn post_recommend(d: &mut Dashboard, body: &str) -> Result<Value> {
    let req: RecommendBody = parse_body(body)?;
    let request = RecommendRequest {
        daily_km: req.daily_km,
        years: req.years,
        filters: req.filters,
        country: d.country_or_default(req.country.as_deref())?,
        grid_year: d.grid_year_or_default(req.grid_year),
    };
    to_json(&recommend::recommend(&d.client, &request)?)
}

/// `POST /api/greenwashing`: body `{brand, model, year, searchWeb?}`.
pub fn post_greenwashing(d: &mut Dashboard, body: &str) -> Result<Value> {
    let req: GreenwashingRequest = parse_body(body)?;
    let key = req.vehicle.key()?;
    let country = d.country_or_default(req.country.as_deref())?;
    let grid_year = d.grid_year_or_default(req.grid_year);

    let vehicle = d
        .vehicles()?
        .iter()
        .find(|v| v.matches(&key))
        .cloned()
        .ok_or_else(|| ApiError::Input(format!("unknown vehicle {key}")))?;
    to_json(&greenwashing::analyze(
        &d.client,
        &vehicle,
        &country,
        grid_year,
        req.search_web,
    )?)
}

/// `GET /api/grid?country=&year=&forecast=1`
pub fn get_grid(d: &mut Dashboard, url: &str) -> Result<Value> {
    let country = d.country_or_default(query::param(url, "country").as_deref())?;
    let year = query::parsed::<i32>(url, "year");
    let forecast = query::flag(url, "forecast");
    to_json(&GridView::fetch(&d.client, &country, year, forecast)?)
}

/// `GET /api/countries`
pub fn get_countries(d: &mut Dashboard) -> Result<Value> {
    to_json(&d.client.countries()?)
}

/// `GET /api/detail?brand=&model=&year=&country=&grid_year=`
pub fn get_detail(d: &mut Dashboard, url: &str) -> Result<Value> {
    let year = query::parsed::<i32>(url, "year")
        .ok_or_else(|| ApiError::Input("year is required".into()))?;
    let key = input::vehicle_parts(
        &query::param(url, "brand").unwrap_or_default(),
        &query::param(url, "model").unwrap_or_default(),
        year,
    )?;
    let country = d.country_or_default(query::param(url, "country").as_deref())?;
    let grid_year = d.grid_year_or_default(query::parsed(url, "grid_year"));
    to_json(&vehicle_detail::load(
        &d.client,
        &key,
        &country,
        grid_year,
        &d.config.defaults.sensitivity_countries,
    )?)
}

/// `POST /api/annual-impact`: body `{total_g_per_km, annual_km?}`.
pub fn post_annual_impact(d: &mut Dashboard, body: &str) -> Result<Value> {
    let req: AnnualImpactRequest = parse_body(body)?;
    let annual_km = req.annual_km.unwrap_or(d.config.defaults.annual_km);
    to_json(&vehicle_detail::annual_impact(
        &d.client,
        req.total_g_per_km,
        annual_km,
    )?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
