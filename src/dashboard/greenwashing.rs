//! Greenwashing analysis: lifecycle first, then the backend's risk check on
//! that lifecycle plus the vehicle's metadata.

use serde::Serialize;

use crate::api::{
    ApiError, CarbonClient, GreenwashingReport, GreenwashingSubject, LifecycleResult, Powertrain,
    Vehicle,
};
use crate::format::format_emission;

/// Transparency score assumed when the backend omits one.
pub const DEFAULT_TRANSPARENCY: f64 = 85.0;

pub fn transparency_label(score: f64) -> &'static str {
    if score >= 80.0 {
        "Excellent Transparency"
    } else if score >= 60.0 {
        "Good Transparency"
    } else if score >= 40.0 {
        "Moderate Transparency"
    } else {
        "Low Transparency"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreenwashingView {
    pub vehicle: String,
    pub powertrain: Powertrain,
    pub risk_level: String,
    /// e.g. `"MEDIUM RISK"`.
    pub risk_badge: String,
    pub is_greenwashing_risk: bool,
    pub total: String,
    pub manufacturing: String,
    pub operational: String,
    pub indicators: Vec<String>,
    pub findings: Vec<String>,
    pub transparency_score: f64,
    pub transparency_label: &'static str,
}

impl GreenwashingView {
    pub fn build(vehicle: &Vehicle, lifecycle: &LifecycleResult, report: &GreenwashingReport) -> Self {
        let risk_level = report
            .risk_level
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or("low")
            .to_ascii_lowercase();
        let transparency = report.transparency_score.unwrap_or(DEFAULT_TRANSPARENCY);
        Self {
            vehicle: vehicle.key().to_string(),
            powertrain: vehicle.powertrain.clone(),
            risk_badge: format!("{} RISK", risk_level.to_ascii_uppercase()),
            risk_level,
            is_greenwashing_risk: report.is_greenwashing_risk,
            total: format_emission(lifecycle.total_g_per_km),
            manufacturing: format_emission(lifecycle.manufacturing_g_per_km),
            operational: format_emission(lifecycle.operational_g_per_km),
            indicators: report.indicators.clone(),
            findings: report.findings.clone(),
            transparency_score: transparency,
            transparency_label: transparency_label(transparency),
        }
    }
}

/// Run the two-step analysis for `vehicle`.
pub fn analyze(
    client: &CarbonClient,
    vehicle: &Vehicle,
    country: &str,
    grid_year: i32,
    search_web: bool,
) -> Result<GreenwashingView, ApiError> {
    let lifecycle = client.lifecycle(&vehicle.key(), country, grid_year)?;
    let report = client.greenwashing(&lifecycle, &GreenwashingSubject::from(vehicle), search_web)?;
    Ok(GreenwashingView::build(vehicle, &lifecycle, &report))
}
