//! Vehicle detail page: metadata, lifecycle breakdown, carbon score and the
//! same vehicle evaluated across several national grids.

use serde::Serialize;

use crate::api::{
    AnnualImpact, ApiError, CarbonClient, CarbonScore, LifecycleResult, SensitivityEntry, Vehicle,
    VehicleKey,
};
use crate::format::{format_emission, format_large_number, placeholder};

/// Colour band of the score ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Amber,
    Red,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 70.0 {
            Self::Green
        } else if score >= 40.0 {
            Self::Amber
        } else {
            Self::Red
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Green => "#00C853",
            Self::Amber => "#FFC107",
            Self::Red => "#FF5252",
        }
    }
}

/// Manufacturing vs operational share of the lifecycle total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub manufacturing_g_per_km: f64,
    pub operational_g_per_km: f64,
    /// Manufacturing share in percent; `None` when both parts are zero.
    pub manufacturing_pct: Option<f64>,
}

impl Breakdown {
    pub fn of(lc: &LifecycleResult) -> Self {
        let sum = lc.manufacturing_g_per_km + lc.operational_g_per_km;
        Self {
            manufacturing_g_per_km: lc.manufacturing_g_per_km,
            operational_g_per_km: lc.operational_g_per_km,
            manufacturing_pct: (sum > 0.0).then(|| lc.manufacturing_g_per_km / sum * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub vehicle: Vehicle,
    pub title: String,
    /// `"2023 • EV"`.
    pub meta: String,
    pub total: String,
    pub manufacturing: String,
    pub operational: String,
    pub total_g_per_km: f64,
    pub score: f64,
    pub score_label: String,
    pub score_band: ScoreBand,
    pub breakdown: Breakdown,
    pub sensitivity: Vec<SensitivityEntry>,
    /// Set when the sensitivity request failed; the rest of the page still
    /// renders.
    pub sensitivity_error: Option<String>,
}

impl DetailView {
    pub fn build(
        vehicle: Vehicle,
        lifecycle: &LifecycleResult,
        score: &CarbonScore,
        sensitivity: Result<Vec<SensitivityEntry>, ApiError>,
    ) -> Self {
        let (sensitivity, sensitivity_error) = match sensitivity {
            Ok(rows) => (rows, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        Self {
            title: vehicle.key().label(),
            meta: format!("{} • {}", vehicle.year, vehicle.powertrain),
            total: format_emission(lifecycle.total_g_per_km),
            manufacturing: format_emission(lifecycle.manufacturing_g_per_km),
            operational: format_emission(lifecycle.operational_g_per_km),
            total_g_per_km: lifecycle.total_g_per_km,
            score: score.score,
            score_label: score.label().to_string(),
            score_band: ScoreBand::of(score.score),
            breakdown: Breakdown::of(lifecycle),
            sensitivity,
            sensitivity_error,
            vehicle,
        }
    }
}

/// Load the page: detail, lifecycle, score, then sensitivity. The first
/// three are required; a sensitivity failure is kept on the view.
pub fn load(
    client: &CarbonClient,
    key: &VehicleKey,
    country: &str,
    grid_year: i32,
    sensitivity_countries: &[String],
) -> Result<DetailView, ApiError> {
    let vehicle = client.vehicle_detail(key)?;
    let lifecycle = client.lifecycle(key, country, grid_year)?;
    let score = client.carbon_score(lifecycle.total_g_per_km)?;
    let sensitivity = client.grid_sensitivity(key, sensitivity_countries, grid_year);
    Ok(DetailView::build(vehicle, &lifecycle, &score, sensitivity))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualImpactView {
    pub annual_km: f64,
    pub annual_kg: String,
    pub equivalent: String,
}

impl AnnualImpactView {
    pub fn build(annual_km: f64, impact: &AnnualImpact) -> Self {
        Self {
            annual_km,
            annual_kg: format_large_number(impact.annual_kg),
            equivalent: placeholder(impact.equivalent.as_ref()),
        }
    }
}

pub fn annual_impact(
    client: &CarbonClient,
    total_g_per_km: f64,
    annual_km: f64,
) -> Result<AnnualImpactView, ApiError> {
    if !(annual_km.is_finite() && annual_km > 0.0) {
        return Err(ApiError::Input("annual distance must be positive".into()));
    }
    let impact = client.annual_impact(total_g_per_km, annual_km)?;
    Ok(AnnualImpactView::build(annual_km, &impact))
}
