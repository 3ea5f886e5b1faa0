//! EV vs ICE break-even: the backend result plus the cumulative-emissions
//! curve derived from it.

use serde::Serialize;

use super::cascade::{CascadeOptions, CascadeSelection, VehicleFilter};
use super::{AVERAGE_ANNUAL_KM, REFERENCE_LIFETIME_KM};
use crate::api::{ApiError, BreakEvenResult, CarbonClient, Powertrain, Vehicle, VehicleKey};
use crate::format::{format_emission, format_large_number};

/// Lower bound of the plotted distance axis (km).
pub const MIN_PLOT_KM: f64 = 300_000.0;

/// Number of equal steps on the distance axis; the curve has one more point.
pub const CHART_STEPS: usize = 50;

/// Cumulative emissions of both vehicles at each sampled distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativeCurve {
    /// Sampled distances in km, from 0 to the plotted maximum.
    pub distance_km: Vec<f64>,
    pub ev_kg: Vec<f64>,
    pub ice_kg: Vec<f64>,
}

/// A break-even distance is only meaningful when positive.
pub fn valid_break_even(result: &BreakEvenResult) -> Option<f64> {
    result
        .break_even_km
        .filter(|km| km.is_finite() && *km > 0.0)
}

/// Build the cumulative curve, or `None` when there is no valid break-even.
///
/// Manufacturing is charged up front as the g/km share over the reference
/// lifetime; operational emissions accumulate with distance.
pub fn cumulative_curve(result: &BreakEvenResult) -> Option<CumulativeCurve> {
    let be = valid_break_even(result)?;
    let max_km = (be * 2.0).max(MIN_PLOT_KM);
    let step = max_km / CHART_STEPS as f64;

    let ev_base = result.ev_manufacturing_g_per_km * REFERENCE_LIFETIME_KM / 1000.0;
    let ice_base = result.ice_manufacturing_g_per_km * REFERENCE_LIFETIME_KM / 1000.0;

    let mut curve = CumulativeCurve {
        distance_km: Vec::with_capacity(CHART_STEPS + 1),
        ev_kg: Vec::with_capacity(CHART_STEPS + 1),
        ice_kg: Vec::with_capacity(CHART_STEPS + 1),
    };
    for i in 0..=CHART_STEPS {
        let km = i as f64 * step;
        curve.distance_km.push(km);
        curve
            .ev_kg
            .push(ev_base + result.ev_operational_g_per_km * km / 1000.0);
        curve
            .ice_kg
            .push(ice_base + result.ice_operational_g_per_km * km / 1000.0);
    }
    Some(curve)
}

/// Explanation shown next to the result.
pub fn break_even_message(result: &BreakEvenResult) -> String {
    if let Some(msg) = result.message.as_deref().filter(|m| !m.is_empty()) {
        return msg.to_string();
    }
    match valid_break_even(result) {
        None => "The EV has lower total emissions from the start. No break-even point needed!"
            .to_string(),
        Some(km) => format!(
            "The EV will have lower total emissions than the ICE vehicle after {} km. \
             At average driving ({} km/year), this is approximately {:.1} years.",
            format_large_number(km),
            format_large_number(AVERAGE_ANNUAL_KM),
            km / AVERAGE_ANNUAL_KM
        ),
    }
}

/// Per-vehicle figures shown under the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSummary {
    pub label: String,
    pub manufacturing: String,
    pub operational: String,
    pub total: String,
}

/// Rendered break-even result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakEvenView {
    /// Formatted distance, `N/A` when there is none.
    pub break_even: String,
    pub message: String,
    pub ev: SideSummary,
    pub ice: SideSummary,
    pub chart: Option<CumulativeCurve>,
}

impl BreakEvenView {
    pub fn build(ev: &VehicleKey, ice: &VehicleKey, result: &BreakEvenResult) -> Self {
        Self {
            break_even: format_large_number(valid_break_even(result)),
            message: break_even_message(result),
            ev: SideSummary {
                label: ev.label(),
                manufacturing: format_emission(result.ev_manufacturing_g_per_km),
                operational: format_emission(result.ev_operational_g_per_km),
                total: format_emission(result.ev_total_g_per_km),
            },
            ice: SideSummary {
                label: ice.label(),
                manufacturing: format_emission(result.ice_manufacturing_g_per_km),
                operational: format_emission(result.ice_operational_g_per_km),
                total: format_emission(result.ice_total_g_per_km),
            },
            chart: cumulative_curve(result),
        }
    }
}

/// Page state: two cascades, one restricted to EVs with consumption data
/// and one to ICE vehicles.
#[derive(Debug, Clone, Default)]
pub struct BreakEvenPage {
    pub ev: CascadeSelection,
    pub ice: CascadeSelection,
}

impl BreakEvenPage {
    pub fn ev_filter() -> VehicleFilter {
        VehicleFilter::break_even_ev()
    }

    pub fn ice_filter() -> VehicleFilter {
        VehicleFilter::powertrain(Powertrain::Ice)
    }

    pub fn ev_options(&self, vehicles: &[Vehicle]) -> CascadeOptions {
        self.ev.options(vehicles, &Self::ev_filter())
    }

    pub fn ice_options(&self, vehicles: &[Vehicle]) -> CascadeOptions {
        self.ice.options(vehicles, &Self::ice_filter())
    }

    /// Both selected vehicles, or an input error naming what is missing.
    pub fn keys(&self, vehicles: &[Vehicle]) -> Result<(VehicleKey, VehicleKey), ApiError> {
        let ev = self
            .ev
            .selected(vehicles, &Self::ev_filter())
            .ok_or_else(|| ApiError::Input("select an EV brand, model and year".into()))?;
        let ice = self
            .ice
            .selected(vehicles, &Self::ice_filter())
            .ok_or_else(|| ApiError::Input("select an ICE brand, model and year".into()))?;
        Ok((ev.key(), ice.key()))
    }

    pub fn calculate(
        &self,
        client: &CarbonClient,
        vehicles: &[Vehicle],
        country: &str,
        grid_year: i32,
    ) -> Result<BreakEvenView, ApiError> {
        let (ev, ice) = self.keys(vehicles)?;
        let result = client.break_even(country, grid_year, &ev, &ice)?;
        Ok(BreakEvenView::build(&ev, &ice, &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(be: Option<f64>) -> BreakEvenResult {
        BreakEvenResult {
            break_even_km: be,
            message: None,
            manufacturing_difference_g_per_km: None,
            operational_advantage_g_per_km: None,
            ev_manufacturing_g_per_km: 40.0,
            ev_operational_g_per_km: 60.0,
            ev_total_g_per_km: 100.0,
            ice_manufacturing_g_per_km: 20.0,
            ice_operational_g_per_km: 120.0,
            ice_total_g_per_km: 140.0,
        }
    }

    #[test]
    fn curve_has_fifty_one_points_from_zero() {
        let curve = cumulative_curve(&result(Some(50_000.0))).unwrap();
        assert_eq!(curve.distance_km.len(), CHART_STEPS + 1);
        assert_eq!(curve.distance_km[0], 0.0);
        assert_eq!(*curve.distance_km.last().unwrap(), MIN_PLOT_KM);
        assert!((curve.ev_kg[0] - 40.0 * 278.6).abs() < 1e-9);
        assert!((curve.ice_kg[0] - 20.0 * 278.6).abs() < 1e-9);
    }

    #[test]
    fn plotted_range_doubles_large_break_even() {
        let curve = cumulative_curve(&result(Some(400_000.0))).unwrap();
        assert_eq!(*curve.distance_km.last().unwrap(), 800_000.0);
        assert_eq!(curve.distance_km[1], 16_000.0);
    }

    #[test]
    fn curves_cross_after_ev_head_start() {
        let curve = cumulative_curve(&result(Some(50_000.0))).unwrap();
        // EV starts higher and grows slower, so it ends lower.
        assert!(curve.ev_kg[0] > curve.ice_kg[0]);
        assert!(curve.ev_kg[CHART_STEPS] < curve.ice_kg[CHART_STEPS]);
    }

    #[test]
    fn no_chart_without_valid_break_even() {
        assert!(cumulative_curve(&result(None)).is_none());
        assert!(cumulative_curve(&result(Some(0.0))).is_none());
        assert!(cumulative_curve(&result(Some(-10.0))).is_none());
    }

    #[test]
    fn message_variants() {
        let msg = break_even_message(&result(Some(45_000.0)));
        assert!(msg.contains("45,000 km"), "{msg}");
        assert!(msg.contains("3.0 years"), "{msg}");

        let msg = break_even_message(&result(None));
        assert!(msg.contains("from the start"));

        let mut r = result(Some(45_000.0));
        r.message = Some("Backend explanation".into());
        assert_eq!(break_even_message(&r), "Backend explanation");
    }

    #[test]
    fn view_formats_both_sides() {
        let ev = VehicleKey::new("Tesla", "Model 3", 2023);
        let ice = VehicleKey::new("Toyota", "Corolla", 2020);
        let view = BreakEvenView::build(&ev, &ice, &result(None));
        assert_eq!(view.break_even, "N/A");
        assert_eq!(view.ev.label, "Tesla Model 3");
        assert_eq!(view.ice.total, "140.0");
        assert!(view.chart.is_none());
    }

    #[test]
    fn keys_require_both_cascades() {
        let vehicles = vec![Vehicle {
            brand: "Tesla".into(),
            model: "Model 3".into(),
            year: 2023,
            powertrain: Powertrain::Ev,
            co2_wltp_gpkm: None,
            electric_wh_per_km: Some(150.0),
        }];
        let mut page = BreakEvenPage::default();
        page.ev.set_brand(Some("Tesla".into()));
        page.ev.set_model(Some("Model 3".into()));
        page.ev.set_year(Some(2023));
        let err = page.keys(&vehicles).unwrap_err();
        assert!(matches!(err, ApiError::Input(ref m) if m.contains("ICE")));
    }
}
