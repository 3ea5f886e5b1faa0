//! Brand → model → year dropdown cascade.
//!
//! Option lists are derived from the loaded vehicle list on every call;
//! nothing is cached. Brand and model matching is exact and
//! case-sensitive. Brands and models sort ascending, years descending.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::api::{Powertrain, Vehicle};

/// Restricts which vehicles feed the cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleFilter {
    pub powertrain: Option<Powertrain>,
    /// Only vehicles with electric consumption data (needed for EV
    /// break-even calculations).
    pub require_consumption: bool,
}

impl VehicleFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn powertrain(powertrain: Powertrain) -> Self {
        Self {
            powertrain: Some(powertrain),
            require_consumption: false,
        }
    }

    /// EVs the backend can compute a break-even for.
    pub fn break_even_ev() -> Self {
        Self {
            powertrain: Some(Powertrain::Ev),
            require_consumption: true,
        }
    }

    pub fn accepts(&self, vehicle: &Vehicle) -> bool {
        if let Some(p) = &self.powertrain
            && &vehicle.powertrain != p
        {
            return false;
        }
        !self.require_consumption || vehicle.electric_wh_per_km.is_some()
    }
}

/// Distinct brands, sorted.
pub fn brands(vehicles: &[Vehicle], filter: &VehicleFilter) -> Vec<String> {
    vehicles
        .iter()
        .filter(|v| filter.accepts(v))
        .map(|v| v.brand.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct models of `brand`, sorted.
pub fn models(vehicles: &[Vehicle], filter: &VehicleFilter, brand: &str) -> Vec<String> {
    vehicles
        .iter()
        .filter(|v| filter.accepts(v) && v.brand == brand)
        .map(|v| v.model.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct years of `brand` + `model`, newest first.
pub fn years(vehicles: &[Vehicle], filter: &VehicleFilter, brand: &str, model: &str) -> Vec<i32> {
    vehicles
        .iter()
        .filter(|v| filter.accepts(v) && v.brand == brand && v.model == model)
        .map(|v| v.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect()
}

/// Current dropdown values. Setting an upstream value clears everything
/// downstream of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeSelection {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

/// The three option lists the cascade currently offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CascadeOptions {
    pub brands: Vec<String>,
    pub models: Vec<String>,
    pub years: Vec<i32>,
}

impl CascadeSelection {
    pub fn set_brand(&mut self, brand: Option<String>) {
        self.brand = brand.filter(|b| !b.is_empty());
        self.model = None;
        self.year = None;
    }

    pub fn set_model(&mut self, model: Option<String>) {
        self.model = model.filter(|m| !m.is_empty());
        self.year = None;
    }

    pub fn set_year(&mut self, year: Option<i32>) {
        self.year = year;
    }

    /// Option lists for the current selection. Downstream lists are empty
    /// until their upstream value is chosen.
    pub fn options(&self, vehicles: &[Vehicle], filter: &VehicleFilter) -> CascadeOptions {
        let brands = brands(vehicles, filter);
        let models = match &self.brand {
            Some(b) => models(vehicles, filter, b),
            None => Vec::new(),
        };
        let years = match (&self.brand, &self.model) {
            (Some(b), Some(m)) => years(vehicles, filter, b, m),
            _ => Vec::new(),
        };
        CascadeOptions {
            brands,
            models,
            years,
        }
    }

    /// The vehicle the three dropdowns point at, if all are set and it
    /// exists in the list.
    pub fn selected<'a>(
        &self,
        vehicles: &'a [Vehicle],
        filter: &VehicleFilter,
    ) -> Option<&'a Vehicle> {
        let (brand, model, year) = (self.brand.as_ref()?, self.model.as_ref()?, self.year?);
        vehicles.iter().find(|v| {
            filter.accepts(v) && &v.brand == brand && &v.model == model && v.year == year
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(brand: &str, model: &str, year: i32, pt: Powertrain, wh: Option<f64>) -> Vehicle {
        Vehicle {
            brand: brand.to_string(),
            model: model.to_string(),
            year,
            powertrain: pt,
            co2_wltp_gpkm: None,
            electric_wh_per_km: wh,
        }
    }

    fn fleet() -> Vec<Vehicle> {
        vec![
            v("Tesla", "Model Y", 2022, Powertrain::Ev, Some(160.0)),
            v("Tesla", "Model 3", 2021, Powertrain::Ev, Some(150.0)),
            v("Tesla", "Model 3", 2023, Powertrain::Ev, Some(145.0)),
            v("Tesla", "Model 3", 2021, Powertrain::Ev, Some(151.0)),
            v("Toyota", "Corolla", 2020, Powertrain::Ice, None),
            v("Toyota", "Prius", 2019, Powertrain::Hev, None),
            v("tesla", "Roadster", 2010, Powertrain::Ev, None),
            v("Nissan", "Leaf", 2018, Powertrain::Ev, None),
        ]
    }

    #[test]
    fn brands_are_distinct_and_sorted() {
        let b = brands(&fleet(), &VehicleFilter::any());
        assert_eq!(b, vec!["Nissan", "Tesla", "Toyota", "tesla"]);
    }

    #[test]
    fn models_match_brand_case_sensitively() {
        let m = models(&fleet(), &VehicleFilter::any(), "Tesla");
        assert_eq!(m, vec!["Model 3", "Model Y"]);
        assert!(models(&fleet(), &VehicleFilter::any(), "TESLA").is_empty());
    }

    #[test]
    fn years_are_distinct_and_newest_first() {
        let y = years(&fleet(), &VehicleFilter::any(), "Tesla", "Model 3");
        assert_eq!(y, vec![2023, 2021]);
    }

    #[test]
    fn cascade_never_offers_foreign_models_or_years() {
        let fleet = fleet();
        let filter = VehicleFilter::any();
        for brand in brands(&fleet, &filter) {
            for model in models(&fleet, &filter, &brand) {
                assert!(fleet.iter().any(|v| v.brand == brand && v.model == model));
                for year in years(&fleet, &filter, &brand, &model) {
                    assert!(
                        fleet
                            .iter()
                            .any(|v| v.brand == brand && v.model == model && v.year == year)
                    );
                }
            }
        }
    }

    #[test]
    fn break_even_filter_requires_consumption_data() {
        let fleet = fleet();
        let ev = VehicleFilter::break_even_ev();
        assert_eq!(brands(&fleet, &ev), vec!["Tesla"]);
        let ice = VehicleFilter::powertrain(Powertrain::Ice);
        assert_eq!(brands(&fleet, &ice), vec!["Toyota"]);
        assert_eq!(models(&fleet, &ice, "Toyota"), vec!["Corolla"]);
    }

    #[test]
    fn changing_brand_clears_downstream() {
        let fleet = fleet();
        let filter = VehicleFilter::any();
        let mut sel = CascadeSelection::default();
        sel.set_brand(Some("Tesla".into()));
        sel.set_model(Some("Model 3".into()));
        sel.set_year(Some(2023));
        assert_eq!(sel.selected(&fleet, &filter).map(|v| v.year), Some(2023));

        sel.set_brand(Some("Toyota".into()));
        assert_eq!(sel.model, None);
        assert_eq!(sel.year, None);
        let opts = sel.options(&fleet, &filter);
        assert_eq!(opts.models, vec!["Corolla", "Prius"]);
        assert!(opts.years.is_empty());
        assert!(sel.selected(&fleet, &filter).is_none());
    }

    #[test]
    fn changing_model_clears_year_only() {
        let mut sel = CascadeSelection::default();
        sel.set_brand(Some("Tesla".into()));
        sel.set_model(Some("Model 3".into()));
        sel.set_year(Some(2021));
        sel.set_model(Some("Model Y".into()));
        assert_eq!(sel.brand.as_deref(), Some("Tesla"));
        assert_eq!(sel.year, None);
    }

    #[test]
    fn empty_string_counts_as_unselected() {
        let mut sel = CascadeSelection::default();
        sel.set_brand(Some(String::new()));
        assert_eq!(sel.brand, None);
        assert!(sel.options(&fleet(), &VehicleFilter::any()).models.is_empty());
    }
}
