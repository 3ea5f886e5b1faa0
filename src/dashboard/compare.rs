//! Lifecycle comparison page: a filterable vehicle list, up to three
//! selected vehicles, comparison cards and two bar charts.

use serde::Serialize;

use super::selection::{Selection, ToggleOutcome};
use super::{AVERAGE_ANNUAL_KM, REFERENCE_LIFETIME_KM};
use crate::api::{ApiError, CarbonClient, Powertrain, Vehicle, VehicleKey};

/// Unit shown on comparison cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Lifecycle grams per kilometre, as the backend reports it.
    #[default]
    GKm,
    /// Kilograms over the reference lifetime.
    LifetimeKg,
    /// Kilograms over ten years at the average annual distance.
    TenYearKg,
}

impl Unit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "g_km" | "g/km" => Some(Self::GKm),
            "lifetime_kg" | "lifetime" => Some(Self::LifetimeKg),
            "ten_year_kg" | "10y" | "ten_year" => Some(Self::TenYearKg),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GKm => "g CO₂/km",
            Self::LifetimeKg => "kg CO₂ (lifetime)",
            Self::TenYearKg => "kg CO₂ (10 years)",
        }
    }

    /// Convert a g/km figure into this unit.
    pub fn convert(self, g_per_km: f64) -> f64 {
        match self {
            Self::GKm => g_per_km,
            Self::LifetimeKg => g_per_km * REFERENCE_LIFETIME_KM / 1000.0,
            Self::TenYearKg => g_per_km * AVERAGE_ANNUAL_KM * 10.0 / 1000.0,
        }
    }
}

/// Narrowing applied to the vehicle list. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub brand: Option<String>,
    pub year: Option<i32>,
    pub powertrain: Option<Powertrain>,
}

impl ListFilter {
    pub fn accepts(&self, v: &Vehicle) -> bool {
        self.brand.as_ref().is_none_or(|b| &v.brand == b)
            && self.year.is_none_or(|y| v.year == y)
            && self.powertrain.as_ref().is_none_or(|p| &v.powertrain == p)
    }
}

/// A row of the vehicle list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub key: VehicleKey,
    pub powertrain: Powertrain,
    pub selected: bool,
    /// Not selectable because the set is full.
    pub disabled: bool,
}

/// One comparison card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCard {
    pub key: VehicleKey,
    pub label: String,
    pub powertrain: Option<Powertrain>,
    pub pending: bool,
    /// Lifecycle figure in the page's current unit.
    pub value: Option<f64>,
    pub manufacturing_g_per_km: Option<f64>,
    pub operational_g_per_km: Option<f64>,
}

/// Stacked bar: manufacturing + operational per vehicle (g/km).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StackedChart {
    pub labels: Vec<String>,
    pub manufacturing: Vec<f64>,
    pub operational: Vec<f64>,
}

/// Everything the page renders after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareView {
    pub unit: Unit,
    pub unit_label: &'static str,
    pub selected_count: usize,
    pub list: Vec<ListItem>,
    pub cards: Vec<ComparisonCard>,
    /// Lifecycle g/km per confirmed vehicle. Empty when nothing is selected.
    pub bar_labels: Vec<String>,
    pub bar_values: Vec<f64>,
    pub stacked: StackedChart,
}

/// A vehicle [`ComparePage::select_all`] could not add.
#[derive(Debug)]
pub enum Skipped {
    /// The selection already held three vehicles.
    Full(VehicleKey),
    /// The lifecycle fetch failed; the selection was rolled back.
    Failed(VehicleKey, ApiError),
}

/// Page state: the loaded vehicle list plus the selection.
#[derive(Debug, Clone)]
pub struct ComparePage {
    pub vehicles: Vec<Vehicle>,
    pub selection: Selection,
    pub filter: ListFilter,
    pub unit: Unit,
    pub country: String,
    pub grid_year: i32,
}

impl ComparePage {
    pub fn new(country: impl Into<String>, grid_year: i32) -> Self {
        Self {
            vehicles: Vec::new(),
            selection: Selection::new(),
            filter: ListFilter::default(),
            unit: Unit::default(),
            country: country.into(),
            grid_year,
        }
    }

    /// Replace the vehicle list from the backend.
    pub fn load_vehicles(&mut self, client: &CarbonClient) -> Result<(), ApiError> {
        self.vehicles = client.vehicles()?;
        Ok(())
    }

    /// Toggle `key`, fetching its lifecycle when it gets added.
    pub fn toggle(
        &mut self,
        client: &CarbonClient,
        key: VehicleKey,
    ) -> Result<ToggleOutcome, ApiError> {
        let (country, grid_year) = (self.country.clone(), self.grid_year);
        self.selection
            .toggle_with(key, |k| client.lifecycle(k, &country, grid_year))
    }

    /// Add each key in order. Keys that are already selected, including
    /// repeats within `keys`, are left as they are rather than toggled off.
    pub fn select_all(
        &mut self,
        client: &CarbonClient,
        keys: impl IntoIterator<Item = VehicleKey>,
    ) -> Vec<Skipped> {
        let mut skipped = Vec::new();
        for key in keys {
            if self.selection.contains(&key) {
                continue;
            }
            if self.selection.is_full() {
                skipped.push(Skipped::Full(key));
                continue;
            }
            if let Err(e) = self.toggle(client, key.clone()) {
                skipped.push(Skipped::Failed(key, e));
            }
        }
        skipped
    }

    fn powertrain_of(&self, key: &VehicleKey) -> Option<Powertrain> {
        self.vehicles
            .iter()
            .find(|v| v.matches(key))
            .map(|v| v.powertrain.clone())
    }

    /// Derive the full view from the current state.
    pub fn view(&self) -> CompareView {
        let full = self.selection.is_full();
        let list = self
            .vehicles
            .iter()
            .filter(|v| self.filter.accepts(v))
            .map(|v| {
                let key = v.key();
                let selected = self.selection.contains(&key);
                ListItem {
                    disabled: full && !selected,
                    selected,
                    powertrain: v.powertrain.clone(),
                    key,
                }
            })
            .collect();

        let cards = self
            .selection
            .entries()
            .iter()
            .map(|entry| ComparisonCard {
                label: entry.key.label(),
                powertrain: self.powertrain_of(&entry.key),
                pending: entry.is_pending(),
                value: entry
                    .lifecycle
                    .as_ref()
                    .map(|lc| self.unit.convert(lc.total_g_per_km)),
                manufacturing_g_per_km: entry.lifecycle.as_ref().map(|lc| lc.manufacturing_g_per_km),
                operational_g_per_km: entry.lifecycle.as_ref().map(|lc| lc.operational_g_per_km),
                key: entry.key.clone(),
            })
            .collect();

        let confirmed: Vec<_> = self
            .selection
            .entries()
            .iter()
            .filter_map(|e| e.lifecycle.as_ref().map(|lc| (e.key.label(), lc)))
            .collect();

        CompareView {
            unit: self.unit,
            unit_label: self.unit.label(),
            selected_count: self.selection.len(),
            list,
            cards,
            bar_labels: confirmed.iter().map(|(l, _)| l.clone()).collect(),
            bar_values: confirmed.iter().map(|(_, lc)| lc.total_g_per_km).collect(),
            stacked: StackedChart {
                labels: confirmed.iter().map(|(l, _)| l.clone()).collect(),
                manufacturing: confirmed
                    .iter()
                    .map(|(_, lc)| lc.manufacturing_g_per_km)
                    .collect(),
                operational: confirmed
                    .iter()
                    .map(|(_, lc)| lc.operational_g_per_km)
                    .collect(),
            },
        }
    }
}
