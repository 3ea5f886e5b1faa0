//! Wire types for the CarbonWise backend.
//!
//! Field names follow the backend's JSON (snake_case, with a few legacy
//! spellings such as `Year` and `type`). Unknown fields on result objects
//! are kept in an `extra` map so they survive a round trip, e.g. when a
//! lifecycle result is posted back to `/greenwashing`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

/// Vehicle powertrain as reported in the backend's `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Powertrain {
    Ev,
    Ice,
    Hev,
    Phev,
    Other(String),
}

impl Powertrain {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ev => "EV",
            Self::Ice => "ICE",
            Self::Hev => "HEV",
            Self::Phev => "PHEV",
            Self::Other(s) => s,
        }
    }

    /// Lowercase name, used for badge CSS classes.
    pub fn badge_class(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Parse user input; accepts `BEV` as an alias for `EV`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "EV" | "BEV" => Self::Ev,
            "ICE" => Self::Ice,
            "HEV" => Self::Hev,
            "PHEV" => Self::Phev,
            _ => Self::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for Powertrain {
    fn from(s: String) -> Self {
        match s.as_str() {
            "EV" => Self::Ev,
            "ICE" => Self::Ice,
            "HEV" => Self::Hev,
            "PHEV" => Self::Phev,
            _ => Self::Other(s),
        }
    }
}

impl From<Powertrain> for String {
    fn from(p: Powertrain) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Powertrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a vehicle: brand + model + year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleKey {
    pub brand: String,
    pub model: String,
    #[serde(deserialize_with = "de_year")]
    pub year: i32,
}

impl VehicleKey {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            year,
        }
    }

    /// Display label used on cards and chart axes: `"Brand Model"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}

impl fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.brand, self.model, self.year)
    }
}

/// One entry of `GET /vehicles` or `GET /vehicle-detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub brand: String,
    pub model: String,
    #[serde(rename = "Year", alias = "year", deserialize_with = "de_year")]
    pub year: i32,
    #[serde(rename = "type", alias = "powertrain")]
    pub powertrain: Powertrain,
    /// Manufacturer-claimed tailpipe figure (g/km), ICE only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co2_wltp_gpkm: Option<f64>,
    /// Electric consumption (Wh/km), EV only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_wh_per_km: Option<f64>,
}

impl Vehicle {
    pub fn key(&self) -> VehicleKey {
        VehicleKey::new(&self.brand, &self.model, self.year)
    }

    pub fn matches(&self, key: &VehicleKey) -> bool {
        self.brand == key.brand && self.model == key.model && self.year == key.year
    }
}

/// Years arrive as integers, floats (`2021.0`) or strings depending on
/// which backend script produced the data file.
fn de_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match &value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(|y| y as i32)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid year: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid year: {s:?}"))),
        other => Err(serde::de::Error::custom(format!("invalid year: {other}"))),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Backend lifecycle calculation for one vehicle in one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleResult {
    pub total_g_per_km: f64,
    pub manufacturing_g_per_km: f64,
    pub operational_g_per_km: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LifecycleResult {
    pub fn new(total: f64, manufacturing: f64, operational: f64) -> Self {
        Self {
            total_g_per_km: total,
            manufacturing_g_per_km: manufacturing,
            operational_g_per_km: operational,
            extra: BTreeMap::new(),
        }
    }
}

/// `GET /compare` single-vehicle summary used by the legacy lifecycle page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleComparison {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub per_km_g: Option<f64>,
    #[serde(default)]
    pub lifetime_kg: Option<f64>,
}

// ---------------------------------------------------------------------------
// Break-even
// ---------------------------------------------------------------------------

/// `POST /break-even` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    #[serde(default)]
    pub break_even_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing_difference_g_per_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operational_advantage_g_per_km: Option<f64>,
    pub ev_manufacturing_g_per_km: f64,
    pub ev_operational_g_per_km: f64,
    pub ev_total_g_per_km: f64,
    pub ice_manufacturing_g_per_km: f64,
    pub ice_operational_g_per_km: f64,
    pub ice_total_g_per_km: f64,
}

/// Vehicle reference inside a `/break-even` request. The backend filters
/// its data file on the raw `Year` column here.
#[derive(Debug, Serialize)]
pub(crate) struct BreakEvenVehicle<'a> {
    pub brand: &'a str,
    pub model: &'a str,
    #[serde(rename = "Year")]
    pub year: i32,
}

impl<'a> From<&'a VehicleKey> for BreakEvenVehicle<'a> {
    fn from(key: &'a VehicleKey) -> Self {
        Self {
            brand: &key.brand,
            model: &key.model,
            year: key.year,
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Optional narrowing applied by `/recommend`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendFilters {
    #[serde(rename = "bodyType", skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub powertrain: Option<String>,
    #[serde(rename = "priceMin", skip_serializing_if = "Option::is_none")]
    pub price_min: Option<u32>,
    #[serde(rename = "priceMax", skip_serializing_if = "Option::is_none")]
    pub price_max: Option<u32>,
}

/// `POST /recommend` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub daily_km: f64,
    pub years: u32,
    pub filters: RecommendFilters,
    pub country: String,
    pub grid_year: i32,
}

/// One ranked vehicle from `/recommend`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Display name, e.g. `"Tesla Model 3 (2023)"`.
    pub vehicle: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    pub powertrain: Powertrain,
    pub operational_g_per_km: f64,
    pub manufacturing_g_per_km: f64,
    pub total_g_per_km: f64,
    #[serde(default)]
    pub personalized_total_kg: Option<f64>,
}

/// The backend has shipped both a bare list and a `{ "recommended": [...] }`
/// envelope for `/recommend`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecommendResponse {
    List(Vec<Recommendation>),
    Envelope {
        #[serde(default)]
        recommended: Vec<Recommendation>,
    },
}

impl RecommendResponse {
    pub fn into_vec(self) -> Vec<Recommendation> {
        match self {
            Self::List(v) => v,
            Self::Envelope { recommended } => recommended,
        }
    }
}

// ---------------------------------------------------------------------------
// Greenwashing, score, impact, sensitivity
// ---------------------------------------------------------------------------

/// Vehicle metadata posted alongside a lifecycle to `/greenwashing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenwashingSubject {
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub powertrain: Powertrain,
}

impl From<&Vehicle> for GreenwashingSubject {
    fn from(v: &Vehicle) -> Self {
        Self {
            brand: v.brand.clone(),
            model: v.model.clone(),
            year: v.year,
            powertrain: v.powertrain.clone(),
        }
    }
}

/// `POST /greenwashing` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreenwashingReport {
    #[serde(default)]
    pub is_greenwashing_risk: bool,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub transparency_score: Option<f64>,
}

/// `POST /carbon-score` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonScore {
    pub score: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CarbonScore {
    /// Older backends send `label`, newer ones `category`.
    pub fn label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.category.as_deref())
            .unwrap_or("N/A")
    }
}

/// `POST /annual-impact` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualImpact {
    pub annual_kg: f64,
    #[serde(default)]
    pub annual_tons: Option<f64>,
    #[serde(default)]
    pub equivalent: Option<String>,
}

/// One row of `POST /grid-sensitivity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityEntry {
    pub country: String,
    pub total_g_per_km: f64,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// `GET /` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn summary(&self) -> &str {
        self.status
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("ok")
    }
}

/// `GET /countries` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
}

/// `GET /methodology` is a flat key → description object.
pub type Methodology = BTreeMap<String, Value>;

/// Intensity for one country-year; either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    #[serde(default)]
    pub raw: Option<f64>,
    #[serde(default)]
    pub corrected: Option<f64>,
}

/// `GET /grid-data`: country → year (as a string key) → intensity.
pub type GridData = BTreeMap<String, BTreeMap<String, GridPoint>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_reads_legacy_field_names() {
        let json = r#"{"brand":"Tesla","model":"Model 3","Year":2023,"type":"EV",
                       "co2_wltp_gpkm":null,"electric_wh_per_km":150.2}"#;
        let v: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(v.year, 2023);
        assert_eq!(v.powertrain, Powertrain::Ev);
        assert_eq!(v.electric_wh_per_km, Some(150.2));
        assert!(v.co2_wltp_gpkm.is_none());
    }

    #[test]
    fn vehicle_accepts_lowercase_year_and_string_values() {
        let json = r#"{"brand":"Toyota","model":"Prius","year":"2020","type":"HEV"}"#;
        let v: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(v.year, 2020);
        assert_eq!(v.powertrain, Powertrain::Hev);

        let json = r#"{"brand":"Ford","model":"Focus","Year":2019.0,"type":"Diesel"}"#;
        let v: Vehicle = serde_json::from_str(json).unwrap();
        assert_eq!(v.year, 2019);
        assert_eq!(v.powertrain, Powertrain::Other("Diesel".to_string()));
    }

    #[test]
    fn powertrain_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&Powertrain::Phev).unwrap(), "\"PHEV\"");
        assert_eq!(Powertrain::parse("bev"), Powertrain::Ev);
        assert_eq!(Powertrain::Ice.badge_class(), "ice");
    }

    #[test]
    fn lifecycle_keeps_extra_fields() {
        let json = r#"{"total_g_per_km":120.5,"manufacturing_g_per_km":40.0,
                       "operational_g_per_km":80.5,"country":"DE"}"#;
        let lc: LifecycleResult = serde_json::from_str(json).unwrap();
        assert_eq!(lc.extra.get("country"), Some(&Value::from("DE")));
        let back = serde_json::to_value(&lc).unwrap();
        assert_eq!(back["country"], "DE");
        assert_eq!(back["total_g_per_km"], 120.5);
    }

    #[test]
    fn break_even_vehicle_uses_capitalised_year() {
        let key = VehicleKey::new("Nissan", "Leaf", 2022);
        let json = serde_json::to_value(BreakEvenVehicle::from(&key)).unwrap();
        assert_eq!(json["Year"], 2022);
        assert!(json.get("year").is_none());
    }

    #[test]
    fn recommend_response_accepts_both_shapes() {
        let item = r#"{"vehicle":"A B (2020)","powertrain":"EV","operational_g_per_km":50,
                       "manufacturing_g_per_km":40,"total_g_per_km":90}"#;
        let list: RecommendResponse = serde_json::from_str(&format!("[{item}]")).unwrap();
        assert_eq!(list.into_vec().len(), 1);
        let env: RecommendResponse =
            serde_json::from_str(&format!(r#"{{"recommended":[{item},{item}]}}"#)).unwrap();
        assert_eq!(env.into_vec().len(), 2);
    }

    #[test]
    fn recommend_filters_use_camel_case_and_skip_empty() {
        let filters = RecommendFilters {
            body_type: Some("SUV".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["bodyType"], "SUV");
        assert!(json.get("powertrain").is_none());
    }

    #[test]
    fn carbon_score_label_falls_back_to_category() {
        let s: CarbonScore = serde_json::from_str(r#"{"score":55.0,"category":"Moderate"}"#).unwrap();
        assert_eq!(s.label(), "Moderate");
    }

    #[test]
    fn grid_data_tolerates_nulls() {
        let json = r#"{"US":{"2020":{"raw":400.0,"corrected":420.0},"2021":{"raw":null,"corrected":null}}}"#;
        let grid: GridData = serde_json::from_str(json).unwrap();
        assert_eq!(grid["US"]["2021"], GridPoint::default());
    }
}
