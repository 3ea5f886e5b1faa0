//! Parsing and validation of user-supplied vehicle and country values.

use regex::Regex;
use std::sync::LazyLock;

use crate::api::{ApiError, VehicleKey};

// ---------------------------------------------------------------------------
// Compiled regexes
// ---------------------------------------------------------------------------

/// ISO-style country codes as the backend uses them: `US`, `DE`, `UK`, `EU27`.
static COUNTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{0,3}$").expect("country regex must compile"));

/// `Brand|Model|Year`, with optional whitespace around each part. The year
/// may carry a trailing `.0` the way some exports write it.
static VEHICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^|]+?)\s*\|\s*([^|]+?)\s*\|\s*(\d{4})(?:\.0+)?\s*$")
        .expect("vehicle regex must compile")
});

/// Normalize and validate a country code.
pub fn country(raw: &str) -> Result<String, ApiError> {
    let code = raw.trim().to_ascii_uppercase();
    if COUNTRY_RE.is_match(&code) {
        Ok(code)
    } else {
        Err(ApiError::Input(format!("invalid country code '{raw}'")))
    }
}

/// Parse `Brand|Model|Year` into a key.
pub fn vehicle_key(raw: &str) -> Result<VehicleKey, ApiError> {
    let caps = VEHICLE_RE.captures(raw).ok_or_else(|| {
        ApiError::Input(format!("expected 'Brand|Model|Year', got '{raw}'"))
    })?;
    let year = caps[3]
        .parse::<i32>()
        .map_err(|e| ApiError::Input(format!("invalid year in '{raw}': {e}")))?;
    Ok(VehicleKey::new(&caps[1], &caps[2], year))
}

/// Build a key from separate parts, rejecting blanks.
pub fn vehicle_parts(brand: &str, model: &str, year: i32) -> Result<VehicleKey, ApiError> {
    let (brand, model) = (brand.trim(), model.trim());
    if brand.is_empty() || model.is_empty() {
        return Err(ApiError::Input("brand and model are required".into()));
    }
    if !(1900..=2100).contains(&year) {
        return Err(ApiError::Input(format!("implausible model year {year}")));
    }
    Ok(VehicleKey::new(brand, model, year))
}
