//! Grid insights: per-country intensity series, the optional linear
//! forecast and the transmission-loss figure.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::api::{ApiError, CarbonClient, GridData, GridPoint};
use crate::format::{PLACEHOLDER, format_large_number};

/// Number of years projected past the latest valid data point.
pub const FORECAST_YEARS: i32 = 5;

/// One year of a country's series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    /// Generation intensity (g CO₂/kWh).
    pub raw: Option<f64>,
    /// Plug-adjusted intensity, including transmission losses.
    pub corrected: Option<f64>,
    pub projected: bool,
}

impl SeriesPoint {
    fn is_complete(&self) -> bool {
        self.raw.is_some() && self.corrected.is_some()
    }
}

/// Year-ordered series for `country`. Year keys that do not parse as
/// integers are skipped.
pub fn country_series(data: &GridData, country: &str) -> Vec<SeriesPoint> {
    let Some(years) = data.get(country) else {
        return Vec::new();
    };
    let by_year: BTreeMap<i32, GridPoint> = years
        .iter()
        .filter_map(|(y, p)| y.trim().parse::<i32>().ok().map(|y| (y, *p)))
        .collect();
    by_year
        .into_iter()
        .map(|(year, p)| SeriesPoint {
            year,
            raw: p.raw,
            corrected: p.corrected,
            projected: false,
        })
        .collect()
}

/// Average yearly change between the first and last value.
fn trend(values: &[(i32, f64)]) -> f64 {
    match values {
        [first, .., last] => (last.1 - first.1) / (values.len() - 1) as f64,
        _ => 0.0,
    }
}

/// Projection of one series from its own latest valid year. Empty with
/// fewer than two valid years.
fn project(points: &[(i32, f64)]) -> Vec<(i32, f64)> {
    let Some(&(last_year, last_value)) = points.last().filter(|_| points.len() >= 2) else {
        return Vec::new();
    };
    let slope = trend(points);
    (1..=FORECAST_YEARS)
        .map(|step| {
            let value = last_value + slope * step as f64;
            (last_year + step, value.max(0.0))
        })
        .collect()
}

/// Append a five-year linear projection to `series`.
///
/// Raw and corrected are fitted independently, each over the years where
/// that value is present, and projected from that series' latest valid
/// year. A series with fewer than two valid years is not extended.
/// Projected values never drop below zero.
pub fn extend_with_forecast(series: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let history: Vec<&SeriesPoint> = series.iter().filter(|p| !p.projected).collect();
    let raw: Vec<(i32, f64)> = history
        .iter()
        .filter_map(|p| p.raw.map(|v| (p.year, v)))
        .collect();
    let corrected: Vec<(i32, f64)> = history
        .iter()
        .filter_map(|p| p.corrected.map(|v| (p.year, v)))
        .collect();

    let mut projected: BTreeMap<i32, SeriesPoint> = BTreeMap::new();
    for (year, value) in project(&raw) {
        projected.entry(year).or_insert_with(|| blank_projection(year)).raw = Some(value);
    }
    for (year, value) in project(&corrected) {
        projected
            .entry(year)
            .or_insert_with(|| blank_projection(year))
            .corrected = Some(value);
    }

    let mut out = series.to_vec();
    for point in projected.into_values() {
        // Years already in the history keep their observed values
        if !out.iter().any(|p| p.year == point.year) {
            out.push(point);
        }
    }
    out
}

fn blank_projection(year: i32) -> SeriesPoint {
    SeriesPoint {
        year,
        raw: None,
        corrected: None,
        projected: true,
    }
}

/// Two decimals plus a percent sign, matching the rounding of
/// [`transmission_loss_pct`].
pub fn format_loss(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Share of generated electricity lost before the plug, in percent,
/// rounded to two decimals. `None` when raw is missing or zero.
pub fn transmission_loss_pct(point: &GridPoint) -> Option<f64> {
    let (raw, corrected) = (point.raw?, point.corrected?);
    if raw == 0.0 {
        return None;
    }
    Some(((corrected - raw) / raw * 100.0 * 100.0).round() / 100.0)
}

/// Grid-insights page view for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridView {
    pub country: String,
    /// Year the headline figures are taken from.
    pub year: Option<i32>,
    pub generation_intensity: String,
    pub plug_adjusted_intensity: String,
    pub transmission_loss_pct: Option<f64>,
    pub transmission_loss: String,
    pub series: Vec<SeriesPoint>,
}

impl GridView {
    /// Headline figures come from `year` when it has data, otherwise from
    /// the latest complete year.
    pub fn build(data: &GridData, country: &str, year: Option<i32>, forecast: bool) -> Self {
        let history = country_series(data, country);
        let headline = year
            .and_then(|y| history.iter().find(|p| p.year == y && p.is_complete()))
            .or_else(|| history.iter().rev().find(|p| p.is_complete()))
            .copied();

        let loss = headline.and_then(|p| {
            transmission_loss_pct(&GridPoint {
                raw: p.raw,
                corrected: p.corrected,
            })
        });
        let series = if forecast {
            extend_with_forecast(&history)
        } else {
            history
        };

        Self {
            country: country.to_string(),
            year: headline.map(|p| p.year),
            generation_intensity: format_large_number(headline.and_then(|p| p.raw)),
            plug_adjusted_intensity: format_large_number(headline.and_then(|p| p.corrected)),
            transmission_loss_pct: loss,
            transmission_loss: format_loss(loss),
            series,
        }
    }

    pub fn fetch(
        client: &CarbonClient,
        country: &str,
        year: Option<i32>,
        forecast: bool,
    ) -> Result<Self, ApiError> {
        let data = client.grid_data()?;
        if !data.contains_key(country) {
            return Err(ApiError::Input(format!("no grid data for country '{country}'")));
        }
        Ok(Self::build(&data, country, year, forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(raw: Option<f64>, corrected: Option<f64>) -> GridPoint {
        GridPoint { raw, corrected }
    }

    fn data() -> GridData {
        let mut data = GridData::new();
        data.insert(
            "US".into(),
            BTreeMap::from([
                ("2020".into(), point(Some(400.0), Some(420.0))),
                ("2021".into(), point(Some(390.0), None)),
                ("2022".into(), point(Some(380.0), Some(400.0))),
                ("2023".into(), point(Some(360.0), Some(380.0))),
            ]),
        );
        data.insert(
            "DE".into(),
            BTreeMap::from([("2023".into(), point(Some(350.0), Some(371.0)))]),
        );
        data.insert(
            "FR".into(),
            BTreeMap::from([
                ("2022".into(), point(Some(20.0), Some(22.0))),
                ("2023".into(), point(Some(5.0), Some(6.0))),
            ]),
        );
        data
    }

    #[test]
    fn series_is_year_ordered() {
        let s = country_series(&data(), "US");
        let years: Vec<i32> = s.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023]);
        assert!(country_series(&data(), "XX").is_empty());
    }

    #[test]
    fn forecast_fits_each_series_over_its_own_years() {
        let s = extend_with_forecast(&country_series(&data(), "US"));
        assert_eq!(s.len(), 4 + 5);
        // raw: 4 points 400 -> 360, trend -40/3; corrected: 3 points 420 -> 380, trend -20
        let first = s[4];
        assert!(first.projected);
        assert_eq!(first.year, 2024);
        assert!((first.raw.unwrap() - (360.0 - 40.0 / 3.0)).abs() < 1e-9);
        assert_eq!(first.corrected, Some(360.0));
        assert_eq!(s[8].year, 2028);
        assert!((s[8].raw.unwrap() - (360.0 - 200.0 / 3.0)).abs() < 1e-9);
        assert_eq!(s[8].corrected, Some(280.0));
    }

    #[test]
    fn sparse_corrected_series_does_not_block_raw_forecast() {
        let history: Vec<SeriesPoint> = (2019..=2023)
            .map(|year| SeriesPoint {
                year,
                raw: Some(500.0 - 10.0 * (year - 2019) as f64),
                corrected: (year == 2023).then_some(470.0),
                projected: false,
            })
            .collect();
        let s = extend_with_forecast(&history);
        assert_eq!(s.len(), 10);
        assert!(s[5..].iter().all(|p| p.projected && p.corrected.is_none()));
        assert_eq!(s[5].year, 2024);
        assert_eq!(s[5].raw, Some(450.0));
        assert_eq!(s[9].raw, Some(410.0));
    }

    #[test]
    fn series_projects_from_its_own_latest_year() {
        let history = vec![
            SeriesPoint {
                year: 2020,
                raw: Some(100.0),
                corrected: Some(110.0),
                projected: false,
            },
            SeriesPoint {
                year: 2021,
                raw: Some(90.0),
                corrected: Some(100.0),
                projected: false,
            },
            SeriesPoint {
                year: 2022,
                raw: Some(80.0),
                corrected: None,
                projected: false,
            },
        ];
        let s = extend_with_forecast(&history);
        // corrected continues from 2021; 2022 keeps its observed gap
        assert_eq!(s[2].corrected, None);
        assert!(!s[2].projected);
        let y2023 = s.iter().find(|p| p.year == 2023).unwrap();
        assert_eq!(y2023.raw, Some(70.0));
        assert_eq!(y2023.corrected, Some(80.0));
        let y2026 = s.iter().find(|p| p.year == 2026).unwrap();
        assert_eq!(y2026.corrected, Some(50.0));
        assert_eq!(y2026.raw, Some(40.0));
        let y2027 = s.iter().find(|p| p.year == 2027).unwrap();
        assert_eq!(y2027.raw, Some(30.0));
        assert_eq!(y2027.corrected, None);
    }

    #[test]
    fn forecast_clamps_at_zero() {
        let s = extend_with_forecast(&country_series(&data(), "FR"));
        assert_eq!(s[2].raw, Some(0.0));
        assert!(s.iter().all(|p| p.raw.unwrap() >= 0.0 && p.corrected.unwrap() >= 0.0));
    }

    #[test]
    fn forecast_needs_two_valid_points() {
        let history = country_series(&data(), "DE");
        assert_eq!(extend_with_forecast(&history), history);

        let sparse = vec![
            SeriesPoint {
                year: 2020,
                raw: Some(1.0),
                corrected: None,
                projected: false,
            },
            SeriesPoint {
                year: 2021,
                raw: None,
                corrected: Some(2.1),
                projected: false,
            },
        ];
        assert_eq!(extend_with_forecast(&sparse), sparse);
    }

    #[test]
    fn transmission_loss_two_decimals() {
        assert_eq!(transmission_loss_pct(&point(Some(400.0), Some(420.0))), Some(5.0));
        assert_eq!(transmission_loss_pct(&point(Some(300.0), Some(310.0))), Some(3.33));
        assert_eq!(transmission_loss_pct(&point(Some(0.0), Some(10.0))), None);
        assert_eq!(transmission_loss_pct(&point(None, Some(10.0))), None);
    }

    #[test]
    fn switching_country_recomputes_loss() {
        let data = data();
        let us = GridView::build(&data, "US", Some(2023), false);
        assert_eq!(us.transmission_loss_pct, Some(5.56));
        let de = GridView::build(&data, "DE", Some(2023), false);
        assert_eq!(de.transmission_loss_pct, Some(6.0));
        assert_eq!(de.transmission_loss, "6.00%");
        assert_eq!(us.transmission_loss, "5.56%");
        assert_eq!(format_loss(None), "N/A");
        assert_eq!(de.generation_intensity, "350.0");
    }

    #[test]
    fn headline_falls_back_to_latest_complete_year() {
        let view = GridView::build(&data(), "US", Some(2021), true);
        assert_eq!(view.year, Some(2023));
        assert_eq!(view.series.len(), 9);
    }
}
