//! Page controllers and the view-model logic behind each dashboard page.
//!
//! Everything here is plain data in, plain data out. The CLI renders the
//! views as tables, the web surface serializes them to JSON.

pub mod break_even;
pub mod cascade;
pub mod compare;
pub mod greenwashing;
pub mod grid;
pub mod input;
pub mod recommend;
pub mod selection;
pub mod vehicle_detail;

/// Reference lifetime distance the backend amortizes manufacturing over (km).
pub const REFERENCE_LIFETIME_KM: f64 = 278_600.0;

/// Annual distance assumed for multi-year projections (km).
pub const AVERAGE_ANNUAL_KM: f64 = 15_000.0;
