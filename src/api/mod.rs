//! Client for the CarbonWise emissions backend.
//!
//! All lifecycle, break-even, scoring and recommendation math lives on the
//! backend; this module only moves typed JSON in and out.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CarbonClient, DEFAULT_BASE_URL, Method};
pub use error::ApiError;
pub use types::{
    AnnualImpact, BreakEvenResult, CarbonScore, Country, GreenwashingReport, GreenwashingSubject,
    GridData, GridPoint, HealthStatus, LifecycleResult, Methodology, Powertrain, RecommendFilters,
    RecommendRequest, Recommendation, SensitivityEntry, SingleComparison, Vehicle, VehicleKey,
};
