//! Recommendation cards: score, score class and reason tags derived from
//! each ranked vehicle the backend returns.

use serde::Serialize;

use crate::api::{ApiError, CarbonClient, Powertrain, RecommendRequest, Recommendation};

/// Lifecycle g/km that costs one score point.
pub const SCORE_DIVISOR: f64 = 3.0;

/// `clamp(0, 100, 100 - total / 3)`.
pub fn score(total_g_per_km: f64) -> f64 {
    (100.0 - total_g_per_km / SCORE_DIVISOR).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreClass {
    Excellent,
    Good,
    Moderate,
}

impl ScoreClass {
    pub fn of(score: f64) -> Self {
        if score >= 70.0 {
            Self::Excellent
        } else if score >= 50.0 {
            Self::Good
        } else {
            Self::Moderate
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Moderate => "moderate",
        }
    }
}

/// Short reasons shown under a recommendation.
pub fn reasons(rec: &Recommendation) -> Vec<&'static str> {
    let mut out = Vec::new();
    if rec.powertrain == Powertrain::Ev {
        out.push("Zero tailpipe emissions");
    }
    if rec.operational_g_per_km < 80.0 {
        out.push("Very low operational emissions");
    }
    if rec.total_g_per_km < 100.0 {
        out.push("Outstanding lifecycle footprint");
    } else if rec.total_g_per_km < 140.0 {
        out.push("Low lifecycle emissions");
    }
    if rec.manufacturing_g_per_km < 30.0 {
        out.push("Efficient manufacturing profile");
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCard {
    /// 1-based, in backend order.
    pub rank: usize,
    pub vehicle: String,
    pub powertrain: Powertrain,
    /// Rounded score for display.
    pub score: u32,
    pub score_class: ScoreClass,
    pub total_g_per_km: f64,
    pub personalized_total_kg: Option<f64>,
    pub reasons: Vec<&'static str>,
}

impl RecommendationCard {
    pub fn build(rank: usize, rec: &Recommendation) -> Self {
        let s = score(rec.total_g_per_km);
        Self {
            rank,
            vehicle: rec.vehicle.clone(),
            powertrain: rec.powertrain.clone(),
            score: s.round() as u32,
            score_class: ScoreClass::of(s),
            total_g_per_km: rec.total_g_per_km,
            personalized_total_kg: rec.personalized_total_kg,
            reasons: reasons(rec),
        }
    }
}

/// Cards in backend order, ranked from 1.
pub fn cards(recs: &[Recommendation]) -> Vec<RecommendationCard> {
    recs.iter()
        .enumerate()
        .map(|(i, r)| RecommendationCard::build(i + 1, r))
        .collect()
}

/// Validate the request and fetch ranked cards.
pub fn recommend(
    client: &CarbonClient,
    request: &RecommendRequest,
) -> Result<Vec<RecommendationCard>, ApiError> {
    if !(request.daily_km.is_finite() && request.daily_km > 0.0) {
        return Err(ApiError::Input("daily distance must be positive".into()));
    }
    if request.years == 0 {
        return Err(ApiError::Input("ownership years must be at least 1".into()));
    }
    if let (Some(min), Some(max)) = (request.filters.price_min, request.filters.price_max)
        && min > max
    {
        return Err(ApiError::Input(format!(
            "price range is empty ({min} > {max})"
        )));
    }
    Ok(cards(&client.recommend(request)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pt: Powertrain, mfg: f64, op: f64) -> Recommendation {
        Recommendation {
            vehicle: "Test Car (2023)".into(),
            brand: None,
            model: None,
            year: None,
            powertrain: pt,
            operational_g_per_km: op,
            manufacturing_g_per_km: mfg,
            total_g_per_km: mfg + op,
            personalized_total_kg: None,
        }
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(score(0.0), 100.0);
        assert_eq!(score(90.0), 70.0);
        assert_eq!(score(300.0), 0.0);
        assert_eq!(score(450.0), 0.0);
        assert_eq!(score(-30.0), 100.0);
    }

    #[test]
    fn class_thresholds() {
        assert_eq!(ScoreClass::of(70.0), ScoreClass::Excellent);
        assert_eq!(ScoreClass::of(69.9), ScoreClass::Good);
        assert_eq!(ScoreClass::of(50.0), ScoreClass::Good);
        assert_eq!(ScoreClass::of(49.9), ScoreClass::Moderate);
    }

    #[test]
    fn ev_with_low_footprint_gets_all_reasons() {
        let r = reasons(&rec(Powertrain::Ev, 25.0, 50.0));
        assert_eq!(
            r,
            vec![
                "Zero tailpipe emissions",
                "Very low operational emissions",
                "Outstanding lifecycle footprint",
                "Efficient manufacturing profile",
            ]
        );
    }

    #[test]
    fn lifecycle_reasons_are_exclusive() {
        let r = reasons(&rec(Powertrain::Hev, 40.0, 90.0));
        assert_eq!(r, vec!["Low lifecycle emissions"]);
        assert!(reasons(&rec(Powertrain::Ice, 40.0, 160.0)).is_empty());
    }

    #[test]
    fn cards_ranked_in_backend_order() {
        let recs = vec![
            rec(Powertrain::Ev, 40.0, 50.0),
            rec(Powertrain::Ice, 30.0, 180.0),
        ];
        let cards = cards(&recs);
        assert_eq!(cards[0].rank, 1);
        assert_eq!(cards[0].score, 70);
        assert_eq!(cards[0].score_class, ScoreClass::Excellent);
        assert_eq!(cards[1].rank, 2);
        assert_eq!(cards[1].score, 30);
        assert_eq!(cards[1].score_class, ScoreClass::Moderate);
    }
}
