//! Suitability-weighted session scoring.
//!
//! Every function here is pure: identical inputs always produce identical
//! outputs, and missing or unknown inputs degrade to a zero score instead of
//! failing.

use serde::{Deserialize, Serialize};

use super::domain::{ObservationRecord, Suitability, SwellSuitability};

/// Multiplier applied to a raw factor score for a given suitability judgment.
pub trait Weighted: Copy {
    fn weight(self) -> f64;
}

impl Weighted for Suitability {
    fn weight(self) -> f64 {
        match self {
            Suitability::Yes => 1.0,
            Suitability::Ok => 0.5,
            Suitability::No => 0.0,
        }
    }
}

impl Weighted for SwellSuitability {
    fn weight(self) -> f64 {
        match self {
            SwellSuitability::Yes => 1.0,
            SwellSuitability::Ok => 0.5,
            SwellSuitability::No | SwellSuitability::TooBig => 0.0,
        }
    }
}

/// Weight of an optional judgment; absent or unrecognised judgments weigh nothing.
pub fn weight<S: Weighted>(suitability: Option<S>) -> f64 {
    suitability.map(Weighted::weight).unwrap_or(0.0)
}

/// Rounds to one decimal place, ties to even (`0.25` becomes `0.2`).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// `round(raw * weight(suitability), 1)`; a missing raw score counts as zero.
pub fn final_score<S: Weighted>(raw_score: Option<u8>, suitability: Option<S>) -> f64 {
    let raw = f64::from(raw_score.unwrap_or(0));
    round1(raw * weight(suitability))
}

/// Composite of the three final scores: `round(swell * wind * tide / 3, 1)`.
///
/// The product means a single unsuitable factor pulls the session to zero.
/// Returns `0.0` when any of the three is absent.
pub fn total_score(swell: Option<f64>, wind: Option<f64>, tide: Option<f64>) -> f64 {
    match (swell, wind, tide) {
        (Some(swell), Some(wind), Some(tide)) => round1(swell * wind * tide / 3.0),
        _ => 0.0,
    }
}

/// Final per-factor scores and the composite for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub swell: f64,
    pub wind: f64,
    pub tide: f64,
    pub total: f64,
}

impl ScoreCard {
    pub fn from_finals(swell: f64, wind: f64, tide: f64) -> Self {
        Self {
            swell,
            wind,
            tide,
            total: total_score(Some(swell), Some(wind), Some(tide)),
        }
    }
}

/// Scores a record from its raw sub-scores and suitability judgments.
///
/// The record itself is left untouched; stored final scores are ignored.
pub fn score_record(record: &ObservationRecord) -> ScoreCard {
    ScoreCard::from_finals(
        final_score(record.swell.score, record.swell.suitable),
        final_score(record.wind.score, record.wind.suitable),
        final_score(record.tide.score, record.tide.suitable),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_follow_suitability_table() {
        assert_eq!(weight(Some(SwellSuitability::Yes)), 1.0);
        assert_eq!(weight(Some(SwellSuitability::Ok)), 0.5);
        assert_eq!(weight(Some(SwellSuitability::No)), 0.0);
        assert_eq!(weight(Some(SwellSuitability::TooBig)), 0.0);
        assert_eq!(weight(Some(Suitability::Ok)), 0.5);
        assert_eq!(weight::<Suitability>(None), 0.0);
    }

    #[test]
    fn final_score_is_zero_for_no_regardless_of_raw() {
        for raw in 0..=10u8 {
            assert_eq!(final_score(Some(raw), Some(Suitability::No)), 0.0);
            assert_eq!(final_score(Some(raw), Some(Suitability::Yes)), f64::from(raw));
            assert_eq!(
                final_score(Some(raw), Some(Suitability::Ok)),
                round1(f64::from(raw) * 0.5)
            );
        }
    }

    #[test]
    fn final_score_treats_missing_raw_as_zero() {
        assert_eq!(final_score(None, Some(SwellSuitability::Yes)), 0.0);
    }

    #[test]
    fn total_is_zero_when_any_factor_is_absent() {
        assert_eq!(total_score(None, Some(5.0), Some(5.0)), 0.0);
        assert_eq!(total_score(Some(5.0), None, Some(5.0)), 0.0);
        assert_eq!(total_score(Some(5.0), Some(5.0), None), 0.0);
    }

    #[test]
    fn total_divides_product_by_three() {
        assert_eq!(total_score(Some(8.0), Some(3.0), Some(4.0)), 32.0);
        assert_eq!(total_score(Some(1.0), Some(1.0), Some(1.0)), 0.3);
        assert_eq!(total_score(Some(10.0), Some(10.0), Some(10.0)), 333.3);
    }

    #[test]
    fn total_rounds_ties_to_even() {
        // 1/Ok, 1/Ok, 3/Yes
        assert_eq!(total_score(Some(0.5), Some(0.5), Some(3.0)), 0.2);
        assert_eq!(total_score(Some(0.5), Some(1.5), Some(5.0)), 1.2);
    }

    #[test]
    fn score_record_uses_raw_scores_not_stored_finals() {
        let mut record = ObservationRecord::default();
        record.swell.score = Some(8);
        record.swell.suitable = Some(SwellSuitability::Yes);
        record.swell.final_score = Some(1.0);
        record.wind.score = Some(6);
        record.wind.suitable = Some(Suitability::Ok);
        record.tide.score = Some(4);
        record.tide.suitable = Some(Suitability::Yes);

        let card = score_record(&record);
        assert_eq!(card.swell, 8.0);
        assert_eq!(card.wind, 3.0);
        assert_eq!(card.tide, 4.0);
        assert_eq!(card.total, 32.0);
    }
}
