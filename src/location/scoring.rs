//! Confidence scoring: a 0–100 score built by subtracting penalties from
//! a perfect 100 and adding small bonuses for corroborating readings.

use super::types::ValidationStatus;

/// Signals feeding the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInput {
    pub accuracy_m: f64,
    pub readings_count: u32,
    pub stability_m: f64,
    pub land_use_valid: bool,
    /// Distance to the nearest region center; `None` when no region exists.
    pub distance_km: Option<f64>,
}

/// Additive, clamped confidence model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn score(&self, input: &ScoreInput) -> u8 {
        let mut score: i32 = 100;

        score -= accuracy_penalty(input.accuracy_m);
        score += readings_adjustment(input.readings_count);
        score -= stability_penalty(input.stability_m);
        if !input.land_use_valid {
            score -= 25;
        }
        score -= distance_penalty(input.distance_km);

        score.clamp(0, 100) as u8
    }

    /// Status bucket plus the human-readable note for a score.
    pub fn validate(&self, score: u8) -> (ValidationStatus, &'static str) {
        let status = ValidationStatus::from_score(score);
        (status, status.note())
    }
}

fn accuracy_penalty(accuracy_m: f64) -> i32 {
    match accuracy_m {
        a if a > 500.0 => 40,
        a if a > 100.0 => 25,
        a if a > 50.0 => 15,
        a if a > 20.0 => 5,
        _ => 0,
    }
}

fn readings_adjustment(count: u32) -> i32 {
    match count {
        0..=1 => -10,
        2 => 0,
        3..=4 => 5,
        _ => 10,
    }
}

fn stability_penalty(stability_m: f64) -> i32 {
    match stability_m {
        s if s > 100.0 => 20,
        s if s > 50.0 => 10,
        s if s > 20.0 => 5,
        _ => 0,
    }
}

fn distance_penalty(distance_km: Option<f64>) -> i32 {
    match distance_km {
        Some(d) if d > 300.0 => 15,
        Some(d) if d > 200.0 => 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(accuracy_m: f64, readings_count: u32) -> ScoreInput {
        ScoreInput {
            accuracy_m,
            readings_count,
            stability_m: 0.0,
            land_use_valid: true,
            distance_km: Some(50.0),
        }
    }

    #[test]
    fn test_perfect_score() {
        assert_eq!(ConfidenceScorer.score(&input(5.0, 5)), 100);
    }

    #[test]
    fn test_accuracy_steps() {
        let s = ConfidenceScorer;
        assert_eq!(s.score(&input(20.0, 2)), 100);
        assert_eq!(s.score(&input(21.0, 2)), 95);
        assert_eq!(s.score(&input(51.0, 2)), 85);
        assert_eq!(s.score(&input(101.0, 2)), 75);
        assert_eq!(s.score(&input(501.0, 2)), 60);
    }

    #[test]
    fn test_readings_adjustment() {
        let s = ConfidenceScorer;
        assert_eq!(s.score(&input(30.0, 1)), 85);
        assert_eq!(s.score(&input(30.0, 2)), 95);
        assert_eq!(s.score(&input(30.0, 3)), 100);
        assert_eq!(s.score(&input(30.0, 0)), 85);
    }

    #[test]
    fn test_stability_and_land_use() {
        let s = ConfidenceScorer;
        let base = input(10.0, 2);
        assert_eq!(s.score(&ScoreInput { stability_m: 30.0, ..base }), 95);
        assert_eq!(s.score(&ScoreInput { stability_m: 75.0, ..base }), 90);
        assert_eq!(s.score(&ScoreInput { stability_m: 150.0, ..base }), 80);
        assert_eq!(s.score(&ScoreInput { land_use_valid: false, ..base }), 75);
    }

    #[test]
    fn test_distance_penalty() {
        let s = ConfidenceScorer;
        let base = input(10.0, 2);
        assert_eq!(s.score(&ScoreInput { distance_km: Some(250.0), ..base }), 90);
        assert_eq!(s.score(&ScoreInput { distance_km: Some(301.0), ..base }), 85);
        assert_eq!(s.score(&ScoreInput { distance_km: None, ..base }), 100);
    }

    #[test]
    fn test_score_clamped_at_zero() {
        let worst = ScoreInput {
            accuracy_m: 5000.0,
            readings_count: 1,
            stability_m: 500.0,
            land_use_valid: false,
            distance_km: Some(5000.0),
        };
        // 100 - 40 - 10 - 20 - 25 - 15 = -10
        assert_eq!(ConfidenceScorer.score(&worst), 0);
    }

    #[test]
    fn test_validate() {
        let (status, note) = ConfidenceScorer.validate(85);
        assert_eq!(status, ValidationStatus::High);
        assert!(note.starts_with("High confidence"));
        assert_eq!(ConfidenceScorer.validate(60).0, ValidationStatus::Medium);
        assert_eq!(ConfidenceScorer.validate(59).0, ValidationStatus::Low);
    }

    proptest! {
        #[test]
        fn prop_score_in_range(
            acc in 0.0f64..10_000.0,
            n in 0u32..50,
            stab in 0.0f64..1_000.0,
            valid in any::<bool>(),
            dist in proptest::option::of(0.0f64..5_000.0),
        ) {
            let s = ConfidenceScorer.score(&ScoreInput {
                accuracy_m: acc, readings_count: n, stability_m: stab, land_use_valid: valid, distance_km: dist,
            });
            prop_assert!(s <= 100);
        }

        #[test]
        fn prop_worse_accuracy_never_scores_higher(a in 0.0f64..2_000.0, extra in 0.0f64..2_000.0) {
            let better = ConfidenceScorer.score(&input(a, 3));
            let worse = ConfidenceScorer.score(&input(a + extra, 3));
            prop_assert!(worse <= better);
        }

        #[test]
        fn prop_more_readings_never_scores_lower(n in 0u32..20, extra in 0u32..20) {
            let fewer = ConfidenceScorer.score(&input(60.0, n));
            let more = ConfidenceScorer.score(&input(60.0, n + extra));
            prop_assert!(more >= fewer);
        }
    }
}
