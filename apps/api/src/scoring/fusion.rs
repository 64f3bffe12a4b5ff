//! Score Fusion & Verdict.
//!
//! `final = weight_lexical * coverage% + weight_semantic * semantic%`, then
//! bucketed into High / Medium / Low with `>=` comparisons on the unrounded score.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::High => f.write_str("High"),
            Verdict::Medium => f.write_str("Medium"),
            Verdict::Low => f.write_str("Low"),
        }
    }
}

/// Fusion weights and verdict thresholds.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub weight_lexical: f64,
    pub weight_semantic: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weight_lexical: 0.5,
            weight_semantic: 0.5,
            high_threshold: 75.0,
            medium_threshold: 50.0,
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), String> {
        let weights = [self.weight_lexical, self.weight_semantic];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("fusion weights must be finite and non-negative".to_string());
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err("fusion weights must not both be zero".to_string());
        }
        if !self.high_threshold.is_finite() || !self.medium_threshold.is_finite() {
            return Err("verdict thresholds must be finite".to_string());
        }
        if self.medium_threshold > self.high_threshold {
            return Err(format!(
                "medium threshold ({}) exceeds high threshold ({})",
                self.medium_threshold, self.high_threshold
            ));
        }
        Ok(())
    }

    /// Weighted sum of the two 0–100 component scores.
    pub fn final_score(&self, coverage_percent: f64, semantic_percent: f64) -> f64 {
        self.weight_lexical * coverage_percent + self.weight_semantic * semantic_percent
    }

    /// Highest tier whose threshold the score reaches.
    pub fn verdict(&self, final_score: f64) -> Verdict {
        if final_score >= self.high_threshold {
            Verdict::High
        } else if final_score >= self.medium_threshold {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }
}

/// Rounds to two decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_equal() {
        let cfg = FusionConfig::default();
        assert!((cfg.final_score(80.0, 60.0) - 70.0).abs() < 1e-9);
        assert!((cfg.final_score(100.0, 100.0) - 100.0).abs() < 1e-9);
        assert_eq!(cfg.final_score(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_verdict_boundaries() {
        let cfg = FusionConfig::default();
        assert_eq!(cfg.verdict(75.0), Verdict::High);
        assert_eq!(cfg.verdict(74.99), Verdict::Medium);
        assert_eq!(cfg.verdict(50.0), Verdict::Medium);
        assert_eq!(cfg.verdict(49.99), Verdict::Low);
        assert_eq!(cfg.verdict(100.0), Verdict::High);
        assert_eq!(cfg.verdict(0.0), Verdict::Low);
    }

    #[test]
    fn test_final_score_monotonic_in_both_inputs() {
        let cfg = FusionConfig::default();
        let steps: Vec<f64> = (0..=10).map(|i| i as f64 * 10.0).collect();
        for &sem in &steps {
            for pair in steps.windows(2) {
                assert!(cfg.final_score(pair[1], sem) >= cfg.final_score(pair[0], sem));
                assert!(cfg.final_score(sem, pair[1]) >= cfg.final_score(sem, pair[0]));
            }
        }
    }

    #[test]
    fn test_custom_weights_and_thresholds() {
        let cfg = FusionConfig {
            weight_lexical: 0.7,
            weight_semantic: 0.3,
            high_threshold: 80.0,
            medium_threshold: 40.0,
        };
        // 0.7*50 + 0.3*100 = 65
        let score = cfg.final_score(50.0, 100.0);
        assert!((score - 65.0).abs() < 1e-9);
        assert_eq!(cfg.verdict(score), Verdict::Medium);
        assert_eq!(cfg.verdict(39.0), Verdict::Low);
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        assert!(FusionConfig::default().validate().is_ok());

        let negative = FusionConfig {
            weight_lexical: -0.1,
            ..FusionConfig::default()
        };
        assert!(negative.validate().is_err());

        let zero = FusionConfig {
            weight_lexical: 0.0,
            weight_semantic: 0.0,
            ..FusionConfig::default()
        };
        assert!(zero.validate().is_err());

        let inverted = FusionConfig {
            high_threshold: 40.0,
            medium_threshold: 60.0,
            ..FusionConfig::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_verdict_serializes_as_tier_name() {
        assert_eq!(serde_json::to_string(&Verdict::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Verdict::Medium).unwrap(), "\"Medium\"");
        assert_eq!(Verdict::Low.to_string(), "Low");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(80.90543), 80.91);
        assert_eq!(round2(74.994), 74.99);
        assert_eq!(round2(0.0), 0.0);
    }
}
