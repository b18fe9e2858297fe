//! Score derivation and difficulty banding.
//!
//! A chunk's raw base value is scaled into a human-sized score, then the
//! score is placed into one of four difficulty bands by configurable
//! thresholds. Misconfigured thresholds (non-increasing or non-finite)
//! are repaired to the defaults at evaluation time with a warning, so a
//! bad config file degrades pricing rather than breaking it.

use terraclaim_types::Difficulty;

use crate::config::EvaluationConfig;

/// Scale a raw base value into a score.
pub fn score_of(base_value: f64, config: &EvaluationConfig) -> f64 {
    let divisor = if config.score_divisor.is_finite() && config.score_divisor > 0.0 {
        config.score_divisor
    } else {
        tracing::warn!(divisor = config.score_divisor, "malformed score divisor, using default");
        EvaluationConfig::default().score_divisor
    };
    (base_value / divisor).max(0.0)
}

/// Place a score into its difficulty band.
pub fn derive_difficulty(score: f64, config: &EvaluationConfig) -> Difficulty {
    let (easy_below, hard_from, impossible_from) = validated_thresholds(config);

    if score >= impossible_from {
        Difficulty::Impossible
    } else if score >= hard_from {
        Difficulty::Hard
    } else if score < easy_below {
        Difficulty::Easy
    } else {
        Difficulty::Normal
    }
}

/// The configured thresholds, or the defaults when the configured triple
/// is not strictly increasing and finite.
fn validated_thresholds(config: &EvaluationConfig) -> (f64, f64, f64) {
    let ordered = config.easy_below.is_finite()
        && config.hard_from.is_finite()
        && config.impossible_from.is_finite()
        && config.easy_below < config.hard_from
        && config.hard_from < config.impossible_from;

    if ordered {
        (config.easy_below, config.hard_from, config.impossible_from)
    } else {
        tracing::warn!(
            easy_below = config.easy_below,
            hard_from = config.hard_from,
            impossible_from = config.impossible_from,
            "malformed difficulty thresholds, using defaults"
        );
        let defaults = EvaluationConfig::default();
        (defaults.easy_below, defaults.hard_from, defaults.impossible_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_the_whole_score_line() {
        let config = EvaluationConfig::default();
        assert_eq!(derive_difficulty(0.0, &config), Difficulty::Easy);
        assert_eq!(derive_difficulty(24.9, &config), Difficulty::Easy);
        assert_eq!(derive_difficulty(25.0, &config), Difficulty::Normal);
        assert_eq!(derive_difficulty(99.9, &config), Difficulty::Normal);
        assert_eq!(derive_difficulty(100.0, &config), Difficulty::Hard);
        assert_eq!(derive_difficulty(250.0, &config), Difficulty::Impossible);
        assert_eq!(derive_difficulty(1.0e12, &config), Difficulty::Impossible);
    }

    #[test]
    fn malformed_thresholds_fall_back_to_defaults() {
        let broken = EvaluationConfig {
            easy_below: 500.0,
            hard_from: 10.0,
            impossible_from: 5.0,
            score_divisor: 1000.0,
        };
        // Behaves exactly like the default banding.
        assert_eq!(derive_difficulty(24.0, &broken), Difficulty::Easy);
        assert_eq!(derive_difficulty(150.0, &broken), Difficulty::Hard);
        assert_eq!(derive_difficulty(300.0, &broken), Difficulty::Impossible);
    }

    #[test]
    fn score_scales_by_divisor() {
        let config = EvaluationConfig::default();
        assert!((score_of(5000.0, &config) - 5.0).abs() < f64::EPSILON);
        assert!(score_of(-10.0, &config).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_divisor_is_repaired() {
        let config = EvaluationConfig {
            score_divisor: 0.0,
            ..EvaluationConfig::default()
        };
        assert!((score_of(5000.0, &config) - 5.0).abs() < f64::EPSILON);
    }
}
