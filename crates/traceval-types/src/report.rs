use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of scoring one task evaluation.
///
/// `scores` holds every sub-score plus the weighted `final_score`;
/// `penalties` holds the deduction breakdown. Values are pre-rounded so two
/// runs over the same inputs produce byte-identical reports. Derived once,
/// never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub scores: BTreeMap<String, f64>,
    pub penalties: BTreeMap<String, f64>,
}

impl ScoreReport {
    pub fn score(&self, name: &str) -> Option<f64> {
        self.scores.get(name).copied()
    }

    pub fn penalty(&self, name: &str) -> Option<f64> {
        self.penalties.get(name).copied()
    }

    pub fn final_score(&self) -> f64 {
        self.score("final_score").unwrap_or(0.0)
    }
}

/// Clamp a sub-score to its declared [0, 1] range.
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Round to the fixed report precision of 4 decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round4_is_stable() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.000_04), 0.0);
    }

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.5), 0.5);
        assert_eq!(clamp01(1.5), 1.0);
    }
}
