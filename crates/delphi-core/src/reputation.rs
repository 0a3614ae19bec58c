// crates/delphi-core/src/reputation.rs
//
// Reputation vector: one nonnegative weight per reporter.
//
// The engine consumes reputation normalized to unit mass. Callers may
// supply weights in any scale (token counts, fractions); the caller of
// the next round persists the smoothed output as this round's input.

use serde::{Deserialize, Serialize};

use crate::error::DelphiError;

/// Per-reporter reputation weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationVector {
    /// Raw weights, one per reporter, in caller units.
    pub weights: Vec<f64>,
}

impl ReputationVector {
    /// Wrap caller-supplied weights.
    pub fn new(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    /// Uniform reputation: 1/n for each of `n` reporters.
    pub fn uniform(n: usize) -> Self {
        Self {
            weights: vec![1.0 / n as f64; n],
        }
    }

    /// Number of reporters covered.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True when the vector covers no reporters.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Normalize to unit mass.
    ///
    /// Non-finite entries (a reporter with NaN reputation) are treated as
    /// weight 0 and the remaining mass is rescaled to sum to 1. Fails with
    /// `DegenerateReputation` when any entry is negative or the finite
    /// mass is not strictly positive.
    pub fn normalized(&self) -> Result<Vec<f64>, DelphiError> {
        let cleaned: Vec<f64> = self
            .weights
            .iter()
            .map(|&w| if w.is_finite() { w } else { 0.0 })
            .collect();
        if cleaned.iter().any(|&w| w < 0.0) {
            return Err(DelphiError::DegenerateReputation(
                "reputation weights must be nonnegative".to_string(),
            ));
        }
        let total: f64 = cleaned.iter().sum();
        if total <= 0.0 {
            return Err(DelphiError::DegenerateReputation(format!(
                "reputation mass must be positive, got {}",
                total
            )));
        }
        Ok(cleaned.into_iter().map(|w| w / total).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sums_to_one() {
        let rep = ReputationVector::uniform(6);
        let norm = rep.normalized().unwrap();
        let sum: f64 = norm.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((norm[0] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn normalized_rescales_arbitrary_units() {
        let rep = ReputationVector::new(vec![2.0, 10.0, 4.0, 2.0, 7.0, 1.0]);
        let norm = rep.normalized().unwrap();
        assert!((norm[1] - 10.0 / 26.0).abs() < 1e-12);
        let sum: f64 = norm.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nan_entries_become_zero_weight() {
        let rep = ReputationVector::new(vec![1.0, f64::NAN, 3.0]);
        let norm = rep.normalized().unwrap();
        assert_eq!(norm[1], 0.0);
        assert!((norm[0] - 0.25).abs() < 1e-12);
        assert!((norm[2] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_mass_is_degenerate() {
        let rep = ReputationVector::new(vec![0.0, 0.0]);
        assert!(matches!(
            rep.normalized(),
            Err(DelphiError::DegenerateReputation(_))
        ));
    }

    #[test]
    fn negative_weight_is_degenerate() {
        let rep = ReputationVector::new(vec![1.0, -0.5]);
        assert!(matches!(
            rep.normalized(),
            Err(DelphiError::DegenerateReputation(_))
        ));
    }

    #[test]
    fn all_nan_is_degenerate() {
        let rep = ReputationVector::new(vec![f64::NAN, f64::NAN]);
        assert!(rep.normalized().is_err());
    }
}
