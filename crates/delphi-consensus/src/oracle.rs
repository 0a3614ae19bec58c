// crates/delphi-consensus/src/oracle.rs
//
// Oracle: validated entry point for one consensus round.
//
// Owns the inputs for a single invocation and runs the full pipeline:
// preprocessing -> weighted PCA -> reward weights -> outcome and
// participation aggregation. Holds no process-wide state; every call is
// independent given its inputs.

use serde::{Deserialize, Serialize};

use delphi_core::{
    ConsensusResult, DelphiError, EventBound, EventReport, ReportMatrix, ReporterReport,
    ReputationVector,
};

use crate::outcomes::{blend_bonus, event_outcomes, participation};
use crate::preprocess::{fill_na, rescale};
use crate::rewards::get_reward_weights;

/// Tunable parameters of the consensus round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Ambiguity band around 0.5 for binary outcome binning.
    #[serde(default = "default_catch_tolerance")]
    pub catch_tolerance: f64,

    /// Exponential smoothing factor for the reputation update.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Advisory cap on the reporter batch size. Exceeding it logs a
    /// warning but is not an error: memory, not correctness, is the
    /// concern at that scale.
    #[serde(default = "default_max_row")]
    pub max_row: usize,

    /// Dump intermediate matrices at debug level.
    #[serde(default)]
    pub verbose: bool,
}

fn default_catch_tolerance() -> f64 {
    0.1
}

fn default_alpha() -> f64 {
    0.1
}

fn default_max_row() -> usize {
    5000
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            catch_tolerance: default_catch_tolerance(),
            alpha: default_alpha(),
            max_row: default_max_row(),
            verbose: false,
        }
    }
}

/// A single consensus invocation over one batch of reports.
#[derive(Debug, Clone)]
pub struct Oracle {
    reports: ReportMatrix,
    event_bounds: Vec<EventBound>,
    reputation: ReputationVector,
    config: OracleConfig,
}

impl Oracle {
    /// Create an Oracle over a report batch.
    ///
    /// # Arguments
    /// * `reports` - R x E report matrix with missing cells masked.
    /// * `event_bounds` - One bound per event, or None to treat every
    ///   event as binary on the signed [-1, 1] convention.
    /// * `reputation` - Prior reputation in any scale, or None for
    ///   uniform weights.
    /// * `config` - Tunables; `OracleConfig::default()` matches the
    ///   documented defaults.
    pub fn new(
        reports: ReportMatrix,
        event_bounds: Option<Vec<EventBound>>,
        reputation: Option<ReputationVector>,
        config: OracleConfig,
    ) -> Self {
        let num_events = reports.num_events();
        let num_reporters = reports.num_reporters();
        let event_bounds =
            event_bounds.unwrap_or_else(|| vec![EventBound::binary(); num_events]);
        let reputation =
            reputation.unwrap_or_else(|| ReputationVector::uniform(num_reporters));
        Self {
            reports,
            event_bounds,
            reputation,
            config,
        }
    }

    /// Validate the inputs against the error taxonomy.
    fn validate(&self) -> Result<(), DelphiError> {
        self.reports.check_rectangular()?;

        let num_reporters = self.reports.num_reporters();
        let num_events = self.reports.num_events();

        if self.event_bounds.len() != num_events {
            return Err(DelphiError::InvalidInput(format!(
                "{} event bounds supplied for {} events",
                self.event_bounds.len(),
                num_events
            )));
        }
        for (j, bound) in self.event_bounds.iter().enumerate() {
            bound.validate(j)?;
        }

        if self.reputation.len() != num_reporters {
            return Err(DelphiError::InvalidInput(format!(
                "{} reputation weights supplied for {} reporters",
                self.reputation.len(),
                num_reporters
            )));
        }

        for j in 0..num_events {
            if self.reports.observed_in_column(j).is_empty() {
                return Err(DelphiError::InsufficientObservations(format!(
                    "event {} has no observed reports",
                    j
                )));
            }
        }

        Ok(())
    }

    /// Run one consensus round and assemble the result.
    ///
    /// Pure with respect to the Oracle's inputs: the same inputs always
    /// produce the same result, and caller-owned data is never mutated.
    pub fn consensus(&self) -> Result<ConsensusResult, DelphiError> {
        self.validate()?;
        let reputation = self.reputation.normalized()?;

        if self.reports.num_reporters() > self.config.max_row {
            tracing::warn!(
                "report batch has {} reporters, above the advisory cap of {}",
                self.reports.num_reporters(),
                self.config.max_row
            );
        }

        let scaled = rescale(&self.reports, &self.event_bounds);
        let filled = fill_na(&scaled, &self.event_bounds, &reputation);
        if self.config.verbose {
            tracing::debug!(
                rescaled = %serde_json::to_string(&scaled.values).unwrap_or_default(),
                filled = %serde_json::to_string(&filled).unwrap_or_default(),
                "preprocessed report matrix"
            );
        }

        let weights = get_reward_weights(&filled, &reputation, self.config.alpha);
        if self.config.verbose {
            tracing::debug!(
                loading = %serde_json::to_string(&weights.first_loading).unwrap_or_default(),
                this_rep = %serde_json::to_string(&weights.this_rep).unwrap_or_default(),
                "reward weights resolved"
            );
        }

        let outcomes = event_outcomes(
            &filled,
            &self.event_bounds,
            &weights.smooth_rep,
            self.config.catch_tolerance,
        );

        let part = participation(&self.reports, &weights.smooth_rep);
        let reporter_bonus = blend_bonus(
            &weights.smooth_rep,
            &part.reporter_participation,
            part.percent_na,
        );
        let author_bonus = blend_bonus(
            &outcomes.consensus_reward,
            &part.event_participation,
            part.percent_na,
        );

        let avg_certainty =
            outcomes.certainty.iter().sum::<f64>() / outcomes.certainty.len() as f64;

        Ok(ConsensusResult {
            reporters: ReporterReport {
                old_rep: weights.old_rep,
                this_rep: weights.this_rep,
                smooth_rep: weights.smooth_rep,
                participation: part.reporter_participation,
                bonus: reporter_bonus,
            },
            events: EventReport {
                outcomes_raw: outcomes.outcomes_raw,
                outcomes_final: outcomes.outcomes_final,
                certainty: outcomes.certainty,
                consensus_reward: outcomes.consensus_reward,
                participation: part.event_participation,
                author_bonus,
            },
            avg_participation: 1.0 - part.percent_na,
            avg_certainty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_matrix(rows: Vec<Vec<f64>>) -> ReportMatrix {
        ReportMatrix::from_rows(rows)
    }

    #[test]
    fn empty_matrix_is_invalid() {
        let oracle = Oracle::new(signed_matrix(vec![]), None, None, OracleConfig::default());
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn ragged_matrix_is_invalid() {
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0, 1.0], vec![1.0]]),
            None,
            None,
            OracleConfig::default(),
        );
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn bound_arity_mismatch_is_invalid() {
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0, -1.0]]),
            Some(vec![EventBound::binary()]),
            None,
            OracleConfig::default(),
        );
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn inverted_bound_is_invalid() {
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0, 5.0]]),
            Some(vec![EventBound::binary(), EventBound::scaled(10.0, 2.0)]),
            None,
            OracleConfig::default(),
        );
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn reputation_arity_mismatch_is_invalid() {
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0], vec![-1.0]]),
            None,
            Some(ReputationVector::new(vec![1.0])),
            OracleConfig::default(),
        );
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn zero_mass_reputation_is_degenerate() {
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0], vec![-1.0]]),
            None,
            Some(ReputationVector::new(vec![0.0, 0.0])),
            OracleConfig::default(),
        );
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::DegenerateReputation(_))
        ));
    }

    #[test]
    fn fully_missing_column_is_insufficient() {
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0, f64::NAN], vec![-1.0, f64::NAN]]),
            None,
            None,
            OracleConfig::default(),
        );
        assert!(matches!(
            oracle.consensus(),
            Err(DelphiError::InsufficientObservations(_))
        ));
    }

    #[test]
    fn single_reporter_falls_back_to_prior() {
        // One reporter holds all mass: the covariance is degenerate and
        // reputation carries over unchanged.
        let oracle = Oracle::new(
            signed_matrix(vec![vec![1.0, -1.0]]),
            None,
            Some(ReputationVector::new(vec![5.0])),
            OracleConfig::default(),
        );
        let result = oracle.consensus().unwrap();
        assert_eq!(result.reporters.this_rep, vec![1.0]);
        assert_eq!(result.events.outcomes_final, vec![1.0, 0.0]);
    }

    #[test]
    fn config_defaults_match_documented_values() {
        let config = OracleConfig::default();
        assert_eq!(config.catch_tolerance, 0.1);
        assert_eq!(config.alpha, 0.1);
        assert_eq!(config.max_row, 5000);
        assert!(!config.verbose);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: OracleConfig = serde_json::from_str(r#"{"alpha": 0.2}"#).unwrap();
        assert_eq!(config.alpha, 0.2);
        assert_eq!(config.catch_tolerance, 0.1);
        assert_eq!(config.max_row, 5000);
    }
}
