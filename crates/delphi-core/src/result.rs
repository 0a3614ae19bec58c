// crates/delphi-core/src/result.rs
//
// The aggregate produced by one consensus invocation.
//
// Reporter-side vectors are indexed by reporter row, event-side vectors
// by event column. The caller persists `smooth_rep` as the reputation
// input to the next round; that feedback loop lives outside the engine.

use serde::{Deserialize, Serialize};

/// Per-reporter results of a consensus round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterReport {
    /// Normalized reputation the round started from.
    pub old_rep: Vec<f64>,
    /// Reputation derived from this round's principal component alone.
    pub this_rep: Vec<f64>,
    /// Exponentially smoothed reputation: alpha * this + (1 - alpha) * old.
    pub smooth_rep: Vec<f64>,
    /// Fraction of events the reporter actually reported on.
    pub participation: Vec<f64>,
    /// Participation-blended reporter reward.
    pub bonus: Vec<f64>,
}

/// Per-event results of a consensus round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReport {
    /// Raw outcome on the rescaled [0, 1] range: reputation-weighted mean
    /// for binary events, reputation-weighted median for scaled events.
    pub outcomes_raw: Vec<f64>,
    /// Final outcome: binary events snapped to {0, 0.5, 1}, scaled events
    /// multiplied back by their span (min is not re-added).
    pub outcomes_final: Vec<f64>,
    /// How unanimous the reporters were: |2 * (raw - 0.5)| in [0, 1].
    pub certainty: Vec<f64>,
    /// Certainty-proportional author reward before participation blending.
    pub consensus_reward: Vec<f64>,
    /// Reputation-weighted fraction of reporters who reported the event.
    pub participation: Vec<f64>,
    /// Participation-blended author reward.
    pub author_bonus: Vec<f64>,
}

/// The result of running one round of Delphi consensus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Per-reporter reputation updates and rewards.
    pub reporters: ReporterReport,
    /// Per-event outcomes, certainty, and rewards.
    pub events: EventReport,
    /// Mean reputation-weighted participation across events (1 - percent_na).
    pub avg_participation: f64,
    /// Mean certainty across events.
    pub avg_certainty: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let result = ConsensusResult {
            reporters: ReporterReport {
                old_rep: vec![0.5, 0.5],
                this_rep: vec![0.6, 0.4],
                smooth_rep: vec![0.51, 0.49],
                participation: vec![1.0, 1.0],
                bonus: vec![0.51, 0.49],
            },
            events: EventReport {
                outcomes_raw: vec![0.9],
                outcomes_final: vec![1.0],
                certainty: vec![0.8],
                consensus_reward: vec![1.0],
                participation: vec![1.0],
                author_bonus: vec![1.0],
            },
            avg_participation: 1.0,
            avg_certainty: 0.8,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: ConsensusResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.reporters.this_rep, vec![0.6, 0.4]);
        assert_eq!(back.events.outcomes_final, vec![1.0]);
        assert_eq!(back.avg_certainty, 0.8);
    }
}
