// crates/delphi-consensus/src/rewards.rs
//
// Reward weight calculation: turns the principal component scores into
// a new reputation vector, resolving the arbitrary PCA sign by
// continuity with the prior consensus, then smooths against the old
// reputation.

use serde::{Deserialize, Serialize};

use crate::pca::weighted_prin_comp;

/// Scale applied to normalized reputation when forming the sign
/// resolution reference, expressing it in token counts. Keeps the
/// reference invariant to the caller's reputation units.
const REP_TOKEN_SCALE: f64 = 1e6;

/// Candidate magnitudes at or below this are treated as all-zero:
/// a perfectly unanimous ballot carries no reputation signal.
const UNANIMITY_TOL: f64 = 1e-12;

/// Output of the reward weight calculation for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardWeights {
    /// Dominant covariance eigenvector: per-event agreement weights.
    pub first_loading: Vec<f64>,
    /// Normalized reputation the round started from.
    pub old_rep: Vec<f64>,
    /// Reputation derived from this round's reports alone.
    pub this_rep: Vec<f64>,
    /// Exponentially smoothed blend of this_rep and old_rep.
    pub smooth_rep: Vec<f64>,
}

/// Normalize a vector into nonnegative weights summing to 1.
///
/// Takes absolute values elementwise. An all-zero vector gets 1 added to
/// every element first, so the degenerate case yields uniform weights
/// instead of a division by zero.
pub fn get_weight(v: &[f64]) -> Vec<f64> {
    let mut abs: Vec<f64> = v.iter().map(|x| x.abs()).collect();
    let mut sum: f64 = abs.iter().sum();
    if sum == 0.0 {
        for x in abs.iter_mut() {
            *x += 1.0;
        }
        sum = abs.iter().sum();
    }
    abs.into_iter().map(|x| x / sum).collect()
}

/// Compute the candidate, sign-resolved, and smoothed reputation vectors.
///
/// Steps:
/// 1. Project reporters onto the dominant agreement pattern (PCA).
/// 2. Shift the scores nonnegative in both directions:
///    `set1 = score + |min|`, `set2 = score - max`. One of the two is the
///    correct orientation of the arbitrary eigenvector sign.
/// 3. Compare the reputation-scaled candidates' event outcomes against
///    the token-scaled prior outcome and keep the candidate with the
///    lower sum of squared error; ties keep set1.
/// 4. An all-zero winner means unanimous reports: reputation carries over
///    unchanged.
/// 5. Otherwise scale the winner by `reputation / mean(reputation)` so
///    that splitting one reporter's reputation across identical rows
///    cannot change the aggregate influence, then normalize.
/// 6. Smooth: `smooth_rep = alpha * this_rep + (1 - alpha) * old_rep`.
///
/// # Arguments
/// * `filled` - Dense filled report matrix on the rescaled range.
/// * `reputation` - Normalized reputation, summing to 1.
/// * `alpha` - Smoothing factor in [0, 1]; 0.1 damps round-to-round
///   volatility while still tracking the new signal.
pub fn get_reward_weights(filled: &[Vec<f64>], reputation: &[f64], alpha: f64) -> RewardWeights {
    let rows = filled.len();
    let cols = filled[0].len();
    let old_rep = reputation.to_vec();

    let (first_loading, first_score) = weighted_prin_comp(filled, reputation);

    let min_score = first_score.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_score = first_score.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let set1: Vec<f64> = first_score.iter().map(|s| s + min_score.abs()).collect();
    let set2: Vec<f64> = first_score.iter().map(|s| s - max_score).collect();

    // Prior outcome in reputation token counts; the scale makes the
    // comparison below invariant to the caller's reputation units.
    let old: Vec<f64> = (0..cols)
        .map(|j| {
            REP_TOKEN_SCALE
                * (0..rows)
                    .map(|i| reputation[i] * filled[i][j])
                    .sum::<f64>()
        })
        .collect();

    // Each candidate is compared in the form it would take as a reward
    // vector: reputation-scaled, then normalized.
    let scaled_candidate = |set: &[f64]| -> Vec<f64> {
        get_weight(
            &set.iter()
                .zip(reputation.iter())
                .map(|(s, r)| s * r)
                .collect::<Vec<f64>>(),
        )
    };
    let outcome = |weights: &[f64]| -> Vec<f64> {
        (0..cols)
            .map(|j| (0..rows).map(|i| weights[i] * filled[i][j]).sum())
            .collect()
    };
    let new1 = outcome(&scaled_candidate(&set1));
    let new2 = outcome(&scaled_candidate(&set2));

    let sse = |new: &[f64]| -> f64 {
        new.iter()
            .zip(old.iter())
            .map(|(n, o)| (n - o) * (n - o))
            .sum()
    };
    let ref_ind = sse(&new1) - sse(&new2);
    let adjusted = if ref_ind <= 0.0 { &set1 } else { &set2 };

    let max_magnitude = adjusted.iter().cloned().fold(0.0, |m, x| x.abs().max(m));
    let this_rep = if max_magnitude <= UNANIMITY_TOL {
        // Unanimous ballot: no signal to update from.
        old_rep.clone()
    } else {
        let mean_rep: f64 = reputation.iter().sum::<f64>() / rows as f64;
        get_weight(
            &adjusted
                .iter()
                .zip(reputation.iter())
                .map(|(a, r)| a * r / mean_rep)
                .collect::<Vec<f64>>(),
        )
    };

    let smooth_rep: Vec<f64> = this_rep
        .iter()
        .zip(old_rep.iter())
        .map(|(t, o)| alpha * t + (1.0 - alpha) * o)
        .collect();

    RewardWeights {
        first_loading,
        old_rep,
        this_rep,
        smooth_rep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn get_weight_normalizes_absolute_values() {
        let w = get_weight(&[1.0, -3.0, 0.0]);
        assert!((w[0] - 0.25).abs() < EPS);
        assert!((w[1] - 0.75).abs() < EPS);
        assert!((w[2] - 0.0).abs() < EPS);
    }

    #[test]
    fn get_weight_zero_vector_becomes_uniform() {
        let w = get_weight(&[0.0, 0.0, 0.0, 0.0]);
        for x in w {
            assert!((x - 0.25).abs() < EPS);
        }
    }

    #[test]
    fn reward_weights_sum_to_one() {
        let filled = vec![
            vec![1.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0],
        ];
        let rep = vec![0.5, 0.3, 0.2];
        let rw = get_reward_weights(&filled, &rep, 0.1);
        let this_sum: f64 = rw.this_rep.iter().sum();
        let smooth_sum: f64 = rw.smooth_rep.iter().sum();
        assert!((this_sum - 1.0).abs() < EPS);
        assert!((smooth_sum - 1.0).abs() < EPS);
    }

    #[test]
    fn unanimous_reports_keep_reputation_unchanged() {
        let filled = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]];
        let rep = vec![0.5, 0.3, 0.2];
        let rw = get_reward_weights(&filled, &rep, 0.1);
        for (t, o) in rw.this_rep.iter().zip(rep.iter()) {
            assert!((t - o).abs() < EPS);
        }
        for (s, o) in rw.smooth_rep.iter().zip(rep.iter()) {
            assert!((s - o).abs() < EPS);
        }
    }

    #[test]
    fn smoothing_blends_this_and_old() {
        let filled = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let rep = vec![0.5, 0.5];
        let rw = get_reward_weights(&filled, &rep, 0.25);
        for i in 0..2 {
            let expected = 0.25 * rw.this_rep[i] + 0.75 * rw.old_rep[i];
            assert!((rw.smooth_rep[i] - expected).abs() < EPS);
        }
    }

    #[test]
    fn loading_has_one_weight_per_event() {
        let filled = vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]];
        let rep = vec![0.5, 0.5];
        let rw = get_reward_weights(&filled, &rep, 0.1);
        assert_eq!(rw.first_loading.len(), 3);
        assert_eq!(rw.this_rep.len(), 2);
    }
}
