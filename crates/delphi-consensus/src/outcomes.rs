// crates/delphi-consensus/src/outcomes.rs
//
// Per-event outcomes, certainty, and participation accounting.
//
// Binary events take the reputation-weighted mean of the filled column;
// scaled events take the reputation-weighted median, which resists
// outlier manipulation of continuous values. Participation blends the
// signal rewards toward reporters and authors who actually showed up.

use delphi_core::{EventBound, ReportMatrix};

use crate::preprocess::catch;
use crate::rewards::get_weight;

/// Per-event outcome vectors for one round.
#[derive(Debug, Clone)]
pub struct EventOutcomes {
    /// Raw outcome on the rescaled [0, 1] range.
    pub outcomes_raw: Vec<f64>,
    /// Final outcome: binned for binary events, span-scaled for scaled.
    pub outcomes_final: Vec<f64>,
    /// |2 * (raw - 0.5)| per event.
    pub certainty: Vec<f64>,
    /// Certainty-proportional author reward.
    pub consensus_reward: Vec<f64>,
}

/// Participation accounting for one round.
#[derive(Debug, Clone)]
pub struct ParticipationSummary {
    /// Per-event: 1 - reputation-weighted missing mass.
    pub event_participation: Vec<f64>,
    /// Per-reporter: fraction of events reported on.
    pub reporter_participation: Vec<f64>,
    /// 1 - mean event participation.
    pub percent_na: f64,
}

/// Weighted median of `values` under `weights`.
///
/// Weights are renormalized internally; a zero total falls back to
/// uniform. Walks the cumulative weight of the sorted values and returns
/// the first value past the 0.5 mark; an exact 0.5 boundary averages the
/// straddling pair.
pub fn weighted_median(values: &[f64], weights: &[f64]) -> f64 {
    let mut pairs: Vec<(f64, f64)> = values.iter().cloned().zip(weights.iter().cloned()).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    let uniform = 1.0 / pairs.len() as f64;

    let mut cumulative = 0.0;
    for (k, &(value, weight)) in pairs.iter().enumerate() {
        cumulative += if total > 0.0 { weight / total } else { uniform };
        if (cumulative - 0.5).abs() < 1e-12 {
            // Exactly half the mass at or below this value: take the
            // midpoint with the next value.
            return if k + 1 < pairs.len() {
                0.5 * (value + pairs[k + 1].0)
            } else {
                value
            };
        }
        if cumulative > 0.5 {
            return value;
        }
    }
    pairs.last().map(|&(v, _)| v).unwrap_or(0.0)
}

/// Compute raw and final outcomes, certainty, and author rewards.
///
/// # Arguments
/// * `filled` - Dense filled report matrix on the rescaled range.
/// * `bounds` - Per-event bounds.
/// * `smooth_rep` - Smoothed reputation, summing to 1.
/// * `catch_tolerance` - Ambiguity band for binary outcome binning.
pub fn event_outcomes(
    filled: &[Vec<f64>],
    bounds: &[EventBound],
    smooth_rep: &[f64],
    catch_tolerance: f64,
) -> EventOutcomes {
    let rows = filled.len();
    let cols = filled[0].len();

    let mut outcomes_raw = Vec::with_capacity(cols);
    for j in 0..cols {
        let column: Vec<f64> = (0..rows).map(|i| filled[i][j]).collect();
        let raw = if bounds[j].scaled {
            weighted_median(&column, smooth_rep)
        } else {
            column
                .iter()
                .zip(smooth_rep.iter())
                .map(|(v, w)| v * w)
                .sum()
        };
        outcomes_raw.push(raw);
    }

    // Certainty is computed on the rescaled [0, 1] outcome for every
    // event type, before any mapping back to original units.
    let certainty: Vec<f64> = outcomes_raw
        .iter()
        .map(|raw| (2.0 * (raw - 0.5)).abs())
        .collect();

    let outcomes_final: Vec<f64> = outcomes_raw
        .iter()
        .enumerate()
        .map(|(j, &raw)| {
            if bounds[j].scaled {
                // Span-scaled only; min is deliberately not re-added,
                // mirroring the asymmetric rescale pair.
                raw * bounds[j].span()
            } else {
                catch(raw, catch_tolerance)
            }
        })
        .collect();

    let consensus_reward = get_weight(&certainty);

    EventOutcomes {
        outcomes_raw,
        outcomes_final,
        certainty,
        consensus_reward,
    }
}

/// Participation per event, per reporter, and overall.
///
/// Event participation weighs each missing cell by the smoothed
/// reputation of the absent reporter; reporter participation is the
/// plain fraction of events the reporter covered.
pub fn participation(reports: &ReportMatrix, smooth_rep: &[f64]) -> ParticipationSummary {
    let rows = reports.num_reporters();
    let cols = reports.num_events();

    let event_participation: Vec<f64> = (0..cols)
        .map(|j| {
            let missing_mass: f64 = (0..rows)
                .filter(|&i| reports.is_missing(i, j))
                .map(|i| smooth_rep[i])
                .sum();
            1.0 - missing_mass
        })
        .collect();

    let reporter_participation: Vec<f64> = (0..rows)
        .map(|i| {
            let missing = (0..cols).filter(|&j| reports.is_missing(i, j)).count();
            1.0 - missing as f64 / cols as f64
        })
        .collect();

    let percent_na =
        1.0 - event_participation.iter().sum::<f64>() / event_participation.len() as f64;

    ParticipationSummary {
        event_participation,
        reporter_participation,
        percent_na,
    }
}

/// Blend a signal-based reward with a participation-based reward.
///
/// `bonus = get_weight(participation) * percent_na + signal * (1 - percent_na)`.
/// With complete participation the blend reduces exactly to the signal.
pub fn blend_bonus(signal: &[f64], participation: &[f64], percent_na: f64) -> Vec<f64> {
    let na_bonus = get_weight(participation);
    signal
        .iter()
        .zip(na_bonus.iter())
        .map(|(s, n)| n * percent_na + s * (1.0 - percent_na))
        .collect()
}
