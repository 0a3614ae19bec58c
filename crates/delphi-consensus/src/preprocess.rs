// crates/delphi-consensus/src/preprocess.rs
//
// Report matrix preprocessing: affine rescale onto [0, 1] and
// reputation-weighted imputation of missing cells.

use delphi_core::{EventBound, ReportMatrix};

use crate::outcomes::weighted_median;

/// Snap a [0, 1] value onto the discrete consensus bins {0, 0.5, 1}.
///
/// Values inside the tolerance band around 0.5 stay ambiguous:
/// `x < 0.5 * (1 - tolerance)` maps to 0, `x > 0.5 * (1 + tolerance)`
/// maps to 1, everything else to 0.5. Used only for binary events.
pub fn catch(x: f64, tolerance: f64) -> f64 {
    if x < 0.5 * (1.0 - tolerance) {
        0.0
    } else if x > 0.5 * (1.0 + tolerance) {
        1.0
    } else {
        0.5
    }
}

/// Affinely rescale every event column onto the nominal [0, 1] range.
///
/// Each column is mapped by its bound: `(x - min) / (max - min)`. The
/// default binary bound [-1, 1] carries signed reports onto {0, 1}.
/// Missing cells are given a first-pass estimate, the column mean of the
/// observed rescaled values; the mask is preserved so `fill_na` can
/// refine them with a reputation-weighted guess.
///
/// Callers must have validated that every bound has max > min and that
/// every column has at least one observed cell.
pub fn rescale(reports: &ReportMatrix, bounds: &[EventBound]) -> ReportMatrix {
    let mut out = reports.clone();
    let rows = out.num_reporters();
    let cols = out.num_events();

    for j in 0..cols {
        let inv_span = 1.0 / bounds[j].span();
        for i in 0..rows {
            out.values[i][j] = (out.values[i][j] - bounds[j].min) * inv_span;
        }
    }

    // First-pass estimate for missing cells: the column mean of the
    // observed rescaled values. fill_na overwrites these.
    for j in 0..cols {
        let observed = reports.observed_in_column(j);
        if observed.len() == rows {
            continue;
        }
        let mean: f64 =
            observed.iter().map(|&i| out.values[i][j]).sum::<f64>() / observed.len() as f64;
        for i in 0..rows {
            if out.mask[i][j] {
                out.values[i][j] = mean;
            }
        }
    }

    out
}

/// Impute missing cells with a reputation-weighted consensus guess.
///
/// For each column with missing entries, only observed rows contribute;
/// their reputations are renormalized to sum to 1. Scaled columns take
/// the reputation-weighted median of the observed values, binary columns
/// the reputation-weighted mean. Observed cells are untouched. Returns
/// the dense filled matrix.
///
/// # Arguments
/// * `scaled` - The rescaled report matrix (mask intact).
/// * `bounds` - Per-event bounds; only the `scaled` flag is read here.
/// * `reputation` - Normalized reputation, summing to 1.
pub fn fill_na(
    scaled: &ReportMatrix,
    bounds: &[EventBound],
    reputation: &[f64],
) -> Vec<Vec<f64>> {
    let rows = scaled.num_reporters();
    let cols = scaled.num_events();
    let mut filled = scaled.values.clone();

    for j in 0..cols {
        let observed = scaled.observed_in_column(j);
        if observed.len() == rows {
            continue;
        }

        let values: Vec<f64> = observed.iter().map(|&i| scaled.values[i][j]).collect();
        let mut weights: Vec<f64> = observed.iter().map(|&i| reputation[i]).collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            for w in weights.iter_mut() {
                *w /= total;
            }
        } else {
            // All observers carry zero reputation; fall back to uniform.
            let uniform = 1.0 / weights.len() as f64;
            for w in weights.iter_mut() {
                *w = uniform;
            }
        }

        let guess = if bounds[j].scaled {
            weighted_median(&values, &weights)
        } else {
            values.iter().zip(weights.iter()).map(|(v, w)| v * w).sum()
        };

        for i in 0..rows {
            if scaled.mask[i][j] {
                filled[i][j] = guess;
            }
        }
    }

    filled
}
