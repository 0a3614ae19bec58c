// crates/delphi-consensus/src/pca.rs
//
// Weighted covariance and principal component extraction.
//
// The covariance of the filled report matrix, with reporters weighted by
// reputation, is a symmetric positive-semidefinite E x E matrix; its
// dominant eigenvector (equivalently, the first singular vector) is the
// agreement pattern the reward step scores reporters against.

/// Covariance denominators below this are treated as degenerate: one
/// reporter holds effectively all reputation mass and no cross-reporter
/// variance can be estimated.
const DEGENERATE_DENOM: f64 = 1e-12;

/// Jacobi sweep limit. Cyclic Jacobi converges quadratically; symmetric
/// matrices in the supported size range settle far earlier.
const MAX_SWEEPS: usize = 64;

/// Off-diagonal Frobenius norm below which the rotation loop stops.
const OFF_DIAGONAL_TOL: f64 = 1e-12;

/// Reputation-weighted covariance of the filled report matrix.
///
/// Computes the weighted column means (reputation must already sum to 1),
/// subtracts them from every row to form the mean-deviation matrix, and
/// returns the unbiased weighted covariance
/// `cov = dev^T . diag(rep) . dev / (1 - sum(rep_i^2))` together with the
/// R x E mean deviation. The denominator generalizes the classic N-1
/// correction to weighted samples. A degenerate denominator yields the
/// zero matrix, which routes the reward step into its unanimity fallback.
pub fn weighted_cov(filled: &[Vec<f64>], reputation: &[f64]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let rows = filled.len();
    let cols = filled[0].len();

    let mut mean = vec![0.0; cols];
    for i in 0..rows {
        for j in 0..cols {
            mean[j] += reputation[i] * filled[i][j];
        }
    }

    let mean_deviation: Vec<Vec<f64>> = filled
        .iter()
        .map(|row| row.iter().zip(mean.iter()).map(|(v, m)| v - m).collect())
        .collect();

    let denom = 1.0 - reputation.iter().map(|r| r * r).sum::<f64>();
    let mut cov = vec![vec![0.0; cols]; cols];
    if denom < DEGENERATE_DENOM {
        return (cov, mean_deviation);
    }

    for a in 0..cols {
        for b in a..cols {
            let mut sum = 0.0;
            for i in 0..rows {
                sum += reputation[i] * mean_deviation[i][a] * mean_deviation[i][b];
            }
            let value = sum / denom;
            cov[a][b] = value;
            cov[b][a] = value;
        }
    }

    (cov, mean_deviation)
}

/// Eigendecomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns (eigenvalues, eigenvectors) with eigenvectors stored as
/// columns: `vectors[i][k]` is component i of eigenvector k. The sweep
/// order is fixed, so the decomposition is deterministic; eigenvector
/// signs are arbitrary and must not be relied upon.
pub fn symmetric_eigen(matrix: &[Vec<f64>]) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut v = vec![vec![0.0; n]; n];
    for i in 0..n {
        v[i][i] = 1.0;
    }

    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| (0..n).map(move |q| (p, q)))
            .filter(|&(p, q)| p != q)
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum::<f64>()
            .sqrt();
        if off < OFF_DIAGONAL_TOL {
            break;
        }

        for p in 0..n.saturating_sub(1) {
            for q in (p + 1)..n {
                if a[p][q].abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[k][p];
                    let vkq = v[k][q];
                    v[k][p] = c * vkp - s * vkq;
                    v[k][q] = s * vkp + c * vkq;
                }
            }
        }
    }

    let eigenvalues = (0..n).map(|i| a[i][i]).collect();
    (eigenvalues, v)
}

/// Extract the dominant agreement pattern from the filled reports.
///
/// `first_loading` (length E) is the eigenvector of the largest
/// eigenvalue of the weighted covariance: the direction along which the
/// reports varied most, one weight per event. `first_score` (length R)
/// projects each reporter's mean-deviation row onto that direction:
/// reporters pulling with the dominant pattern score high in magnitude.
/// The loading's sign is arbitrary; the reward step resolves it.
pub fn weighted_prin_comp(filled: &[Vec<f64>], reputation: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let (cov, mean_deviation) = weighted_cov(filled, reputation);
    let (eigenvalues, vectors) = symmetric_eigen(&cov);

    let mut dominant = 0;
    for (k, &value) in eigenvalues.iter().enumerate() {
        if value > eigenvalues[dominant] {
            dominant = k;
        }
    }

    let first_loading: Vec<f64> = (0..cov.len()).map(|i| vectors[i][dominant]).collect();
    let first_score: Vec<f64> = mean_deviation
        .iter()
        .map(|row| row.iter().zip(first_loading.iter()).map(|(d, l)| d * l).sum())
        .collect();

    (first_loading, first_score)
}
