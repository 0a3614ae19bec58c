// crates/delphi-consensus/src/lib.rs
//
// delphi-consensus: Weighted-PCA consensus for the Delphi engine.
//
// This crate implements the algorithmic core that aggregates noisy,
// possibly adversarial reports into per-event outcomes while updating
// each reporter's reputation. One invocation runs a single pass of
// preprocessing -> weighted covariance / PCA -> reward weights ->
// outcome and participation aggregation; iterative refinement happens
// across rounds driven by the caller.

pub mod oracle;
pub mod outcomes;
pub mod pca;
pub mod preprocess;
pub mod rewards;

pub use oracle::{Oracle, OracleConfig};
pub use rewards::RewardWeights;
