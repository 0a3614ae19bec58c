// crates/delphi-core/src/matrix.rs
//
// Report matrix: R x E report values with a missing-cell mask.
//
// Each row is one reporter's ballot across all events; each column is one
// event being estimated. A parallel boolean mask records which cells were
// never reported, keeping an observed 0.0 distinct from a missing cell.

use serde::{Deserialize, Serialize};

use crate::error::DelphiError;

/// A dense report matrix where values[reporter_idx][event_idx] = report.
///
/// Missing cells are tracked in a parallel mask rather than by sentinel,
/// so every f64 in `values` is meaningful once preprocessing has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMatrix {
    /// Dense report values: values[reporter_idx][event_idx].
    pub values: Vec<Vec<f64>>,
    /// Missing-cell mask: mask[reporter_idx][event_idx] = true when the
    /// reporter did not report on the event.
    pub mask: Vec<Vec<bool>>,
}

impl ReportMatrix {
    /// Create a zero-filled matrix with no missing cells.
    ///
    /// # Arguments
    /// * `reporters` - Number of reporters (rows).
    /// * `events` - Number of events (columns).
    pub fn new(reporters: usize, events: usize) -> Self {
        Self {
            values: vec![vec![0.0; events]; reporters],
            mask: vec![vec![false; events]; reporters],
        }
    }

    /// Build a matrix from raw rows, treating NaN cells as missing.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let mask = rows
            .iter()
            .map(|row| row.iter().map(|v| v.is_nan()).collect())
            .collect();
        let values = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| if v.is_nan() { 0.0 } else { v })
                    .collect()
            })
            .collect();
        Self { values, mask }
    }

    /// Build a matrix from optional cells, treating `None` as missing.
    pub fn from_options(rows: Vec<Vec<Option<f64>>>) -> Self {
        let mask = rows
            .iter()
            .map(|row| row.iter().map(|v| v.is_none()).collect())
            .collect();
        let values = rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(0.0)).collect())
            .collect();
        Self { values, mask }
    }

    /// Number of reporters (rows).
    pub fn num_reporters(&self) -> usize {
        self.values.len()
    }

    /// Number of events (columns). Zero when the matrix has no rows.
    pub fn num_events(&self) -> usize {
        self.values.first().map_or(0, |row| row.len())
    }

    /// Get the report from reporter `r` on event `e`.
    pub fn get(&self, r: usize, e: usize) -> f64 {
        self.values[r][e]
    }

    /// Set the report from reporter `r` on event `e`, clearing the mask.
    pub fn set(&mut self, r: usize, e: usize, value: f64) {
        self.values[r][e] = value;
        self.mask[r][e] = false;
    }

    /// Mark the cell (r, e) as missing.
    pub fn set_missing(&mut self, r: usize, e: usize) {
        self.values[r][e] = 0.0;
        self.mask[r][e] = true;
    }

    /// Whether reporter `r` reported on event `e`.
    pub fn is_missing(&self, r: usize, e: usize) -> bool {
        self.mask[r][e]
    }

    /// The full column of event `e`, including placeholder values in
    /// missing cells.
    pub fn column(&self, e: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[e]).collect()
    }

    /// Indices of the reporters with an observed report on event `e`.
    pub fn observed_in_column(&self, e: usize) -> Vec<usize> {
        (0..self.num_reporters())
            .filter(|&r| !self.mask[r][e])
            .collect()
    }

    /// Validate the matrix shape: at least one row and one column, every
    /// row the same length, and the mask congruent with the values.
    pub fn check_rectangular(&self) -> Result<(), DelphiError> {
        if self.values.is_empty() {
            return Err(DelphiError::InvalidInput(
                "report matrix has no rows".to_string(),
            ));
        }
        let cols = self.values[0].len();
        if cols == 0 {
            return Err(DelphiError::InvalidInput(
                "report matrix has no columns".to_string(),
            ));
        }
        for (i, row) in self.values.iter().enumerate() {
            if row.len() != cols {
                return Err(DelphiError::InvalidInput(format!(
                    "ragged report matrix: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
        }
        if self.mask.len() != self.values.len()
            || self.mask.iter().any(|row| row.len() != cols)
        {
            return Err(DelphiError::InvalidInput(
                "mask shape does not match report values".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_marks_nan_as_missing() {
        let m = ReportMatrix::from_rows(vec![vec![1.0, f64::NAN], vec![0.0, -1.0]]);
        assert!(!m.is_missing(0, 0));
        assert!(m.is_missing(0, 1));
        assert!(!m.is_missing(1, 0));
        // An observed zero stays an observed zero.
        assert_eq!(m.get(1, 0), 0.0);
    }

    #[test]
    fn from_options_marks_none_as_missing() {
        let m = ReportMatrix::from_options(vec![vec![Some(1.0), None], vec![Some(0.0), Some(1.0)]]);
        assert!(m.is_missing(0, 1));
        assert_eq!(m.observed_in_column(1), vec![1]);
        assert_eq!(m.observed_in_column(0), vec![0, 1]);
    }

    #[test]
    fn set_clears_mask() {
        let mut m = ReportMatrix::new(2, 2);
        m.set_missing(0, 1);
        assert!(m.is_missing(0, 1));
        m.set(0, 1, 0.5);
        assert!(!m.is_missing(0, 1));
        assert_eq!(m.get(0, 1), 0.5);
    }

    #[test]
    fn check_rectangular_rejects_empty_matrix() {
        let m = ReportMatrix::from_rows(vec![]);
        assert!(matches!(
            m.check_rectangular(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn check_rectangular_rejects_ragged_rows() {
        let m = ReportMatrix::from_rows(vec![vec![1.0, 1.0], vec![1.0]]);
        assert!(matches!(
            m.check_rectangular(),
            Err(DelphiError::InvalidInput(_))
        ));
    }

    #[test]
    fn check_rectangular_accepts_well_formed() {
        let m = ReportMatrix::from_rows(vec![vec![1.0, -1.0], vec![-1.0, 1.0]]);
        assert!(m.check_rectangular().is_ok());
    }

    #[test]
    fn serde_round_trip_preserves_mask() {
        let m = ReportMatrix::from_rows(vec![vec![1.0, f64::NAN], vec![0.0, -1.0]]);
        let json = serde_json::to_string(&m).unwrap();
        let back: ReportMatrix = serde_json::from_str(&json).unwrap();
        assert!(back.is_missing(0, 1));
        assert_eq!(back.get(1, 1), -1.0);
    }
}
