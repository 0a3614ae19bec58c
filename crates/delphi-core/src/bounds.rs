// crates/delphi-core/src/bounds.rs
//
// Per-event metadata: binary vs scaled, and the value range for the
// affine rescale step.

use serde::{Deserialize, Serialize};

use crate::error::DelphiError;

/// The kind and range of a single event column.
///
/// Binary events use the signed reporting convention (-1 = false,
/// +1 = true, 0 = ambiguous) and carry the implicit bound [-1, 1] that
/// maps them onto [0, 1] during preprocessing. Scaled events carry the
/// caller-supplied [min, max] range of the quantity being estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBound {
    /// True for a continuous (scaled) event, false for binary.
    pub scaled: bool,
    /// Lower bound of the reporting range.
    pub min: f64,
    /// Upper bound of the reporting range. Must exceed `min`.
    pub max: f64,
}

impl EventBound {
    /// A binary event on the signed convention [-1, 1].
    pub fn binary() -> Self {
        Self {
            scaled: false,
            min: -1.0,
            max: 1.0,
        }
    }

    /// A scaled event bounded by [min, max].
    pub fn scaled(min: f64, max: f64) -> Self {
        Self {
            scaled: true,
            min,
            max,
        }
    }

    /// Width of the reporting range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Validate that the range is usable by the affine rescale.
    pub fn validate(&self, event_idx: usize) -> Result<(), DelphiError> {
        if !(self.max > self.min) {
            return Err(DelphiError::InvalidInput(format!(
                "event {}: bound max ({}) must exceed min ({})",
                event_idx, self.max, self.min
            )));
        }
        Ok(())
    }
}

impl Default for EventBound {
    fn default() -> Self {
        Self::binary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_bound_covers_signed_convention() {
        let b = EventBound::binary();
        assert!(!b.scaled);
        assert_eq!(b.min, -1.0);
        assert_eq!(b.max, 1.0);
        assert_eq!(b.span(), 2.0);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let b = EventBound::scaled(5.0, 5.0);
        assert!(matches!(b.validate(0), Err(DelphiError::InvalidInput(_))));
        let b = EventBound::scaled(5.0, 2.0);
        assert!(b.validate(3).is_err());
    }

    #[test]
    fn validate_rejects_nan_range() {
        let b = EventBound::scaled(f64::NAN, 1.0);
        assert!(b.validate(0).is_err());
    }

    #[test]
    fn validate_accepts_ordered_range() {
        assert!(EventBound::scaled(0.1, 0.5).validate(0).is_ok());
        assert!(EventBound::binary().validate(0).is_ok());
    }
}
