//! Interval-width stopping rule shared by the bracketing solvers.

use thiserror::Error;

/// Absolute plus relative tolerance on the width of an interval.
///
/// An interval `[a, b]` is narrow enough once `|b − a| ≤ abs + rel·|m|`,
/// where `m` is its midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    abs: f64,
    rel: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ToleranceError {
    #[error("absolute tolerance must be finite and non-negative, got {0}")]
    Absolute(f64),

    #[error("relative tolerance must be finite and non-negative, got {0}")]
    Relative(f64),
}

impl Tolerance {
    /// Near machine precision for values of order one.
    pub const TIGHT: Self = Self {
        abs: 1e-12,
        rel: 1e-12,
    };

    /// # Errors
    ///
    /// Returns an error if either part is negative or non-finite.
    pub fn new(abs: f64, rel: f64) -> Result<Self, ToleranceError> {
        if !abs.is_finite() || abs < 0.0 {
            return Err(ToleranceError::Absolute(abs));
        }
        if !rel.is_finite() || rel < 0.0 {
            return Err(ToleranceError::Relative(rel));
        }
        Ok(Self { abs, rel })
    }

    /// A purely absolute tolerance, in the units of the solver variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `abs` is negative or non-finite.
    pub fn absolute(abs: f64) -> Result<Self, ToleranceError> {
        Self::new(abs, 0.0)
    }

    #[must_use]
    pub fn abs(&self) -> f64 {
        self.abs
    }

    #[must_use]
    pub fn rel(&self) -> f64 {
        self.rel
    }

    /// Whether the interval between `a` and `b` is within tolerance.
    #[must_use]
    pub fn is_met(&self, a: f64, b: f64) -> bool {
        let mid = 0.5 * (a + b);
        (b - a).abs() <= self.abs + self.rel * mid.abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::TIGHT
    }
}
