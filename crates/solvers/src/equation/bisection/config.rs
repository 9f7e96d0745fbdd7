use thiserror::Error;

use crate::Tolerance;

/// Stopping rules for bisection.
///
/// Iteration ends when the bracket is within `x_tol`, when a midpoint
/// residual is within `residual_tol` of zero, or after `max_iters` halvings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    x_tol: Tolerance,
    residual_tol: f64,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("residual tolerance must be finite and non-negative, got {0}")]
    Residual(f64),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            x_tol: Tolerance::TIGHT,
            residual_tol: 1e-12,
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns an error if `residual_tol` is negative or non-finite.
    pub fn new(
        max_iters: usize,
        x_tol: Tolerance,
        residual_tol: f64,
    ) -> Result<Self, ConfigError> {
        if !residual_tol.is_finite() || residual_tol < 0.0 {
            return Err(ConfigError::Residual(residual_tol));
        }
        Ok(Self {
            max_iters,
            x_tol,
            residual_tol,
        })
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn x_tol(&self) -> Tolerance {
        self.x_tol
    }

    #[must_use]
    pub fn residual_tol(&self) -> f64 {
        self.residual_tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_residual_tolerance() {
        assert_eq!(
            Config::new(10, Tolerance::TIGHT, -1.0),
            Err(ConfigError::Residual(-1.0))
        );
        assert!(Config::new(10, Tolerance::TIGHT, f64::INFINITY).is_err());
        assert!(Config::new(10, Tolerance::TIGHT, 0.0).is_ok());
    }
}
