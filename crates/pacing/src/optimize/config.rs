use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyze::DEFAULT_CRITICAL_SEGMENTS;

/// Power search bounds, either as multiples of critical power or in watts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerBounds {
    Relative { lower: f64, upper: f64 },
    Absolute { lower: f64, upper: f64 },
}

impl PowerBounds {
    fn resolve(self, critical_power: f64) -> [f64; 2] {
        match self {
            Self::Relative { lower, upper } => [lower * critical_power, upper * critical_power],
            Self::Absolute { lower, upper } => [lower, upper],
        }
    }

    fn is_valid(self) -> bool {
        let (Self::Relative { lower, upper } | Self::Absolute { lower, upper }) = self;
        lower.is_finite() && upper.is_finite() && lower >= 0.0 && lower < upper
    }
}

/// Configuration for the constant-power optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct OptimizerConfig {
    target_utilization: f64,
    bounds: PowerBounds,
    power_tolerance: f64,
    seeds: usize,
    max_evaluations: usize,
    grid_points: usize,
    utilization_weight: f64,
    utilization_tolerance: f64,
    critical_segments: usize,
}

/// Errors that can occur when validating an optimizer config.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("target utilization must be in (0, 1], got {0}")]
    TargetUtilization(f64),

    #[error("power bounds must be finite, non-negative, and increasing")]
    Bounds,

    #[error("power tolerance must be positive and finite, got {0} W")]
    PowerTolerance(f64),

    #[error("need at least one seed and two evaluations per seed, got {seeds} seeds and {max_evaluations} evaluations")]
    Budget { seeds: usize, max_evaluations: usize },

    #[error("a fallback scan needs at least two points, got {0}")]
    GridPoints(usize),

    #[error("utilization weight must be non-negative and finite, got {0}")]
    UtilizationWeight(f64),

    #[error("utilization tolerance must be in [0, 1), got {0}")]
    UtilizationTolerance(f64),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            target_utilization: 0.85,
            bounds: PowerBounds::Relative {
                lower: 0.9,
                upper: 2.0,
            },
            power_tolerance: 0.1,
            seeds: 4,
            max_evaluations: 240,
            grid_points: 111,
            utilization_weight: 1.0e4,
            utilization_tolerance: 0.02,
            critical_segments: DEFAULT_CRITICAL_SEGMENTS,
        }
    }
}

impl OptimizerConfig {
    /// Sets the fraction of the reserve to spend by the finish.
    ///
    /// # Errors
    ///
    /// Returns an error unless `target` is in `(0, 1]`.
    pub fn with_target_utilization(self, target: f64) -> Result<Self, ConfigError> {
        Self {
            target_utilization: target,
            ..self
        }
        .validate()
    }

    /// Searches powers in `[lower, upper]` watts instead of the default
    /// `0.9·CP ..= 2.0·CP`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bounds are non-finite, negative, or not
    /// increasing.
    pub fn with_bounds(self, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        Self {
            bounds: PowerBounds::Absolute { lower, upper },
            ..self
        }
        .validate()
    }

    /// Searches powers between `lower` and `upper` multiples of critical
    /// power.
    ///
    /// # Errors
    ///
    /// Returns an error if the factors are non-finite, negative, or not
    /// increasing.
    pub fn with_relative_bounds(self, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        Self {
            bounds: PowerBounds::Relative { lower, upper },
            ..self
        }
        .validate()
    }

    /// Sets the convergence tolerance on power, W.
    ///
    /// # Errors
    ///
    /// Returns an error if `tolerance` is not positive and finite.
    pub fn with_power_tolerance(self, tolerance: f64) -> Result<Self, ConfigError> {
        Self {
            power_tolerance: tolerance,
            ..self
        }
        .validate()
    }

    /// Sets the number of seed brackets and the total evaluation budget
    /// shared between them.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no seeds or fewer than two evaluations
    /// per seed.
    pub fn with_search(self, seeds: usize, max_evaluations: usize) -> Result<Self, ConfigError> {
        Self {
            seeds,
            max_evaluations,
            ..self
        }
        .validate()
    }

    /// Sets the number of points in the fallback scan.
    ///
    /// # Errors
    ///
    /// Returns an error if `points < 2`.
    pub fn with_grid_points(self, points: usize) -> Result<Self, ConfigError> {
        Self {
            grid_points: points,
            ..self
        }
        .validate()
    }

    /// Sets the weight (s) on the squared utilization miss and the allowed
    /// undershoot before a result is flagged conservative.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is negative or the tolerance is
    /// outside `[0, 1)`.
    pub fn with_utilization_penalty(
        self,
        weight: f64,
        tolerance: f64,
    ) -> Result<Self, ConfigError> {
        Self {
            utilization_weight: weight,
            utilization_tolerance: tolerance,
            ..self
        }
        .validate()
    }

    /// Sets how many critical segments the metrics report.
    #[must_use]
    pub fn with_critical_segments(self, count: usize) -> Self {
        Self {
            critical_segments: count,
            ..self
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let t = self.target_utilization;
        if !t.is_finite() || t <= 0.0 || t > 1.0 {
            return Err(ConfigError::TargetUtilization(t));
        }
        if !self.bounds.is_valid() {
            return Err(ConfigError::Bounds);
        }
        if !self.power_tolerance.is_finite() || self.power_tolerance <= 0.0 {
            return Err(ConfigError::PowerTolerance(self.power_tolerance));
        }
        if self.seeds == 0 || self.max_evaluations < 2 * self.seeds {
            return Err(ConfigError::Budget {
                seeds: self.seeds,
                max_evaluations: self.max_evaluations,
            });
        }
        if self.grid_points < 2 {
            return Err(ConfigError::GridPoints(self.grid_points));
        }
        if !self.utilization_weight.is_finite() || self.utilization_weight < 0.0 {
            return Err(ConfigError::UtilizationWeight(self.utilization_weight));
        }
        let tol = self.utilization_tolerance;
        if !tol.is_finite() || !(0.0..1.0).contains(&tol) {
            return Err(ConfigError::UtilizationTolerance(tol));
        }
        Ok(self)
    }

    #[must_use]
    pub fn target_utilization(&self) -> f64 {
        self.target_utilization
    }

    /// Power bounds in watts for a rider with the given critical power.
    #[must_use]
    pub fn bounds(&self, critical_power: f64) -> [f64; 2] {
        self.bounds.resolve(critical_power)
    }

    #[must_use]
    pub fn power_tolerance(&self) -> f64 {
        self.power_tolerance
    }

    #[must_use]
    pub fn seeds(&self) -> usize {
        self.seeds
    }

    #[must_use]
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    #[must_use]
    pub fn grid_points(&self) -> usize {
        self.grid_points
    }

    #[must_use]
    pub fn utilization_weight(&self) -> f64 {
        self.utilization_weight
    }

    #[must_use]
    pub fn utilization_tolerance(&self) -> f64 {
        self.utilization_tolerance
    }

    #[must_use]
    pub fn critical_segments(&self) -> usize {
        self.critical_segments
    }
}

/// Deserialized form; missing fields take their defaults.
#[derive(Deserialize)]
#[serde(default)]
struct RawConfig {
    target_utilization: f64,
    bounds: PowerBounds,
    power_tolerance: f64,
    seeds: usize,
    max_evaluations: usize,
    grid_points: usize,
    utilization_weight: f64,
    utilization_tolerance: f64,
    critical_segments: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        let OptimizerConfig {
            target_utilization,
            bounds,
            power_tolerance,
            seeds,
            max_evaluations,
            grid_points,
            utilization_weight,
            utilization_tolerance,
            critical_segments,
        } = OptimizerConfig::default();

        Self {
            target_utilization,
            bounds,
            power_tolerance,
            seeds,
            max_evaluations,
            grid_points,
            utilization_weight,
            utilization_tolerance,
            critical_segments,
        }
    }
}

impl TryFrom<RawConfig> for OptimizerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self {
            target_utilization: raw.target_utilization,
            bounds: raw.bounds,
            power_tolerance: raw.power_tolerance,
            seeds: raw.seeds,
            max_evaluations: raw.max_evaluations,
            grid_points: raw.grid_points,
            utilization_weight: raw.utilization_weight,
            utilization_tolerance: raw.utilization_tolerance,
            critical_segments: raw.critical_segments,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn default_bounds_scale_with_critical_power() {
        let config = OptimizerConfig::default();

        let [lower, upper] = config.bounds(300.0);

        assert_relative_eq!(lower, 270.0);
        assert_relative_eq!(upper, 600.0);
    }

    #[test]
    fn absolute_bounds_ignore_critical_power() {
        let config = OptimizerConfig::default().with_bounds(200.0, 450.0).unwrap();

        assert_eq!(config.bounds(300.0), [200.0, 450.0]);
    }

    #[test]
    fn rejects_invalid_settings() {
        let config = OptimizerConfig::default();

        assert_eq!(
            config.with_target_utilization(0.0),
            Err(ConfigError::TargetUtilization(0.0))
        );
        assert_eq!(config.with_bounds(400.0, 300.0), Err(ConfigError::Bounds));
        assert_eq!(
            config.with_relative_bounds(-0.1, 2.0),
            Err(ConfigError::Bounds)
        );
        assert!(config.with_power_tolerance(0.0).is_err());
        assert_eq!(
            config.with_search(4, 7),
            Err(ConfigError::Budget {
                seeds: 4,
                max_evaluations: 7
            })
        );
        assert_eq!(config.with_grid_points(1), Err(ConfigError::GridPoints(1)));
        assert!(config.with_utilization_penalty(-1.0, 0.02).is_err());
        assert!(config.with_utilization_penalty(1.0e4, 1.0).is_err());
    }

    #[test]
    fn target_of_one_is_allowed() {
        let config = OptimizerConfig::default().with_target_utilization(1.0).unwrap();

        assert_relative_eq!(config.target_utilization(), 1.0);
    }
}
