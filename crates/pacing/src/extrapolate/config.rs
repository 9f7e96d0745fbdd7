use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits on the fine-grained speed integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct ExtrapolationConfig {
    max_acceleration: f64,
    max_deceleration: f64,
    max_step: f64,
    max_speed_change: f64,
    max_substeps: usize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("acceleration limits must be positive and finite, got +{accel} / -{decel} m/s²")]
    Acceleration { accel: f64, decel: f64 },

    #[error("sub-step length must be positive and finite, got {0} m")]
    Step(f64),

    #[error("relative speed change per sub-step must be in (0, 1], got {0}")]
    SpeedChange(f64),

    #[error("at least one sub-step is required")]
    Substeps,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            max_acceleration: 2.0,
            max_deceleration: 4.0,
            max_step: 1.0,
            max_speed_change: 0.05,
            max_substeps: 10_000,
        }
    }
}

impl ExtrapolationConfig {
    /// Sets the acceleration and deceleration limits, both positive, m/s².
    ///
    /// # Errors
    ///
    /// Returns an error unless both limits are positive and finite.
    pub fn with_acceleration_limits(self, accel: f64, decel: f64) -> Result<Self, ConfigError> {
        Self {
            max_acceleration: accel,
            max_deceleration: decel,
            ..self
        }
        .validate()
    }

    /// Sets the sub-step limits.
    ///
    /// Sub-steps are at most `max_step` metres and short enough that speed
    /// changes by at most `max_speed_change` of itself per step, up to
    /// `max_substeps` per fine point.
    ///
    /// # Errors
    ///
    /// Returns an error if any limit is out of range.
    pub fn with_substeps(
        self,
        max_step: f64,
        max_speed_change: f64,
        max_substeps: usize,
    ) -> Result<Self, ConfigError> {
        Self {
            max_step,
            max_speed_change,
            max_substeps,
            ..self
        }
        .validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let valid = |a: f64| a.is_finite() && a > 0.0;
        if !valid(self.max_acceleration) || !valid(self.max_deceleration) {
            return Err(ConfigError::Acceleration {
                accel: self.max_acceleration,
                decel: self.max_deceleration,
            });
        }
        if !valid(self.max_step) {
            return Err(ConfigError::Step(self.max_step));
        }
        if !valid(self.max_speed_change) || self.max_speed_change > 1.0 {
            return Err(ConfigError::SpeedChange(self.max_speed_change));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::Substeps);
        }
        Ok(self)
    }

    #[must_use]
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    #[must_use]
    pub fn max_deceleration(&self) -> f64 {
        self.max_deceleration
    }

    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    #[must_use]
    pub fn max_speed_change(&self) -> f64 {
        self.max_speed_change
    }

    #[must_use]
    pub fn max_substeps(&self) -> usize {
        self.max_substeps
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct RawConfig {
    max_acceleration: f64,
    max_deceleration: f64,
    max_step: f64,
    max_speed_change: f64,
    max_substeps: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        let config = ExtrapolationConfig::default();
        Self {
            max_acceleration: config.max_acceleration,
            max_deceleration: config.max_deceleration,
            max_step: config.max_step,
            max_speed_change: config.max_speed_change,
            max_substeps: config.max_substeps,
        }
    }
}

impl TryFrom<RawConfig> for ExtrapolationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self {
            max_acceleration: raw.max_acceleration,
            max_deceleration: raw.max_deceleration,
            max_step: raw.max_step,
            max_speed_change: raw.max_speed_change,
            max_substeps: raw.max_substeps,
        }
        .validate()
    }
}
