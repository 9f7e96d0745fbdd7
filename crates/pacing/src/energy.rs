//! The anaerobic energy reserve (W′ balance).
//!
//! The reserve starts full at the beginning of every run. Riding above
//! critical power drains it by the excess work; riding at or below critical
//! power refills it, never past capacity. Draining it completely while above
//! critical power exhausts the rider, and an exhausted reserve stays
//! exhausted for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::InvalidInput;

/// How the reserve refills below critical power.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecoveryModel {
    /// Refills by `(CP − P)·t`.
    #[default]
    Linear,

    /// Refills exponentially toward capacity with time constant
    /// `τ = tau_base · (CP − P)^tau_exponent` seconds.
    Exponential { tau_base: f64, tau_exponent: f64 },
}

impl RecoveryModel {
    /// Exponential recovery with the published time-constant fit
    /// `τ = 2287.2 · DCP^−0.688`.
    #[must_use]
    pub fn exponential() -> Self {
        Self::Exponential {
            tau_base: 2287.2,
            tau_exponent: -0.688,
        }
    }

    pub(crate) fn validated(self) -> Result<Self, InvalidInput> {
        match self {
            Self::Linear => Ok(self),
            Self::Exponential {
                tau_base,
                tau_exponent,
            } => {
                if tau_base.is_finite() && tau_base > 0.0 && tau_exponent.is_finite() {
                    Ok(self)
                } else {
                    Err(InvalidInput::Recovery)
                }
            }
        }
    }

    /// Reserve after recovering at `deficit` watts below CP for `duration`.
    fn recover(self, remaining: f64, capacity: f64, deficit: f64, duration: f64) -> f64 {
        let refilled = match self {
            Self::Linear => remaining + deficit * duration,
            Self::Exponential {
                tau_base,
                tau_exponent,
            } => {
                let tau = tau_base * deficit.powf(tau_exponent);
                capacity - (capacity - remaining) * (-duration / tau).exp()
            }
        };
        refilled.clamp(remaining.min(capacity), capacity)
    }
}

/// Outcome of applying one power/duration pair to the reserve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Above critical power; `used` joules were drawn.
    Depleted { used: f64 },

    /// At or below critical power; `recovered` joules were restored.
    Recovered { recovered: f64 },

    /// The demand reached or exceeded what remained. Only `used` joules were
    /// available and `shortfall` joules were missing.
    Exhausted { used: f64, shortfall: f64 },
}

impl Transition {
    /// Signed change in the reserve: negative when drawn down.
    #[must_use]
    pub fn delta(&self) -> f64 {
        match *self {
            Self::Depleted { used } | Self::Exhausted { used, .. } => -used,
            Self::Recovered { recovered } => recovered,
        }
    }

    /// Joules drawn from the reserve.
    #[must_use]
    pub fn used(&self) -> f64 {
        match *self {
            Self::Depleted { used } | Self::Exhausted { used, .. } => used,
            Self::Recovered { .. } => 0.0,
        }
    }
}

/// Remaining anaerobic energy, clamped to `[0, capacity]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyReserve {
    capacity: f64,
    remaining: f64,
    exhausted: bool,
    recovery: RecoveryModel,
}

impl EnergyReserve {
    /// Creates a full reserve with linear recovery.
    ///
    /// `capacity` is expected to be positive; rider parameters guarantee it.
    #[must_use]
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            remaining: capacity,
            exhausted: false,
            recovery: RecoveryModel::Linear,
        }
    }

    /// Switches the recovery model.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::Recovery`] for invalid exponential parameters.
    pub fn with_recovery(self, recovery: RecoveryModel) -> Result<Self, InvalidInput> {
        Ok(Self {
            recovery: recovery.validated()?,
            ..self
        })
    }

    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    #[must_use]
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fraction of capacity spent so far.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        1.0 - self.remaining / self.capacity
    }

    /// Applies `power` for `duration` seconds against `critical_power`.
    ///
    /// Once exhausted, every further application reports
    /// [`Transition::Exhausted`] with nothing used.
    pub fn apply(&mut self, power: f64, critical_power: f64, duration: f64) -> Transition {
        if self.exhausted {
            return Transition::Exhausted {
                used: 0.0,
                shortfall: ((power - critical_power) * duration).max(0.0),
            };
        }

        if power > critical_power {
            let demand = (power - critical_power) * duration;
            if demand >= self.remaining {
                let used = self.remaining;
                self.remaining = 0.0;
                self.exhausted = true;
                Transition::Exhausted {
                    used,
                    shortfall: demand - used,
                }
            } else {
                self.remaining -= demand;
                Transition::Depleted { used: demand }
            }
        } else {
            let before = self.remaining;
            let deficit = critical_power - power;
            if deficit > 0.0 {
                self.remaining =
                    self.recovery
                        .recover(before, self.capacity, deficit, duration);
            }
            Transition::Recovered {
                recovered: self.remaining - before,
            }
        }
    }
}
