//! Rider parameters and the profile estimates used to fill them in.

use serde::{Deserialize, Serialize};

use crate::{Atmosphere, InvalidInput, RecoveryModel};

/// Default drag area, m².
pub const DEFAULT_DRAG_AREA: f64 = 0.3;

/// Default rolling resistance coefficient.
pub const DEFAULT_ROLLING_RESISTANCE: f64 = 0.005;

/// Physiological and equipment parameters for one rider.
///
/// Set once per optimization and shared read-only by every solver call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiderRecord", into = "RiderRecord")]
pub struct RiderParameters {
    critical_power: f64,
    w_prime: f64,
    mass: f64,
    drag_area: f64,
    rolling_resistance: f64,
    drivetrain_efficiency: f64,
    atmosphere: Atmosphere,
    recovery: RecoveryModel,
}

impl RiderParameters {
    /// Creates rider parameters with default equipment and weather.
    ///
    /// `mass` is the combined rider and bike mass.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is non-positive or non-finite.
    pub fn new(critical_power: f64, w_prime: f64, mass: f64) -> Result<Self, InvalidInput> {
        if !critical_power.is_finite() || critical_power <= 0.0 {
            return Err(InvalidInput::CriticalPower(critical_power));
        }
        if !w_prime.is_finite() || w_prime <= 0.0 {
            return Err(InvalidInput::Capacity(w_prime));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(InvalidInput::Mass(mass));
        }

        Ok(Self {
            critical_power,
            w_prime,
            mass,
            drag_area: DEFAULT_DRAG_AREA,
            rolling_resistance: DEFAULT_ROLLING_RESISTANCE,
            drivetrain_efficiency: 1.0,
            atmosphere: Atmosphere::default(),
            recovery: RecoveryModel::Linear,
        })
    }

    /// Sets the drag area (CdA, m²) and rolling resistance coefficient.
    ///
    /// # Errors
    ///
    /// Returns an error if the drag area is not positive or the rolling
    /// resistance is negative.
    pub fn with_aero(self, drag_area: f64, rolling_resistance: f64) -> Result<Self, InvalidInput> {
        if !drag_area.is_finite() || drag_area <= 0.0 {
            return Err(InvalidInput::DragArea(drag_area));
        }
        if !rolling_resistance.is_finite() || rolling_resistance < 0.0 {
            return Err(InvalidInput::RollingResistance(rolling_resistance));
        }

        Ok(Self {
            drag_area,
            rolling_resistance,
            ..self
        })
    }

    /// Sets the fraction of pedal power delivered to the wheel.
    ///
    /// # Errors
    ///
    /// Returns an error unless `efficiency` is in `(0, 1]`.
    pub fn with_drivetrain_efficiency(self, efficiency: f64) -> Result<Self, InvalidInput> {
        if !efficiency.is_finite() || efficiency <= 0.0 || efficiency > 1.0 {
            return Err(InvalidInput::DrivetrainEfficiency(efficiency));
        }

        Ok(Self {
            drivetrain_efficiency: efficiency,
            ..self
        })
    }

    #[must_use]
    pub fn with_atmosphere(self, atmosphere: Atmosphere) -> Self {
        Self { atmosphere, ..self }
    }

    /// Sets how the reserve refills below critical power.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::Recovery`] if an exponential model has a
    /// non-positive or non-finite time-constant base, or a non-finite
    /// exponent.
    pub fn with_recovery(self, recovery: RecoveryModel) -> Result<Self, InvalidInput> {
        Ok(Self {
            recovery: recovery.validated()?,
            ..self
        })
    }

    #[must_use]
    pub fn critical_power(&self) -> f64 {
        self.critical_power
    }

    /// Energy reserve capacity (W′), J.
    #[must_use]
    pub fn w_prime(&self) -> f64 {
        self.w_prime
    }

    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[must_use]
    pub fn drag_area(&self) -> f64 {
        self.drag_area
    }

    #[must_use]
    pub fn rolling_resistance(&self) -> f64 {
        self.rolling_resistance
    }

    #[must_use]
    pub fn drivetrain_efficiency(&self) -> f64 {
        self.drivetrain_efficiency
    }

    #[must_use]
    pub fn atmosphere(&self) -> &Atmosphere {
        &self.atmosphere
    }

    #[must_use]
    pub fn recovery(&self) -> RecoveryModel {
        self.recovery
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RiderRecord {
    critical_power: f64,
    w_prime: f64,
    mass: f64,
    #[serde(default = "default_drag_area")]
    drag_area: f64,
    #[serde(default = "default_rolling_resistance")]
    rolling_resistance: f64,
    #[serde(default = "default_efficiency")]
    drivetrain_efficiency: f64,
    #[serde(default)]
    atmosphere: Atmosphere,
    #[serde(default)]
    recovery: RecoveryModel,
}

fn default_drag_area() -> f64 {
    DEFAULT_DRAG_AREA
}

fn default_rolling_resistance() -> f64 {
    DEFAULT_ROLLING_RESISTANCE
}

fn default_efficiency() -> f64 {
    1.0
}

impl TryFrom<RiderRecord> for RiderParameters {
    type Error = InvalidInput;

    fn try_from(record: RiderRecord) -> Result<Self, Self::Error> {
        RiderParameters::new(record.critical_power, record.w_prime, record.mass)?
            .with_aero(record.drag_area, record.rolling_resistance)?
            .with_drivetrain_efficiency(record.drivetrain_efficiency)?
            .with_atmosphere(record.atmosphere)
            .with_recovery(record.recovery)
    }
}

impl From<RiderParameters> for RiderRecord {
    fn from(rider: RiderParameters) -> Self {
        Self {
            critical_power: rider.critical_power,
            w_prime: rider.w_prime,
            mass: rider.mass,
            drag_area: rider.drag_area,
            rolling_resistance: rider.rolling_resistance,
            drivetrain_efficiency: rider.drivetrain_efficiency,
            atmosphere: rider.atmosphere,
            recovery: rider.recovery,
        }
    }
}

/// Bike category used to pick a baseline drag area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BikeType {
    Road,
    TimeTrial,
    Gravel,
    Mountain,
}

/// Riding position used to pick a baseline drag area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Hoods,
    Drops,
    Aero,
    Flat,
}

/// Estimates drag area (m²) from bike type, position, and rider height (m).
///
/// The baseline for the bike and position is scaled by `height / 1.75` and
/// rounded to three decimals. Combinations without a baseline use 0.35 m².
///
/// # Errors
///
/// Returns an error if `height` is not positive and finite.
pub fn estimate_cda(bike: BikeType, position: Position, height: f64) -> Result<f64, InvalidInput> {
    if !height.is_finite() || height <= 0.0 {
        return Err(InvalidInput::Height(height));
    }

    let baseline = match (bike, position) {
        (BikeType::Road, Position::Drops) => 0.33,
        (BikeType::Road, Position::Aero) => 0.30,
        (BikeType::TimeTrial, Position::Aero) => 0.22,
        (BikeType::Gravel, Position::Hoods) => 0.38,
        (BikeType::Gravel, Position::Drops) => 0.36,
        (BikeType::Mountain, Position::Flat) => 0.40,
        _ => 0.35,
    };

    let scaled: f64 = baseline * height / 1.75;
    Ok((scaled * 1000.0).round() / 1000.0)
}

/// Rider archetype used to estimate W′ from critical power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderType {
    TimeTrialist,
    Sprinter,
    AllRounder,
}

impl RiderType {
    /// Estimated energy reserve capacity (J) for a rider with the given
    /// critical power.
    #[must_use]
    pub fn w_prime(self, critical_power: f64) -> f64 {
        match self {
            Self::TimeTrialist => 10_000.0 + 0.5 * critical_power,
            Self::Sprinter => 25_000.0 + 0.7 * critical_power,
            Self::AllRounder => 15_000.0 + 0.6 * critical_power,
        }
    }

    /// Typical best efforts as `(duration s, power W)` pairs, from 1 to 60
    /// minutes.
    #[must_use]
    pub fn best_efforts(self, critical_power: f64) -> Vec<(f64, f64)> {
        let multipliers: [f64; 6] = match self {
            Self::TimeTrialist => [1.4, 1.2, 1.1, 1.05, 1.02, 1.0],
            Self::Sprinter => [1.8, 1.4, 1.2, 1.1, 1.05, 1.0],
            Self::AllRounder => [1.6, 1.3, 1.15, 1.08, 1.03, 1.0],
        };
        let durations = [60.0, 300.0, 600.0, 1200.0, 1800.0, 3600.0];

        durations
            .into_iter()
            .zip(multipliers)
            .map(|(t, m)| (t, critical_power * m))
            .collect()
    }
}

/// Critical power and W′ fitted from best efforts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalPowerFit {
    pub critical_power: f64,
    pub w_prime: f64,
}

/// Fits the two-parameter power-duration model `P(t) = CP + W′/t`.
///
/// `best_efforts` holds `(duration s, power W)` pairs. The model is linear in
/// `1/t`, so the fit is an ordinary least-squares line.
///
/// # Errors
///
/// Returns an error if any effort is non-positive or non-finite, fewer than
/// two distinct durations are given, or the fit is not physical.
pub fn fit_critical_power(best_efforts: &[(f64, f64)]) -> Result<CriticalPowerFit, InvalidInput> {
    if best_efforts
        .iter()
        .any(|&(t, p)| !t.is_finite() || !p.is_finite() || t <= 0.0 || p <= 0.0)
    {
        return Err(InvalidInput::BestEfforts(
            "durations and powers must be positive and finite",
        ));
    }

    #[allow(clippy::cast_precision_loss)]
    let n = best_efforts.len() as f64;
    let mean_x = best_efforts.iter().map(|&(t, _)| 1.0 / t).sum::<f64>() / n;
    let mean_p = best_efforts.iter().map(|&(_, p)| p).sum::<f64>() / n;

    let (sxx, sxp) = best_efforts
        .iter()
        .fold((0.0, 0.0), |(sxx, sxp), &(t, p)| {
            let dx = 1.0 / t - mean_x;
            (sxx + dx * dx, sxp + dx * (p - mean_p))
        });

    if best_efforts.len() < 2 || sxx <= f64::EPSILON * mean_x * mean_x {
        return Err(InvalidInput::BestEfforts(
            "at least two distinct durations are required",
        ));
    }

    let w_prime = sxp / sxx;
    let critical_power = mean_p - w_prime * mean_x;
    if critical_power <= 0.0 || w_prime <= 0.0 {
        return Err(InvalidInput::BestEfforts(
            "efforts do not describe a declining power-duration curve",
        ));
    }

    Ok(CriticalPowerFit {
        critical_power,
        w_prime,
    })
}
