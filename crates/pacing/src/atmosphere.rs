//! Air density from weather and altitude.
//!
//! Pressure falls with altitude following the barometric formula for a
//! standard lapse rate. Density is the sum of the dry-air and water-vapour
//! contributions, with the vapour pressure taken as the saturation pressure
//! at the dew point.

use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{Length, MassDensity, Pressure, ThermodynamicTemperature},
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    pressure::{hectopascal, pascal},
    thermodynamic_temperature::{degree_celsius, kelvin},
};

use crate::InvalidInput;

/// Specific gas constant for dry air, J/(kg·K).
const R_DRY: f64 = 287.05;

/// Specific gas constant for water vapour, J/(kg·K).
const R_VAPOUR: f64 = 461.495;

/// Standard sea-level temperature, K.
const T0: f64 = 288.15;

/// Temperature lapse rate, K/m.
const LAPSE_RATE: f64 = 0.0065;

/// Standard gravity, m/s².
const G0: f64 = 9.80665;

/// Molar mass of dry air, kg/mol.
const MOLAR_MASS: f64 = 0.028_964_4;

/// Universal gas constant, J/(mol·K).
const R_UNIVERSAL: f64 = 8.31447;

/// Weather conditions used to compute air density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AtmosphereRecord", into = "AtmosphereRecord")]
pub struct Atmosphere {
    temperature: ThermodynamicTemperature,
    dew_point: ThermodynamicTemperature,
    sea_level_pressure: Pressure,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            temperature: ThermodynamicTemperature::new::<degree_celsius>(15.0),
            dew_point: ThermodynamicTemperature::new::<degree_celsius>(10.0),
            sea_level_pressure: Pressure::new::<hectopascal>(1013.25),
        }
    }
}

impl Atmosphere {
    /// Creates an atmosphere from air temperature, dew point, and sea-level
    /// pressure.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is non-finite, the temperature is not
    /// above absolute zero, the dew point exceeds the temperature, or the
    /// pressure is not positive.
    pub fn new(
        temperature: ThermodynamicTemperature,
        dew_point: ThermodynamicTemperature,
        sea_level_pressure: Pressure,
    ) -> Result<Self, InvalidInput> {
        let t = temperature.get::<kelvin>();
        let dp = dew_point.get::<kelvin>();
        let p = sea_level_pressure.get::<pascal>();

        let valid = t.is_finite() && dp.is_finite() && p.is_finite();
        if !valid || t <= 0.0 || dp > t || p <= 0.0 {
            return Err(InvalidInput::Atmosphere);
        }

        Ok(Self {
            temperature,
            dew_point,
            sea_level_pressure,
        })
    }

    #[must_use]
    pub fn temperature(&self) -> ThermodynamicTemperature {
        self.temperature
    }

    #[must_use]
    pub fn dew_point(&self) -> ThermodynamicTemperature {
        self.dew_point
    }

    #[must_use]
    pub fn sea_level_pressure(&self) -> Pressure {
        self.sea_level_pressure
    }

    /// Station pressure at `altitude`.
    #[must_use]
    pub fn pressure(&self, altitude: Length) -> Pressure {
        let h = altitude.get::<meter>();
        let exponent = G0 * MOLAR_MASS / (R_UNIVERSAL * LAPSE_RATE);
        let ratio = (1.0 - LAPSE_RATE * h / T0).max(0.0).powf(exponent);
        self.sea_level_pressure * ratio
    }

    /// Saturation vapour pressure at the dew point (Tetens form).
    #[must_use]
    pub fn vapour_pressure(&self) -> Pressure {
        let dp = self.dew_point.get::<degree_celsius>();
        Pressure::new::<hectopascal>(6.11 * 10_f64.powf(7.5 * dp / (237.3 + dp)))
    }

    /// Moist air density at `altitude`.
    #[must_use]
    pub fn density(&self, altitude: Length) -> MassDensity {
        let t = self.temperature.get::<kelvin>();
        let p = self.pressure(altitude).get::<pascal>();
        let p_vapour = self.vapour_pressure().get::<pascal>().min(p);
        let p_dry = p - p_vapour;

        MassDensity::new::<kilogram_per_cubic_meter>(
            p_dry / (R_DRY * t) + p_vapour / (R_VAPOUR * t),
        )
    }

    /// Air density in kg/m³ at an altitude in metres.
    #[must_use]
    pub fn density_at(&self, altitude: f64) -> f64 {
        self.density(Length::new::<meter>(altitude))
            .get::<kilogram_per_cubic_meter>()
    }
}

/// Plain-unit form used for serialization: degrees Celsius and hectopascals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct AtmosphereRecord {
    temperature_c: f64,
    dew_point_c: f64,
    sea_level_pressure_hpa: f64,
}

impl TryFrom<AtmosphereRecord> for Atmosphere {
    type Error = InvalidInput;

    fn try_from(record: AtmosphereRecord) -> Result<Self, Self::Error> {
        Atmosphere::new(
            ThermodynamicTemperature::new::<degree_celsius>(record.temperature_c),
            ThermodynamicTemperature::new::<degree_celsius>(record.dew_point_c),
            Pressure::new::<hectopascal>(record.sea_level_pressure_hpa),
        )
    }
}

impl From<Atmosphere> for AtmosphereRecord {
    fn from(atmosphere: Atmosphere) -> Self {
        Self {
            temperature_c: atmosphere.temperature.get::<degree_celsius>(),
            dew_point_c: atmosphere.dew_point.get::<degree_celsius>(),
            sea_level_pressure_hpa: atmosphere.sea_level_pressure.get::<hectopascal>(),
        }
    }
}
