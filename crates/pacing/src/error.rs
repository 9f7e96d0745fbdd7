use thiserror::Error;

/// Input that is rejected before any simulation begins.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("segment distance must be positive and finite, got {0} m")]
    Distance(f64),

    #[error("segment gradient must be finite with magnitude at most {max}, got {gradient}")]
    Gradient { gradient: f64, max: f64 },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("a course needs at least one segment")]
    EmptyCourse,

    #[error("critical power must be positive and finite, got {0} W")]
    CriticalPower(f64),

    #[error("energy reserve capacity must be positive and finite, got {0} J")]
    Capacity(f64),

    #[error("mass must be positive and finite, got {0} kg")]
    Mass(f64),

    #[error("drag area must be positive and finite, got {0} m²")]
    DragArea(f64),

    #[error("rolling resistance coefficient must be non-negative and finite, got {0}")]
    RollingResistance(f64),

    #[error("drivetrain efficiency must be in (0, 1], got {0}")]
    DrivetrainEfficiency(f64),

    #[error("power must be non-negative and finite, got {0} W")]
    Power(f64),

    #[error("power schedule has {got} entries for a course of {expected} segments")]
    ScheduleLength { expected: usize, got: usize },

    #[error("rider height must be positive and finite, got {0} m")]
    Height(f64),

    #[error("best efforts: {0}")]
    BestEfforts(&'static str),

    #[error("recovery time constant parameters must be finite with a positive base")]
    Recovery,

    #[error("air temperature must be above absolute zero and dew point must not exceed it")]
    Atmosphere,
}
