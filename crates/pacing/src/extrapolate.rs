//! Continuous speed trace over a dense point series.
//!
//! The coarse optimization holds one power per segment. Here that power is
//! broadcast onto every fine point inside the segment, and speed is
//! integrated point by point with forward Euler over distance:
//!
//! ```text
//! a     = clamp((η·P/v − F_resist(v)) / m, −max_deceleration, max_acceleration)
//! dv/dx = a / v
//! dt/dx = 1 / v
//! ```
//!
//! The exit speed of one point is the entry speed of the next, so the rider
//! speeds up or slows down gradually across power and gradient changes
//! instead of snapping to each new steady speed.

mod config;

pub use config::{ConfigError, ExtrapolationConfig};

use std::convert::Infallible;

use pacer_core::StepIntegrable;
use pacer_solvers::transient::euler;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    CoursePoint, InvalidInput, OptimizationResult, RiderParameters, SimulationRun,
    physics::{Conditions, MIN_SPEED, ResistiveForces},
};

#[derive(Debug, Error)]
pub enum ExtrapolateError {
    #[error("run exhausted the reserve on segment {segment_index}; no complete schedule")]
    Incomplete { segment_index: usize },

    #[error("no fine points to extrapolate")]
    NoPoints,

    #[error("fine point {index}: {source}")]
    InvalidPoint {
        index: usize,
        #[source]
        source: InvalidInput,
    },

    #[error("fine point {index} at {position} m is not after the previous point")]
    Unordered { index: usize, position: f64 },

    #[error("fine point {index} at {position} m is outside the course [0, {end}) m")]
    OutOfRange {
        index: usize,
        position: f64,
        end: f64,
    },

    #[error("speed integration failed: {0}")]
    Integration(#[from] euler::Error),
}

/// Power held over a stretch of route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerSpan {
    pub start: f64,
    pub end: f64,
    pub power: f64,
}

/// Coarse per-segment powers and the speed to start the trace with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSchedule {
    spans: Vec<PowerSpan>,
    initial_speed: f64,
}

impl PowerSchedule {
    /// Builds the schedule from a completed run.
    ///
    /// The initial speed is the first segment's average speed.
    ///
    /// # Errors
    ///
    /// Returns [`ExtrapolateError::Incomplete`] if the run exhausted the
    /// reserve.
    pub fn from_run(run: &SimulationRun) -> Result<Self, ExtrapolateError> {
        if let Some(segment_index) = run.failed_segment() {
            return Err(ExtrapolateError::Incomplete { segment_index });
        }

        let spans = run
            .segments
            .iter()
            .map(|s| PowerSpan {
                start: s.start,
                end: s.start + s.distance,
                power: s.power,
            })
            .collect();

        Ok(Self {
            spans,
            initial_speed: run.segments.first().map_or(MIN_SPEED, |s| s.speed),
        })
    }

    #[must_use]
    pub fn spans(&self) -> &[PowerSpan] {
        &self.spans
    }

    #[must_use]
    pub fn initial_speed(&self) -> f64 {
        self.initial_speed
    }

    /// End of the last span, m.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.spans.last().map_or(0.0, |s| s.end)
    }

    /// Power of the span containing `position`.
    ///
    /// Spans cover `[start, end)`; positions past the end take the last
    /// span's power.
    #[must_use]
    pub fn power_at(&self, position: f64) -> f64 {
        let index = self
            .spans
            .partition_point(|span| span.end <= position)
            .min(self.spans.len().saturating_sub(1));
        self.spans.get(index).map_or(0.0, |s| s.power)
    }
}

/// Solved motion over one fine point's span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinePoint {
    pub position: f64,
    /// Length of the span, m.
    pub distance: f64,
    pub power: f64,
    pub entry_speed: f64,
    pub exit_speed: f64,
    /// Mean acceleration over the span, m/s².
    pub acceleration: f64,
    pub elapsed_time: f64,
    pub cumulative_time: f64,
}

/// Speed and elapsed time, integrated along distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub speed: f64,
    pub time: f64,
}

/// Rates of change per metre travelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicsRate {
    pub speed: f64,
    pub time: f64,
}

impl StepIntegrable<f64> for Kinematics {
    type Derivative = KinematicsRate;

    fn step(&self, rate: KinematicsRate, dx: f64) -> Self {
        Self {
            speed: (self.speed + rate.speed * dx).max(MIN_SPEED),
            time: self.time + rate.time * dx,
        }
    }
}

/// Net acceleration at `speed`, clamped to the configured limits.
#[must_use]
pub fn acceleration(
    power: f64,
    speed: f64,
    conditions: &Conditions,
    rider: &RiderParameters,
    config: &ExtrapolationConfig,
) -> f64 {
    let speed = speed.max(MIN_SPEED);
    let propulsive = rider.drivetrain_efficiency() * power / speed;
    let resistive = ResistiveForces::at(speed, conditions, rider).total();
    let a = (propulsive - resistive) / rider.mass();
    a.clamp(-config.max_deceleration(), config.max_acceleration())
}

/// Extrapolates an optimization result onto `points` with default limits.
///
/// # Errors
///
/// See [`extrapolate_schedule`].
pub fn extrapolate(
    result: &OptimizationResult,
    points: &[CoursePoint],
    rider: &RiderParameters,
) -> Result<Vec<FinePoint>, ExtrapolateError> {
    let schedule = PowerSchedule::from_run(&result.run)?;
    extrapolate_schedule(&schedule, points, rider, &ExtrapolationConfig::default())
}

/// Integrates speed over `points` under a coarse power schedule.
///
/// Points must be strictly increasing and lie in `[0, schedule.end())`.
/// Each point spans to the next one; the last spans to the end of the
/// schedule.
///
/// # Errors
///
/// Returns an error if there are no points, a point is invalid, unordered,
/// or outside the schedule.
pub fn extrapolate_schedule(
    schedule: &PowerSchedule,
    points: &[CoursePoint],
    rider: &RiderParameters,
    config: &ExtrapolationConfig,
) -> Result<Vec<FinePoint>, ExtrapolateError> {
    validate_points(points, schedule.end())?;

    let mut trace = Vec::with_capacity(points.len());
    let mut speed = schedule.initial_speed();
    let mut cumulative_time = 0.0;

    for (index, point) in points.iter().enumerate() {
        let end = points
            .get(index + 1)
            .map_or(schedule.end(), |next| next.position);
        let distance = end - point.position;
        let power = schedule.power_at(point.position);
        let conditions = Conditions::new(point.gradient, point.wind, point.altitude, rider);

        let exit = integrate_span(power, distance, speed, &conditions, rider, config)?;
        cumulative_time += exit.time;
        trace.push(FinePoint {
            position: point.position,
            distance,
            power,
            entry_speed: speed,
            exit_speed: exit.speed,
            acceleration: (exit.speed - speed) / exit.time,
            elapsed_time: exit.time,
            cumulative_time,
        });
        speed = exit.speed;
    }

    Ok(trace)
}

/// Speed and time after riding `distance` at `power`, entered at `speed`.
///
/// Each sub-step is sized from the current speed: at most `max_step` long
/// and short enough that the largest allowed acceleration changes speed by
/// at most `max_speed_change · speed`. Once the remaining sub-steps would
/// overrun `max_substeps`, the rest of the span is split evenly over them.
fn integrate_span(
    power: f64,
    distance: f64,
    speed: f64,
    conditions: &Conditions,
    rider: &RiderParameters,
    config: &ExtrapolationConfig,
) -> Result<Kinematics, euler::Error> {
    let rate = |state: &Kinematics| -> Result<KinematicsRate, Infallible> {
        let a = acceleration(power, state.speed, conditions, rider, config);
        Ok(KinematicsRate {
            speed: a / state.speed,
            time: 1.0 / state.speed,
        })
    };

    let mut state = Kinematics { speed, time: 0.0 };
    let mut covered = 0.0;
    for taken in 0..config.max_substeps() {
        let remaining = distance - covered;
        if remaining <= f64::EPSILON * distance {
            break;
        }

        #[allow(clippy::cast_precision_loss)]
        let even = remaining / (config.max_substeps() - taken) as f64;
        let step = step_limit(state.speed, config).max(even).min(remaining);

        state = euler::integrate_unobserved(state, step, 1, &rate)?.state;
        covered += step;
    }
    Ok(state)
}

fn step_limit(speed: f64, config: &ExtrapolationConfig) -> f64 {
    let a_max = config.max_acceleration().max(config.max_deceleration());
    config
        .max_step()
        .min(config.max_speed_change() * speed * speed / a_max)
}

fn validate_points(points: &[CoursePoint], end: f64) -> Result<(), ExtrapolateError> {
    if points.is_empty() {
        return Err(ExtrapolateError::NoPoints);
    }

    let mut previous: Option<f64> = None;
    for (index, point) in points.iter().enumerate() {
        point
            .validate()
            .map_err(|source| ExtrapolateError::InvalidPoint { index, source })?;

        if point.position < 0.0 || point.position >= end {
            return Err(ExtrapolateError::OutOfRange {
                index,
                position: point.position,
                end,
            });
        }
        if previous.is_some_and(|p| point.position <= p) {
            return Err(ExtrapolateError::Unordered {
                index,
                position: point.position,
            });
        }
        previous = Some(point.position);
    }
    Ok(())
}
