//! Steady-state speed from a power balance.
//!
//! At steady speed `v` the wheel power `η·P` equals the power dissipated by
//! resistive forces:
//!
//! ```text
//! η·P = (½·ρ·CdA·(v − w)·|v − w| + m·g·Crr·cos θ + m·g·sin θ) · v
//! ```
//!
//! where `θ = atan(gradient)` and `w` is the tailwind. The speed is found by
//! bisection over `[MIN_SPEED, MAX_SPEED]`. When no root can be bracketed or
//! the search does not converge, [`solve_speed`] falls back to a closed-form
//! estimate and logs a warning instead of failing.

use std::convert::Infallible;

use pacer_core::{EquationProblem, Model};
use pacer_solvers::equation::bisection;
use thiserror::Error;

use crate::{RiderParameters, Segment};

/// Gravitational acceleration, m/s².
pub const GRAVITY: f64 = 9.81;

/// Lowest speed ever reported, m/s.
pub const MIN_SPEED: f64 = 0.1;

/// Upper end of the speed search bracket, m/s.
pub const MAX_SPEED: f64 = 100.0;

/// Local conditions that shape the resistive forces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub gradient: f64,
    /// Tailwind along the direction of travel, m/s.
    pub wind: f64,
    /// kg/m³
    pub air_density: f64,
}

impl Conditions {
    /// Conditions at `altitude` using the rider's atmosphere for density.
    #[must_use]
    pub fn new(gradient: f64, wind: f64, altitude: f64, rider: &RiderParameters) -> Self {
        Self {
            gradient,
            wind,
            air_density: rider.atmosphere().density_at(altitude),
        }
    }

    /// Conditions on a segment.
    #[must_use]
    pub fn on(segment: &Segment, rider: &RiderParameters) -> Self {
        Self::new(segment.gradient(), segment.wind(), segment.altitude(), rider)
    }
}

/// Resistive force components at a given speed, N.
///
/// Positive values oppose motion. Drag is negative when a tailwind is
/// faster than the rider, and gravity is negative on descents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResistiveForces {
    pub drag: f64,
    pub rolling: f64,
    pub gravity: f64,
}

impl ResistiveForces {
    #[must_use]
    pub fn at(speed: f64, conditions: &Conditions, rider: &RiderParameters) -> Self {
        let theta = conditions.gradient.atan();
        let airspeed = speed - conditions.wind;
        let weight = rider.mass() * GRAVITY;

        Self {
            drag: 0.5 * conditions.air_density * rider.drag_area() * airspeed * airspeed.abs(),
            rolling: weight * rider.rolling_resistance() * theta.cos(),
            gravity: weight * theta.sin(),
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.drag + self.rolling + self.gravity
    }
}

/// Errors from the un-degraded speed solve.
#[derive(Debug, Error)]
pub enum SpeedError {
    #[error("no steady speed in the search bracket balances {power} W")]
    NoBracket { power: f64 },

    #[error("speed search stopped after {iters} iterations without converging")]
    NotConverged { iters: usize },

    #[error(transparent)]
    Solver(#[from] bisection::Error),
}

/// Wheel power needed to hold a given speed.
struct PowerBalance<'a> {
    conditions: &'a Conditions,
    rider: &'a RiderParameters,
}

impl Model for PowerBalance<'_> {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn call(&self, speed: &f64) -> Result<f64, Self::Error> {
        Ok(ResistiveForces::at(*speed, self.conditions, self.rider).total() * speed)
    }
}

/// Residual is required power minus delivered wheel power.
struct DeliveredPower(f64);

impl EquationProblem<1> for DeliveredPower {
    type Input = f64;
    type Output = f64;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<f64, Self::Error> {
        Ok(x[0])
    }

    fn residuals(&self, _speed: &f64, required: &f64) -> Result<[f64; 1], Self::Error> {
        Ok([required - self.0])
    }
}

/// Solves for the steady speed, reporting any solver failure.
///
/// The result is floored at [`MIN_SPEED`].
///
/// # Errors
///
/// Returns [`SpeedError::NoBracket`] if the power balance does not change
/// sign over the search bracket and [`SpeedError::NotConverged`] if the
/// search runs out of iterations.
pub fn try_steady_speed(
    power: f64,
    conditions: &Conditions,
    rider: &RiderParameters,
) -> Result<f64, SpeedError> {
    let model = PowerBalance { conditions, rider };
    let problem = DeliveredPower(rider.drivetrain_efficiency() * power);

    let solution = bisection::solve_unobserved(
        &model,
        &problem,
        [MIN_SPEED, MAX_SPEED],
        &bisection::Config::default(),
    )
    .map_err(|err| match err {
        bisection::Error::NoSignChange { .. } => SpeedError::NoBracket { power },
        other => SpeedError::Solver(other),
    })?;

    if solution.is_converged() {
        Ok(solution.x.max(MIN_SPEED))
    } else {
        Err(SpeedError::NotConverged {
            iters: solution.iters,
        })
    }
}

/// Steady speed for `power` under `conditions`, never failing.
///
/// Falls back to [`fallback_speed`] with a warning if the search fails.
#[must_use]
pub fn steady_speed(power: f64, conditions: &Conditions, rider: &RiderParameters) -> f64 {
    match try_steady_speed(power, conditions, rider) {
        Ok(speed) => speed,
        Err(err) => {
            let estimate = fallback_speed(power, conditions, rider);
            log::warn!(
                "speed solve failed at {power:.1} W ({err}); using estimate {estimate:.3} m/s"
            );
            estimate
        }
    }
}

/// Closed-form speed estimate.
///
/// Uphill, takes the smaller of the speed that balances gravity and rolling
/// resistance alone and the speed that balances drag alone. Downhill, where
/// gravity outweighs rolling resistance, drag alone has to absorb both the
/// wheel power and the gravity assist, so the larger of the coasting airspeed
/// and the powered airspeed is used. The result is clamped to
/// `[MIN_SPEED, MAX_SPEED]`.
#[must_use]
pub fn fallback_speed(power: f64, conditions: &Conditions, rider: &RiderParameters) -> f64 {
    let wheel_power = (rider.drivetrain_efficiency() * power).max(0.0);
    let forces = ResistiveForces::at(0.0, conditions, rider);

    let climbing = forces.rolling + forces.gravity;
    let from_weight = if climbing > 0.0 {
        wheel_power / climbing
    } else {
        f64::INFINITY
    };

    let k = 0.5 * conditions.air_density * rider.drag_area();
    let powered = (wheel_power / k).cbrt();
    let coasting = if climbing < 0.0 {
        (-climbing / k).sqrt()
    } else {
        0.0
    };
    let from_drag = powered.max(coasting) + conditions.wind;

    let estimate = from_weight.min(from_drag);
    if estimate.is_nan() {
        MIN_SPEED
    } else {
        estimate.clamp(MIN_SPEED, MAX_SPEED)
    }
}

/// Steady speed for `power` on the given gradient, wind, and altitude.
#[must_use]
pub fn solve_speed(
    power: f64,
    gradient: f64,
    wind: f64,
    altitude: f64,
    rider: &RiderParameters,
) -> f64 {
    steady_speed(power, &Conditions::new(gradient, wind, altitude, rider), rider)
}

/// Like [`solve_speed`] but reports failures instead of estimating.
///
/// # Errors
///
/// See [`try_steady_speed`].
pub fn try_solve_speed(
    power: f64,
    gradient: f64,
    wind: f64,
    altitude: f64,
    rider: &RiderParameters,
) -> Result<f64, SpeedError> {
    try_steady_speed(power, &Conditions::new(gradient, wind, altitude, rider), rider)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn rider() -> RiderParameters {
        RiderParameters::new(250.0, 20_000.0, 75.0).unwrap()
    }

    fn wheel_power(speed: f64, gradient: f64, wind: f64, rider: &RiderParameters) -> f64 {
        let conditions = Conditions::new(gradient, wind, 0.0, rider);
        ResistiveForces::at(speed, &conditions, rider).total() * speed
    }

    #[test]
    fn flat_speed_balances_power() {
        let rider = rider();

        let speed = solve_speed(250.0, 0.0, 0.0, 0.0, &rider);

        assert!(speed > 9.0 && speed < 12.0);
        assert_relative_eq!(wheel_power(speed, 0.0, 0.0, &rider), 250.0, epsilon = 1e-6);
    }

    #[test]
    fn climbing_is_slower_than_flat() {
        let rider = rider();

        let flat = solve_speed(300.0, 0.0, 0.0, 0.0, &rider);
        let climb = solve_speed(300.0, 0.06, 0.0, 0.0, &rider);

        assert!(climb < flat);
        assert_relative_eq!(wheel_power(climb, 0.06, 0.0, &rider), 300.0, epsilon = 1e-6);
    }

    #[test]
    fn headwind_slows_and_tailwind_helps() {
        let rider = rider();

        let still = solve_speed(250.0, 0.0, 0.0, 0.0, &rider);
        let headwind = solve_speed(250.0, 0.0, -4.0, 0.0, &rider);
        let tailwind = solve_speed(250.0, 0.0, 4.0, 0.0, &rider);

        assert!(headwind < still);
        assert!(tailwind > still);
    }

    #[test]
    fn thinner_air_is_faster() {
        let rider = rider();

        let low = solve_speed(250.0, 0.0, 0.0, 0.0, &rider);
        let high = solve_speed(250.0, 0.0, 0.0, 2500.0, &rider);

        assert!(high > low);
    }

    #[test]
    fn efficiency_reduces_speed() {
        let rider = rider();
        let lossy = rider.with_drivetrain_efficiency(0.95).unwrap();

        let ideal = solve_speed(250.0, 0.0, 0.0, 0.0, &rider);
        let real = solve_speed(250.0, 0.0, 0.0, 0.0, &lossy);

        assert!(real < ideal);
        assert_relative_eq!(
            wheel_power(ideal, 0.0, 0.0, &rider) * 0.95,
            wheel_power(real, 0.0, 0.0, &rider),
            epsilon = 1e-6
        );
    }

    #[test]
    fn descent_without_power_coasts() {
        let rider = rider();

        let speed = solve_speed(0.0, -0.08, 0.0, 0.0, &rider);

        assert!(speed > 10.0);
        assert_relative_eq!(wheel_power(speed, -0.08, 0.0, &rider), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn zero_power_on_flat_floors_at_min_speed() {
        let rider = rider();

        assert!(matches!(
            try_solve_speed(0.0, 0.0, 0.0, 0.0, &rider),
            Err(SpeedError::NoBracket { .. })
        ));
        assert_relative_eq!(solve_speed(0.0, 0.0, 0.0, 0.0, &rider), MIN_SPEED);
    }

    #[test]
    fn fallback_bounds_true_speed() {
        let rider = rider();
        let conditions = Conditions::new(0.05, 0.0, 0.0, &rider);

        let exact = steady_speed(300.0, &conditions, &rider);
        let estimate = fallback_speed(300.0, &conditions, &rider);

        assert!(estimate >= exact);
        assert!(estimate < 2.0 * exact);
    }

    #[test]
    fn steep_descent_with_tailwind_exceeds_sixty() {
        let rider = rider();
        let conditions = Conditions::new(-0.5, 20.0, 0.0, &rider);

        let coasting = steady_speed(0.0, &conditions, &rider);
        assert!(coasting > 60.0);
        assert_relative_eq!(
            fallback_speed(0.0, &conditions, &rider),
            coasting,
            max_relative = 1e-9
        );

        let pedalling = steady_speed(300.0, &conditions, &rider);
        let estimate = fallback_speed(300.0, &conditions, &rider);
        assert!(pedalling > coasting);
        assert!(estimate > 60.0 && estimate <= pedalling);
    }

    #[test]
    fn forces_change_sign_with_tailwind_and_descent() {
        let rider = rider();
        let conditions = Conditions::new(-0.05, 10.0, 0.0, &rider);

        let forces = ResistiveForces::at(5.0, &conditions, &rider);

        assert!(forces.drag < 0.0);
        assert!(forces.gravity < 0.0);
        assert!(forces.rolling > 0.0);
    }
}
