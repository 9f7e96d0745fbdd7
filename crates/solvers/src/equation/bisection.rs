//! Bisection root finding on a bracketed interval.
//!
//! The solver evaluates both ends of the bracket, confirms a sign change, and
//! halves the interval until the width or the residual meets the configured
//! tolerances. Convergence is guaranteed for any continuous residual with a
//! sign change, which is why the speed solver uses it: the power balance is
//! continuous and crosses zero exactly once for positive power.

mod bracket;
mod config;
mod error;
mod solution;

pub use bracket::{BracketError, Sign};
pub use config::{Config, ConfigError};
pub use error::Error;
pub use solution::{Solution, Status};

use pacer_core::{EquationProblem, Model, Observer};

use crate::equation::{Evaluation, evaluate};

use bracket::{Bounds, Bracket};

/// Control actions supported by the bisection solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver early and return the best evaluation so far.
    StopEarly,
}

/// Iteration event emitted by the bisection solver.
pub struct Event<'a, I, O> {
    /// Iteration counter (1-based within the bisection loop).
    pub iter: usize,

    /// Bracket before it is shrunk around this evaluation.
    pub bracket: [f64; 2],

    /// Evaluation at the current midpoint.
    pub eval: &'a Evaluation<I, O, 1>,
}

/// Finds a root of the equation using the bisection method.
///
/// # Errors
///
/// Returns an error if the bracket is invalid or does not contain a sign
/// change, a residual is non-finite, or the model or problem fails.
pub fn solve<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
    Obs: for<'a> Observer<Event<'a, M::Input, M::Output>, Action>,
{
    let bounds = Bounds::new(bracket)?;
    let [left, right] = bounds.as_array();

    let left_eval = finite(evaluate(model, problem, [left])?)?;
    if left_eval.residuals[0].abs() <= config.residual_tol() {
        return Ok(Solution::from_eval(left_eval, Status::Converged, 0));
    }

    let right_eval = finite(evaluate(model, problem, [right])?)?;
    if right_eval.residuals[0].abs() <= config.residual_tol() {
        return Ok(Solution::from_eval(right_eval, Status::Converged, 0));
    }

    let mut bracket = Bracket::new(
        bounds,
        Sign::of(left_eval.residuals[0]),
        Sign::of(right_eval.residuals[0]),
    )
    .map_err(|_| Error::NoSignChange {
        left,
        right,
        left_residual: left_eval.residuals[0],
        right_residual: right_eval.residuals[0],
    })?;

    let mut best = if left_eval.residuals[0].abs() <= right_eval.residuals[0].abs() {
        left_eval
    } else {
        right_eval
    };

    for iter in 1..=config.max_iters() {
        let mid = bracket.midpoint();
        let mid_eval = finite(evaluate(model, problem, [mid])?)?;
        let residual = mid_eval.residuals[0];

        let event = Event {
            iter,
            bracket: bracket.as_array(),
            eval: &mid_eval,
        };
        let action = observer.observe(&event);

        let is_better = residual.abs() < best.residuals[0].abs();
        if let Some(Action::StopEarly) = action {
            let best = if is_better { mid_eval } else { best };
            return Ok(Solution::from_eval(best, Status::StoppedByObserver, iter));
        }

        if residual.abs() <= config.residual_tol() || bracket.is_within(config.x_tol()) {
            return Ok(Solution::from_eval(mid_eval, Status::Converged, iter));
        }

        bracket.shrink(mid, Sign::of(residual));
        if is_better {
            best = mid_eval;
        }
    }

    Ok(Solution::from_eval(best, Status::MaxIters, config.max_iters()))
}

/// Runs bisection without observation.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<M, P>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: EquationProblem<1, Input = M::Input, Output = M::Output>,
{
    solve(model, problem, bracket, config, ())
}

fn finite<I, O>(eval: Evaluation<I, O, 1>) -> Result<Evaluation<I, O, 1>, Error> {
    let residual = eval.residuals[0];
    if residual.is_finite() {
        Ok(eval)
    } else {
        Err(Error::NonFiniteResidual {
            x: eval.x[0],
            residual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    use crate::Tolerance;

    /// Power needed to hold speed `v` against a cubic drag law plus a
    /// constant resistive force.
    struct CubicDrag {
        k: f64,
        resist: f64,
    }

    impl Model for CubicDrag {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn call(&self, v: &f64) -> Result<f64, Self::Error> {
            Ok(self.k * v.powi(3) + self.resist * v)
        }
    }

    /// Drives the model output to a target power.
    struct TargetPower(f64);

    impl EquationProblem<1> for TargetPower {
        type Input = f64;
        type Output = f64;
        type Error = Infallible;

        fn input(&self, x: &[f64; 1]) -> Result<f64, Self::Error> {
            Ok(x[0])
        }

        fn residuals(&self, _input: &f64, output: &f64) -> Result<[f64; 1], Self::Error> {
            Ok([output - self.0])
        }
    }

    #[test]
    fn finds_speed_for_target_power() {
        let model = CubicDrag {
            k: 0.2,
            resist: 3.0,
        };
        // 0.2 * 10^3 + 3 * 10 = 230 W
        let solution = solve_unobserved(&model, &TargetPower(230.0), [0.1, 50.0], &Config::default())
            .expect("should solve");

        assert_eq!(solution.status, Status::Converged);
        assert_relative_eq!(solution.x, 10.0, epsilon = 1e-9);
        assert_relative_eq!(solution.snapshot.output, 230.0, epsilon = 1e-6);
    }

    #[test]
    fn normalizes_reversed_bracket() {
        let model = CubicDrag { k: 1.0, resist: 0.0 };

        let solution = solve_unobserved(&model, &TargetPower(27.0), [10.0, 0.0], &Config::default())
            .expect("should solve with reversed bracket");

        assert_relative_eq!(solution.x, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn observer_can_stop_iteration() {
        let model = CubicDrag { k: 1.0, resist: 0.0 };

        let mut calls = 0;
        let observer = |event: &Event<'_, f64, f64>| {
            calls += 1;
            (event.iter >= 3).then_some(Action::StopEarly)
        };

        let solution = solve(&model, &TargetPower(8.0), [0.0, 10.0], &Config::default(), observer)
            .expect("should stop cleanly");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.iters, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn errors_without_sign_change() {
        let model = CubicDrag { k: 1.0, resist: 1.0 };

        // Required power is positive everywhere, so zero target has no root.
        let result = solve_unobserved(&model, &TargetPower(0.0), [0.1, 50.0], &Config::default());

        assert!(matches!(result, Err(Error::NoSignChange { .. })));
    }

    #[test]
    fn errors_on_invalid_bracket() {
        let model = CubicDrag { k: 1.0, resist: 0.0 };
        let problem = TargetPower(1.0);

        let result = solve_unobserved(&model, &problem, [2.0, 2.0], &Config::default());
        assert!(matches!(
            result,
            Err(Error::InvalidBracket(BracketError::ZeroWidth))
        ));

        let result = solve_unobserved(&model, &problem, [f64::NAN, 2.0], &Config::default());
        assert!(matches!(
            result,
            Err(Error::InvalidBracket(BracketError::NonFinite))
        ));
    }

    #[test]
    fn zero_iters_returns_best_endpoint() {
        let model = CubicDrag { k: 1.0, resist: 0.0 };
        let config = Config::new(0, Tolerance::TIGHT, 1e-12).unwrap();

        let solution = solve_unobserved(&model, &TargetPower(9.0), [2.0, 10.0], &config)
            .expect("should return best endpoint");

        assert_eq!(solution.status, Status::MaxIters);
        assert_eq!(solution.iters, 0);
        // |8 - 9| beats |1000 - 9|
        assert_relative_eq!(solution.x, 2.0);
    }
}
