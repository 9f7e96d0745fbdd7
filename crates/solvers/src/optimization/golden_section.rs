//! Golden section search for single-variable minimization.
//!
//! # Algorithm
//!
//! Golden section search finds the minimum of a unimodal function on a
//! bounded interval. It maintains two interior points positioned by the
//! golden ratio, compares their objectives, and shrinks the bracket toward
//! the better point. Each iteration reuses one interior point, so every
//! iteration costs exactly one evaluation.
//!
//! # Limitations
//!
//! - **Single variable only**: works with [`MinimizationProblem<1>`]
//! - **Unimodal assumption**: may settle in a local minimum if the objective
//!   has several; run it over several sub-brackets to guard against that
//! - **Finite objectives**: a non-finite objective is reported as an error
//!
//! # Observer Events
//!
//! The solver emits one [`Event`] after initialization (for the second
//! interior point) and one per iteration afterwards. Observers can return
//! [`Action::StopEarly`] to halt and keep the best point found so far, which
//! is how callers impose evaluation budgets.

mod bracket;
mod config;
mod error;
mod event;
mod point;
mod solution;
mod state;


pub use config::Config;
pub use error::Error;
pub use event::{Action, Event};
pub use point::Point;
pub use solution::{Solution, Status};

use pacer_core::{MinimizationProblem, Model, Observer};

use crate::optimization::evaluate::{Evaluation, evaluate};

use bracket::GoldenBracket;
use state::{ShrinkDirection, State};

/// Finds the minimum of the objective using golden section search.
///
/// # Errors
///
/// Returns an error if the bracket is not finite, the model or problem fails,
/// or an objective is non-finite.
pub fn minimize<M, P, Obs>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<1, Input = M::Input, Output = M::Output>,
    Obs: Observer<Event, Action>,
{
    let bracket = GoldenBracket::new(bracket)?;

    let left = eval_finite(model, problem, bracket.inner_left)?;
    let right = eval_finite(model, problem, bracket.inner_right)?;
    let mut state = State::new(bracket, left, right);

    let event = Event {
        iter: 0,
        point: state.right(),
        best: state.best(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(state.into_solution(Status::StoppedByObserver, 0));
    }

    for iter in 1..=config.max_iters() {
        if state.is_converged(config) {
            return Ok(state.into_solution(Status::Converged, iter - 1));
        }

        let direction = state.next_direction();
        let x = match direction {
            ShrinkDirection::ShrinkLeft(x) | ShrinkDirection::ShrinkRight(x) => x,
        };

        let eval = eval_finite(model, problem, x)?;
        let point = Point::from(&eval);
        state.apply(direction, eval);

        let event = Event {
            iter,
            point,
            best: state.best(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(state.into_solution(Status::StoppedByObserver, iter));
        }
    }

    Ok(state.into_solution(Status::MaxIters, config.max_iters()))
}

/// Finds the minimum of the objective without observer support.
///
/// # Errors
///
/// See [`minimize`].
pub fn minimize_unobserved<M, P>(
    model: &M,
    problem: &P,
    bracket: [f64; 2],
    config: &Config,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<1, Input = M::Input, Output = M::Output>,
{
    minimize(model, problem, bracket, config, ())
}

fn eval_finite<M, P>(
    model: &M,
    problem: &P,
    x: f64,
) -> Result<Evaluation<M::Input, M::Output, 1>, Error>
where
    M: Model,
    P: MinimizationProblem<1, Input = M::Input, Output = M::Output>,
{
    let eval = evaluate(model, problem, [x])?;
    if eval.objective.is_finite() {
        Ok(eval)
    } else {
        Err(Error::NonFiniteObjective {
            x,
            objective: eval.objective,
        })
    }
}
