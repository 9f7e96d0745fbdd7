//! Forward Euler stepping.
//!
//! Advances a state with explicit Euler:
//!
//! ```text
//! state_{n+1} = state_n + derivative(state_n) * delta
//! ```
//!
//! The independent variable is whatever `Delta` the state is integrable
//! along. The fine-grained pacing solver integrates over distance, not time.
//!
//! # Example
//!
//! ```ignore
//! use pacer_solvers::transient::euler;
//!
//! let solution = euler::integrate_unobserved(start, 0.5, 40, |state| Ok(rate(state)))?;
//! println!("final speed: {}", solution.state.speed);
//! ```

mod error;
mod event;
mod solution;

pub use error::Error;
pub use event::{Action, Event};
pub use solution::{Solution, Status};

use std::error::Error as StdError;

use pacer_core::{DerivativeOf, Observer, StepIntegrable};

/// Integrates `steps` forward Euler steps of size `delta` from `initial`.
///
/// # Algorithm
///
/// For each step:
/// - compute the derivative at the current state,
/// - step the state forward by `delta`,
/// - emit an [`Event`]; [`Action::StopEarly`] ends the integration.
///
/// Step 0 is emitted for the initial state before any stepping.
///
/// # Errors
///
/// Returns [`Error::Derivative`] if the derivative cannot be computed.
pub fn integrate<S, D, F, E, Obs>(
    initial: S,
    delta: D,
    steps: usize,
    mut derivative: F,
    mut observer: Obs,
) -> Result<Solution<S>, Error>
where
    S: StepIntegrable<D> + Clone,
    D: Clone,
    F: FnMut(&S) -> Result<DerivativeOf<S, D>, E>,
    E: StdError + Send + Sync + 'static,
    Obs: Observer<Event<S>, Action>,
{
    let event = Event {
        step: 0,
        state: initial.clone(),
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return Ok(Solution {
            status: Status::StoppedByObserver,
            state: initial,
            steps: 0,
        });
    }

    let mut state = initial;
    for step in 1..=steps {
        let rate = derivative(&state).map_err(Error::derivative)?;
        state = state.step(rate, delta.clone());

        let event = Event {
            step,
            state: state.clone(),
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                state,
                steps: step,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        state,
        steps,
    })
}

/// Integrates without observation.
///
/// # Errors
///
/// See [`integrate`].
pub fn integrate_unobserved<S, D, F, E>(
    initial: S,
    delta: D,
    steps: usize,
    derivative: F,
) -> Result<Solution<S>, Error>
where
    S: StepIntegrable<D> + Clone,
    D: Clone,
    F: FnMut(&S) -> Result<DerivativeOf<S, D>, E>,
    E: StdError + Send + Sync + 'static,
{
    integrate(initial, delta, steps, derivative, ())
}
