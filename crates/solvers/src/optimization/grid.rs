//! Exhaustive scan over evenly spaced points.
//!
//! The scan makes no assumption about the shape of the objective, so it is
//! the fallback when a bracketing search cannot be trusted. Its resolution is
//! `(right - left) / (points - 1)`.

use std::error::Error as StdError;

use pacer_core::{MinimizationProblem, Model, Snapshot};

use crate::optimization::{EvalError, evaluate};

/// Errors that can occur during a grid scan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("range must be finite with left < right, got [{left}, {right}]")]
    InvalidRange { left: f64, right: f64 },

    #[error("a grid scan needs at least two points, got {0}")]
    TooFewPoints(usize),

    #[error("non-finite objective {objective} at x = {x}")]
    NonFiniteObjective { x: f64, objective: f64 },

    #[error("model error: {0}")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("problem error: {0}")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: StdError + Send + Sync + 'static,
    PE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<ME, PE>) -> Self {
        match err {
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Problem(e) => Self::Problem(Box::new(e)),
        }
    }
}

/// The best grid point found by a scan.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub x: f64,
    pub objective: f64,
    pub snapshot: Snapshot<I, O>,

    /// Number of objective evaluations.
    pub evaluations: usize,
}

/// Evaluates the objective at `points` evenly spaced values spanning `range`
/// (both ends included) and returns the lowest.
///
/// Ties keep the smaller `x`.
///
/// # Errors
///
/// Returns an error if the range is invalid, fewer than two points are
/// requested, an objective is non-finite, or the model or problem fails.
pub fn scan<M, P>(
    model: &M,
    problem: &P,
    range: [f64; 2],
    points: usize,
) -> Result<Solution<M::Input, M::Output>, Error>
where
    M: Model,
    P: MinimizationProblem<1, Input = M::Input, Output = M::Output>,
{
    let [left, right] = range;
    if !left.is_finite() || !right.is_finite() || left >= right {
        return Err(Error::InvalidRange { left, right });
    }
    if points < 2 {
        return Err(Error::TooFewPoints(points));
    }

    #[allow(clippy::cast_precision_loss)]
    let spacing = (right - left) / (points - 1) as f64;

    let mut best: Option<Solution<M::Input, M::Output>> = None;
    for i in 0..points {
        #[allow(clippy::cast_precision_loss)]
        let x = if i == points - 1 {
            right
        } else {
            left + spacing * i as f64
        };

        let eval = evaluate(model, problem, [x])?;
        if !eval.objective.is_finite() {
            return Err(Error::NonFiniteObjective {
                x,
                objective: eval.objective,
            });
        }

        if best
            .as_ref()
            .is_none_or(|best| eval.objective < best.objective)
        {
            best = Some(Solution {
                x,
                objective: eval.objective,
                snapshot: eval.snapshot,
                evaluations: 0,
            });
        }
    }

    let mut best = best.ok_or(Error::TooFewPoints(points))?;
    best.evaluations = points;
    Ok(best)
}
