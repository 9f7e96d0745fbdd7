use pacer_core::Snapshot;

use crate::equation::Evaluation;

/// How a bisection solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The bracket or the residual met its tolerance.
    Converged,
    MaxIters,
    StoppedByObserver,
}

/// Root estimate with the model call that produced it.
///
/// Unless the solve converged, `x` is the evaluated point with the smallest
/// residual magnitude.
#[derive(Debug, Clone)]
pub struct Solution<I, O> {
    pub status: Status,
    pub x: f64,
    pub residual: f64,
    pub snapshot: Snapshot<I, O>,
    /// Halvings performed.
    pub iters: usize,
}

impl<I, O> Solution<I, O> {
    pub(super) fn from_eval(eval: Evaluation<I, O, 1>, status: Status, iters: usize) -> Self {
        let Evaluation {
            x: [x],
            residuals: [residual],
            snapshot,
        } = eval;
        Self {
            status,
            x,
            residual,
            snapshot,
            iters,
        }
    }

    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }
}
