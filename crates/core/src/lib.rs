//! Core traits and types shared by the pacer solvers and pacing engine.
//!
//! - [`Model`]: a callable that maps a typed input to a typed output
//! - [`Snapshot`]: a captured input/output pair from a model call
//! - [`Observer`]: receives solver events and optionally returns control actions
//! - [`EquationProblem`], [`MinimizationProblem`]: adapt scalar solver
//!   variables to model inputs and extract residuals or objectives from outputs
//! - [`StepIntegrable`]: state that can be advanced by a derivative and a step

mod model;
mod observer;
mod problems;
mod step;

pub use model::{Model, Snapshot};
pub use observer::Observer;
pub use problems::{EquationProblem, MinimizationProblem};
pub use step::{DerivativeOf, StepIntegrable};
