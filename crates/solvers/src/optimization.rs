//! Solvers for scalar minimization problems.
//!
//! A [`MinimizationProblem`] maps a solver variable to a model input, calls
//! the model, and extracts a scalar objective. The solvers here are
//! deliberately small building blocks; search policies such as multi-start
//! seeding or fallback scans are composed by the caller.
//!
//! - [`golden_section`]: derivative-free search over a bracket for unimodal
//!   objectives
//! - [`grid`]: evaluates the objective at evenly spaced points over a range
//!
//! [`MinimizationProblem`]: pacer_core::MinimizationProblem

mod evaluate;

pub use evaluate::{EvalError, Evaluation, evaluate};

pub mod golden_section;
pub mod grid;
