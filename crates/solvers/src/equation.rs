//! Solvers for equation problems.
//!
//! An [`EquationProblem`] maps a solver variable to a model input, calls the
//! model, and computes a residual. Solvers in this module drive that residual
//! toward zero.
//!
//! [`EquationProblem`]: pacer_core::EquationProblem

mod evaluate;

pub use evaluate::{EvalError, Evaluation, evaluate};

pub mod bisection;
