//! Numerical solvers for the pacer engine.
//!
//! - [`equation::bisection`]: bracketed scalar root finding
//! - [`optimization::golden_section`]: bracketed scalar minimization
//! - [`optimization::grid`]: exhaustive scan over a bounded interval
//! - [`transient::euler`]: forward Euler stepping of [`StepIntegrable`] state
//!
//! Bracketing solvers share a [`Tolerance`] on the interval width.
//!
//! Every solver works through the traits in [`pacer_core`], so callers plug in
//! their own [`Model`] and problem definitions.
//!
//! [`StepIntegrable`]: pacer_core::StepIntegrable
//! [`Model`]: pacer_core::Model

pub mod equation;
pub mod optimization;
pub mod transient;

mod tolerance;

pub use tolerance::{Tolerance, ToleranceError};
