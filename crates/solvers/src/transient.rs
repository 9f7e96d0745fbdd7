//! Fixed-step integration of [`StepIntegrable`] states.
//!
//! [`StepIntegrable`]: pacer_core::StepIntegrable

pub mod euler;
