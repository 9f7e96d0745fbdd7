mod equation;
mod optimization;

pub use equation::EquationProblem;
pub use optimization::MinimizationProblem;
