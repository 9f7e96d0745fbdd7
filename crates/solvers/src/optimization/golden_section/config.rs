use crate::Tolerance;

/// Stopping rules for a golden section search.
///
/// The search stops once the two interior points are within `x_tol` of each
/// other, or after `max_iters` shrink steps. Each step costs one evaluation
/// on top of the two spent placing the initial interior points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_iters: usize,
    x_tol: Tolerance,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            x_tol: Tolerance::TIGHT,
        }
    }
}

impl Config {
    #[must_use]
    pub fn new(max_iters: usize, x_tol: Tolerance) -> Self {
        Self { max_iters, x_tol }
    }

    #[must_use]
    pub fn max_iters(&self) -> usize {
        self.max_iters
    }

    #[must_use]
    pub fn x_tol(&self) -> Tolerance {
        self.x_tol
    }
}
