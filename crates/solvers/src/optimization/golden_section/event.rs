use super::Point;

/// Actions an observer can take during golden section search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop the solver early and return the best solution found so far.
    StopEarly,
}

/// Event emitted after each evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Iteration counter; `0` for the initialization event.
    pub iter: usize,

    /// The point that was just evaluated.
    pub point: Point,

    /// The best point found so far, including `point`.
    pub best: Point,
}
