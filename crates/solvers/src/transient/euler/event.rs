/// Control actions supported by the Euler integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop integrating and return the current state.
    StopEarly,
}

/// Event emitted for each state.
///
/// Step 0 is the initial state; steps `1..=N` follow each Euler step.
#[derive(Debug, Clone)]
pub struct Event<S> {
    pub step: usize,
    pub state: S,
}
