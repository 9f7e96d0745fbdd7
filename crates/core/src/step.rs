/// A trait for types that can be stepped using their derivative.
///
/// Implementing this trait lets the forward Euler integrator advance the type
/// via `derivative * delta`, where the derivative is with respect to `Delta`.
/// The fine-grained pacing solver steps over distance rather than time, so
/// `Delta` is whatever independent variable the state is integrated along.
pub trait StepIntegrable<Delta> {
    /// The derivative of the type with respect to `Delta`.
    type Derivative;

    /// Returns the value after stepping with a derivative and step size.
    #[must_use]
    fn step(&self, derivative: Self::Derivative, delta: Delta) -> Self;
}

/// Type alias for the derivative of a `StepIntegrable` type.
pub type DerivativeOf<T, Delta> = <T as StepIntegrable<Delta>>::Derivative;
