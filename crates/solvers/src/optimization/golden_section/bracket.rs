use super::Error;

/// The inverse golden ratio: 1/φ = φ - 1.
const INV_PHI: f64 = 0.618_033_988_749_895;

/// Golden section search bracket.
///
/// Maintains the outer interval [left, right] and two interior points
/// positioned according to the golden ratio.
#[derive(Debug, Clone, Copy)]
pub(super) struct GoldenBracket {
    pub(super) left: f64,
    pub(super) right: f64,
    pub(super) inner_left: f64,
    pub(super) inner_right: f64,
}

impl GoldenBracket {
    /// Creates a bracket with interior points positioned by the golden ratio.
    ///
    /// Reversed bounds are swapped.
    pub(super) fn new(bracket: [f64; 2]) -> Result<Self, Error> {
        let [a, b] = bracket;
        if !a.is_finite() || !b.is_finite() {
            return Err(Error::NonFiniteBracket { left: a, right: b });
        }

        let (left, right) = if a <= b { (a, b) } else { (b, a) };
        let width = right - left;
        Ok(Self {
            left,
            right,
            inner_left: left + (1.0 - INV_PHI) * width,
            inner_right: left + INV_PHI * width,
        })
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Shrinks to `[left, inner_right]`; the old `inner_left` becomes `inner_right`.
    pub(super) fn shrink_right(&mut self) {
        self.right = self.inner_right;
        self.inner_right = self.inner_left;
        self.inner_left = self.left + (1.0 - INV_PHI) * self.width();
    }

    /// Shrinks to `[inner_left, right]`; the old `inner_right` becomes `inner_left`.
    pub(super) fn shrink_left(&mut self) {
        self.left = self.inner_left;
        self.inner_left = self.inner_right;
        self.inner_right = self.left + INV_PHI * self.width();
    }

    /// Returns x for the new `inner_left` after shrinking right (without mutating).
    pub(super) fn next_inner_left(&self) -> f64 {
        self.left + (1.0 - INV_PHI) * (self.inner_right - self.left)
    }

    /// Returns x for the new `inner_right` after shrinking left (without mutating).
    pub(super) fn next_inner_right(&self) -> f64 {
        self.inner_left + INV_PHI * (self.right - self.inner_left)
    }
}
