use crate::optimization::Evaluation;

use super::bracket::GoldenBracket;
use super::{Config, Point, Solution, Status};

/// Direction to shrink the bracket and where to evaluate next.
#[derive(Debug, Clone, Copy)]
pub(super) enum ShrinkDirection {
    /// Shrink left bound; payload is x for new `inner_right`.
    ShrinkLeft(f64),

    /// Shrink right bound; payload is x for new `inner_left`.
    ShrinkRight(f64),
}

pub(super) struct State<I, O> {
    bracket: GoldenBracket,
    left: Point,
    right: Point,
    best: Evaluation<I, O, 1>,
    evaluations: usize,
}

impl<I, O> State<I, O> {
    pub(super) fn new(
        bracket: GoldenBracket,
        left: Evaluation<I, O, 1>,
        right: Evaluation<I, O, 1>,
    ) -> Self {
        let left_pt = Point::from(&left);
        let right_pt = Point::from(&right);
        let best = if left.objective <= right.objective {
            left
        } else {
            right
        };

        Self {
            bracket,
            left: left_pt,
            right: right_pt,
            best,
            evaluations: 2,
        }
    }

    pub(super) fn right(&self) -> Point {
        self.right
    }

    pub(super) fn best(&self) -> Point {
        Point::from(&self.best)
    }

    /// Which direction to shrink and where to evaluate next.
    pub(super) fn next_direction(&self) -> ShrinkDirection {
        if self.left.objective <= self.right.objective {
            ShrinkDirection::ShrinkRight(self.bracket.next_inner_left())
        } else {
            ShrinkDirection::ShrinkLeft(self.bracket.next_inner_right())
        }
    }

    /// Shrinks the bracket and records the new interior evaluation.
    pub(super) fn apply(&mut self, direction: ShrinkDirection, eval: Evaluation<I, O, 1>) {
        let point = Point::from(&eval);
        match direction {
            ShrinkDirection::ShrinkRight(_) => {
                self.bracket.shrink_right();
                self.right = self.left;
                self.left = point;
            }
            ShrinkDirection::ShrinkLeft(_) => {
                self.bracket.shrink_left();
                self.left = self.right;
                self.right = point;
            }
        }

        self.evaluations += 1;
        if eval.objective < self.best.objective {
            self.best = eval;
        }
    }

    pub(super) fn is_converged(&self, config: &Config) -> bool {
        config
            .x_tol()
            .is_met(self.bracket.inner_left, self.bracket.inner_right)
    }

    pub(super) fn into_solution(self, status: Status, iters: usize) -> Solution<I, O> {
        Solution {
            status,
            x: self.best.x[0],
            objective: self.best.objective,
            snapshot: self.best.snapshot,
            iters,
            evaluations: self.evaluations,
        }
    }
}
