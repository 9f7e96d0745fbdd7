use std::error::Error as StdError;

use thiserror::Error;

use crate::equation::EvalError;

use super::BracketError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidBracket(#[from] BracketError),

    /// Both ends of the bracket have residuals of the same sign.
    #[error(
        "residual keeps its sign over [{left}, {right}]: {left_residual} and {right_residual}"
    )]
    NoSignChange {
        left: f64,
        right: f64,
        left_residual: f64,
        right_residual: f64,
    },

    #[error("residual at x = {x} is {residual}")]
    NonFiniteResidual { x: f64, residual: f64 },

    #[error("model failed: {0}")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("problem failed: {0}")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: StdError + Send + Sync + 'static,
    PE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<ME, PE>) -> Self {
        match err {
            EvalError::Model(source) => Self::Model(Box::new(source)),
            EvalError::Problem(source) => Self::Problem(Box::new(source)),
        }
    }
}
