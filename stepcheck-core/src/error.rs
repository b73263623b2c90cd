// Error Types
// Crate-level error aggregating every interpreter's failures

use crate::config::ConfigError;
use crate::context::UnknownVariableError;
use crate::correlation::CorrelationError;
use crate::matcher::ParseError;
use crate::path::PathError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepcheckError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    UnknownVariable(#[from] UnknownVariableError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type StepcheckResult<T> = Result<T, StepcheckError>;
