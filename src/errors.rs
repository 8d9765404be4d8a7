use thiserror::Error;

use crate::functions::functions_errors::FunctionError;
use crate::targets::targets_errors::TargetError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the resolution engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    #[error("Function error: {0}")]
    Function(#[from] FunctionError),
}
