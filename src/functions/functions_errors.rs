use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("Function '{0}' is already registered")]
    DuplicateFunction(String),

    #[error("Function '{function}' does not support target '{target}'")]
    UnsupportedTarget { function: String, target: String },

    #[error("Invalid parameters for function '{function}': {reason}")]
    InvalidParameters { function: String, reason: String },
}
