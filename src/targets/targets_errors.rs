use thiserror::Error;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Invalid target type: {0}")]
    InvalidTargetType(String),

    #[error("Target kind '{0}' is not registered")]
    UnknownKind(String),
}
