use thiserror::Error;

/// Errors raised by the runtime value primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivideByZero,
}
