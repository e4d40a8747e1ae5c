use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at line {line}, column {column}: {message}")]
    Syntax { line: usize, column: usize, message: String },
    #[error("unterminated literal starting at line {line}, column {column}")]
    UnterminatedLiteral { line: usize, column: usize },
    #[error("unknown attribute type `{0}`")]
    UnknownAttType(String),
}
