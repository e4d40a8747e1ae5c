use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("{element} has neither a name class nor a name attribute")]
    MissingNameClass { element: String },
    #[error("parse error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unknown keyword escape `\\{0}`")]
    UnknownEscape(String),
    #[error("unterminated string literal")]
    UnterminatedLiteral,
    #[error("operators `,`, `|`, and `&` cannot mix without parentheses")]
    MixedOperators,
    #[error("unresolved parameter entity %{0};")]
    UnresolvedParameter(String),
}
