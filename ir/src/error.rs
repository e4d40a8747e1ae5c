use thiserror::Error;

use crate::qname::QName;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unresolved reference to {kind} {name}")]
    UnresolvedReference { kind: &'static str, name: QName },
    #[error("duplicate {kind} declaration for {name}")]
    DuplicateDeclaration { kind: &'static str, name: QName },
}
