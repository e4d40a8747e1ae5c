use thiserror::Error;
use xbc_ir::QName;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unresolved reference to {name}")]
    UnresolvedReference { name: QName },

    #[error("unknown xsd-type {0:?} in type map")]
    UnknownTypeMapEntry(String),

    #[error("{0}")]
    Xml(#[from] roxmltree::Error),

    #[error("missing attribute {attribute:?} on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("root element is not a typemap document (found <{0}>)")]
    NotATypeMap(String),

    #[error("no record field could be derived for a model group with an empty particle list")]
    EmptyModelGroup,

    #[error("generated source failed to parse: {0}")]
    Syn(#[from] syn::Error),
}
