use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("unresolved namespace prefix {prefix:?} on element <{element}>")]
    UnresolvedPrefix { prefix: String, element: String },
    #[error("<{element}> is missing required attribute {attribute:?}")]
    MissingAttribute { element: String, attribute: &'static str },
    #[error("<{element}> attribute {attribute:?} has invalid value {value:?}")]
    InvalidAttributeValue {
        element: String,
        attribute: &'static str,
        value: String,
    },
    #[error("expected <schema> as the document element, found <{0}>")]
    NotASchema(String),
}
