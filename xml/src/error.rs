use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("xml I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("unresolved namespace prefix: {0}")]
    UnresolvedPrefix(String),
    #[error("invalid utf-8 in xml text: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("unexpected end of document")]
    UnexpectedEof,
}
