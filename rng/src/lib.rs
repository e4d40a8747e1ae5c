//! Parses RELAX NG schemas (XML and compact syntax), simplifies them to
//! the canonical pattern set, and translates the result into the shared
//! Schema IR ([`xbc_ir::Schema`]).

pub mod compact;
pub mod ir;
pub mod simplify;
pub mod translate;
pub mod xml_parser;

mod error;

pub use error::Error;
pub use simplify::{simplify, simplify_grammar, ExternalResolver};
pub use translate::translate;
pub use xml_parser::parse_grammar as parse_xml;
