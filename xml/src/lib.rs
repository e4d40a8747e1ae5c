//! XML pull-reader and event-writer traits consumed by generated binding
//! code, plus one concrete `quick-xml`-backed implementation of each.

mod any_element;
mod error;
mod reader;
mod writer;

pub use any_element::AnyElement;
pub use error::Error;
pub use reader::{read_element_text, Attribute, NodeType, QuickXmlReader, XmlReader};
pub use writer::{QuickXmlWriter, XmlWriter};
