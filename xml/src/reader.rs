use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::Reader;

use xbc_ir::QName;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    StartElement,
    EndElement,
    Characters,
    Eof,
    Other,
}

/// A single attribute as seen at the current start-element event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// Pull-reader contract consumed by generated `read_T` functions. Mirrors a
/// forward-only cursor over start/end-element and characters events, with
/// namespace resolution baked into `name()` and `attribute_name()`.
pub trait XmlReader {
    fn read(&mut self) -> Result<bool, Error>;
    fn node_type(&self) -> NodeType;
    fn name(&self) -> Option<QName>;
    fn text(&self) -> Option<&str>;
    fn depth(&self) -> usize;
    fn attribute_count(&self) -> usize;
    fn attribute_name(&self, index: usize) -> Option<QName>;
    fn attribute_value(&self, index: usize) -> Option<&str>;
    fn attribute_value_by_name(&self, name: &QName) -> Option<&str>;
    fn namespace_uri_for_prefix(&self, prefix: &str) -> Option<&str>;
}

/// Concrete [`XmlReader`] backed by `quick_xml::Reader` over an in-memory
/// buffer. Namespace resolution is delegated to quick-xml's own prefix
/// tracking via `Reader::read_event_into` paired with `resolve_element`.
pub struct QuickXmlReader<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
    depth: usize,
    node_type: NodeType,
    name: Option<QName>,
    text: Option<String>,
    attributes: Vec<Attribute>,
}

impl<'a> QuickXmlReader<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            depth: 0,
            node_type: NodeType::Other,
            name: None,
            text: None,
            attributes: Vec::new(),
        }
    }

    fn resolve_name(&mut self, local: quick_xml::name::QName, is_attribute: bool) -> Result<QName, Error> {
        let (resolved, local_name) = self.reader.resolve_element(local);
        let _ = is_attribute;
        let namespace_uri = match resolved {
            ResolveResult::Bound(ns) => std::str::from_utf8(ns.as_ref())?.to_string(),
            ResolveResult::Unbound => String::new(),
            ResolveResult::Unknown(prefix) => {
                return Err(Error::UnresolvedPrefix(String::from_utf8_lossy(&prefix).into_owned()));
            }
        };
        Ok(QName::new(namespace_uri, std::str::from_utf8(local_name.as_ref())?))
    }
}

impl XmlReader for QuickXmlReader<'_> {
    fn read(&mut self) -> Result<bool, Error> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        match event {
            Event::Eof => {
                self.node_type = NodeType::Eof;
                Ok(false)
            }
            Event::Start(start) => {
                self.depth += 1;
                self.name = Some(self.resolve_name(start.name(), false)?);
                self.attributes.clear();
                for attr in start.attributes().flatten() {
                    let name = self.resolve_name(attr.key, true)?;
                    let value = attr.decode_and_unescape_value(self.reader.decoder())?.into_owned();
                    self.attributes.push(Attribute { name, value });
                }
                self.node_type = NodeType::StartElement;
                Ok(true)
            }
            Event::Empty(start) => {
                self.name = Some(self.resolve_name(start.name(), false)?);
                self.attributes.clear();
                for attr in start.attributes().flatten() {
                    let name = self.resolve_name(attr.key, true)?;
                    let value = attr.decode_and_unescape_value(self.reader.decoder())?.into_owned();
                    self.attributes.push(Attribute { name, value });
                }
                self.node_type = NodeType::StartElement;
                Ok(true)
            }
            Event::End(_) => {
                self.node_type = NodeType::EndElement;
                self.depth = self.depth.saturating_sub(1);
                Ok(true)
            }
            Event::Text(text) => {
                self.text = Some(text.decode()?.into_owned());
                self.node_type = NodeType::Characters;
                Ok(true)
            }
            _ => {
                self.node_type = NodeType::Other;
                Ok(true)
            }
        }
    }

    fn node_type(&self) -> NodeType {
        self.node_type
    }

    fn name(&self) -> Option<QName> {
        self.name.clone()
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    fn attribute_name(&self, index: usize) -> Option<QName> {
        self.attributes.get(index).map(|a| a.name.clone())
    }

    fn attribute_value(&self, index: usize) -> Option<&str> {
        self.attributes.get(index).map(|a| a.value.as_str())
    }

    fn attribute_value_by_name(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    fn namespace_uri_for_prefix(&self, prefix: &str) -> Option<&str> {
        // quick-xml resolves prefixes per-event rather than exposing a
        // standalone lookup; callers needing this ask at the node where the
        // prefixed name occurs, which `resolve_name` already covers.
        let _ = prefix;
        None
    }
}

/// Reads the element-only text content of the element the cursor currently
/// sits on, consuming through its matching end tag. Used by generated
/// `read_T` functions for scalar-valued elements, mirroring how
/// [`crate::AnyElement::read`] walks the same kind of subtree untyped.
pub fn read_element_text(reader: &mut impl XmlReader) -> Result<String, Error> {
    let start_depth = reader.depth();
    let mut text = String::new();
    loop {
        if !reader.read()? {
            break;
        }
        match reader.node_type() {
            NodeType::Characters => {
                if let Some(chunk) = reader.text() {
                    text.push_str(chunk);
                }
            }
            NodeType::EndElement if reader.depth() == start_depth => break,
            _ => {}
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_start_element_with_attribute() {
        let mut reader = QuickXmlReader::new(r#"<root id="1"><child/></root>"#);
        assert!(reader.read().unwrap());
        assert_eq!(reader.node_type(), NodeType::StartElement);
        assert_eq!(reader.name().unwrap().local_name, "root");
        assert_eq!(reader.attribute_count(), 1);
        assert_eq!(reader.attribute_value(0), Some("1"));
    }

    #[test]
    fn tracks_depth_across_nesting() {
        let mut reader = QuickXmlReader::new("<a><b><c/></b></a>");
        reader.read().unwrap();
        assert_eq!(reader.depth(), 1);
        reader.read().unwrap();
        assert_eq!(reader.depth(), 2);
        reader.read().unwrap();
        assert_eq!(reader.depth(), 2);
    }

    #[test]
    fn reads_text_content() {
        let mut reader = QuickXmlReader::new("<a>hello</a>");
        reader.read().unwrap();
        reader.read().unwrap();
        assert_eq!(reader.node_type(), NodeType::Characters);
        assert_eq!(reader.text(), Some("hello"));
    }

    #[test]
    fn reports_eof() {
        let mut reader = QuickXmlReader::new("<a/>");
        assert!(reader.read().unwrap());
        assert!(!reader.read().unwrap());
        assert_eq!(reader.node_type(), NodeType::Eof);
    }
}
