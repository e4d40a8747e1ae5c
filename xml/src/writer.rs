use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer as QuickWriter;

use xbc_ir::QName;

use crate::error::Error;

/// Event-writer contract consumed by generated `write_T` functions.
pub trait XmlWriter {
    fn start_element(&mut self, name: &QName) -> Result<(), Error>;
    fn end_element(&mut self) -> Result<(), Error>;
    fn attribute(&mut self, name: &QName, value: &str) -> Result<(), Error>;
    fn namespace_declaration(&mut self, prefix: &str, uri: &str) -> Result<(), Error>;
    fn characters(&mut self, text: &str) -> Result<(), Error>;
}

/// Concrete [`XmlWriter`] backed by `quick_xml::Writer`, buffering pending
/// attributes/namespace declarations until the element tag is flushed by
/// the next `start_element`/`end_element` call or an explicit `finish()`.
pub struct QuickXmlWriter<W: std::io::Write> {
    writer: QuickWriter<W>,
    open_names: Vec<String>,
    pending_name: Option<String>,
    pending_attrs: Vec<(String, String)>,
}

impl<W: std::io::Write> QuickXmlWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: QuickWriter::new(sink),
            open_names: Vec::new(),
            pending_name: None,
            pending_attrs: Vec::new(),
        }
    }

    fn qualified(name: &QName) -> String {
        if name.namespace_uri.is_empty() {
            name.local_name.clone()
        } else {
            name.local_name.clone()
        }
    }

    fn flush_pending_start(&mut self) -> Result<(), Error> {
        if let Some(name) = self.pending_name.take() {
            let mut start = BytesStart::new(name.clone());
            for (key, value) in self.pending_attrs.drain(..) {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            self.writer.write_event(Event::Start(start))?;
            self.open_names.push(name);
        }
        Ok(())
    }

    pub fn into_inner(mut self) -> Result<W, Error> {
        self.flush_pending_start()?;
        Ok(self.writer.into_inner())
    }
}

impl<W: std::io::Write> XmlWriter for QuickXmlWriter<W> {
    fn start_element(&mut self, name: &QName) -> Result<(), Error> {
        self.flush_pending_start()?;
        self.pending_name = Some(Self::qualified(name));
        Ok(())
    }

    fn end_element(&mut self) -> Result<(), Error> {
        if self.pending_name.is_some() {
            // Element had no children and no text: emit as self-closing.
            let name = self.pending_name.take().unwrap();
            let mut start = BytesStart::new(name.as_str());
            for (key, value) in self.pending_attrs.drain(..) {
                start.push_attribute((key.as_str(), value.as_str()));
            }
            self.writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        self.flush_pending_start()?;
        let name = self
            .open_names
            .pop()
            .expect("end_element called with no matching start_element");
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn attribute(&mut self, name: &QName, value: &str) -> Result<(), Error> {
        self.pending_attrs.push((Self::qualified(name), value.to_string()));
        Ok(())
    }

    fn namespace_declaration(&mut self, prefix: &str, uri: &str) -> Result<(), Error> {
        let key = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{prefix}")
        };
        self.pending_attrs.push((key, uri.to_string()));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Error> {
        self.flush_pending_start()?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_self_closing_element_with_attribute() {
        let mut writer = QuickXmlWriter::new(Vec::new());
        writer.start_element(&QName::unqualified("root")).unwrap();
        writer.attribute(&QName::unqualified("id"), "1").unwrap();
        writer.end_element().unwrap();
        let out = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), r#"<root id="1"/>"#);
    }

    #[test]
    fn writes_nested_elements_with_text() {
        let mut writer = QuickXmlWriter::new(Vec::new());
        writer.start_element(&QName::unqualified("a")).unwrap();
        writer.start_element(&QName::unqualified("b")).unwrap();
        writer.characters("hello").unwrap();
        writer.end_element().unwrap();
        writer.end_element().unwrap();
        let out = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<a><b>hello</b></a>");
    }
}
