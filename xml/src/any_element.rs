//! An owned, untyped capture of one XML element subtree, used for wildcard
//! (`xs:any`) content that generated bindings have no static type for.

use xbc_ir::QName;

use crate::error::Error;
use crate::reader::{Attribute, NodeType, XmlReader};
use crate::writer::XmlWriter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnyElement {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<AnyElement>,
}

impl AnyElement {
    /// Reads the element the cursor currently sits on, consuming through its
    /// matching end tag.
    pub fn read(reader: &mut impl XmlReader) -> Result<Self, Error> {
        let name = reader.name().ok_or(Error::UnexpectedEof)?;
        let mut attributes = Vec::with_capacity(reader.attribute_count());
        for index in 0..reader.attribute_count() {
            if let (Some(name), Some(value)) =
                (reader.attribute_name(index), reader.attribute_value(index))
            {
                attributes.push(Attribute {
                    name,
                    value: value.to_string(),
                });
            }
        }
        let start_depth = reader.depth();
        let mut text = None;
        let mut children = Vec::new();
        loop {
            if !reader.read()? {
                break;
            }
            match reader.node_type() {
                NodeType::StartElement => children.push(AnyElement::read(reader)?),
                NodeType::Characters => {
                    text = reader.text().map(str::to_string);
                }
                NodeType::EndElement if reader.depth() == start_depth => break,
                _ => {}
            }
        }
        Ok(Self {
            name,
            attributes,
            text,
            children,
        })
    }

    pub fn write(&self, writer: &mut impl XmlWriter) -> Result<(), Error> {
        writer.start_element(&self.name)?;
        for attribute in &self.attributes {
            writer.attribute(&attribute.name, &attribute.value)?;
        }
        if let Some(text) = &self.text {
            writer.characters(text)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.end_element()?;
        Ok(())
    }
}
