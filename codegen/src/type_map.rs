//! Loads the type-map file (spec §6.5): an XML document mapping XSD
//! built-in local names onto target-language type expressions.

use std::collections::HashMap;

use crate::error::Error;

pub const TYPEMAP_NAMESPACE: &str = "http://xb.dev/typemap";

#[derive(Clone, Debug)]
pub struct TypeMapping {
    pub target_type: String,
    /// A `use` path to bring the target type into scope; empty when the
    /// type needs no import (e.g. it is a primitive).
    pub target_use: String,
}

#[derive(Clone, Debug, Default)]
pub struct TypeMap {
    entries: HashMap<String, TypeMapping>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, xsd_local_name: impl Into<String>, mapping: TypeMapping) {
        self.entries.insert(xsd_local_name.into(), mapping);
    }

    pub fn get(&self, xsd_local_name: &str) -> Option<&TypeMapping> {
        self.entries.get(xsd_local_name)
    }

    pub fn parse(source: &str) -> Result<Self, Error> {
        let document = roxmltree::Document::parse(source)?;
        let root = document.root_element();
        if root.tag_name().name() != "typemap" || root.tag_name().namespace() != Some(TYPEMAP_NAMESPACE) {
            return Err(Error::NotATypeMap(root.tag_name().name().to_string()));
        }

        let mut map = Self::new();
        for mapping in root
            .children()
            .filter(|c| c.is_element() && c.tag_name().name() == "mapping")
        {
            let xsd_type = mapping
                .attribute("xsd-type")
                .ok_or_else(|| Error::MissingAttribute {
                    element: "mapping".to_string(),
                    attribute: "xsd-type",
                })?;
            let cpp_type = mapping
                .attribute("cpp-type")
                .ok_or_else(|| Error::MissingAttribute {
                    element: "mapping".to_string(),
                    attribute: "cpp-type",
                })?;
            let cpp_header = mapping.attribute("cpp-header").unwrap_or("");
            map.insert(
                xsd_type,
                TypeMapping {
                    target_type: cpp_type.to_string(),
                    target_use: cpp_header.to_string(),
                },
            );
        }
        Ok(map)
    }

    /// The built-in map for the XSD datatypes this implementation's runtime
    /// crate natively represents, matching spec §4.1's runtime primitives
    /// plus the scalars the host language already provides.
    pub fn defaults() -> Self {
        let mut map = Self::new();
        let primitive = |t: &str| TypeMapping {
            target_type: t.to_string(),
            target_use: String::new(),
        };
        let runtime = |t: &str| TypeMapping {
            target_type: format!("xbc_runtime::{t}"),
            target_use: format!("xbc_runtime::{t}"),
        };
        map.insert("string", primitive("String"));
        map.insert("boolean", primitive("bool"));
        map.insert("float", primitive("f32"));
        map.insert("double", primitive("f64"));
        map.insert("byte", primitive("i8"));
        map.insert("unsignedByte", primitive("u8"));
        map.insert("short", primitive("i16"));
        map.insert("unsignedShort", primitive("u16"));
        map.insert("int", primitive("i32"));
        map.insert("unsignedInt", primitive("u32"));
        map.insert("long", primitive("i64"));
        map.insert("unsignedLong", primitive("u64"));
        map.insert("integer", runtime("Integer"));
        map.insert("nonNegativeInteger", runtime("Integer"));
        map.insert("positiveInteger", runtime("Integer"));
        map.insert("negativeInteger", runtime("Integer"));
        map.insert("nonPositiveInteger", runtime("Integer"));
        map.insert("decimal", runtime("Decimal"));
        map.insert("date", runtime("Date"));
        map.insert("time", runtime("Time"));
        map.insert("dateTime", runtime("DateTime"));
        map.insert("duration", runtime("Duration"));
        map.insert("yearMonthDuration", runtime("YearMonthDuration"));
        map.insert("dayTimeDuration", runtime("DayTimeDuration"));
        map.insert("ID", primitive("String"));
        map.insert("IDREF", primitive("String"));
        map.insert("IDREFS", primitive("Vec<String>"));
        map.insert("NMTOKEN", primitive("String"));
        map.insert("NMTOKENS", primitive("Vec<String>"));
        map.insert("ENTITY", primitive("String"));
        map.insert("ENTITIES", primitive("Vec<String>"));
        map.insert("NOTATION", primitive("String"));
        map.insert("anyURI", primitive("String"));
        map.insert(
            "QName",
            TypeMapping {
                target_type: "xbc_ir::QName".to_string(),
                target_use: "xbc_ir::QName".to_string(),
            },
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_string_and_int() {
        let map = TypeMap::defaults();
        assert_eq!(map.get("string").unwrap().target_type, "String");
        assert_eq!(map.get("int").unwrap().target_type, "i32");
    }

    #[test]
    fn parses_typemap_document() {
        let xml = r#"<typemap xmlns="http://xb.dev/typemap">
            <mapping xsd-type="string" cpp-type="String" cpp-header=""/>
            <mapping xsd-type="int" cpp-type="i32" cpp-header=""/>
        </typemap>"#;
        let map = TypeMap::parse(xml).unwrap();
        assert_eq!(map.get("string").unwrap().target_type, "String");
        assert_eq!(map.get("int").unwrap().target_type, "i32");
        assert!(map.get("double").is_none());
    }

    #[test]
    fn rejects_non_typemap_root() {
        let xml = r#"<notAMap xmlns="http://xb.dev/typemap"/>"#;
        assert!(TypeMap::parse(xml).is_err());
    }
}
