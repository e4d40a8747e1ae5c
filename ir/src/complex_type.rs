use crate::attribute::AttributeUse;
use crate::group::{ModelGroup, OpenContent, Wildcard};
use crate::qname::QName;
use crate::simple_type::{Assertion, FacetSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivation {
    Extension,
    Restriction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleContent {
    pub base_type: QName,
    pub derivation: Derivation,
    pub facet_set: FacetSet,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexContent {
    pub base_type: QName,
    pub derivation: Derivation,
    pub model_group: Option<ModelGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentType {
    Empty,
    Simple(SimpleContent),
    ElementOnly(ComplexContent),
    Mixed(ComplexContent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplexType {
    pub name: QName,
    pub is_abstract: bool,
    pub mixed: bool,
    pub content_type: ContentType,
    pub attribute_uses: Vec<AttributeUse>,
    pub attribute_group_refs: Vec<QName>,
    pub attribute_wildcard: Option<Wildcard>,
    pub open_content: Option<OpenContent>,
    pub assertions: Vec<Assertion>,
}

impl ComplexType {
    pub fn new(name: QName, content_type: ContentType) -> Self {
        Self {
            name,
            is_abstract: false,
            mixed: false,
            content_type,
            attribute_uses: Vec::new(),
            attribute_group_refs: Vec::new(),
            attribute_wildcard: None,
            open_content: None,
            assertions: Vec::new(),
        }
    }
}
