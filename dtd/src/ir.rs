//! DTD's own declaration tree, separate from the Schema IR. Reduced to a
//! `xbc_ir::Schema` by [`crate::translate`].

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantifier {
    One,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    Sequence,
    Choice,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentParticle {
    Name(String, Quantifier),
    Group {
        kind: GroupKind,
        items: Vec<ContentParticle>,
        quantifier: Quantifier,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSpec {
    Empty,
    Any,
    /// `(#PCDATA)` with no listed names.
    PcdataOnly,
    /// `(#PCDATA | a | b)*`
    Mixed(Vec<String>),
    Children(ContentParticle),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: String,
    pub content_spec: ContentSpec,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttType {
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    Nmtoken,
    Nmtokens,
    Notation(Vec<String>),
    Enumeration(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefaultDecl {
    Required,
    Implied,
    Fixed(String),
    Value(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttDef {
    pub name: String,
    pub att_type: AttType,
    pub default: DefaultDecl,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttlistDecl {
    pub element_name: String,
    pub attributes: Vec<AttDef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityDecl {
    pub name: String,
    pub value: String,
    pub is_parameter: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doctype {
    pub elements: Vec<ElementDecl>,
    pub attlists: Vec<AttlistDecl>,
    pub entities: Vec<EntityDecl>,
}
