//! RELAX NG's own pattern tree, separate from the Schema IR. Rewritten in
//! place by [`crate::simplify`] and reduced to a `xbc_ir::Schema` by
//! [`crate::translate`].

/// A RELAX NG pattern. Owning tree: every recursive field is a `Box`, so
/// the whole thing can be deep-cloned and moved freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Empty,
    Text,
    NotAllowed,
    Ref(String),
    ParentRef(String),
    Element(NameClass, Box<Pattern>),
    Attribute(NameClass, Box<Pattern>),
    Group(Box<Pattern>, Box<Pattern>),
    Interleave(Box<Pattern>, Box<Pattern>),
    Choice(Box<Pattern>, Box<Pattern>),
    OneOrMore(Box<Pattern>),
    ZeroOrMore(Box<Pattern>),
    Optional(Box<Pattern>),
    Mixed(Box<Pattern>),
    List(Box<Pattern>),
    Data {
        library: String,
        datatype: String,
        params: Vec<(String, String)>,
        except: Option<Box<Pattern>>,
    },
    Value {
        library: String,
        datatype: String,
        value: String,
        ns: String,
    },
    ExternalRef {
        href: String,
        ns: String,
    },
    Grammar(Box<GrammarPattern>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameClass {
    Specific { ns: String, local: String },
    AnyName { except: Option<Box<NameClass>> },
    NsName { ns: String, except: Option<Box<NameClass>> },
    Choice(Box<NameClass>, Box<NameClass>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combine {
    None,
    Choice,
    Interleave,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub combine: Combine,
    pub body: Pattern,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeDirective {
    pub href: String,
    pub ns: Option<String>,
    pub overrides: Vec<Define>,
    pub start_override: Option<Pattern>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrammarPattern {
    pub start: Option<Pattern>,
    pub defines: Vec<Define>,
    pub includes: Vec<IncludeDirective>,
}

impl NameClass {
    pub fn specific(ns: impl Into<String>, local: impl Into<String>) -> Self {
        NameClass::Specific {
            ns: ns.into(),
            local: local.into(),
        }
    }
}
