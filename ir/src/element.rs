use crate::qname::QName;

/// XSD 1.1 conditional type assignment: an ordered list of `(test, type)`
/// pairs on an element declaration, with an absent test meaning "default".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeAlternative {
    pub test: Option<String>,
    pub type_name: QName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: QName,
    pub type_name: QName,
    pub nillable: bool,
    pub is_abstract: bool,
    pub default: Option<String>,
    pub fixed: Option<String>,
    pub substitution_group: Option<QName>,
    pub type_alternatives: Vec<TypeAlternative>,
}

impl ElementDecl {
    pub fn new(name: QName, type_name: QName) -> Self {
        Self {
            name,
            type_name,
            nillable: false,
            is_abstract: false,
            default: None,
            fixed: None,
            substitution_group: None,
            type_alternatives: Vec::new(),
        }
    }
}
