use crate::qname::QName;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variety {
    Atomic,
    List,
    Union,
}

/// Constraining facets. Bound facets keep the raw lexical string (rather
/// than a parsed number) so codegen can emit them verbatim into
/// documentation and the type-map defaulting logic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetSet {
    pub enumeration: Vec<String>,
    pub pattern: Option<String>,
    pub min_inclusive: Option<String>,
    pub min_exclusive: Option<String>,
    pub max_inclusive: Option<String>,
    pub max_exclusive: Option<String>,
    pub length: Option<u64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub total_digits: Option<u64>,
    pub fraction_digits: Option<u64>,
}

/// An XPath `<assert test="...">`, kept as the raw test string; codegen's
/// narrow translator interprets a documented subset (§4.6.7).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleType {
    pub name: QName,
    pub variety: Variety,
    pub base_type: QName,
    pub facet_set: FacetSet,
    pub item_type: Option<QName>,
    pub member_types: Vec<QName>,
    pub assertions: Vec<Assertion>,
}

impl SimpleType {
    pub fn atomic(name: QName, base_type: QName) -> Self {
        Self {
            name,
            variety: Variety::Atomic,
            base_type,
            facet_set: FacetSet::default(),
            item_type: None,
            member_types: Vec::new(),
            assertions: Vec::new(),
        }
    }
}
