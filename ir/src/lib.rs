//! The Schema IR: the language-neutral internal model shared by the XSD,
//! RELAX NG, and DTD front ends and consumed by codegen.

pub mod attribute;
pub mod complex_type;
pub mod element;
mod error;
pub mod group;
pub mod qname;
pub mod schema;
pub mod simple_type;

pub use attribute::{AttributeDecl, AttributeUse};
pub use complex_type::{ComplexContent, ComplexType, ContentType, Derivation, SimpleContent};
pub use element::{ElementDecl, TypeAlternative};
pub use error::Error;
pub use group::{
    AttributeGroupDef, Compositor, MaxOccurs, ModelGroup, ModelGroupDef, NamespaceConstraint,
    Occurrence, OpenContent, OpenContentMode, Particle, ProcessContents, Term, Wildcard,
};
pub use qname::{QName, XSD_NAMESPACE};
pub use schema::{EntityId, Import, Include, ReferenceKind, Schema, SchemaSet};
pub use simple_type::{Assertion, FacetSet, SimpleType, Variety};
