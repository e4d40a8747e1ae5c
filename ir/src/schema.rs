use std::collections::HashMap;

use tracing::warn;

use crate::attribute::AttributeDecl;
use crate::complex_type::ComplexType;
use crate::element::ElementDecl;
use crate::error::Error;
use crate::group::{AttributeGroupDef, ModelGroupDef, OpenContent};
use crate::qname::QName;
use crate::simple_type::SimpleType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub namespace: String,
    pub schema_location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Include {
    pub schema_location: String,
}

/// A single schema document's declarations. Cross-schema references are
/// qname-only; intra-schema structure is owned directly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    pub target_namespace: String,
    pub elements: Vec<ElementDecl>,
    pub attributes: Vec<AttributeDecl>,
    pub simple_types: Vec<SimpleType>,
    pub complex_types: Vec<ComplexType>,
    pub model_groups: Vec<ModelGroupDef>,
    pub attribute_groups: Vec<AttributeGroupDef>,
    pub imports: Vec<Import>,
    pub includes: Vec<Include>,
    /// Default open-content directive plus its "applies to empty" flag.
    pub default_open_content: Option<(OpenContent, bool)>,
}

impl Schema {
    pub fn new(target_namespace: impl Into<String>) -> Self {
        Self {
            target_namespace: target_namespace.into(),
            ..Default::default()
        }
    }
}

/// A borrowed-reference substitute: identifies one declaration by the
/// schema that owns it and its position within that schema's vector. Using
/// an index pair rather than a lifetime-bound reference lets `SchemaSet`
/// hand out stable handles from `resolve()` without borrowing itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub schema_index: usize,
    pub item_index: usize,
}

#[derive(Debug, Default)]
pub struct SchemaSet {
    schemas: Vec<Schema>,
    elements: HashMap<QName, EntityId>,
    attributes: HashMap<QName, EntityId>,
    simple_types: HashMap<QName, EntityId>,
    complex_types: HashMap<QName, EntityId>,
    model_groups: HashMap<QName, EntityId>,
    attribute_groups: HashMap<QName, EntityId>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_schema(&mut self, schema: Schema) {
        self.schemas.push(schema);
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Rebuilds all six qname index maps from the schemas currently owned.
    /// Idempotent: calling this again after schemas are added or mutated
    /// produces index maps consistent with the current state.
    pub fn resolve(&mut self) -> Result<(), Error> {
        self.elements.clear();
        self.attributes.clear();
        self.simple_types.clear();
        self.complex_types.clear();
        self.model_groups.clear();
        self.attribute_groups.clear();

        for (schema_index, schema) in self.schemas.iter().enumerate() {
            index_by_name(
                &mut self.elements,
                schema.elements.iter().map(|e| &e.name),
                schema_index,
                "element",
            )?;
            index_by_name(
                &mut self.attributes,
                schema.attributes.iter().map(|a| &a.name),
                schema_index,
                "attribute",
            )?;
            index_by_name(
                &mut self.simple_types,
                schema.simple_types.iter().map(|t| &t.name),
                schema_index,
                "simple type",
            )?;
            index_by_name(
                &mut self.complex_types,
                schema.complex_types.iter().map(|t| &t.name),
                schema_index,
                "complex type",
            )?;
            index_by_name(
                &mut self.model_groups,
                schema.model_groups.iter().map(|g| &g.name),
                schema_index,
                "model group",
            )?;
            index_by_name(
                &mut self.attribute_groups,
                schema.attribute_groups.iter().map(|g| &g.name),
                schema_index,
                "attribute group",
            )?;
        }
        Ok(())
    }

    pub fn lookup_element(&self, name: &QName) -> Option<&ElementDecl> {
        let id = self.elements.get(name)?;
        self.schemas[id.schema_index].elements.get(id.item_index)
    }

    pub fn lookup_attribute(&self, name: &QName) -> Option<&AttributeDecl> {
        let id = self.attributes.get(name)?;
        self.schemas[id.schema_index].attributes.get(id.item_index)
    }

    pub fn lookup_simple_type(&self, name: &QName) -> Option<&SimpleType> {
        let id = self.simple_types.get(name)?;
        self.schemas[id.schema_index].simple_types.get(id.item_index)
    }

    pub fn lookup_complex_type(&self, name: &QName) -> Option<&ComplexType> {
        let id = self.complex_types.get(name)?;
        self.schemas[id.schema_index].complex_types.get(id.item_index)
    }

    pub fn lookup_model_group(&self, name: &QName) -> Option<&ModelGroupDef> {
        let id = self.model_groups.get(name)?;
        self.schemas[id.schema_index].model_groups.get(id.item_index)
    }

    pub fn lookup_attribute_group(&self, name: &QName) -> Option<&AttributeGroupDef> {
        let id = self.attribute_groups.get(name)?;
        self.schemas[id.schema_index]
            .attribute_groups
            .get(id.item_index)
    }

    /// True when `name` names neither a resolvable declaration in this set
    /// nor a built-in (namespace is the XSD namespace) — i.e. codegen
    /// should report it as an unresolved reference.
    pub fn is_unresolvable(&self, kind: ReferenceKind, name: &QName) -> bool {
        if name.namespace_uri == crate::qname::XSD_NAMESPACE {
            return false;
        }
        match kind {
            ReferenceKind::Element => self.lookup_element(name).is_none(),
            ReferenceKind::Attribute => self.lookup_attribute(name).is_none(),
            ReferenceKind::SimpleType => self.lookup_simple_type(name).is_none(),
            ReferenceKind::ComplexType => self.lookup_complex_type(name).is_none(),
            ReferenceKind::ModelGroup => self.lookup_model_group(name).is_none(),
            ReferenceKind::AttributeGroup => self.lookup_attribute_group(name).is_none(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Element,
    Attribute,
    SimpleType,
    ComplexType,
    ModelGroup,
    AttributeGroup,
}

fn index_by_name<'a>(
    map: &mut HashMap<QName, EntityId>,
    names: impl Iterator<Item = &'a QName>,
    schema_index: usize,
    kind: &'static str,
) -> Result<(), Error> {
    for (item_index, name) in names.enumerate() {
        if name.is_unset() {
            continue;
        }
        let id = EntityId {
            schema_index,
            item_index,
        };
        if let Some(previous) = map.insert(name.clone(), id) {
            if previous.schema_index != schema_index || previous.item_index != item_index {
                warn!(%name, kind, "duplicate global declaration; keeping the later one");
                return Err(Error::DuplicateDeclaration {
                    kind,
                    name: name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qname::QName;

    fn element(name: &str) -> ElementDecl {
        ElementDecl::new(QName::unqualified(name), QName::unqualified("string"))
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut set = SchemaSet::new();
        let mut schema = Schema::new("urn:example");
        schema.elements.push(element("root"));
        set.add_schema(schema);

        set.resolve().unwrap();
        assert!(set.lookup_element(&QName::unqualified("root")).is_some());
        set.resolve().unwrap();
        assert!(set.lookup_element(&QName::unqualified("root")).is_some());
    }

    #[test]
    fn duplicate_global_name_is_an_error() {
        let mut set = SchemaSet::new();
        let mut schema = Schema::new("urn:example");
        schema.elements.push(element("root"));
        schema.elements.push(element("root"));
        set.add_schema(schema);

        assert!(set.resolve().is_err());
    }

    #[test]
    fn builtin_namespace_never_unresolvable() {
        let set = SchemaSet::new();
        let builtin = QName::new(crate::qname::XSD_NAMESPACE, "string");
        assert!(!set.is_unresolvable(ReferenceKind::SimpleType, &builtin));
    }

    #[test]
    fn unknown_reference_is_unresolvable() {
        let set = SchemaSet::new();
        let unknown = QName::unqualified("Missing");
        assert!(set.is_unresolvable(ReferenceKind::ComplexType, &unknown));
    }
}
