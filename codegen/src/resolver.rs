//! Type resolver (spec §4.6.1): reduces a qname to a target-language type
//! expression, given the enclosing schema's namespace as context.

use std::collections::HashMap;

use xbc_ir::{QName, SchemaSet, XSD_NAMESPACE};

use crate::naming::{module_path, type_name};
use crate::type_map::TypeMap;

/// How a resolved type's values are read from and written to XML text.
/// Serialization (§4.6.4), deserialization (§4.6.5) and validation (§4.6.6)
/// all need this to decide between a scalar `FromStr`/`Display` round trip,
/// the runtime crate's `parse`/`Display`, and a recursive call into the
/// generated type's own `read_<T>`/`write_<T>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    /// A native Rust scalar (`String`, `bool`, `i32`, ...): parses with
    /// `str::parse`, formats with `Display`/`to_string`.
    Scalar,
    /// An `xbc_runtime` value type: parses with `T::parse`, formats with
    /// its `Display` impl.
    Runtime,
    /// A named simple type declared in the schema itself (an enum or an
    /// alias): never has child elements of its own, so an element or
    /// attribute of this type is still read/written as lexical text, via
    /// its generated `to_string`/`from_string` helpers.
    GeneratedSimple,
    /// A complex type declared in the schema itself: an element of this
    /// type recurses into its own generated `read_<T>`/`write_<T>`/
    /// `validate_<T>` functions rather than being written as text.
    GeneratedComplex,
}

/// The result of resolving one qname: the Rust type expression plus any
/// `use` paths it pulled in (foreign-namespace module references, or a
/// type-map entry's associated import), and how it's read and written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub expression: String,
    pub uses: Vec<String>,
    pub codec: Codec,
}

impl Resolution {
    fn simple(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        let codec = classify_builtin(&expression);
        Self {
            expression,
            uses: Vec::new(),
            codec,
        }
    }

    fn mapped(expression: String, uses: Vec<String>) -> Self {
        let codec = classify_builtin(&expression);
        Self { expression, uses, codec }
    }

    fn declared(expression: String, uses: Vec<String>, codec: Codec) -> Self {
        Self { expression, uses, codec }
    }
}

/// Classifies a type-map or unset-sentinel expression. Schema-declared
/// types are classified directly by `qualified` instead, since only the
/// resolver steps that looked the qname up in the schema set itself know
/// whether it's a simple or complex type.
fn classify_builtin(expression: &str) -> Codec {
    if expression.starts_with("xbc_runtime::") {
        Codec::Runtime
    } else {
        Codec::Scalar
    }
}

pub struct TypeResolver<'a> {
    pub schema_set: &'a SchemaSet,
    pub type_map: &'a TypeMap,
    pub namespace_map: &'a HashMap<String, String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        schema_set: &'a SchemaSet,
        type_map: &'a TypeMap,
        namespace_map: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            schema_set,
            type_map,
            namespace_map,
        }
    }

    /// Resolves `qname` to a type expression, as seen from `current_namespace`.
    pub fn resolve(&self, qname: &QName, current_namespace: &str) -> Resolution {
        // 1. the unit-type sentinel.
        if qname.is_unset() {
            return Resolution::simple("()");
        }

        // 2. XSD built-in: a type_map hit wins outright.
        if qname.namespace_uri == XSD_NAMESPACE {
            if let Some(mapping) = self.type_map.get(&qname.local_name) {
                let uses = if mapping.target_use.is_empty() {
                    Vec::new()
                } else {
                    vec![mapping.target_use.clone()]
                };
                return Resolution::mapped(mapping.target_type.clone(), uses);
            }
        }

        // 3. a simple type declared somewhere in the schema set.
        if self.schema_set.lookup_simple_type(qname).is_some() {
            return self.qualified(qname, current_namespace, Codec::GeneratedSimple);
        }

        // 4. a complex type declared somewhere in the schema set.
        if self.schema_set.lookup_complex_type(qname).is_some() {
            return self.qualified(qname, current_namespace, Codec::GeneratedComplex);
        }

        // 5. last-resort type_map fallback, else the bare local name —
        // a deliberate compile-failure escalation for an undefined
        // reference.
        if let Some(mapping) = self.type_map.get(&qname.local_name) {
            let uses = if mapping.target_use.is_empty() {
                Vec::new()
            } else {
                vec![mapping.target_use.clone()]
            };
            return Resolution::mapped(mapping.target_type.clone(), uses);
        }
        tracing::warn!(%qname, "unresolved type reference; emitting local name verbatim");
        Resolution::declared(type_name(&qname.local_name), Vec::new(), Codec::GeneratedComplex)
    }

    fn qualified(&self, qname: &QName, current_namespace: &str, codec: Codec) -> Resolution {
        let name = type_name(&qname.local_name);
        if qname.namespace_uri == current_namespace {
            return Resolution::declared(name, Vec::new(), codec);
        }
        let module = module_path(&qname.namespace_uri, self.namespace_map);
        Resolution::declared(format!("crate::{module}::{name}"), vec![format!("crate::{module}")], codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbc_ir::{ComplexType, ContentType, Schema};

    fn schema_set_with(target_namespace: &str, complex_type: &str) -> SchemaSet {
        let mut schema = Schema::new(target_namespace);
        schema
            .complex_types
            .push(ComplexType::new(QName::new(target_namespace, complex_type), ContentType::Empty));
        let mut set = SchemaSet::new();
        set.add_schema(schema);
        set.resolve().unwrap();
        set
    }

    #[test]
    fn resolves_unset_qname_to_unit() {
        let set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &map);
        assert_eq!(resolver.resolve(&QName::default(), "").expression, "()");
    }

    #[test]
    fn resolves_xsd_builtin_via_type_map() {
        let set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &map);
        let resolved = resolver.resolve(&QName::new(XSD_NAMESPACE, "int"), "");
        assert_eq!(resolved.expression, "i32");
    }

    #[test]
    fn resolves_local_complex_type_unqualified() {
        let set = schema_set_with("urn:a", "Order");
        let type_map = TypeMap::defaults();
        let map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &map);
        let resolved = resolver.resolve(&QName::new("urn:a", "Order"), "urn:a");
        assert_eq!(resolved.expression, "Order");
        assert!(resolved.uses.is_empty());
    }

    #[test]
    fn resolves_foreign_complex_type_qualified() {
        let set = schema_set_with("urn:a", "Order");
        let type_map = TypeMap::defaults();
        let map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &map);
        let resolved = resolver.resolve(&QName::new("urn:a", "Order"), "urn:b");
        assert!(resolved.expression.ends_with("::Order"));
        assert_eq!(resolved.uses.len(), 1);
    }

    #[test]
    fn unresolved_reference_falls_back_to_local_name() {
        let set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &map);
        let resolved = resolver.resolve(&QName::new("urn:missing", "Ghost"), "urn:a");
        assert_eq!(resolved.expression, "Ghost");
    }
}
