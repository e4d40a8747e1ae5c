//! Simple-type translation: named atomic/list/union types become a type
//! alias, an enum, or a synthesized tagged union, completing the
//! by-qualified-name resolution the type resolver (§4.6.1) defers here.

use xbc_ir::{QName, SimpleType, Variety};

use crate::naming::type_name;
use crate::resolver::TypeResolver;
use crate::target::Declaration;

pub struct SimpleTypeContext<'a> {
    pub resolver: &'a TypeResolver<'a>,
    pub current_namespace: &'a str,
}

pub struct SimpleTypeTranslation {
    pub declaration: Declaration,
    pub uses: Vec<String>,
}

/// Translates one named simple type into a declaration:
/// - an atomic type with an `enumeration` facet becomes a plain enum, one
///   variant per value, carrying the original lexical string for the
///   `to_string`/`from_string` helpers emitted alongside it (§4.7);
/// - any other atomic restriction becomes a type alias over its base;
/// - a list becomes a `Vec<item>` alias;
/// - a union becomes a synthesized tagged union over its member types —
///   Rust's nearest equivalent to an inline `variant<m1, m2, ...>`.
pub fn translate_simple_type(simple_type: &SimpleType, ctx: &SimpleTypeContext) -> SimpleTypeTranslation {
    let name = type_name(&simple_type.name.local_name);
    match simple_type.variety {
        Variety::Atomic if !simple_type.facet_set.enumeration.is_empty() => {
            let variants = simple_type
                .facet_set
                .enumeration
                .iter()
                .map(|value| (enumerator_name(value), value.clone()))
                .collect();
            SimpleTypeTranslation {
                declaration: Declaration::Enum { name, variants },
                uses: Vec::new(),
            }
        }
        Variety::Atomic => {
            let resolved = ctx.resolver.resolve(&simple_type.base_type, ctx.current_namespace);
            SimpleTypeTranslation {
                declaration: Declaration::Alias {
                    name,
                    target: resolved.expression,
                },
                uses: resolved.uses,
            }
        }
        Variety::List => {
            let item_type = simple_type.item_type.clone().unwrap_or_default();
            let resolved = ctx.resolver.resolve(&item_type, ctx.current_namespace);
            SimpleTypeTranslation {
                declaration: Declaration::Alias {
                    name,
                    target: format!("Vec<{}>", resolved.expression),
                },
                uses: resolved.uses,
            }
        }
        Variety::Union => {
            let mut uses = Vec::new();
            let arms = simple_type
                .member_types
                .iter()
                .map(|member| {
                    let resolved = ctx.resolver.resolve(member, ctx.current_namespace);
                    uses.extend(resolved.uses);
                    (member_arm_name(member), resolved.expression)
                })
                .collect();
            SimpleTypeTranslation {
                declaration: Declaration::Variant { name, arms },
                uses,
            }
        }
    }
}

fn member_arm_name(member: &QName) -> String {
    type_name(&member.local_name)
}

/// An enumeration value has no namespace to disambiguate with, only its
/// lexical string, which may not be a valid Rust identifier by itself
/// (`"2nd-class"`); `type_name` already escapes leading digits and
/// reserved words on top of the `PascalCase` conversion.
fn enumerator_name(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    type_name(&sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use xbc_ir::{QName, SchemaSet, XSD_NAMESPACE};

    use crate::type_map::TypeMap;

    #[test]
    fn enumeration_becomes_an_enum_with_lexical_variants() {
        let mut simple_type = SimpleType::atomic(
            QName::new("urn:a", "StatusType"),
            QName::new(XSD_NAMESPACE, "string"),
        );
        simple_type.facet_set.enumeration = vec!["open".to_string(), "closed".to_string()];

        let set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &namespace_map);
        let ctx = SimpleTypeContext {
            resolver: &resolver,
            current_namespace: "urn:a",
        };

        let translation = translate_simple_type(&simple_type, &ctx);
        match translation.declaration {
            Declaration::Enum { name, variants } => {
                assert_eq!(name, "StatusType");
                assert_eq!(variants, vec![("Open".to_string(), "open".to_string()), ("Closed".to_string(), "closed".to_string())]);
            }
            other => panic!("expected an enum declaration, got {other:?}"),
        }
    }

    #[test]
    fn list_becomes_a_vec_alias() {
        let simple_type = SimpleType {
            name: QName::new("urn:a", "SizeList"),
            variety: Variety::List,
            item_type: Some(QName::new(XSD_NAMESPACE, "int")),
            ..SimpleType::atomic(QName::new("urn:a", "SizeList"), QName::default())
        };

        let set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&set, &type_map, &namespace_map);
        let ctx = SimpleTypeContext {
            resolver: &resolver,
            current_namespace: "urn:a",
        };

        let translation = translate_simple_type(&simple_type, &ctx);
        match translation.declaration {
            Declaration::Alias { name, target } => {
                assert_eq!(name, "SizeList");
                assert_eq!(target, "Vec<i32>");
            }
            other => panic!("expected an alias declaration, got {other:?}"),
        }
    }
}
