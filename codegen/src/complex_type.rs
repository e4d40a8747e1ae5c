//! Complex-type translation (spec §4.6.3): assembles one record declaration
//! per complex type from its content model and attribute uses.

use xbc_ir::{AttributeUse, ComplexContent, ComplexType, ContentType, Derivation, QName, SchemaSet};

use crate::error::Error;
use crate::naming::{field_name, type_name};
use crate::particle::{translate_model_group, Cardinality, FieldPlan, FieldRole, ParticleContext};
use crate::resolver::{Codec, TypeResolver};
use crate::target::{Declaration, Field};

pub struct ComplexTypeContext<'a> {
    pub resolver: &'a TypeResolver<'a>,
    pub schema_set: &'a SchemaSet,
    pub current_namespace: &'a str,
}

pub struct ComplexTypeTranslation {
    pub record: Declaration,
    /// Every field of `record`, in declaration order, annotated with its
    /// XML shape. Consumed by the serializer/deserializer/validator, which
    /// all need more than the bare `Field` the target AST carries.
    pub fields: Vec<FieldPlan>,
    pub extra_declarations: Vec<Declaration>,
    pub uses: Vec<String>,
}

/// Translates one complex type into a record declaration. Mixed content and
/// simple-content extension both get a synthesized `text`/`value` field;
/// extension derivation flattens the base type's fields into the derived
/// record rather than modeling inheritance, since generated record types
/// have no supertype relationship to lean on.
pub fn translate_complex_type(
    complex_type: &ComplexType,
    ctx: &ComplexTypeContext,
) -> Result<ComplexTypeTranslation, Error> {
    let mut fields: Vec<FieldPlan> = Vec::new();
    let mut extra_declarations = Vec::new();

    match &complex_type.content_type {
        ContentType::Empty => {}
        ContentType::Simple(simple) => {
            let resolved = ctx.resolver.resolve(&simple.base_type, ctx.current_namespace);
            fields.push(FieldPlan {
                field: Field {
                    type_expr: resolved.expression,
                    name: "value".to_string(),
                    default: None,
                },
                role: FieldRole::Value { codec: resolved.codec },
                cardinality: Cardinality::Required,
                uses: resolved.uses,
                extra_declarations: Vec::new(),
            });
        }
        ContentType::ElementOnly(content) => {
            translate_complex_content(complex_type, content, false, ctx, &mut fields)?;
        }
        ContentType::Mixed(content) => {
            translate_complex_content(complex_type, content, true, ctx, &mut fields)?;
        }
    }

    fields.extend(translate_attributes(complex_type, ctx)?);

    let mut uses: Vec<String> = fields.iter().flat_map(|plan| plan.uses.iter().cloned()).collect();
    for plan in &fields {
        extra_declarations.extend(plan.extra_declarations.iter().cloned());
    }
    uses.sort();
    uses.dedup();

    let record_fields = fields.iter().map(|plan| plan.field.clone()).collect();
    Ok(ComplexTypeTranslation {
        record: Declaration::Record {
            name: type_name(&complex_type.name.local_name),
            fields: record_fields,
            generate_equality: true,
        },
        fields,
        extra_declarations,
        uses,
    })
}

fn translate_complex_content(
    complex_type: &ComplexType,
    content: &ComplexContent,
    mixed: bool,
    ctx: &ComplexTypeContext,
    fields: &mut Vec<FieldPlan>,
) -> Result<(), Error> {
    if mixed {
        fields.push(FieldPlan {
            field: Field {
                type_expr: "Option<String>".to_string(),
                name: "text".to_string(),
                default: None,
            },
            role: FieldRole::Text,
            cardinality: Cardinality::Optional,
            uses: Vec::new(),
            extra_declarations: Vec::new(),
        });
    }

    if content.derivation == Derivation::Extension {
        fields.extend(inherited_fields(&content.base_type, ctx)?);
    }

    if let Some(group) = &content.model_group {
        let particle_ctx = ParticleContext {
            resolver: ctx.resolver,
            schema_set: ctx.schema_set,
            current_namespace: ctx.current_namespace,
            enclosing_type: &complex_type.name,
        };
        let mut choice_ordinal = 0usize;
        fields.extend(translate_model_group(group, &particle_ctx, &mut choice_ordinal)?);
    }

    Ok(())
}

/// A restriction narrows its base's content model, which generated code
/// re-derives in full from the restricted particle tree rather than from
/// the base type, so only an `Extension` derivation needs to reach back
/// into its base type's own fields here.
fn inherited_fields(base_type: &QName, ctx: &ComplexTypeContext) -> Result<Vec<FieldPlan>, Error> {
    let base = match ctx.schema_set.lookup_complex_type(base_type) {
        Some(base) => base,
        None => return Ok(Vec::new()),
    };
    Ok(translate_complex_type(base, ctx)?.fields)
}

fn translate_attributes(complex_type: &ComplexType, ctx: &ComplexTypeContext) -> Result<Vec<FieldPlan>, Error> {
    let mut attribute_uses: Vec<AttributeUse> = complex_type.attribute_uses.clone();
    collect_attribute_group_uses(&complex_type.attribute_group_refs, ctx.schema_set, &mut attribute_uses);

    let mut fields = Vec::with_capacity(attribute_uses.len() + 1);
    for attribute_use in &attribute_uses {
        let resolved = ctx.resolver.resolve(&attribute_use.type_name, ctx.current_namespace);
        let optional = !attribute_use.required || attribute_use.default.is_some();
        let type_expr = if optional {
            format!("Option<{}>", resolved.expression)
        } else {
            resolved.expression.clone()
        };
        fields.push(FieldPlan {
            field: Field {
                type_expr,
                name: field_name(&attribute_use.name.local_name),
                default: attribute_use.default.clone(),
            },
            role: FieldRole::Attribute {
                xml_name: attribute_use.name.clone(),
                codec: resolved.codec,
            },
            cardinality: if optional {
                Cardinality::Optional
            } else {
                Cardinality::Required
            },
            uses: resolved.uses,
            extra_declarations: Vec::new(),
        });
    }

    if complex_type.attribute_wildcard.is_some() {
        fields.push(FieldPlan {
            field: Field {
                type_expr: "Vec<(xbc_ir::QName, String)>".to_string(),
                name: "any_attributes".to_string(),
                default: None,
            },
            role: FieldRole::Attribute {
                xml_name: QName::default(),
                codec: Codec::GeneratedComplex,
            },
            cardinality: Cardinality::Vector,
            uses: vec!["xbc_ir::QName".to_string()],
            extra_declarations: Vec::new(),
        });
    }

    Ok(fields)
}

fn collect_attribute_group_uses(refs: &[QName], schema_set: &SchemaSet, out: &mut Vec<AttributeUse>) {
    for group_name in refs {
        let Some(group) = schema_set.lookup_attribute_group(group_name) else {
            continue;
        };
        out.extend(group.attribute_uses.iter().cloned());
        collect_attribute_group_uses(&group.attribute_group_refs, schema_set, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TypeResolver;
    use crate::type_map::TypeMap;
    use std::collections::HashMap;
    use xbc_ir::{Derivation, SimpleContent};

    fn ctx<'a>(resolver: &'a TypeResolver<'a>, schema_set: &'a SchemaSet) -> ComplexTypeContext<'a> {
        ComplexTypeContext {
            resolver,
            schema_set,
            current_namespace: "urn:a",
        }
    }

    #[test]
    fn simple_content_produces_a_value_field_then_attributes() {
        let schema_set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&schema_set, &type_map, &namespace_map);

        let mut complex_type = ComplexType::new(
            QName::new("urn:a", "Price"),
            ContentType::Simple(SimpleContent {
                base_type: QName::new(xbc_ir::XSD_NAMESPACE, "decimal"),
                derivation: Derivation::Extension,
                facet_set: Default::default(),
            }),
        );
        complex_type.attribute_uses.push(AttributeUse {
            name: QName::unqualified("currency"),
            type_name: QName::new(xbc_ir::XSD_NAMESPACE, "string"),
            required: true,
            default: None,
            fixed: None,
        });

        let translation = translate_complex_type(&complex_type, &ctx(&resolver, &schema_set)).unwrap();
        assert_eq!(translation.fields.len(), 2);
        assert!(matches!(translation.fields[0].role, FieldRole::Value { .. }));
        assert_eq!(translation.fields[1].field.name, "currency");
        match translation.record {
            Declaration::Record { fields, .. } => assert_eq!(fields.len(), 2),
            _ => panic!("expected a record declaration"),
        }
    }

    #[test]
    fn attribute_wildcard_adds_any_attributes_bucket() {
        let schema_set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&schema_set, &type_map, &namespace_map);

        let mut complex_type = ComplexType::new(QName::new("urn:a", "Extensible"), ContentType::Empty);
        complex_type.attribute_wildcard = Some(xbc_ir::Wildcard {
            namespace_constraint: xbc_ir::NamespaceConstraint::Any,
            process_contents: xbc_ir::ProcessContents::Lax,
        });

        let translation = translate_complex_type(&complex_type, &ctx(&resolver, &schema_set)).unwrap();
        assert_eq!(translation.fields.len(), 1);
        assert_eq!(translation.fields[0].field.name, "any_attributes");
    }
}
