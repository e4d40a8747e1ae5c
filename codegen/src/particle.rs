//! Particle translation (spec §4.6.2): turns a model group's particles into
//! the record fields of the enclosing complex type.

use xbc_ir::{Compositor, ElementDecl, MaxOccurs, ModelGroup, Occurrence, Particle, QName, SchemaSet, Term};

use crate::error::Error;
use crate::naming::{field_name, type_name};
use crate::resolver::{Codec, TypeResolver};
use crate::target::{Declaration, Field};

pub struct ParticleContext<'a> {
    pub resolver: &'a TypeResolver<'a>,
    pub schema_set: &'a SchemaSet,
    pub current_namespace: &'a str,
    /// The complex type this particle tree belongs to, used to detect
    /// field-level recursion (spec's self-referential `owning_pointer` row).
    pub enclosing_type: &'a QName,
}

/// How many times a field's value appears in an instance document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    Required,
    Optional,
    Vector,
    OwningPointer,
}

/// One alternative of a synthesized choice/substitution-group enum, as seen
/// by the (de)serializer: which XML element tag selects it (`None` for a
/// wildcard or a multi-element nested-group arm, which this translator
/// doesn't attempt to dispatch by tag) and how its payload is coded.
#[derive(Clone, Debug)]
pub struct ChoiceArm {
    pub variant: String,
    pub type_expr: String,
    pub xml_name: Option<QName>,
    pub codec: Codec,
}

/// What kind of XML content a field corresponds to.
#[derive(Clone, Debug)]
pub enum FieldRole {
    Element { xml_name: QName, codec: Codec },
    Choice { arms: Vec<ChoiceArm> },
    Wildcard,
    Attribute { xml_name: QName, codec: Codec },
    /// A simple-content complex type's single scalar value.
    Value { codec: Codec },
    /// A mixed-content complex type's interspersed character data.
    Text,
}

/// One generated field plus whatever else had to come along with it: the
/// `use` paths its type expression needs, any helper declarations (a
/// synthesized choice/substitution-group enum) it had to introduce, and
/// enough XML shape information for the serializer/deserializer/validator
/// to drive this field on its own.
pub struct FieldPlan {
    pub field: Field,
    pub role: FieldRole,
    pub cardinality: Cardinality,
    pub uses: Vec<String>,
    pub extra_declarations: Vec<Declaration>,
}

/// Translates a model group's particles into the fields of its owning
/// record. `choice_ordinal` is threaded through so that a complex type with
/// more than one `<choice>` in its content gets distinctly named helper
/// enums (`Choice`, `Choice2`, ...).
pub fn translate_model_group(
    group: &ModelGroup,
    ctx: &ParticleContext,
    choice_ordinal: &mut usize,
) -> Result<Vec<FieldPlan>, Error> {
    match group.compositor {
        // Interleave has no ordering guarantee, but its field *shape* is the
        // same flat list of optional/repeated fields as a sequence.
        Compositor::Sequence | Compositor::All | Compositor::Interleave => {
            let mut fields = Vec::new();
            for particle in &group.particles {
                fields.extend(translate_particle(particle, ctx, choice_ordinal)?);
            }
            Ok(fields)
        }
        Compositor::Choice => Ok(vec![translate_choice(group, ctx, choice_ordinal)?]),
    }
}

fn translate_particle(
    particle: &Particle,
    ctx: &ParticleContext,
    choice_ordinal: &mut usize,
) -> Result<Vec<FieldPlan>, Error> {
    match &particle.term {
        // Nested groups (anonymous or referenced) are flattened into the
        // surrounding field list at their point of occurrence. The particle
        // wrapping an anonymous group its own repetition is a rare pattern
        // in practice; fields inherit the inner group's own occurrences.
        Term::Group(inner) => translate_model_group(inner, ctx, choice_ordinal),
        Term::GroupRef(name) => {
            let def = ctx
                .schema_set
                .lookup_model_group(name)
                .ok_or_else(|| Error::UnresolvedReference { name: name.clone() })?;
            translate_model_group(&def.group, ctx, choice_ordinal)
        }
        Term::Wildcard(_) => Ok(vec![translate_wildcard(particle.occurrence)]),
        Term::Element(decl) => Ok(vec![translate_element(decl, particle.occurrence, ctx)]),
        Term::ElementRef(qname) => {
            let decl = ctx
                .schema_set
                .lookup_element(qname)
                .ok_or_else(|| Error::UnresolvedReference { name: qname.clone() })?;
            Ok(vec![translate_element(decl, particle.occurrence, ctx)])
        }
    }
}

fn translate_wildcard(occurrence: Occurrence) -> FieldPlan {
    let singular = "xbc_xml::AnyElement".to_string();
    let (type_expr, cardinality) = if is_repeating(occurrence) {
        (format!("Vec<{singular}>"), Cardinality::Vector)
    } else if occurrence.min_occurs == 0 {
        (format!("Option<{singular}>"), Cardinality::Optional)
    } else {
        (singular, Cardinality::Required)
    };
    FieldPlan {
        field: Field {
            type_expr,
            name: "any".to_string(),
            default: None,
        },
        role: FieldRole::Wildcard,
        cardinality,
        uses: vec!["xbc_xml::AnyElement".to_string()],
        extra_declarations: Vec::new(),
    }
}

fn translate_element(decl: &ElementDecl, occurrence: Occurrence, ctx: &ParticleContext) -> FieldPlan {
    if decl.is_abstract {
        let members = substitution_group_members(ctx.schema_set, &decl.name);
        if !members.is_empty() {
            return translate_substitution_group(decl, &members, ctx);
        }
    }

    let name = field_name(&decl.name.local_name);
    let is_self_reference = decl.type_alternatives.is_empty() && decl.type_name == *ctx.enclosing_type;
    let (mut type_expr, codec, mut uses, extra_declarations) = resolve_element_value(decl, ctx);

    let cardinality;
    if is_self_reference && occurrence.min_occurs == 0 && occurrence.max_occurs == MaxOccurs::Bounded(1) {
        // Recursion is only representable behind an owning pointer; Option
        // doubles as the "zero occurrences" case so no separate nillable
        // wrap is needed here.
        type_expr = format!("Option<Box<{type_expr}>>");
        cardinality = Cardinality::OwningPointer;
    } else if decl.nillable {
        type_expr = format!("Option<{type_expr}>");
        if is_repeating(occurrence) {
            type_expr = format!("Vec<{type_expr}>");
            cardinality = Cardinality::Vector;
        } else {
            cardinality = Cardinality::Optional;
        }
    } else if is_repeating(occurrence) {
        type_expr = format!("Vec<{type_expr}>");
        cardinality = Cardinality::Vector;
    } else if occurrence.min_occurs == 0 {
        type_expr = format!("Option<{type_expr}>");
        cardinality = Cardinality::Optional;
    } else {
        cardinality = Cardinality::Required;
    }

    uses.sort();
    uses.dedup();
    FieldPlan {
        field: Field {
            type_expr,
            name,
            default: decl.default.clone(),
        },
        role: FieldRole::Element {
            xml_name: decl.name.clone(),
            codec,
        },
        cardinality,
        uses,
        extra_declarations,
    }
}

/// Resolves the value type of an element particle, before any nillable,
/// repetition or self-reference wrapping is applied.
///
/// Conditional type assignment picks between alternative types per
/// instance via an XPath test over the element's own attributes; fully
/// modeling that would mean generating a dispatcher that re-reads
/// attributes before committing to a payload type, which §4.6.7 already
/// scopes XPath support narrowly for. This resolver takes the same narrow
/// stance and collapses a CTA list to its default alternative (the one
/// with no test), or its first alternative if every one is conditional,
/// rather than generating a per-instance dispatcher.
fn resolve_element_value(decl: &ElementDecl, ctx: &ParticleContext) -> (String, Codec, Vec<String>, Vec<Declaration>) {
    let type_name = if decl.type_alternatives.is_empty() {
        &decl.type_name
    } else {
        decl.type_alternatives
            .iter()
            .find(|alternative| alternative.test.is_none())
            .or_else(|| decl.type_alternatives.first())
            .map(|alternative| &alternative.type_name)
            .unwrap_or(&decl.type_name)
    };
    let resolved = ctx.resolver.resolve(type_name, ctx.current_namespace);
    (resolved.expression, resolved.codec, resolved.uses, Vec::new())
}

/// An abstract element with registered substitution-group members can be
/// replaced in an instance document by any one of them, each under its own
/// tag — the same "tag picks the payload" shape as an explicit `<choice>`,
/// so this reuses the choice machinery rather than inventing a second one.
fn translate_substitution_group(decl: &ElementDecl, members: &[QName], ctx: &ParticleContext) -> FieldPlan {
    let enum_name = format!(
        "{}{}Choice",
        type_name(&ctx.enclosing_type.local_name),
        type_name(&decl.name.local_name)
    );
    let mut arms = Vec::new();
    let mut choice_arms = Vec::new();
    let mut uses = Vec::new();
    for member in members {
        let resolved = ctx.resolver.resolve(member, ctx.current_namespace);
        let variant = type_name(&member.local_name);
        arms.push((variant.clone(), resolved.expression.clone()));
        choice_arms.push(ChoiceArm {
            variant,
            type_expr: resolved.expression,
            xml_name: Some(member.clone()),
            codec: resolved.codec,
        });
        uses.extend(resolved.uses);
    }
    uses.sort();
    uses.dedup();
    FieldPlan {
        field: Field {
            type_expr: enum_name.clone(),
            name: field_name(&decl.name.local_name),
            default: None,
        },
        role: FieldRole::Choice { arms: choice_arms },
        // Matches translate_choice's own simplification: a choice-shaped
        // field is always required, occurrence bounds on the head aren't
        // enforced.
        cardinality: Cardinality::Required,
        uses,
        extra_declarations: vec![Declaration::Variant { name: enum_name, arms }],
    }
}

fn substitution_group_members(schema_set: &SchemaSet, head: &QName) -> Vec<QName> {
    schema_set
        .schemas()
        .iter()
        .flat_map(|schema| schema.elements.iter())
        .filter(|element| element.substitution_group.as_ref() == Some(head))
        .map(|element| element.name.clone())
        .collect()
}

fn translate_choice(
    group: &ModelGroup,
    ctx: &ParticleContext,
    choice_ordinal: &mut usize,
) -> Result<FieldPlan, Error> {
    *choice_ordinal += 1;
    let suffix = if *choice_ordinal == 1 {
        String::new()
    } else {
        choice_ordinal.to_string()
    };
    let enum_name = format!("{}Choice{suffix}", type_name(&ctx.enclosing_type.local_name));

    let mut arms = Vec::new();
    let mut choice_arms = Vec::new();
    let mut uses = Vec::new();
    let mut extra_declarations = Vec::new();
    for particle in &group.particles {
        for plan in translate_particle(particle, ctx, choice_ordinal)? {
            let variant = type_name(&plan.field.name);
            arms.push((variant.clone(), plan.field.type_expr));
            let (xml_name, codec) = match &plan.role {
                FieldRole::Element { xml_name, codec } => (Some(xml_name.clone()), *codec),
                // A nested group or wildcard arm has no single tag to
                // dispatch on; the (de)serializer falls back to trying it
                // last, in source order.
                FieldRole::Choice { .. } | FieldRole::Wildcard => (None, Codec::GeneratedComplex),
            };
            choice_arms.push(ChoiceArm {
                variant,
                type_expr: plan.field.type_expr.clone(),
                xml_name,
                codec,
            });
            uses.extend(plan.uses);
            extra_declarations.extend(plan.extra_declarations);
        }
    }
    extra_declarations.push(Declaration::Variant {
        name: enum_name.clone(),
        arms,
    });

    uses.sort();
    uses.dedup();
    Ok(FieldPlan {
        field: Field {
            type_expr: enum_name,
            name: "choice".to_string(),
            default: None,
        },
        role: FieldRole::Choice { arms: choice_arms },
        cardinality: Cardinality::Required,
        uses,
        extra_declarations,
    })
}

fn is_repeating(occurrence: Occurrence) -> bool {
    match occurrence.max_occurs {
        MaxOccurs::Unbounded => true,
        MaxOccurs::Bounded(n) => n > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TypeResolver;
    use crate::type_map::TypeMap;
    use std::collections::HashMap;
    use xbc_ir::{ComplexType, ContentType, Schema};

    fn required(name: &str) -> ElementDecl {
        ElementDecl::new(QName::new("urn:a", name), QName::new(xbc_ir::XSD_NAMESPACE, "string"))
    }

    #[test]
    fn required_element_gets_plain_field() {
        let schema_set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&schema_set, &type_map, &namespace_map);
        let enclosing = QName::new("urn:a", "Order");
        let ctx = ParticleContext {
            resolver: &resolver,
            schema_set: &schema_set,
            current_namespace: "urn:a",
            enclosing_type: &enclosing,
        };
        let plan = translate_element(&required("title"), Occurrence::once(), &ctx);
        assert_eq!(plan.field.type_expr, "String");
        assert!(matches!(plan.cardinality, Cardinality::Required));
        assert!(matches!(plan.role, FieldRole::Element { .. }));
    }

    #[test]
    fn optional_element_wraps_in_option() {
        let schema_set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&schema_set, &type_map, &namespace_map);
        let enclosing = QName::new("urn:a", "Order");
        let ctx = ParticleContext {
            resolver: &resolver,
            schema_set: &schema_set,
            current_namespace: "urn:a",
            enclosing_type: &enclosing,
        };
        let occurrence = Occurrence {
            min_occurs: 0,
            max_occurs: MaxOccurs::Bounded(1),
        };
        let plan = translate_element(&required("note"), occurrence, &ctx);
        assert_eq!(plan.field.type_expr, "Option<String>");
        assert!(matches!(plan.cardinality, Cardinality::Optional));
    }

    #[test]
    fn abstract_head_with_members_becomes_choice() {
        let mut schema = Schema::new("urn:a");
        schema
            .complex_types
            .push(ComplexType::new(QName::new("urn:a", "Car"), ContentType::Empty));
        schema
            .complex_types
            .push(ComplexType::new(QName::new("urn:a", "Truck"), ContentType::Empty));
        let mut head = ElementDecl::new(QName::new("urn:a", "vehicle"), QName::default());
        head.is_abstract = true;
        let mut car = ElementDecl::new(QName::new("urn:a", "car"), QName::new("urn:a", "Car"));
        car.substitution_group = Some(QName::new("urn:a", "vehicle"));
        let mut truck = ElementDecl::new(QName::new("urn:a", "truck"), QName::new("urn:a", "Truck"));
        truck.substitution_group = Some(QName::new("urn:a", "vehicle"));
        schema.elements.push(head.clone());
        schema.elements.push(car);
        schema.elements.push(truck);

        let mut schema_set = SchemaSet::new();
        schema_set.add_schema(schema);
        schema_set.resolve().unwrap();

        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&schema_set, &type_map, &namespace_map);
        let enclosing = QName::new("urn:a", "Fleet");
        let ctx = ParticleContext {
            resolver: &resolver,
            schema_set: &schema_set,
            current_namespace: "urn:a",
            enclosing_type: &enclosing,
        };
        let plan = translate_element(&head, Occurrence::once(), &ctx);
        match &plan.role {
            FieldRole::Choice { arms } => {
                assert_eq!(arms.len(), 2);
                assert!(arms.iter().all(|arm| arm.xml_name.is_some()));
            }
            _ => panic!("expected a choice-shaped field"),
        }
    }

    #[test]
    fn conditional_type_assignment_collapses_to_default_alternative() {
        let schema_set = SchemaSet::new();
        let type_map = TypeMap::defaults();
        let namespace_map = HashMap::new();
        let resolver = TypeResolver::new(&schema_set, &type_map, &namespace_map);
        let enclosing = QName::new("urn:a", "Order");
        let ctx = ParticleContext {
            resolver: &resolver,
            schema_set: &schema_set,
            current_namespace: "urn:a",
            enclosing_type: &enclosing,
        };
        let mut decl = required("amount");
        decl.type_alternatives.push(xbc_ir::TypeAlternative {
            test: Some("@currency = 'USD'".to_string()),
            type_name: QName::new(xbc_ir::XSD_NAMESPACE, "decimal"),
        });
        decl.type_alternatives.push(xbc_ir::TypeAlternative {
            test: None,
            type_name: QName::new(xbc_ir::XSD_NAMESPACE, "string"),
        });
        let plan = translate_element(&decl, Occurrence::once(), &ctx);
        assert_eq!(plan.field.type_expr, "String");
    }
}
