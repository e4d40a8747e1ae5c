//! Projects a parsed DTD onto the Schema IR.

use std::collections::HashMap;

use xbc_ir::group::{Compositor, MaxOccurs, ModelGroup, Occurrence, Particle, Term};
use xbc_ir::{
    AttributeUse, ComplexContent, ComplexType, ContentType, Derivation, ElementDecl as SchemaElementDecl, FacetSet, QName,
    Schema, SimpleContent, SimpleType, Variety, XSD_NAMESPACE,
};

use crate::ir::{AttDef, AttType, ContentParticle, ContentSpec, DefaultDecl, Doctype, GroupKind, Quantifier};

fn builtin(local: &str) -> QName {
    QName::new(XSD_NAMESPACE, local)
}

/// DTDs have no namespaces; every translated declaration lands in the
/// unqualified (empty) namespace.
pub fn translate(doctype: &Doctype) -> Schema {
    let mut schema = Schema::new(String::new());
    let attlists: HashMap<&str, &[AttDef]> = doctype
        .attlists
        .iter()
        .map(|a| (a.element_name.as_str(), a.attributes.as_slice()))
        .collect();

    for element in &doctype.elements {
        let qname = QName::unqualified(element.name.clone());
        let mut attribute_uses = Vec::new();
        if let Some(defs) = attlists.get(element.name.as_str()) {
            for def in *defs {
                attribute_uses.push(translate_attribute(def, &mut schema));
            }
        }

        let type_name = match &element.content_spec {
            ContentSpec::PcdataOnly if attribute_uses.is_empty() => builtin("string"),
            _ => {
                let type_qname = QName::unqualified(format!("{}Type", element.name));
                let complex_type = translate_complex_type(type_qname.clone(), &element.content_spec, attribute_uses);
                schema.complex_types.push(complex_type);
                type_qname
            }
        };
        schema.elements.push(SchemaElementDecl::new(qname, type_name));
    }

    schema
}

fn translate_complex_type(name: QName, content_spec: &ContentSpec, attribute_uses: Vec<AttributeUse>) -> ComplexType {
    match content_spec {
        ContentSpec::Empty => {
            let mut complex_type = ComplexType::new(name, ContentType::Empty);
            complex_type.attribute_uses = attribute_uses;
            complex_type
        }
        // `ANY` has no structural counterpart in the Schema IR; approximated
        // as empty content, matching the documented limitation for this
        // content kind.
        ContentSpec::Any => {
            tracing::warn!(type_name = %name, "ANY content approximated as empty content");
            let mut complex_type = ComplexType::new(name, ContentType::Empty);
            complex_type.attribute_uses = attribute_uses;
            complex_type
        }
        ContentSpec::PcdataOnly => {
            let mut complex_type = ComplexType::new(
                name,
                ContentType::Simple(SimpleContent {
                    base_type: builtin("string"),
                    derivation: Derivation::Restriction,
                    facet_set: FacetSet::default(),
                }),
            );
            complex_type.attribute_uses = attribute_uses;
            complex_type
        }
        ContentSpec::Mixed(_) => {
            // Mixed content with named children has no faithful particle
            // model in this translator; the mixed flag is set and the
            // children are left unvalidated (documented limitation).
            let mut complex_type = ComplexType::new(
                name,
                ContentType::Mixed(ComplexContent {
                    base_type: QName::default(),
                    derivation: Derivation::Restriction,
                    model_group: None,
                }),
            );
            complex_type.mixed = true;
            complex_type.attribute_uses = attribute_uses;
            complex_type
        }
        ContentSpec::Children(particle) => {
            let model_group = translate_particle_as_group(particle);
            let mut complex_type = ComplexType::new(
                name,
                ContentType::ElementOnly(ComplexContent {
                    base_type: QName::default(),
                    derivation: Derivation::Restriction,
                    model_group: Some(model_group),
                }),
            );
            complex_type.attribute_uses = attribute_uses;
            complex_type
        }
    }
}

fn translate_particle_as_group(particle: &ContentParticle) -> ModelGroup {
    let top = translate_particle(particle);
    match top.term {
        Term::Group(group) => *group,
        other => ModelGroup {
            compositor: Compositor::Sequence,
            particles: vec![Particle {
                occurrence: top.occurrence,
                term: other,
            }],
        },
    }
}

fn translate_particle(particle: &ContentParticle) -> Particle {
    match particle {
        ContentParticle::Name(name, quantifier) => Particle {
            occurrence: translate_quantifier(*quantifier),
            term: Term::ElementRef(QName::unqualified(name.clone())),
        },
        ContentParticle::Group { kind, items, quantifier } => {
            let compositor = match kind {
                GroupKind::Sequence => Compositor::Sequence,
                GroupKind::Choice => Compositor::Choice,
            };
            let particles = items.iter().map(translate_particle).collect();
            Particle {
                occurrence: translate_quantifier(*quantifier),
                term: Term::Group(Box::new(ModelGroup { compositor, particles })),
            }
        }
    }
}

fn translate_quantifier(quantifier: Quantifier) -> Occurrence {
    match quantifier {
        Quantifier::One => Occurrence::once(),
        Quantifier::ZeroOrOne => Occurrence {
            min_occurs: 0,
            max_occurs: MaxOccurs::Bounded(1),
        },
        Quantifier::ZeroOrMore => Occurrence {
            min_occurs: 0,
            max_occurs: MaxOccurs::Unbounded,
        },
        Quantifier::OneOrMore => Occurrence {
            min_occurs: 1,
            max_occurs: MaxOccurs::Unbounded,
        },
    }
}

fn translate_attribute(def: &AttDef, schema: &mut Schema) -> AttributeUse {
    let name = QName::unqualified(def.name.clone());
    let type_name = translate_att_type(&def.name, &def.att_type, schema);
    let (required, default, fixed) = match &def.default {
        DefaultDecl::Required => (true, None, None),
        DefaultDecl::Implied => (false, None, None),
        DefaultDecl::Fixed(value) => (false, None, Some(value.clone())),
        DefaultDecl::Value(value) => (false, Some(value.clone()), None),
    };
    AttributeUse {
        name,
        type_name,
        required,
        default,
        fixed,
    }
}

fn translate_att_type(attr_name: &str, att_type: &AttType, schema: &mut Schema) -> QName {
    match att_type {
        AttType::CData => builtin("string"),
        AttType::Id => builtin("ID"),
        AttType::IdRef => builtin("IDREF"),
        AttType::IdRefs => builtin("IDREFS"),
        AttType::Entity => builtin("ENTITY"),
        AttType::Entities => builtin("ENTITIES"),
        AttType::Nmtoken => builtin("NMTOKEN"),
        AttType::Nmtokens => builtin("NMTOKENS"),
        AttType::Enumeration(values) => synthesize_enumeration(attr_name, builtin("string"), values, schema),
        AttType::Notation(values) => synthesize_enumeration(attr_name, builtin("NOTATION"), values, schema),
    }
}

fn synthesize_enumeration(attr_name: &str, base_type: QName, values: &[String], schema: &mut Schema) -> QName {
    let qname = QName::unqualified(format!("{attr_name}_type"));
    let mut facet_set = FacetSet::default();
    facet_set.enumeration = values.to_vec();
    schema.simple_types.push(SimpleType {
        name: qname.clone(),
        variety: Variety::Atomic,
        base_type,
        facet_set,
        item_type: None,
        member_types: Vec::new(),
        assertions: Vec::new(),
    });
    qname
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_dtd;

    fn translate_source(source: &str) -> Schema {
        translate(&parse_dtd(source).unwrap())
    }

    #[test]
    fn empty_element_gets_empty_content_type() {
        let schema = translate_source("<!ELEMENT br EMPTY>");
        let br = &schema.elements[0];
        let br_type = schema.complex_types.iter().find(|t| t.name == br.type_name).unwrap();
        assert_eq!(br_type.content_type, ContentType::Empty);
    }

    #[test]
    fn pcdata_only_element_gets_string_type() {
        let schema = translate_source("<!ELEMENT name (#PCDATA)>");
        assert_eq!(schema.elements[0].type_name, builtin("string"));
        assert!(schema.complex_types.is_empty());
    }

    #[test]
    fn children_content_model_becomes_sequence() {
        let schema = translate_source("<!ELEMENT book (title, author+, chapter*)>");
        let book = &schema.elements[0];
        let book_type = schema.complex_types.iter().find(|t| t.name == book.type_name).unwrap();
        match &book_type.content_type {
            ContentType::ElementOnly(content) => {
                let group = content.model_group.as_ref().unwrap();
                assert_eq!(group.compositor, Compositor::Sequence);
                assert_eq!(group.particles.len(), 3);
                assert_eq!(group.particles[1].occurrence.min_occurs, 1);
                assert_eq!(group.particles[1].occurrence.max_occurs, MaxOccurs::Unbounded);
            }
            other => panic!("expected element-only content, got {other:?}"),
        }
    }

    #[test]
    fn enumeration_attribute_becomes_synthetic_simple_type() {
        let schema = translate_source(
            r#"<!ELEMENT book (title)>
               <!ATTLIST book status (draft|final) "draft">"#,
        );
        let book = &schema.elements[0];
        let book_type = schema.complex_types.iter().find(|t| t.name == book.type_name).unwrap();
        let status = &book_type.attribute_uses[0];
        assert_eq!(status.default, Some("draft".to_string()));
        let simple_type = schema.simple_types.iter().find(|t| t.name == status.type_name).unwrap();
        assert_eq!(simple_type.facet_set.enumeration, vec!["draft".to_string(), "final".to_string()]);
    }

    #[test]
    fn required_attribute_is_required() {
        let schema = translate_source(
            r#"<!ELEMENT book (title)>
               <!ATTLIST book id ID #REQUIRED>"#,
        );
        let book = &schema.elements[0];
        let book_type = schema.complex_types.iter().find(|t| t.name == book.type_name).unwrap();
        assert!(book_type.attribute_uses[0].required);
        assert_eq!(book_type.attribute_uses[0].type_name, builtin("ID"));
    }
}
