//! Projects a simplified RELAX NG grammar onto the Schema IR.

use std::collections::HashMap;

use xbc_ir::group::{Compositor, MaxOccurs, ModelGroup, Occurrence, Particle, Term};
use xbc_ir::{
    AttributeUse, ComplexContent, ComplexType, ContentType, Derivation, ElementDecl, FacetSet,
    QName, Schema, SimpleType, Variety, XSD_NAMESPACE,
};

use crate::error::Error;
use crate::ir::{GrammarPattern, NameClass, Pattern};

struct TranslateCtx<'a> {
    defines: HashMap<&'a str, &'a Pattern>,
    target_namespace: String,
    global_elements: HashMap<&'a str, QName>,
}

pub fn translate(grammar: &GrammarPattern) -> Result<Schema, Error> {
    let target_namespace = find_first_element_ns(grammar).unwrap_or_default();
    let mut schema = Schema::new(target_namespace.clone());

    let defines: HashMap<&str, &Pattern> = grammar.defines.iter().map(|d| (d.name.as_str(), &d.body)).collect();
    let mut global_elements = HashMap::new();
    for define in &grammar.defines {
        if let Pattern::Element(name_class, _) = &define.body {
            if let Ok((ns, local)) = specific_name(name_class) {
                global_elements.insert(define.name.as_str(), QName::new(ns, local));
            }
        }
    }

    let mut ctx = TranslateCtx {
        defines,
        target_namespace,
        global_elements,
    };

    for define in &grammar.defines {
        if let Pattern::Element(name_class, content) = &define.body {
            let decl = translate_element(name_class, content, &mut ctx, &mut schema)?;
            schema.elements.push(decl);
        }
    }

    if let Some(start) = &grammar.start {
        if let Pattern::Element(name_class, content) = start {
            let decl = translate_element(name_class, content, &mut ctx, &mut schema)?;
            schema.elements.push(decl);
        }
    }

    Ok(schema)
}

fn find_first_element_ns(grammar: &GrammarPattern) -> Option<String> {
    for define in &grammar.defines {
        if let Some(ns) = find_element_ns(&define.body) {
            return Some(ns);
        }
    }
    grammar.start.as_ref().and_then(find_element_ns)
}

fn find_element_ns(pattern: &Pattern) -> Option<String> {
    match pattern {
        Pattern::Element(NameClass::Specific { ns, .. }, _) => Some(ns.clone()),
        Pattern::Element(_, content) => find_element_ns(content),
        Pattern::Attribute(_, content) => find_element_ns(content),
        Pattern::Group(l, r) | Pattern::Interleave(l, r) | Pattern::Choice(l, r) => {
            find_element_ns(l).or_else(|| find_element_ns(r))
        }
        Pattern::OneOrMore(x) | Pattern::ZeroOrMore(x) | Pattern::Optional(x) | Pattern::Mixed(x) | Pattern::List(x) => {
            find_element_ns(x)
        }
        Pattern::Grammar(g) => find_first_element_ns(g),
        _ => None,
    }
}

fn specific_name(name_class: &NameClass) -> Result<(&str, &str), Error> {
    match name_class {
        NameClass::Specific { ns, local } => Ok((ns.as_str(), local.as_str())),
        _ => Err(Error::Syntax {
            line: 0,
            column: 0,
            message: "only specific (non-wildcard) name classes translate to Schema IR declarations".to_string(),
        }),
    }
}

fn builtin(local: &str) -> QName {
    QName::new(XSD_NAMESPACE, local)
}

/// Resolves a content pattern to a simple (text-only) type: the shared
/// logic behind attribute typing and simple-content elements.
fn translate_simple_type(pattern: &Pattern, ctx: &mut TranslateCtx, schema: &mut Schema, synthetic_hint: &str) -> QName {
    match pattern {
        Pattern::Text => builtin("string"),
        Pattern::Data { library, datatype, .. } => {
            if library.is_empty() {
                builtin(datatype)
            } else {
                // Non-XSD datatype libraries have no direct Schema IR
                // representation; approximate with xs:string.
                builtin("string")
            }
        }
        Pattern::Value { .. } => builtin("string"),
        Pattern::List(_) => builtin("string"),
        Pattern::Choice(_, _) => {
            let mut values = Vec::new();
            collect_choice_values(pattern, &mut values);
            if values.is_empty() {
                return builtin("string");
            }
            let qname = QName::new(ctx.target_namespace.clone(), format!("{synthetic_hint}_type"));
            let mut facet_set = FacetSet::default();
            facet_set.enumeration = values;
            schema.simple_types.push(SimpleType {
                name: qname.clone(),
                variety: Variety::Atomic,
                base_type: builtin("string"),
                facet_set,
                item_type: None,
                member_types: Vec::new(),
                assertions: Vec::new(),
            });
            qname
        }
        Pattern::Ref(name) => {
            let body = ctx.defines.get(name.as_str()).copied();
            match body {
                Some(inner) => translate_simple_type(inner, ctx, schema, synthetic_hint),
                None => builtin("string"),
            }
        }
        _ => builtin("string"),
    }
}

fn collect_choice_values(pattern: &Pattern, out: &mut Vec<String>) {
    match pattern {
        Pattern::Choice(l, r) => {
            collect_choice_values(l, out);
            collect_choice_values(r, out);
        }
        Pattern::Value { value, .. } => out.push(value.clone()),
        _ => out.clear(),
    }
}

fn translate_attribute(
    name_class: &NameClass,
    content: &Pattern,
    ctx: &mut TranslateCtx,
    schema: &mut Schema,
) -> Result<AttributeUse, Error> {
    let (ns, local) = specific_name(name_class)?;
    let name = QName::new(ns, local);
    let type_name = translate_simple_type(content, ctx, schema, local);
    Ok(AttributeUse {
        name,
        type_name,
        required: true,
        default: None,
        fixed: None,
    })
}

fn is_pure_text_content(pattern: &Pattern) -> bool {
    matches!(pattern, Pattern::Text | Pattern::Data { .. } | Pattern::Value { .. } | Pattern::List(_))
}

fn translate_element(
    name_class: &NameClass,
    content: &Pattern,
    ctx: &mut TranslateCtx,
    schema: &mut Schema,
) -> Result<ElementDecl, Error> {
    let (ns, local) = specific_name(name_class)?;
    let qname = QName::new(ns, local);

    let mut attribute_uses = Vec::new();
    let (particle, mixed) = translate_group(content, ctx, schema, &mut attribute_uses)?;

    let type_name = match (&particle, mixed) {
        (None, false) if attribute_uses.is_empty() && is_pure_text_content(content) => {
            translate_simple_type(content, ctx, schema, local)
        }
        _ => {
            let type_qname = QName::new(ctx.target_namespace.clone(), format!("{local}Type"));
            let model_group = particle.and_then(|p| match p.term {
                Term::Group(group) if p.occurrence == Occurrence::once() => Some(*group),
                other_term => Some(ModelGroup {
                    compositor: Compositor::Sequence,
                    particles: vec![Particle {
                        occurrence: p.occurrence,
                        term: other_term,
                    }],
                }),
            });
            let complex_content = ComplexContent {
                base_type: QName::default(),
                derivation: Derivation::Restriction,
                model_group,
            };
            let content_type = if mixed {
                ContentType::Mixed(complex_content)
            } else if complex_content.model_group.is_none() {
                ContentType::Empty
            } else {
                ContentType::ElementOnly(complex_content)
            };
            let mut complex_type = ComplexType::new(type_qname.clone(), content_type);
            complex_type.mixed = mixed;
            complex_type.attribute_uses = attribute_uses;
            schema.complex_types.push(complex_type);
            type_qname
        }
    };

    Ok(ElementDecl::new(qname, type_name))
}

/// Translates one content pattern into at most one [`Particle`], collecting
/// attribute contributions into `attrs_out` along the way. Returns
/// `(particle, mixed)` where `mixed` is set when an `interleave(x, text)`
/// (mixed's simplified form) is found at this level.
fn translate_group(
    pattern: &Pattern,
    ctx: &mut TranslateCtx,
    schema: &mut Schema,
    attrs_out: &mut Vec<AttributeUse>,
) -> Result<(Option<Particle>, bool), Error> {
    match pattern {
        Pattern::Empty | Pattern::NotAllowed => Ok((None, false)),
        Pattern::Text | Pattern::Data { .. } | Pattern::Value { .. } | Pattern::List(_) => Ok((None, false)),
        Pattern::Attribute(name_class, content) => {
            attrs_out.push(translate_attribute(name_class, content, ctx, schema)?);
            Ok((None, false))
        }
        Pattern::Element(name_class, content) => {
            let decl = translate_element(name_class, content, ctx, schema)?;
            Ok((
                Some(Particle {
                    occurrence: Occurrence::once(),
                    term: Term::Element(Box::new(decl)),
                }),
                false,
            ))
        }
        Pattern::Ref(name) => {
            if let Some(qname) = ctx.global_elements.get(name.as_str()).cloned() {
                Ok((
                    Some(Particle {
                        occurrence: Occurrence::once(),
                        term: Term::ElementRef(qname),
                    }),
                    false,
                ))
            } else if let Some(body) = ctx.defines.get(name.as_str()).copied() {
                translate_group(body, ctx, schema, attrs_out)
            } else {
                Err(Error::Syntax {
                    line: 0,
                    column: 0,
                    message: format!("reference to undefined pattern `{name}`"),
                })
            }
        }
        Pattern::Group(l, r) => {
            let (lp, lm) = translate_group(l, ctx, schema, attrs_out)?;
            let (rp, rm) = translate_group(r, ctx, schema, attrs_out)?;
            Ok((combine(Compositor::Sequence, lp, rp), lm || rm))
        }
        Pattern::Interleave(l, r) if **l == Pattern::Text => {
            let (rp, _) = translate_group(r, ctx, schema, attrs_out)?;
            Ok((rp, true))
        }
        Pattern::Interleave(l, r) if **r == Pattern::Text => {
            let (lp, _) = translate_group(l, ctx, schema, attrs_out)?;
            Ok((lp, true))
        }
        Pattern::Interleave(l, r) => {
            let (lp, lm) = translate_group(l, ctx, schema, attrs_out)?;
            let (rp, rm) = translate_group(r, ctx, schema, attrs_out)?;
            Ok((combine(Compositor::Interleave, lp, rp), lm || rm))
        }
        Pattern::Choice(l, r) if **r == Pattern::Empty => {
            let mut sub_attrs = Vec::new();
            let (lp, lm) = translate_group(l, ctx, schema, &mut sub_attrs)?;
            for attribute in &mut sub_attrs {
                attribute.required = false;
            }
            attrs_out.extend(sub_attrs);
            Ok((lp.map(make_optional), lm))
        }
        Pattern::Choice(l, r) if **l == Pattern::Empty => {
            let mut sub_attrs = Vec::new();
            let (rp, rm) = translate_group(r, ctx, schema, &mut sub_attrs)?;
            for attribute in &mut sub_attrs {
                attribute.required = false;
            }
            attrs_out.extend(sub_attrs);
            Ok((rp.map(make_optional), rm))
        }
        Pattern::Choice(l, r) => {
            let (lp, lm) = translate_group(l, ctx, schema, attrs_out)?;
            let (rp, rm) = translate_group(r, ctx, schema, attrs_out)?;
            Ok((combine(Compositor::Choice, lp, rp), lm || rm))
        }
        Pattern::OneOrMore(x) => {
            let (p, mixed) = translate_group(x, ctx, schema, attrs_out)?;
            Ok((
                p.map(|p| Particle {
                    occurrence: Occurrence {
                        min_occurs: 1,
                        max_occurs: MaxOccurs::Unbounded,
                    },
                    term: p.term,
                }),
                mixed,
            ))
        }
        Pattern::Mixed(_) | Pattern::ZeroOrMore(_) | Pattern::Optional(_) => Err(Error::Syntax {
            line: 0,
            column: 0,
            message: "translator received an un-simplified pattern; run simplify() first".to_string(),
        }),
        Pattern::ExternalRef { href, .. } => Err(Error::Syntax {
            line: 0,
            column: 0,
            message: format!("unresolved external reference `{href}`"),
        }),
        Pattern::Grammar(_) => Err(Error::Syntax {
            line: 0,
            column: 0,
            message: "nested grammar inside element content is not supported".to_string(),
        }),
    }
}

fn combine(compositor: Compositor, l: Option<Particle>, r: Option<Particle>) -> Option<Particle> {
    match (l, r) {
        (None, None) => None,
        (Some(p), None) | (None, Some(p)) => Some(p),
        (Some(l), Some(r)) => Some(Particle {
            occurrence: Occurrence::once(),
            term: Term::Group(Box::new(ModelGroup {
                compositor,
                particles: vec![l, r],
            })),
        }),
    }
}

fn make_optional(particle: Particle) -> Particle {
    Particle {
        occurrence: Occurrence {
            min_occurs: 0,
            max_occurs: particle.occurrence.max_occurs,
        },
        term: particle.term,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::parse;
    use crate::simplify::simplify_grammar;

    fn translate_compact(source: &str) -> Schema {
        let grammar = parse(source).unwrap();
        let simplified = simplify_grammar(grammar, None).unwrap();
        translate(&simplified).unwrap()
    }

    #[test]
    fn scenario_f_address_book() {
        let schema = translate_compact(
            r#"
            default namespace = "urn:test"
            start = element addressBook {
                element card {
                    attribute type { string },
                    element name { text },
                    element email { text }
                }+
            }
        "#,
        );
        assert_eq!(schema.target_namespace, "urn:test");
        assert_eq!(schema.elements.len(), 1);
        let address_book = schema.elements.iter().find(|e| e.name.local_name == "addressBook").unwrap();
        let book_type = schema
            .complex_types
            .iter()
            .find(|t| t.name == address_book.type_name)
            .unwrap();
        match &book_type.content_type {
            ContentType::ElementOnly(content) => {
                let group = content.model_group.as_ref().unwrap();
                assert_eq!(group.particles.len(), 1);
                assert_eq!(group.particles[0].occurrence.min_occurs, 1);
                assert_eq!(group.particles[0].occurrence.max_occurs, MaxOccurs::Unbounded);
            }
            other => panic!("expected element-only content, got {other:?}"),
        }
        let card_type = schema
            .complex_types
            .iter()
            .find(|t| t.name.local_name == "cardType")
            .unwrap();
        assert_eq!(card_type.attribute_uses.len(), 1);
        assert!(card_type.attribute_uses[0].required);
    }

    #[test]
    fn optional_element_gets_min_occurs_zero() {
        let schema = translate_compact(
            r#"
            default namespace = "urn:test"
            start = element root { element nickname { text }? }
        "#,
        );
        let root = schema.elements.iter().find(|e| e.name.local_name == "root").unwrap();
        let root_type = schema.complex_types.iter().find(|t| t.name == root.type_name).unwrap();
        match &root_type.content_type {
            ContentType::ElementOnly(content) => {
                let group = content.model_group.as_ref().unwrap();
                assert_eq!(group.particles[0].occurrence.min_occurs, 0);
            }
            other => panic!("expected element-only content, got {other:?}"),
        }
    }
}
