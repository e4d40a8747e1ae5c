//! Single-pass translation of XSD 1.1 element syntax into [`xbc_ir`] types.
//!
//! Each XSD element name is handled by one function that consumes its
//! attributes, descends into its children, and reduces to an IR node —
//! there is no intermediate tree; `roxmltree`'s already-parsed DOM stands
//! in for the pull reader's cursor.

use roxmltree::Node;

use xbc_ir::group::{
    AttributeGroupDef, Compositor, MaxOccurs, ModelGroup, NamespaceConstraint, Occurrence,
    OpenContent, OpenContentMode, Particle, ProcessContents, Term, Wildcard,
};
use xbc_ir::{
    AttributeDecl, AttributeUse, ComplexContent, ComplexType, ContentType, Derivation,
    ElementDecl, FacetSet, Import, Include, ModelGroupDef, QName, Schema, SimpleContent,
    SimpleType, TypeAlternative, Variety, XSD_NAMESPACE,
};

use crate::error::Error;

pub fn parse_schema(source: &str) -> Result<Schema, Error> {
    let document = roxmltree::Document::parse(source)?;
    let root = document.root_element();
    if root.tag_name().name() != "schema" || root.tag_name().namespace() != Some(XSD_NAMESPACE) {
        return Err(Error::NotASchema(root.tag_name().name().to_string()));
    }

    let target_namespace = root.attribute("targetNamespace").unwrap_or("").to_string();
    let mut schema = Schema::new(target_namespace.clone());

    // Each arm computes its declaration with `&mut schema` available (for
    // any anonymous types it needs to register) before pushing, since the
    // push itself also needs `&mut schema`.
    for child in xsd_children(root) {
        match child.tag_name().name() {
            "import" => schema.imports.push(parse_import(child)),
            "include" => schema.includes.push(parse_include(child)?),
            "element" => {
                let decl = parse_global_element(child, &target_namespace, &mut schema)?;
                schema.elements.push(decl);
            }
            "attribute" => {
                let decl = parse_global_attribute(child, &target_namespace, &mut schema)?;
                schema.attributes.push(decl);
            }
            "simpleType" => {
                let name = required_attribute(child, "name")?.to_string();
                let simple_type = parse_named_simple_type(child, &target_namespace, &name, &mut schema)?;
                schema.simple_types.push(simple_type);
            }
            "complexType" => {
                let name = required_attribute(child, "name")?.to_string();
                let complex_type = parse_named_complex_type(child, &target_namespace, &name, &mut schema)?;
                schema.complex_types.push(complex_type);
            }
            "group" => {
                let group_def = parse_group_def(child, &target_namespace, &mut schema)?;
                schema.model_groups.push(group_def);
            }
            "attributeGroup" => {
                let group_def = parse_attribute_group_def(child, &target_namespace, &mut schema)?;
                schema.attribute_groups.push(group_def);
            }
            "defaultOpenContent" => {
                let applies_to_empty = bool_attribute(child, "appliesToEmpty", false);
                schema.default_open_content =
                    Some((parse_open_content_body(child)?, applies_to_empty));
            }
            "notation" | "annotation" | "redefine" => {
                tracing::debug!(element = child.tag_name().name(), "skipping unsupported top-level element");
            }
            other => {
                tracing::debug!(element = other, "skipping foreign-namespace or unknown element");
            }
        }
    }

    Ok(schema)
}

fn xsd_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|c| c.is_element() && c.tag_name().namespace() == Some(XSD_NAMESPACE))
}

fn required_attribute<'a>(node: Node<'a, '_>, attribute: &'static str) -> Result<&'a str, Error> {
    node.attribute(attribute).ok_or_else(|| Error::MissingAttribute {
        element: node.tag_name().name().to_string(),
        attribute,
    })
}

fn bool_attribute(node: Node, attribute: &str, default: bool) -> bool {
    match node.attribute(attribute) {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

fn synthetic_type_name(enclosing_local_name: &str) -> String {
    format!("{enclosing_local_name}_type")
}

/// Resolves a possibly-prefixed QName value (e.g. `xs:string`, or an
/// unprefixed `string` under a default namespace) against the namespace
/// scope visible at `context`.
fn resolve_qname_value(value: &str, context: Node) -> Result<QName, Error> {
    match value.split_once(':') {
        Some((prefix, local)) => {
            let uri = context
                .lookup_namespace_uri(Some(prefix))
                .ok_or_else(|| Error::UnresolvedPrefix {
                    prefix: prefix.to_string(),
                    element: context.tag_name().name().to_string(),
                })?;
            Ok(QName::new(uri, local))
        }
        None => {
            let uri = context.lookup_namespace_uri(None).unwrap_or("");
            Ok(QName::new(uri, value))
        }
    }
}

fn parse_import(node: Node) -> Import {
    Import {
        namespace: node.attribute("namespace").unwrap_or("").to_string(),
        schema_location: node.attribute("schemaLocation").map(String::from),
    }
}

fn parse_include(node: Node) -> Result<Include, Error> {
    Ok(Include {
        schema_location: required_attribute(node, "schemaLocation")?.to_string(),
    })
}

fn parse_occurs(node: Node) -> Occurrence {
    let min_occurs = node
        .attribute("minOccurs")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let max_occurs = match node.attribute("maxOccurs") {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(v) => MaxOccurs::Bounded(v.parse().unwrap_or(1)),
        None => MaxOccurs::Bounded(1),
    };
    Occurrence { min_occurs, max_occurs }
}

fn parse_wildcard(node: Node) -> Wildcard {
    let namespace_constraint = match node.attribute("namespace") {
        None | Some("##any") => NamespaceConstraint::Any,
        Some("##other") => NamespaceConstraint::Other,
        Some(list) => NamespaceConstraint::Enumerated(
            list.split_whitespace().map(String::from).collect(),
        ),
    };
    let process_contents = match node.attribute("processContents") {
        Some("lax") => ProcessContents::Lax,
        Some("skip") => ProcessContents::Skip,
        _ => ProcessContents::Strict,
    };
    Wildcard {
        namespace_constraint,
        process_contents,
    }
}

fn parse_open_content_body(node: Node) -> Result<OpenContent, Error> {
    let mode = match node.attribute("mode") {
        Some("suffix") => OpenContentMode::Suffix,
        Some("none") => OpenContentMode::None,
        _ => OpenContentMode::Interleave,
    };
    let wildcard = xsd_children(node)
        .find(|c| c.tag_name().name() == "any")
        .map(parse_wildcard)
        .unwrap_or(Wildcard {
            namespace_constraint: NamespaceConstraint::Any,
            process_contents: ProcessContents::Strict,
        });
    Ok(OpenContent { mode, wildcard })
}

fn parse_facet_set(restriction_or_list: Node) -> FacetSet {
    let mut facets = FacetSet::default();
    for facet in xsd_children(restriction_or_list) {
        let value = facet.attribute("value").unwrap_or("");
        match facet.tag_name().name() {
            "enumeration" => facets.enumeration.push(value.to_string()),
            "pattern" => facets.pattern = Some(value.to_string()),
            "minInclusive" => facets.min_inclusive = Some(value.to_string()),
            "minExclusive" => facets.min_exclusive = Some(value.to_string()),
            "maxInclusive" => facets.max_inclusive = Some(value.to_string()),
            "maxExclusive" => facets.max_exclusive = Some(value.to_string()),
            "length" => facets.length = value.parse().ok(),
            "minLength" => facets.min_length = value.parse().ok(),
            "maxLength" => facets.max_length = value.parse().ok(),
            "totalDigits" => facets.total_digits = value.parse().ok(),
            "fractionDigits" => facets.fraction_digits = value.parse().ok(),
            _ => {}
        }
    }
    facets
}

fn parse_assertions(node: Node, child_name: &str) -> Vec<xbc_ir::Assertion> {
    xsd_children(node)
        .filter(|c| c.tag_name().name() == child_name)
        .filter_map(|c| c.attribute("test"))
        .map(|test| xbc_ir::Assertion(test.to_string()))
        .collect()
}

/// Parses a `<simpleType>` body (variety-selecting child: `restriction`,
/// `list`, or `union`) into a named [`SimpleType`].
fn parse_named_simple_type(node: Node, target_namespace: &str, name: &str, schema: &mut Schema) -> Result<SimpleType, Error> {
    let qname = QName::new(target_namespace, name);
    parse_simple_type_body(node, qname, schema)
}

fn parse_simple_type_body(node: Node, qname: QName, schema: &mut Schema) -> Result<SimpleType, Error> {
    for child in xsd_children(node) {
        match child.tag_name().name() {
            "restriction" => {
                let base = child
                    .attribute("base")
                    .map(|b| resolve_qname_value(b, child))
                    .transpose()?
                    .unwrap_or_default();
                return Ok(SimpleType {
                    name: qname,
                    variety: Variety::Atomic,
                    base_type: base,
                    facet_set: parse_facet_set(child),
                    item_type: None,
                    member_types: Vec::new(),
                    assertions: parse_assertions(child, "assertion"),
                });
            }
            "list" => {
                let item_type = match child.attribute("itemType") {
                    Some(value) => resolve_qname_value(value, child)?,
                    None => QName::default(),
                };
                return Ok(SimpleType {
                    name: qname,
                    variety: Variety::List,
                    base_type: QName::default(),
                    facet_set: FacetSet::default(),
                    item_type: Some(item_type),
                    member_types: Vec::new(),
                    assertions: Vec::new(),
                });
            }
            "union" => {
                let mut member_types: Vec<QName> = child
                    .attribute("memberTypes")
                    .map(|list| {
                        list.split_whitespace()
                            .map(|name| resolve_qname_value(name, child))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .transpose()?
                    .unwrap_or_default();
                for inline in xsd_children(child).filter(|c| c.tag_name().name() == "simpleType") {
                    let inline_name = QName::new(
                        qname.namespace_uri.clone(),
                        format!("{}_member{}", qname.local_name, member_types.len()),
                    );
                    member_types.push(inline_name.clone());
                    let member_type = parse_simple_type_body(inline, inline_name, schema)?;
                    schema.simple_types.push(member_type);
                }
                return Ok(SimpleType {
                    name: qname,
                    variety: Variety::Union,
                    base_type: QName::default(),
                    facet_set: FacetSet::default(),
                    item_type: None,
                    member_types,
                    assertions: Vec::new(),
                });
            }
            _ => continue,
        }
    }
    Ok(SimpleType::atomic(qname, QName::default()))
}

fn parse_global_element(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<ElementDecl, Error> {
    let name = required_attribute(node, "name")?;
    let qname = QName::new(target_namespace, name);
    parse_element_body(node, qname, target_namespace, schema)
}

fn parse_element_body(node: Node, qname: QName, target_namespace: &str, schema: &mut Schema) -> Result<ElementDecl, Error> {
    let type_name = if let Some(type_attr) = node.attribute("type") {
        resolve_qname_value(type_attr, node)?
    } else if let Some(inline) = xsd_children(node).find(|c| {
        matches!(c.tag_name().name(), "simpleType" | "complexType")
    }) {
        let synthetic = QName::new(target_namespace, synthetic_type_name(&qname.local_name));
        match inline.tag_name().name() {
            "simpleType" => {
                let simple_type = parse_simple_type_body(inline, synthetic.clone(), schema)?;
                schema.simple_types.push(simple_type);
            }
            "complexType" => {
                let complex_type = parse_complex_type_body(inline, synthetic.clone(), schema)?;
                schema.complex_types.push(complex_type);
            }
            _ => unreachable!(),
        }
        synthetic
    } else {
        QName::default()
    };

    let mut decl = ElementDecl::new(qname, type_name);
    decl.nillable = bool_attribute(node, "nillable", false);
    decl.is_abstract = bool_attribute(node, "abstract", false);
    decl.default = node.attribute("default").map(String::from);
    decl.fixed = node.attribute("fixed").map(String::from);
    decl.substitution_group = node
        .attribute("substitutionGroup")
        .map(|v| resolve_qname_value(v, node))
        .transpose()?;
    decl.type_alternatives = xsd_children(node)
        .filter(|c| c.tag_name().name() == "alternative")
        .map(|alt| -> Result<TypeAlternative, Error> {
            Ok(TypeAlternative {
                test: alt.attribute("test").map(String::from),
                type_name: alt
                    .attribute("type")
                    .map(|v| resolve_qname_value(v, alt))
                    .transpose()?
                    .unwrap_or_default(),
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(decl)
}

fn parse_global_attribute(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<AttributeDecl, Error> {
    let name = required_attribute(node, "name")?;
    let qname = QName::new(target_namespace, name);
    let type_name = if let Some(type_attr) = node.attribute("type") {
        resolve_qname_value(type_attr, node)?
    } else if let Some(inline) = xsd_children(node).find(|c| c.tag_name().name() == "simpleType") {
        let synthetic = QName::new(target_namespace, synthetic_type_name(&qname.local_name));
        let simple_type = parse_simple_type_body(inline, synthetic.clone(), schema)?;
        schema.simple_types.push(simple_type);
        synthetic
    } else {
        QName::default()
    };
    Ok(AttributeDecl {
        name: qname,
        type_name,
        default: node.attribute("default").map(String::from),
        fixed: node.attribute("fixed").map(String::from),
    })
}

fn parse_attribute_use(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<AttributeUse, Error> {
    if let Some(reference) = node.attribute("ref") {
        let name = resolve_qname_value(reference, node)?;
        let required = node.attribute("use") == Some("required");
        return Ok(AttributeUse {
            name: name.clone(),
            type_name: QName::default(),
            required,
            default: node.attribute("default").map(String::from),
            fixed: node.attribute("fixed").map(String::from),
        });
    }
    let name = required_attribute(node, "name")?;
    let qname = QName::new(target_namespace, name);
    let type_name = if let Some(type_attr) = node.attribute("type") {
        resolve_qname_value(type_attr, node)?
    } else if let Some(inline) = xsd_children(node).find(|c| c.tag_name().name() == "simpleType") {
        let synthetic = QName::new(target_namespace, synthetic_type_name(&qname.local_name));
        let simple_type = parse_simple_type_body(inline, synthetic.clone(), schema)?;
        schema.simple_types.push(simple_type);
        synthetic
    } else {
        QName::default()
    };
    Ok(AttributeUse {
        name: qname,
        type_name,
        required: node.attribute("use") == Some("required"),
        default: node.attribute("default").map(String::from),
        fixed: node.attribute("fixed").map(String::from),
    })
}

fn parse_group_def(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<ModelGroupDef, Error> {
    let name = required_attribute(node, "name")?;
    let qname = QName::new(target_namespace, name);
    let compositor_node = xsd_children(node)
        .find(|c| matches!(c.tag_name().name(), "sequence" | "choice" | "all"));
    let group = match compositor_node {
        Some(n) => parse_model_group(n, target_namespace, schema)?,
        None => ModelGroup {
            compositor: Compositor::Sequence,
            particles: Vec::new(),
        },
    };
    Ok(ModelGroupDef { name: qname, group })
}

fn parse_attribute_group_def(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<AttributeGroupDef, Error> {
    let name = required_attribute(node, "name")?;
    let qname = QName::new(target_namespace, name);
    let mut attribute_uses = Vec::new();
    let mut attribute_group_refs = Vec::new();
    let mut attribute_wildcard = None;
    for child in xsd_children(node) {
        match child.tag_name().name() {
            "attribute" => attribute_uses.push(parse_attribute_use(child, target_namespace, schema)?),
            "attributeGroup" => {
                attribute_group_refs.push(resolve_qname_value(required_attribute(child, "ref")?, child)?)
            }
            "anyAttribute" => attribute_wildcard = Some(parse_wildcard(child)),
            _ => {}
        }
    }
    Ok(AttributeGroupDef {
        name: qname,
        attribute_uses,
        attribute_group_refs,
        attribute_wildcard,
    })
}

fn parse_model_group(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<ModelGroup, Error> {
    let compositor = match node.tag_name().name() {
        "sequence" => Compositor::Sequence,
        "choice" => Compositor::Choice,
        "all" => Compositor::All,
        other => {
            return Err(Error::InvalidAttributeValue {
                element: node.tag_name().name().to_string(),
                attribute: "compositor",
                value: other.to_string(),
            })
        }
    };
    let mut particles = Vec::new();
    for child in xsd_children(node) {
        if let Some(particle) = parse_particle(child, target_namespace, schema)? {
            particles.push(particle);
        }
    }
    Ok(ModelGroup { compositor, particles })
}

fn parse_particle(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<Option<Particle>, Error> {
    let occurrence = parse_occurs(node);
    let term = match node.tag_name().name() {
        "element" => {
            if let Some(reference) = node.attribute("ref") {
                Term::ElementRef(resolve_qname_value(reference, node)?)
            } else {
                let name = required_attribute(node, "name")?;
                let qname = QName::new(target_namespace, name);
                Term::Element(Box::new(parse_element_body(node, qname, target_namespace, schema)?))
            }
        }
        "group" => Term::GroupRef(resolve_qname_value(required_attribute(node, "ref")?, node)?),
        "any" => Term::Wildcard(parse_wildcard(node)),
        "sequence" | "choice" | "all" => {
            Term::Group(Box::new(parse_model_group(node, target_namespace, schema)?))
        }
        _ => return Ok(None),
    };
    Ok(Some(Particle { occurrence, term }))
}

fn parse_named_complex_type(node: Node, target_namespace: &str, name: &str, schema: &mut Schema) -> Result<ComplexType, Error> {
    let qname = QName::new(target_namespace, name);
    parse_complex_type_body(node, qname, schema)
}

fn parse_complex_type_body(node: Node, qname: QName, schema: &mut Schema) -> Result<ComplexType, Error> {
    let target_namespace = qname.namespace_uri.clone();
    let is_abstract = bool_attribute(node, "abstract", false);
    let mixed = bool_attribute(node, "mixed", false);

    let simple_content_node = xsd_children(node).find(|c| c.tag_name().name() == "simpleContent");
    let complex_content_node = xsd_children(node).find(|c| c.tag_name().name() == "complexContent");

    let (content_type, attribute_uses, attribute_group_refs, attribute_wildcard) =
        if let Some(simple) = simple_content_node {
            parse_simple_content(simple, &target_namespace, schema)?
        } else if let Some(complex) = complex_content_node {
            parse_complex_content(complex, &target_namespace, mixed, schema)?
        } else {
            // Implicit complexContent: particle model and attributes appear
            // directly under <complexType>.
            let model_group = xsd_children(node)
                .find(|c| matches!(c.tag_name().name(), "sequence" | "choice" | "all"))
                .map(|n| parse_model_group(n, &target_namespace, schema))
                .transpose()?;
            let content = ComplexContent {
                base_type: QName::default(),
                derivation: Derivation::Restriction,
                model_group,
            };
            let content_type = if mixed {
                ContentType::Mixed(content)
            } else if matches!(content.model_group, None) {
                ContentType::Empty
            } else {
                ContentType::ElementOnly(content)
            };
            let (uses, group_refs, wildcard) = parse_attribute_children(node, &target_namespace, schema)?;
            (content_type, uses, group_refs, wildcard)
        };

    let open_content = xsd_children(node)
        .find(|c| c.tag_name().name() == "openContent")
        .map(parse_open_content_body)
        .transpose()?;

    Ok(ComplexType {
        name: qname,
        is_abstract,
        mixed,
        content_type,
        attribute_uses,
        attribute_group_refs,
        attribute_wildcard,
        open_content,
        assertions: parse_assertions(node, "assert"),
    })
}

type AttributeParts = (Vec<AttributeUse>, Vec<QName>, Option<Wildcard>);

fn parse_attribute_children(node: Node, target_namespace: &str, schema: &mut Schema) -> Result<AttributeParts, Error> {
    let mut attribute_uses = Vec::new();
    let mut attribute_group_refs = Vec::new();
    let mut attribute_wildcard = None;
    for child in xsd_children(node) {
        match child.tag_name().name() {
            "attribute" => attribute_uses.push(parse_attribute_use(child, target_namespace, schema)?),
            "attributeGroup" => {
                attribute_group_refs.push(resolve_qname_value(required_attribute(child, "ref")?, child)?)
            }
            "anyAttribute" => attribute_wildcard = Some(parse_wildcard(child)),
            _ => {}
        }
    }
    Ok((attribute_uses, attribute_group_refs, attribute_wildcard))
}

fn parse_simple_content(
    node: Node,
    target_namespace: &str,
    schema: &mut Schema,
) -> Result<(ContentType, Vec<AttributeUse>, Vec<QName>, Option<Wildcard>), Error> {
    let derivation_node = xsd_children(node)
        .find(|c| matches!(c.tag_name().name(), "restriction" | "extension"))
        .ok_or_else(|| Error::MissingAttribute {
            element: "simpleContent".to_string(),
            attribute: "restriction|extension",
        })?;
    let derivation = if derivation_node.tag_name().name() == "extension" {
        Derivation::Extension
    } else {
        Derivation::Restriction
    };
    let base_type = resolve_qname_value(required_attribute(derivation_node, "base")?, derivation_node)?;
    let facet_set = parse_facet_set(derivation_node);
    let (attribute_uses, attribute_group_refs, attribute_wildcard) =
        parse_attribute_children(derivation_node, target_namespace, schema)?;
    Ok((
        ContentType::Simple(SimpleContent {
            base_type,
            derivation,
            facet_set,
        }),
        attribute_uses,
        attribute_group_refs,
        attribute_wildcard,
    ))
}

fn parse_complex_content(
    node: Node,
    target_namespace: &str,
    mixed_on_type: bool,
    schema: &mut Schema,
) -> Result<(ContentType, Vec<AttributeUse>, Vec<QName>, Option<Wildcard>), Error> {
    let mixed = bool_attribute(node, "mixed", mixed_on_type);
    let derivation_node = xsd_children(node)
        .find(|c| matches!(c.tag_name().name(), "restriction" | "extension"))
        .ok_or_else(|| Error::MissingAttribute {
            element: "complexContent".to_string(),
            attribute: "restriction|extension",
        })?;
    let derivation = if derivation_node.tag_name().name() == "extension" {
        Derivation::Extension
    } else {
        Derivation::Restriction
    };
    let base_type = resolve_qname_value(required_attribute(derivation_node, "base")?, derivation_node)?;
    let model_group = xsd_children(derivation_node)
        .find(|c| matches!(c.tag_name().name(), "sequence" | "choice" | "all"))
        .map(|n| parse_model_group(n, target_namespace, schema))
        .transpose()?;
    let (attribute_uses, attribute_group_refs, attribute_wildcard) =
        parse_attribute_children(derivation_node, target_namespace, schema)?;
    let content = ComplexContent {
        base_type,
        derivation,
        model_group,
    };
    let content_type = if mixed {
        ContentType::Mixed(content)
    } else {
        ContentType::ElementOnly(content)
    };
    Ok((content_type, attribute_uses, attribute_group_refs, attribute_wildcard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_target_namespace_and_global_element() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"
                              targetNamespace="http://example.com/order">
            <element name="root" type="string"/>
        </schema>"#;
        let schema = parse_schema(xml).unwrap();
        assert_eq!(schema.target_namespace, "http://example.com/order");
        assert_eq!(schema.elements.len(), 1);
        assert_eq!(schema.elements[0].name.local_name, "root");
    }

    #[test]
    fn parses_complex_type_with_sequence_and_attributes() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"
                              xmlns:xs="http://www.w3.org/2001/XMLSchema"
                              targetNamespace="http://example.com/order">
            <complexType name="OrderType">
                <sequence>
                    <element name="symbol" type="xs:string"/>
                    <element name="quantity" type="xs:int"/>
                    <element name="price" type="xs:double" minOccurs="0"/>
                </sequence>
                <attribute name="id" type="xs:string" use="required"/>
            </complexType>
        </schema>"#;
        let schema = parse_schema(xml).unwrap();
        assert_eq!(schema.complex_types.len(), 1);
        let order_type = &schema.complex_types[0];
        assert_eq!(order_type.attribute_uses.len(), 1);
        assert!(order_type.attribute_uses[0].required);
        match &order_type.content_type {
            ContentType::ElementOnly(content) => {
                let group = content.model_group.as_ref().unwrap();
                assert_eq!(group.compositor, Compositor::Sequence);
                assert_eq!(group.particles.len(), 3);
            }
            other => panic!("expected element-only content, got {other:?}"),
        }
    }

    #[test]
    fn synthesizes_name_for_anonymous_inline_type() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"
                              targetNamespace="http://example.com/order">
            <element name="side">
                <simpleType>
                    <restriction base="string">
                        <enumeration value="Buy"/>
                        <enumeration value="Sell"/>
                    </restriction>
                </simpleType>
            </element>
        </schema>"#;
        let schema = parse_schema(xml).unwrap();
        assert_eq!(schema.elements[0].type_name.local_name, "side_type");
        assert_eq!(schema.simple_types.len(), 1);
        assert_eq!(schema.simple_types[0].facet_set.enumeration, vec!["Buy", "Sell"]);
    }

    #[test]
    fn synthesizes_name_for_anonymous_attribute_type() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"
                              targetNamespace="http://example.com/order">
            <complexType name="OrderType">
                <attribute name="status">
                    <simpleType>
                        <restriction base="string">
                            <enumeration value="open"/>
                            <enumeration value="closed"/>
                        </restriction>
                    </simpleType>
                </attribute>
            </complexType>
        </schema>"#;
        let schema = parse_schema(xml).unwrap();
        let order_type = &schema.complex_types[0];
        assert_eq!(order_type.attribute_uses[0].type_name.local_name, "status_type");
        assert_eq!(schema.simple_types.len(), 1);
        assert_eq!(schema.simple_types[0].facet_set.enumeration, vec!["open", "closed"]);
    }

    #[test]
    fn parses_import_and_include_without_following_them() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
            <import namespace="urn:other" schemaLocation="other.xsd"/>
            <include schemaLocation="shared.xsd"/>
        </schema>"#;
        let schema = parse_schema(xml).unwrap();
        assert_eq!(schema.imports.len(), 1);
        assert_eq!(schema.imports[0].namespace, "urn:other");
        assert_eq!(schema.includes.len(), 1);
    }

    #[test]
    fn unresolved_prefix_is_a_parse_error() {
        let xml = r#"<schema xmlns="http://www.w3.org/2001/XMLSchema">
            <element name="root" type="bogus:Foo"/>
        </schema>"#;
        assert!(parse_schema(xml).is_err());
    }
}
