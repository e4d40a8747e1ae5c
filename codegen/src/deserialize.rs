//! Deserialization emission (spec §4.6.5): one `read_<T>` procedure per
//! complex type, assembled from the same field plan the serializer uses.
//! The generated function assumes the reader cursor already sits on this
//! element's own start tag (the same contract `AnyElement::read` uses),
//! reads its attributes, then its children up to the matching end tag.

use crate::naming::io_function;
use crate::particle::{Cardinality, ChoiceArm, FieldPlan, FieldRole};
use crate::resolver::Codec;
use crate::target::Declaration;

pub fn read_procedure(record_name: &str, function_name: &str, fields: &[FieldPlan]) -> Declaration {
    let mut body = String::new();

    for plan in fields {
        if let FieldRole::Attribute { xml_name, codec } = &plan.role {
            body.push_str(&read_attribute(
                &plan.field.name,
                &plan.field.type_expr,
                xml_name,
                plan.cardinality,
                *codec,
            ));
        }
    }

    let mut dispatch_arms = String::new();
    let mut characters_arm = String::new();
    let mut has_children_loop = false;

    for plan in fields {
        match &plan.role {
            FieldRole::Value { codec } => {
                body.push_str("let mut value_text = String::new();\n");
                characters_arm
                    .push_str("xbc_xml::NodeType::Characters => { if let Some(t) = reader.text() { value_text.push_str(t); } }\n");
                has_children_loop = true;
                let _ = codec;
            }
            FieldRole::Text => {
                body.push_str("let mut text: Option<String> = None;\n");
                characters_arm.push_str(
                    "xbc_xml::NodeType::Characters => { if let Some(t) = reader.text() { \
                     text = Some(text.take().unwrap_or_default() + t); } }\n",
                );
                has_children_loop = true;
            }
            FieldRole::Element { xml_name, codec } => {
                body.push_str(&local_decl(&plan.field.name, plan.cardinality));
                dispatch_arms.push_str(&element_dispatch_arm(
                    &plan.field.name,
                    &plan.field.type_expr,
                    xml_name,
                    plan.cardinality,
                    *codec,
                ));
                has_children_loop = true;
            }
            FieldRole::Wildcard => {
                body.push_str(&local_decl(&plan.field.name, plan.cardinality));
                dispatch_arms.push_str(&wildcard_dispatch_arm(&plan.field.name, plan.cardinality));
                has_children_loop = true;
            }
            FieldRole::Choice { arms } => {
                body.push_str(&format!("let mut {}: Option<{}> = None;\n", plan.field.name, plan.field.type_expr));
                dispatch_arms.push_str(&choice_dispatch_arms(&plan.field.name, arms));
                has_children_loop = true;
            }
            FieldRole::Attribute { .. } => {}
        }
    }

    if has_children_loop {
        body.push_str("let start_depth = reader.depth();\n");
        body.push_str("loop {\n");
        body.push_str("    if !reader.read()? { break; }\n");
        body.push_str("    match reader.node_type() {\n");
        if !dispatch_arms.is_empty() {
            body.push_str("        xbc_xml::NodeType::StartElement => {\n");
            body.push_str("            match reader.name() {\n");
            body.push_str(&dispatch_arms);
            body.push_str("                _ => { let _ = xbc_xml::AnyElement::read(reader)?; }\n");
            body.push_str("            }\n");
            body.push_str("        }\n");
        } else {
            body.push_str("        xbc_xml::NodeType::StartElement => { let _ = xbc_xml::AnyElement::read(reader)?; }\n");
        }
        if !characters_arm.is_empty() {
            body.push_str(&characters_arm);
        }
        body.push_str("        xbc_xml::NodeType::EndElement if reader.depth() == start_depth => break,\n");
        body.push_str("        _ => {}\n");
        body.push_str("    }\n");
        body.push_str("}\n");
    }

    body.push_str(&format!("Ok({record_name} {{\n"));
    for plan in fields {
        body.push_str(&format!("    {}: {},\n", plan.field.name, final_expr(plan)));
    }
    body.push_str("})\n");

    Declaration::Procedure {
        return_type: format!("Result<{record_name}, xbc_xml::Error>"),
        name: function_name.to_string(),
        params: "reader: &mut impl xbc_xml::XmlReader".to_string(),
        body,
        inline: false,
    }
}

fn scalar_parse(expr: &str, codec: Codec, value_type: &str) -> String {
    match codec {
        Codec::Scalar if value_type == "String" => expr.to_string(),
        Codec::Scalar => format!("{expr}.parse::<{value_type}>().map_err(|_| xbc_xml::Error::UnexpectedEof)?"),
        Codec::Runtime => format!("{value_type}::parse(&{expr}).map_err(|_| xbc_xml::Error::UnexpectedEof)?"),
        Codec::GeneratedSimple => {
            format!("{value_type}::from_string(&{expr}).map_err(|_| xbc_xml::Error::UnexpectedEof)?")
        }
        Codec::GeneratedComplex => expr.to_string(),
    }
}

fn read_attribute(
    field: &str,
    type_expr: &str,
    xml_name: &xbc_ir::QName,
    cardinality: Cardinality,
    codec: Codec,
) -> String {
    if xml_name.is_unset() {
        // The attribute-wildcard bucket: capture every attribute verbatim.
        return format!(
            "let mut {field} = Vec::new();\n\
             for i in 0..reader.attribute_count() {{\n\
                 if let (Some(name), Some(value)) = (reader.attribute_name(i), reader.attribute_value(i)) {{\n\
                     {field}.push((name, value.to_string()));\n\
                 }}\n\
             }}\n"
        );
    }
    let qname_expr = format!(
        "xbc_ir::QName::new({:?}, {:?})",
        xml_name.namespace_uri, xml_name.local_name
    );
    let raw = format!("raw_{field}");
    let value_type = inner_type(type_expr, cardinality);
    let parsed = scalar_parse(&raw, codec, value_type);
    match cardinality {
        Cardinality::Required => format!(
            "let {raw} = reader.attribute_value_by_name(&{qname_expr}).ok_or(xbc_xml::Error::UnexpectedEof)?.to_string();\n\
             let {field} = {parsed};\n"
        ),
        _ => format!(
            "let {field} = match reader.attribute_value_by_name(&{qname_expr}) {{\n\
                 Some({raw}) => {{ let {raw} = {raw}.to_string(); Some({parsed}) }}\n\
                 None => None,\n\
             }};\n"
        ),
    }
}

fn local_decl(field: &str, cardinality: Cardinality) -> String {
    match cardinality {
        Cardinality::Required => format!("let mut {field} = None;\n"),
        Cardinality::Optional => format!("let mut {field} = None;\n"),
        Cardinality::Vector => format!("let mut {field} = Vec::new();\n"),
        Cardinality::OwningPointer => format!("let mut {field} = None;\n"),
    }
}

fn final_expr(plan: &FieldPlan) -> String {
    match &plan.role {
        FieldRole::Attribute { xml_name, .. } if xml_name.is_unset() => plan.field.name.clone(),
        FieldRole::Attribute { .. } => plan.field.name.clone(),
        FieldRole::Value { codec } => scalar_parse("value_text", *codec, &plan.field.type_expr),
        FieldRole::Text => "text".to_string(),
        FieldRole::Element { .. } | FieldRole::Wildcard | FieldRole::Choice { .. } => match plan.cardinality {
            Cardinality::Required => format!("{}.ok_or(xbc_xml::Error::UnexpectedEof)?", plan.field.name),
            Cardinality::OwningPointer => format!("{}.map(Box::new)", plan.field.name),
            Cardinality::Optional | Cardinality::Vector => plan.field.name.clone(),
        },
    }
}

fn element_dispatch_arm(
    field: &str,
    type_expr: &str,
    xml_name: &xbc_ir::QName,
    cardinality: Cardinality,
    codec: Codec,
) -> String {
    let qname_expr = format!(
        "xbc_ir::QName::new({:?}, {:?})",
        xml_name.namespace_uri, xml_name.local_name
    );
    let value_type = inner_type(type_expr, cardinality);
    let read_expr = read_value_expr(value_type, codec);
    match cardinality {
        Cardinality::Required | Cardinality::Optional => format!(
            "                Some(name) if name == {qname_expr} => {{ {field} = Some({read_expr}); }}\n"
        ),
        Cardinality::Vector => format!(
            "                Some(name) if name == {qname_expr} => {{ {field}.push({read_expr}); }}\n"
        ),
        Cardinality::OwningPointer => format!(
            "                Some(name) if name == {qname_expr} => {{ {field} = Some({read_expr}); }}\n"
        ),
    }
}

fn read_value_expr(value_type: &str, codec: Codec) -> String {
    match codec {
        Codec::Scalar | Codec::Runtime | Codec::GeneratedSimple => {
            let text = "xbc_xml::read_element_text(reader)?";
            scalar_parse(text, codec, value_type)
        }
        Codec::GeneratedComplex => format!("{}(reader)?", io_function(value_type, "read")),
    }
}

/// Mirrors [`crate::serialize`]'s wrapper-stripping so the read side builds
/// the same bare element type from a wrapped field type.
fn inner_type<'a>(type_expr: &'a str, cardinality: Cardinality) -> &'a str {
    let strip = |wrapped: &'a str, wrapper: &str| -> &'a str {
        wrapped
            .strip_prefix(wrapper)
            .and_then(|s| s.strip_suffix('>'))
            .unwrap_or(wrapped)
    };
    match cardinality {
        Cardinality::Required => type_expr,
        Cardinality::Optional => strip(type_expr, "Option<"),
        Cardinality::Vector => strip(type_expr, "Vec<"),
        Cardinality::OwningPointer => strip(strip(type_expr, "Option<"), "Box<"),
    }
}

fn wildcard_dispatch_arm(field: &str, cardinality: Cardinality) -> String {
    match cardinality {
        Cardinality::Vector => {
            format!("                Some(_) => {{ {field}.push(xbc_xml::AnyElement::read(reader)?); }}\n")
        }
        _ => format!("                Some(_) => {{ {field} = Some(xbc_xml::AnyElement::read(reader)?); }}\n"),
    }
}

fn choice_dispatch_arms(field: &str, arms: &[ChoiceArm]) -> String {
    let mut out = String::new();
    for arm in arms {
        let Some(xml_name) = &arm.xml_name else {
            continue;
        };
        let qname_expr = format!(
            "xbc_ir::QName::new({:?}, {:?})",
            xml_name.namespace_uri, xml_name.local_name
        );
        let read_expr = read_value_expr(&arm.type_expr, arm.codec);
        out.push_str(&format!(
            "                Some(name) if name == {qname_expr} => {{ {field} = Some({}::{}({read_expr})); }}\n",
            arm.variant, arm.variant
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Field;
    use xbc_ir::QName;

    fn title_field() -> FieldPlan {
        FieldPlan {
            field: Field {
                type_expr: "String".to_string(),
                name: "title".to_string(),
                default: None,
            },
            role: FieldRole::Element {
                xml_name: QName::new("http://example.com/order", "title"),
                codec: Codec::Scalar,
            },
            cardinality: Cardinality::Required,
            uses: Vec::new(),
            extra_declarations: Vec::new(),
        }
    }

    #[test]
    fn builds_record_literal_from_dispatched_fields() {
        let declaration = read_procedure("Order", "read_order", &[title_field()]);
        match declaration {
            Declaration::Procedure { body, name, .. } => {
                assert_eq!(name, "read_order");
                assert!(body.contains("let start_depth = reader.depth();"));
                assert!(body.contains("title = Some(xbc_xml::read_element_text(reader)?);"));
                assert!(body.contains("title: title.ok_or(xbc_xml::Error::UnexpectedEof)?,"));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }

    #[test]
    fn required_attribute_reads_before_child_loop() {
        let attribute = FieldPlan {
            field: Field {
                type_expr: "i32".to_string(),
                name: "quantity".to_string(),
                default: None,
            },
            role: FieldRole::Attribute {
                xml_name: QName::unqualified("quantity"),
                codec: Codec::Scalar,
            },
            cardinality: Cardinality::Required,
            uses: Vec::new(),
            extra_declarations: Vec::new(),
        };
        let declaration = read_procedure("LineItem", "read_line_item", &[attribute, title_field()]);
        match declaration {
            Declaration::Procedure { body, .. } => {
                assert!(body.contains("attribute_value_by_name"));
                assert!(body.contains("raw_quantity.parse::<i32>()"));
                assert!(body.find("raw_quantity").unwrap() < body.find("start_depth").unwrap());
            }
            _ => panic!("expected a procedure declaration"),
        }
    }

    #[test]
    fn generated_complex_element_calls_nested_read_function() {
        let field = FieldPlan {
            field: Field {
                type_expr: "crate::order::LineItem".to_string(),
                name: "line_item".to_string(),
                default: None,
            },
            role: FieldRole::Element {
                xml_name: QName::new("http://example.com/order", "lineItem"),
                codec: Codec::GeneratedComplex,
            },
            cardinality: Cardinality::Vector,
            uses: Vec::new(),
            extra_declarations: Vec::new(),
        };
        let declaration = read_procedure("Order", "read_order", &[field]);
        match declaration {
            Declaration::Procedure { body, .. } => {
                assert!(body.contains("line_item.push(crate::order::read_line_item(reader)?);"));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }
}
