//! Serialization emission (spec §4.6.4): one `write_<T>` procedure per
//! complex type, built from the field plan `complex_type` produced.

use crate::naming::io_function;
use crate::particle::{Cardinality, ChoiceArm, FieldPlan, FieldRole};
use crate::resolver::Codec;
use crate::target::Declaration;

/// Builds the `write_<T>` procedure for a complex type. `record_name` is the
/// type's own Rust identifier (as emitted by [`crate::complex_type`]);
/// `function_name` is the generated free function's name.
pub fn write_procedure(record_name: &str, function_name: &str, fields: &[FieldPlan]) -> Declaration {
    let mut body = String::new();
    body.push_str("writer.start_element(name)?;\n");

    for plan in fields {
        if let FieldRole::Attribute { xml_name, codec } = &plan.role {
            if xml_name.is_unset() {
                // The attribute-wildcard bucket: emit each captured pair.
                body.push_str(&format!(
                    "for (name, value) in &value.{} {{ writer.attribute(name, value)?; }}\n",
                    plan.field.name
                ));
                continue;
            }
            body.push_str(&write_attribute(
                &plan.field.name,
                &xml_name.namespace_uri,
                &xml_name.local_name,
                plan.cardinality,
                *codec,
            ));
        }
    }

    for plan in fields {
        match &plan.role {
            FieldRole::Value { codec } => {
                body.push_str(&format!("writer.characters(&{})?;\n", to_text("value.value", *codec)));
            }
            FieldRole::Text => {
                body.push_str("if let Some(ref text) = value.text { writer.characters(text)?; }\n");
            }
            FieldRole::Element { xml_name, codec } => {
                body.push_str(&write_element_field(
                    &plan.field.name,
                    &plan.field.type_expr,
                    xml_name,
                    plan.cardinality,
                    *codec,
                ));
            }
            FieldRole::Wildcard => {
                body.push_str(&write_wildcard_field(&plan.field.name, plan.cardinality));
            }
            FieldRole::Choice { arms } => {
                body.push_str(&write_choice_field(&plan.field.name, &plan.field.type_expr, arms));
            }
            FieldRole::Attribute { .. } => {}
        }
    }

    body.push_str("writer.end_element()?;\nOk(())\n");

    Declaration::Procedure {
        return_type: "Result<(), xbc_xml::Error>".to_string(),
        name: function_name.to_string(),
        params: format!("value: &{record_name}, name: &xbc_ir::QName, writer: &mut impl xbc_xml::XmlWriter"),
        body,
        inline: false,
    }
}

/// Every codec this crate generates (a native scalar's `Display`, a runtime
/// value type's `Display`, or a schema-declared enum's generated
/// `to_string`) supports `.to_string()`, so text rendering needs no
/// per-codec branch.
fn to_text(expr: &str, _codec: Codec) -> String {
    format!("{expr}.to_string()")
}

fn write_attribute(
    field: &str,
    namespace_uri: &str,
    local_name: &str,
    cardinality: Cardinality,
    codec: Codec,
) -> String {
    let qname_expr = format!("xbc_ir::QName::new({namespace_uri:?}, {local_name:?})");
    let access = format!("value.{field}");
    match cardinality {
        Cardinality::Required => format!("writer.attribute(&{qname_expr}, &{})?;\n", to_text(&access, codec)),
        _ => format!(
            "if let Some(ref inner) = {access} {{ writer.attribute(&{qname_expr}, &{})?; }}\n",
            to_text("inner", codec)
        ),
    }
}

/// Strips the cardinality wrapper off a field's type expression to recover
/// the element's own value type, which is what a nested `write_<T>` call
/// needs rather than the `Option<...>`/`Vec<...>` wrapper around it.
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

fn write_element_field(
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
    let call = |binding: &str| write_value_call(binding, value_type, &qname_expr, codec);
    match cardinality {
        Cardinality::Required => format!("{}\n", call(&format!("&value.{field}"))),
        Cardinality::Optional => format!("if let Some(ref inner) = value.{field} {{ {} }}\n", call("inner")),
        Cardinality::Vector => format!("for item in &value.{field} {{ {} }}\n", call("item")),
        Cardinality::OwningPointer => {
            format!("if let Some(ref boxed) = value.{field} {{ {} }}\n", call("boxed.as_ref()"))
        }
    }
}

fn write_value_call(binding: &str, value_type: &str, qname_expr: &str, codec: Codec) -> String {
    match codec {
        Codec::Scalar | Codec::Runtime | Codec::GeneratedSimple => format!(
            "writer.start_element(&{qname_expr})?; writer.characters(&{})?; writer.end_element()?;",
            to_text(binding, codec)
        ),
        Codec::GeneratedComplex => format!("{}({binding}, &{qname_expr}, writer)?;", io_function(value_type, "write")),
    }
}

fn write_wildcard_field(field: &str, cardinality: Cardinality) -> String {
    match cardinality {
        Cardinality::Required => format!("value.{field}.write(writer)?;\n"),
        Cardinality::Optional | Cardinality::OwningPointer => {
            format!("if let Some(ref any) = value.{field} {{ any.write(writer)?; }}\n")
        }
        Cardinality::Vector => format!("for any in &value.{field} {{ any.write(writer)?; }}\n"),
    }
}

fn write_choice_field(field: &str, enum_type: &str, arms: &[ChoiceArm]) -> String {
    let mut body = format!("match &value.{field} {{\n");
    for arm in arms {
        let variant = &arm.variant;
        match &arm.xml_name {
            Some(xml_name) => {
                let qname_expr = format!(
                    "xbc_ir::QName::new({:?}, {:?})",
                    xml_name.namespace_uri, xml_name.local_name
                );
                body.push_str(&format!(
                    "    {enum_type}::{variant}(inner) => {{ {call} }}\n",
                    call = write_value_call("inner", &arm.type_expr, &qname_expr, arm.codec)
                ));
            }
            None => {
                body.push_str(&format!(
                    "    {enum_type}::{variant}(_) => {{ /* nested group/wildcard choice arm: not dispatched by tag */ }}\n"
                ));
            }
        }
    }
    body.push_str("}\n");
    body
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
    fn emits_start_and_end_element_around_fields() {
        let declaration = write_procedure("Order", "write_order", &[title_field()]);
        match declaration {
            Declaration::Procedure { body, name, .. } => {
                assert_eq!(name, "write_order");
                assert!(body.starts_with("writer.start_element(name)?;\n"));
                assert!(body.contains("value.title"));
                assert!(body.trim_end().ends_with("Ok(())"));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }

    #[test]
    fn optional_attribute_is_guarded_by_if_let() {
        let field = FieldPlan {
            field: Field {
                type_expr: "Option<String>".to_string(),
                name: "note".to_string(),
                default: None,
            },
            role: FieldRole::Attribute {
                xml_name: QName::unqualified("note"),
                codec: Codec::Scalar,
            },
            cardinality: Cardinality::Optional,
            uses: Vec::new(),
            extra_declarations: Vec::new(),
        };
        let declaration = write_procedure("Order", "write_order", &[field]);
        match declaration {
            Declaration::Procedure { body, .. } => {
                assert!(body.contains("if let Some(ref inner) = value.note"));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }

    #[test]
    fn generated_complex_element_calls_nested_write_function() {
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
        let declaration = write_procedure("Order", "write_order", &[field]);
        match declaration {
            Declaration::Procedure { body, .. } => {
                assert!(body.contains("crate::order::write_line_item(item"));
                assert!(body.contains("for item in &value.line_item"));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }
}
