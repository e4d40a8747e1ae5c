//! The mechanical printer (spec §4.7): turns a `CppFile` into source text.
//! Each declaration is rendered to a textual snippet by the straightforward
//! parts of this module, assembled into one `syn::File` and formatted by
//! `prettyplease`, the same two-step "build then pretty-print" the teacher's
//! own Rust generator (`generator/src/generators/rust.rs`) uses.

use crate::error::Error;
use crate::target::{CppFile, Declaration, FileKind};

/// Prints one generated file's full source text.
pub fn emit_file(file: &CppFile) -> Result<String, Error> {
    let mut source = String::new();

    // An inner doc comment must precede every other item in the file, so
    // the banner is written first, ahead of `use`/`mod` lines.
    let carries_declarations = file
        .namespaces
        .iter()
        .flat_map(|ns| &ns.declarations)
        .any(|d| !matches!(d, Declaration::Procedure { .. }));
    if carries_declarations {
        source.push_str(&format!("//! generated bindings: {}\n\n", file.file_name));
    }

    for include in &file.includes {
        source.push_str(&format!("use {include};\n"));
    }
    for module in &file.module_declarations {
        source.push_str(&format!("pub mod {module};\n"));
    }
    if !file.includes.is_empty() || !file.module_declarations.is_empty() {
        source.push('\n');
    }

    for namespace in &file.namespaces {
        for declaration in &namespace.declarations {
            source.push_str(&emit_declaration(declaration));
            source.push('\n');
        }
    }

    let parsed = syn::parse_file(&source)?;
    Ok(prettyplease::unparse(&parsed))
}

fn emit_declaration(declaration: &Declaration) -> String {
    match declaration {
        Declaration::Record {
            name,
            fields,
            generate_equality,
        } => record_source(name, fields, *generate_equality),
        Declaration::Enum { name, variants } => enum_source(name, variants),
        Declaration::Alias { name, target } => format!("pub type {name} = {target};\n"),
        Declaration::ForwardRef { .. } => String::new(),
        Declaration::Variant { name, arms } => variant_source(name, arms),
        Declaration::Procedure {
            return_type,
            name,
            params,
            body,
            inline,
        } => {
            let inline_attr = if *inline { "#[inline]\n" } else { "" };
            format!("{inline_attr}pub fn {name}({params}) -> {return_type} {{\n{body}}}\n")
        }
    }
}

fn record_source(name: &str, fields: &[crate::target::Field], generate_equality: bool) -> String {
    let derives = if generate_equality {
        "#[derive(Debug, Clone, PartialEq)]"
    } else {
        "#[derive(Debug, Clone)]"
    };
    let mut body = String::new();
    for field in fields {
        body.push_str(&format!("    pub {}: {},\n", field.name, field.type_expr));
    }
    format!("{derives}\npub struct {name} {{\n{body}}}\n")
}

/// A named simple type's enum gets the `to_string`/`from_string` helpers
/// spec §4.7 calls for: `Display` (so `.to_string()` works, matching the
/// `Codec::Scalar`/`Codec::Runtime` call shape in the serializer) and an
/// inherent `from_string` the deserializer calls symmetrically.
fn enum_source(name: &str, variants: &[(String, String)]) -> String {
    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n");
    out.push_str(&format!("pub enum {name} {{\n"));
    for (variant, _) in variants {
        out.push_str(&format!("    {variant},\n"));
    }
    out.push_str("}\n");

    out.push_str(&format!("impl std::fmt::Display for {name} {{\n"));
    out.push_str("    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {\n");
    out.push_str("        let text = match self {\n");
    for (variant, lexical) in variants {
        out.push_str(&format!("            {name}::{variant} => {lexical:?},\n"));
    }
    out.push_str("        };\n        f.write_str(text)\n    }\n}\n");

    out.push_str(&format!("impl {name} {{\n"));
    out.push_str("    pub fn from_string(value: &str) -> Result<Self, String> {\n");
    out.push_str("        match value {\n");
    for (variant, lexical) in variants {
        out.push_str(&format!("            {lexical:?} => Ok({name}::{variant}),\n"));
    }
    out.push_str(&format!("            other => Err(format!(\"invalid value for {name}: {{other}}\")),\n"));
    out.push_str("        }\n    }\n}\n");
    out
}

fn variant_source(name: &str, arms: &[(String, String)]) -> String {
    let mut out = String::new();
    out.push_str("#[derive(Debug, Clone)]\n");
    out.push_str(&format!("pub enum {name} {{\n"));
    for (variant, type_expr) in arms {
        out.push_str(&format!("    {variant}({type_expr}),\n"));
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{CppNamespace, Field};

    #[test]
    fn emits_a_record_with_equality_derive() {
        let file = CppFile {
            file_name: "order.rs".to_string(),
            kind: FileKind::Header,
            includes: vec!["xbc_ir::QName".to_string()],
            namespaces: vec![CppNamespace {
                path: vec!["order".to_string()],
                declarations: vec![Declaration::Record {
                    name: "Order".to_string(),
                    fields: vec![Field {
                        type_expr: "String".to_string(),
                        name: "title".to_string(),
                        default: None,
                    }],
                    generate_equality: true,
                }],
            }],
            module_declarations: Vec::new(),
        };
        let text = emit_file(&file).unwrap();
        assert!(text.contains("use xbc_ir::QName;"));
        assert!(text.contains("pub struct Order"));
        assert!(text.contains("PartialEq"));
        assert!(text.contains("pub title: String"));
    }

    #[test]
    fn emits_enum_with_display_and_from_string() {
        let file = CppFile {
            file_name: "status.rs".to_string(),
            kind: FileKind::Header,
            includes: Vec::new(),
            namespaces: vec![CppNamespace {
                path: vec!["order".to_string()],
                declarations: vec![Declaration::Enum {
                    name: "Status".to_string(),
                    variants: vec![("Open".to_string(), "open".to_string()), ("Closed".to_string(), "closed".to_string())],
                }],
            }],
            module_declarations: Vec::new(),
        };
        let text = emit_file(&file).unwrap();
        assert!(text.contains("pub enum Status"));
        assert!(text.contains("impl std::fmt::Display for Status"));
        assert!(text.contains("pub fn from_string"));
        assert!(text.contains("\"open\""));
    }

    #[test]
    fn procedure_only_file_omits_the_declaration_banner() {
        let file = CppFile {
            file_name: "order_io.rs".to_string(),
            kind: FileKind::Source,
            includes: vec!["super::*".to_string()],
            namespaces: vec![CppNamespace {
                path: vec!["order".to_string()],
                declarations: vec![Declaration::Procedure {
                    return_type: "bool".to_string(),
                    name: "validate_order".to_string(),
                    params: "value: &Order".to_string(),
                    body: "true\n".to_string(),
                    inline: false,
                }],
            }],
            module_declarations: Vec::new(),
        };
        let text = emit_file(&file).unwrap();
        assert!(!text.contains("generated bindings"));
        assert!(text.contains("pub fn validate_order"));
    }

    #[test]
    fn umbrella_file_emits_module_declarations() {
        let file = CppFile {
            file_name: "order/mod.rs".to_string(),
            kind: FileKind::Header,
            includes: Vec::new(),
            namespaces: Vec::new(),
            module_declarations: vec!["order".to_string()],
        };
        let text = emit_file(&file).unwrap();
        assert!(text.contains("pub mod order;"));
    }
}
