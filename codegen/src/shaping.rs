//! File shaping (spec §4.6.8, adapted per `SPEC_FULL.md` for a language with
//! no header/source split): groups one namespace's declarations and
//! procedures into the files `options::OutputMode` calls for.

use crate::naming::field_name;
use crate::options::OutputMode;
use crate::target::{CppFile, CppNamespace, Declaration, FileKind};

/// Shapes one namespace's already-ordered type declarations and IO
/// procedures into the files `mode` calls for. `uses` is the deduplicated
/// `use` path list `includes::compute_uses` built for this namespace.
pub fn shape_namespace(
    module_path: &str,
    type_declarations: Vec<Declaration>,
    procedures: Vec<Declaration>,
    uses: Vec<String>,
    mode: OutputMode,
) -> Vec<CppFile> {
    match mode {
        OutputMode::HeaderOnly => {
            let has_procedures = !procedures.is_empty();
            let mut declarations = type_declarations;
            declarations.extend(procedures);
            let mut includes = uses;
            if has_procedures {
                includes.push("xbc_xml::Error".to_string());
            }
            vec![CppFile {
                file_name: format!("{module_path}.rs"),
                kind: FileKind::Header,
                includes,
                namespaces: vec![CppNamespace {
                    path: vec![module_path.to_string()],
                    declarations,
                }],
                module_declarations: Vec::new(),
            }]
        }
        OutputMode::Split => {
            let types_file = CppFile {
                file_name: format!("{module_path}_types.rs"),
                kind: FileKind::Header,
                includes: uses.clone(),
                namespaces: vec![CppNamespace {
                    path: vec![module_path.to_string()],
                    declarations: type_declarations,
                }],
                module_declarations: Vec::new(),
            };
            let mut io_includes = uses;
            io_includes.push("super::*".to_string());
            if !procedures.is_empty() {
                io_includes.push("xbc_xml::Error".to_string());
            }
            let io_file = CppFile {
                file_name: format!("{module_path}_io.rs"),
                kind: FileKind::Source,
                includes: io_includes,
                namespaces: vec![CppNamespace {
                    path: vec![module_path.to_string()],
                    declarations: procedures,
                }],
                module_declarations: Vec::new(),
            };
            vec![types_file, io_file]
        }
        OutputMode::FilePerType => {
            let mut files = Vec::with_capacity(type_declarations.len() + 2);
            let mut module_declarations = Vec::with_capacity(type_declarations.len());
            for declaration in type_declarations {
                let stem = field_name(declaration.name());
                module_declarations.push(stem.clone());
                files.push(CppFile {
                    file_name: format!("{module_path}/{stem}.rs"),
                    kind: FileKind::Header,
                    // Over-inclusive: every per-type file gets the whole
                    // namespace's `use` set rather than a narrowed one,
                    // since an unused `use` only ever warns in Rust.
                    includes: uses.clone(),
                    namespaces: vec![CppNamespace {
                        path: vec![module_path.to_string(), stem],
                        declarations: vec![declaration],
                    }],
                    module_declarations: Vec::new(),
                });
            }
            files.push(CppFile {
                file_name: format!("{module_path}/mod.rs"),
                kind: FileKind::Header,
                includes: Vec::new(),
                namespaces: Vec::new(),
                module_declarations,
            });
            files.push(CppFile {
                file_name: format!("{module_path}_io.rs"),
                kind: FileKind::Source,
                includes: {
                    let mut io_includes = uses;
                    io_includes.push(format!("{module_path}::*"));
                    if !procedures.is_empty() {
                        io_includes.push("xbc_xml::Error".to_string());
                    }
                    io_includes
                },
                namespaces: vec![CppNamespace {
                    path: vec![module_path.to_string()],
                    declarations: procedures,
                }],
                module_declarations: Vec::new(),
            });
            files
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Field;

    fn sample_record() -> Declaration {
        Declaration::Record {
            name: "Order".to_string(),
            fields: vec![Field {
                type_expr: "String".to_string(),
                name: "title".to_string(),
                default: None,
            }],
            generate_equality: true,
        }
    }

    fn sample_procedure() -> Declaration {
        Declaration::Procedure {
            return_type: "Result<Order, xbc_xml::Error>".to_string(),
            name: "read_order".to_string(),
            params: "reader: &mut impl xbc_xml::XmlReader".to_string(),
            body: "todo!()\n".to_string(),
            inline: false,
        }
    }

    #[test]
    fn header_only_emits_a_single_inline_file() {
        let files = shape_namespace("order", vec![sample_record()], vec![sample_procedure()], Vec::new(), OutputMode::HeaderOnly);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].namespaces[0].declarations.len(), 2);
    }

    #[test]
    fn split_separates_types_from_procedures() {
        let files = shape_namespace(
            "order",
            vec![sample_record()],
            vec![sample_procedure()],
            vec!["xbc_ir::QName".to_string()],
            OutputMode::Split,
        );
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "order_types.rs");
        assert_eq!(files[1].file_name, "order_io.rs");
        assert!(files[1].includes.contains(&"super::*".to_string()));
        assert_eq!(files[0].namespaces[0].declarations.len(), 1);
        assert_eq!(files[1].namespaces[0].declarations.len(), 1);
    }

    #[test]
    fn file_per_type_adds_an_umbrella_module() {
        let files = shape_namespace("order", vec![sample_record()], vec![sample_procedure()], Vec::new(), OutputMode::FilePerType);
        // one per-type file, one mod.rs, one _io.rs
        assert_eq!(files.len(), 3);
        let umbrella = files.iter().find(|f| f.file_name == "order/mod.rs").unwrap();
        assert_eq!(umbrella.module_declarations, vec!["order".to_string()]);
    }
}
