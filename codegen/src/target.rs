//! Language-neutral target AST (spec'd §3.4). `codegen` populates it,
//! `emit` prints it. Names carried over verbatim from the design: a
//! `CppFile` is simply "the generated-code AST of one output file",
//! regardless of target language.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Header,
    Source,
}

#[derive(Clone, Debug)]
pub struct Field {
    pub type_expr: String,
    pub name: String,
    pub default: Option<String>,
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Record {
        name: String,
        fields: Vec<Field>,
        generate_equality: bool,
    },
    Enum {
        name: String,
        /// (variant identifier, external lexical string)
        variants: Vec<(String, String)>,
    },
    Alias {
        name: String,
        target: String,
    },
    ForwardRef {
        name: String,
    },
    Procedure {
        return_type: String,
        name: String,
        params: String,
        body: String,
        inline: bool,
    },
    /// A tagged union with payload types, one arm per alternative. Rust has
    /// no anonymous `variant<A, B>` expression the way the target-language
    /// AST's type-expression strings assume (spec §3.4's type expressions
    /// are written with C++'s template-based `std::variant` in mind); this
    /// is the one declaration kind this AST adds beyond spec §3.4 to carry
    /// that payload as a named enum instead.
    Variant {
        name: String,
        arms: Vec<(String, String)>,
    },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Record { name, .. }
            | Declaration::Enum { name, .. }
            | Declaration::Alias { name, .. }
            | Declaration::ForwardRef { name }
            | Declaration::Procedure { name, .. }
            | Declaration::Variant { name, .. } => name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CppNamespace {
    pub path: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Clone, Debug)]
pub struct CppFile {
    pub file_name: String,
    pub kind: FileKind,
    pub includes: Vec<String>,
    pub namespaces: Vec<CppNamespace>,
    /// `pub mod <segment>;` lines for an umbrella file (`file_per_type`
    /// mode's `mod.rs`). Empty for every other file kind and mode.
    pub module_declarations: Vec<String>,
}
