//! Codegen options (spec §9 design notes): how output is split across
//! files, and how foreign namespace URIs map onto module paths.

use std::collections::HashMap;

/// Resolves spec §9's C++ header/source Open Question for a language with
/// no declaration/definition split (SPEC_FULL §4.6.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// One file per namespace; declarations and procedures inline together.
    HeaderOnly,
    /// Two files per namespace: `_types.rs` (declarations) and `_io.rs`
    /// (procedures), the latter opening with `use super::*;`.
    Split,
    /// One file per declaration, plus an umbrella `mod.rs` and one shared
    /// `_io.rs` per namespace.
    FilePerType,
}

#[derive(Clone, Debug)]
pub struct CodegenOptions {
    pub namespace_map: HashMap<String, String>,
    pub mode: OutputMode,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            namespace_map: HashMap::new(),
            mode: OutputMode::Split,
        }
    }
}
