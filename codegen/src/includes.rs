//! Use-statement computation (spec §4.6.10, adapted for Rust): collects,
//! dedups and sorts every `use` path a file's declarations pulled in while
//! being translated, plus the runtime support paths their own IO routines
//! need.

use std::collections::BTreeSet;

/// Rust's analogue of spec's well-known-fragment header probes: a type
/// expression built from these crates never needs its own `use` entry
/// threaded through from particle/complex-type translation, since every
/// generated file already imports them unconditionally.
const ALWAYS_PRESENT: &[&str] = &["xbc_ir::QName", "xbc_xml::AnyElement", "xbc_xml::XmlReader", "xbc_xml::XmlWriter"];

/// Builds the sorted, deduplicated list of `use` paths for one generated
/// file from the `uses` each `FieldPlan`/declaration contributed, plus
/// `emits_io` (whether this file also carries `read_*`/`write_*`/
/// `validate_*` procedures, which need the xml/error support crates).
pub fn compute_uses(contributed: impl IntoIterator<Item = String>, emits_io: bool) -> Vec<String> {
    let mut uses: BTreeSet<String> = contributed.into_iter().filter(|u| !ALWAYS_PRESENT.contains(&u.as_str())).collect();
    if emits_io {
        uses.insert("xbc_xml::Error".to_string());
    }
    uses.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_and_sorts() {
        let uses = compute_uses(
            vec!["crate::order".to_string(), "crate::line_item".to_string(), "crate::order".to_string()],
            false,
        );
        assert_eq!(uses, vec!["crate::line_item".to_string(), "crate::order".to_string()]);
    }

    #[test]
    fn io_file_pulls_in_xml_error() {
        let uses = compute_uses(Vec::new(), true);
        assert_eq!(uses, vec!["xbc_xml::Error".to_string()]);
    }

    #[test]
    fn always_present_paths_are_filtered() {
        let uses = compute_uses(vec!["xbc_ir::QName".to_string(), "crate::order".to_string()], false);
        assert_eq!(uses, vec!["crate::order".to_string()]);
    }
}
