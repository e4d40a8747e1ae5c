//! Declaration ordering (spec §4.6.9): within a generated file, declarations
//! are topologically sorted so a record/enum/alias is only ever used after
//! it's been declared.

use std::collections::{HashMap, VecDeque};

use crate::target::Declaration;

/// Orders `declarations` by Kahn's algorithm over the "A's field mentions
/// B's name" dependency graph. Declarations left over once no more
/// zero-indegree nodes remain (a reference cycle — recursive types, already
/// broken at the field level by `Option<Box<T>>`) are appended in their
/// original relative order rather than dropped.
pub fn order_declarations(declarations: Vec<Declaration>) -> Vec<Declaration> {
    let n = declarations.len();
    let names: Vec<&str> = declarations.iter().map(|d| d.name()).collect();
    let index_of: HashMap<&str, usize> = names.iter().enumerate().map(|(i, name)| (*name, i)).collect();

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];
    for (i, decl) in declarations.iter().enumerate() {
        for referenced in references(decl) {
            for (name, &dependency) in &index_of {
                if dependency == i {
                    continue;
                }
                if mentions(&referenced, name) {
                    dependents[dependency].push(i);
                    indegree[i] += 1;
                }
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    while let Some(u) = queue.pop_front() {
        if visited[u] {
            continue;
        }
        visited[u] = true;
        order.push(u);
        for &v in &dependents[u] {
            indegree[v] -= 1;
            if indegree[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    for i in 0..n {
        if !visited[i] {
            order.push(i);
        }
    }

    let mut declarations: Vec<Option<Declaration>> = declarations.into_iter().map(Some).collect();
    order.into_iter().map(|i| declarations[i].take().expect("each index visited once")).collect()
}

fn references(decl: &Declaration) -> Vec<String> {
    match decl {
        Declaration::Record { fields, .. } => fields.iter().map(|f| f.type_expr.clone()).collect(),
        Declaration::Alias { target, .. } => vec![target.clone()],
        Declaration::Variant { arms, .. } => arms.iter().map(|(_, type_expr)| type_expr.clone()).collect(),
        Declaration::Enum { .. } | Declaration::ForwardRef { .. } | Declaration::Procedure { .. } => Vec::new(),
    }
}

fn mentions(haystack: &str, needle: &str) -> bool {
    let bytes = haystack.as_bytes();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let at = start + pos;
        let before_ok = at == 0 || !is_ident_char(bytes[at - 1]);
        let after = at + needle.len();
        let after_ok = after >= bytes.len() || !is_ident_char(bytes[after]);
        if before_ok && after_ok {
            return true;
        }
        start = at + 1;
    }
    false
}

fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Field;

    fn record(name: &str, field_types: &[&str]) -> Declaration {
        Declaration::Record {
            name: name.to_string(),
            fields: field_types
                .iter()
                .enumerate()
                .map(|(i, type_expr)| Field {
                    type_expr: type_expr.to_string(),
                    name: format!("f{i}"),
                    default: None,
                })
                .collect(),
            generate_equality: true,
        }
    }

    #[test]
    fn dependency_is_ordered_before_dependent() {
        let declarations = vec![record("Order", &["Vec<LineItem>"]), record("LineItem", &["String"])];
        let ordered = order_declarations(declarations);
        assert_eq!(ordered[0].name(), "LineItem");
        assert_eq!(ordered[1].name(), "Order");
    }

    #[test]
    fn self_recursion_does_not_block_ordering() {
        let declarations = vec![record("Node", &["Option<Box<Node>>", "String"])];
        let ordered = order_declarations(declarations);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].name(), "Node");
    }

    #[test]
    fn prefix_name_collision_does_not_create_a_false_edge() {
        // "OrderId" contains "Order" as a literal substring; mentions()
        // must not treat that as a dependency on the unrelated "Order" type.
        let declarations = vec![record("Order", &["Vec<LineItem>"]), record("LineItem", &["OrderId"])];
        let ordered = order_declarations(declarations);
        // With no real edge between them, Kahn's algorithm (both start at
        // indegree 0) preserves the original relative order.
        assert_eq!(ordered[0].name(), "Order");
        assert_eq!(ordered[1].name(), "LineItem");
    }
}
