//! Naming conventions (spec §4.6.11): namespace URIs become module paths,
//! local names become Rust identifiers.

use check_keyword::CheckKeyword;
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::HashMap;

/// Converts a schema local name into a `PascalCase` type identifier,
/// escaping a leading digit and any Rust reserved word.
pub fn type_name(local_name: &str) -> String {
    identifier(&local_name.to_upper_camel_case())
}

/// Converts a schema local name into a `snake_case` field/function
/// identifier, escaping a leading digit and any Rust reserved word.
pub fn field_name(local_name: &str) -> String {
    identifier(&local_name.to_snake_case())
}

fn identifier(candidate: &str) -> String {
    let prefixed = match candidate.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{candidate}"),
        _ => candidate.to_string(),
    };
    if prefixed.is_keyword() || prefixed.is_reserved() {
        format!("{prefixed}_")
    } else {
        prefixed
    }
}

/// Builds the call path of a generated `read_<T>`/`write_<T>`/`validate_<T>`
/// free function for a resolved type expression, preserving its module
/// qualification (`crate::order::OrderType` -> `crate::order::write_order_type`).
pub fn io_function(type_expr: &str, prefix: &str) -> String {
    match type_expr.rsplit_once("::") {
        Some((module, local)) => format!("{module}::{prefix}_{}", field_name(local)),
        None => format!("{prefix}_{}", field_name(type_expr)),
    }
}

/// Derives a `snake_case` module path segment for a namespace URI, honoring
/// a user-supplied override in `namespace_map` first.
pub fn module_path(namespace_uri: &str, namespace_map: &HashMap<String, String>) -> String {
    if let Some(mapped) = namespace_map.get(namespace_uri) {
        return mapped.clone();
    }
    if namespace_uri.is_empty() {
        return "unqualified".to_string();
    }
    let last_segment = namespace_uri
        .rsplit(['/', ':'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(namespace_uri);
    field_name(last_segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_cases_a_type_name() {
        assert_eq!(type_name("order_type"), "OrderType");
        assert_eq!(type_name("OrderType"), "OrderType");
    }

    #[test]
    fn escapes_reserved_words() {
        assert_eq!(field_name("type"), "type_");
        assert_eq!(field_name("match"), "match_");
    }

    #[test]
    fn escapes_leading_digit() {
        assert_eq!(field_name("2nd"), "_2nd");
    }

    #[test]
    fn module_path_prefers_namespace_map() {
        let mut map = HashMap::new();
        map.insert("http://example.com/order".to_string(), "order_v2".to_string());
        assert_eq!(module_path("http://example.com/order", &map), "order_v2");
    }

    #[test]
    fn module_path_derives_from_last_uri_segment() {
        let map = HashMap::new();
        assert_eq!(module_path("http://example.com/orderBook", &map), "order_book");
    }
}
