//! Narrow XPath translation (spec §4.6.7): only `@attr = 'literal'` /
//! `@attr != 'literal'` attribute-equality tests, and simple relational
//! comparisons on a value's own fields, translate; everything else is
//! rejected so the caller can fall back to an always-true validator.

use crate::naming::field_name;

/// One recognized comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    fn rust_operator(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

fn split_comparison(test: &str) -> Option<(&str, Operator, &str)> {
    const OPERATORS: &[(&str, Operator)] = &[
        ("!=", Operator::Ne),
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        ("=", Operator::Eq),
        ("<", Operator::Lt),
        (">", Operator::Gt),
    ];
    for (token, operator) in OPERATORS {
        if let Some((left, right)) = test.split_once(token) {
            return Some((left.trim(), *operator, right.trim()));
        }
    }
    None
}

fn unquote(literal: &str) -> Option<&str> {
    let literal = literal.trim();
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return Some(&literal[1..literal.len() - 1]);
        }
    }
    None
}

/// Translates a CTA `test` attribute into a boolean Rust expression reading
/// from a positioned `reader: &impl XmlReader`. Only `@attr <op> 'literal'`
/// shapes with a bare attribute on the left translate; everything else
/// returns `None` so the caller can keep this element's default type.
pub fn translate_attribute_test(test: &str) -> Option<String> {
    let (left, operator, right) = split_comparison(test)?;
    let attr = left.strip_prefix('@')?;
    let literal = unquote(right)?;
    Some(format!(
        "reader.attribute_value_by_name(&xbc_ir::QName::unqualified({attr:?})) {} Some({literal:?})",
        operator.rust_operator()
    ))
}

/// Translates an `<assert>` test over `value`'s own fields into a boolean
/// Rust expression. Only `field <op> 'literal'` and `field <op> field`
/// shapes translate; `field` must be a bare identifier naming one of
/// `value`'s fields (schema local names, converted the same way particle
/// translation names them).
pub fn translate_assertion_test(test: &str) -> Option<String> {
    let (left, operator, right) = split_comparison(test)?;
    let left_expr = field_reference(left)?;
    let right_expr = match unquote(right) {
        Some(literal) => format!("{literal:?}"),
        None => format!("value.{}", field_name(right)),
    };
    Some(format!("{left_expr} {} {right_expr}", operator.rust_operator()))
}

fn field_reference(token: &str) -> Option<String> {
    let token = token.trim();
    if token.is_empty() || token.contains(['(', ')', ' ', '/']) {
        return None;
    }
    Some(format!("value.{}", field_name(token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_attribute_equality() {
        let expr = translate_attribute_test("@currency = 'USD'").unwrap();
        assert!(expr.contains("attribute_value_by_name"));
        assert!(expr.contains("\"USD\""));
        assert!(expr.contains("=="));
    }

    #[test]
    fn translates_attribute_inequality() {
        let expr = translate_attribute_test("@currency != 'USD'").unwrap();
        assert!(expr.contains("!="));
    }

    #[test]
    fn rejects_unsupported_attribute_shapes() {
        assert!(translate_attribute_test("count(@currency) > 0").is_none());
    }

    #[test]
    fn translates_field_comparison() {
        let expr = translate_assertion_test("minOccurs <= maxOccurs").unwrap();
        assert_eq!(expr, "value.min_occurs <= value.max_occurs");
    }

    #[test]
    fn translates_field_literal_comparison() {
        let expr = translate_assertion_test("status = 'active'").unwrap();
        assert_eq!(expr, "value.status == \"active\"");
    }

    #[test]
    fn rejects_unsupported_assertion_shapes() {
        assert!(translate_assertion_test("starts-with(status, 'a')").is_none());
    }
}
