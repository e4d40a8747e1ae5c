//! Validator emission (spec §4.6.6): one `validate_<T>` procedure per
//! complex type or simple type that carries assertions, returning the
//! conjunction of whatever predicates `crate::xpath` could translate.

use xbc_ir::Assertion;

use crate::target::Declaration;
use crate::xpath::translate_assertion_test;

/// Builds `validate_<T>(value: &T) -> bool`. Returns `None` when
/// `assertions` is empty — callers skip emitting a validator entirely for
/// types with no assertions, rather than emitting a trivial `true` stub.
pub fn validate_procedure(type_name: &str, function_name: &str, assertions: &[Assertion]) -> Option<Declaration> {
    if assertions.is_empty() {
        return None;
    }

    let mut predicates = Vec::new();
    for assertion in assertions {
        match translate_assertion_test(&assertion.0) {
            Some(expr) => predicates.push(expr),
            None => {
                // Spec §4.6.6: an untranslatable assertion degrades the
                // whole predicate to an unconditional pass rather than
                // silently dropping just this conjunct.
                let mut body = String::new();
                body.push_str(&format!(
                    "// untranslatable assertion, not enforced: {}\n",
                    assertion.0.replace('\n', " ")
                ));
                body.push_str("true\n");
                return Some(Declaration::Procedure {
                    return_type: "bool".to_string(),
                    name: function_name.to_string(),
                    params: format!("value: &{type_name}"),
                    body,
                    inline: false,
                });
            }
        }
    }

    let body = format!("{}\n", predicates.join(" && "));
    Some(Declaration::Procedure {
        return_type: "bool".to_string(),
        name: function_name.to_string(),
        params: format!("value: &{type_name}"),
        body,
        inline: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_assertions_yields_no_validator() {
        assert!(validate_procedure("Order", "validate_order", &[]).is_none());
    }

    #[test]
    fn translatable_assertions_conjoin() {
        let assertions = vec![
            Assertion("minOccurs <= maxOccurs".to_string()),
            Assertion("status = 'active'".to_string()),
        ];
        let declaration = validate_procedure("Order", "validate_order", &assertions).unwrap();
        match declaration {
            Declaration::Procedure { body, .. } => {
                assert!(body.contains("value.min_occurs <= value.max_occurs"));
                assert!(body.contains("&&"));
                assert!(body.contains("value.status == \"active\""));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }

    #[test]
    fn untranslatable_assertion_falls_back_to_true() {
        let assertions = vec![Assertion("starts-with(status, 'a')".to_string())];
        let declaration = validate_procedure("Order", "validate_order", &assertions).unwrap();
        match declaration {
            Declaration::Procedure { body, .. } => {
                assert!(body.contains("untranslatable assertion"));
                assert!(body.trim_end().ends_with("true"));
            }
            _ => panic!("expected a procedure declaration"),
        }
    }
}
