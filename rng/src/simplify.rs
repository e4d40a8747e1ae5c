//! Bottom-up rewriter applying RELAX NG's canonical simplification rules.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::ir::{Combine, Define, GrammarPattern, Pattern};

/// Resolves `externalRef`/`include` hrefs fetched outside the core pipeline.
/// Absent a resolver, the reference node is left in place (per spec.md
/// §4.4's "External references are resolved via an optional resolver
/// callback; absent resolver leaves the node in place").
pub trait ExternalResolver {
    fn resolve_pattern(&self, href: &str) -> Result<Pattern, Error>;
    fn resolve_grammar(&self, href: &str) -> Result<GrammarPattern, Error>;
}

pub fn simplify(pattern: Pattern, resolver: Option<&dyn ExternalResolver>) -> Result<Pattern, Error> {
    rewrite(pattern, resolver)
}

pub fn simplify_grammar(
    grammar: GrammarPattern,
    resolver: Option<&dyn ExternalResolver>,
) -> Result<GrammarPattern, Error> {
    let merged = merge_includes(grammar, resolver)?;
    let start = merged.start.map(|p| rewrite(p, resolver)).transpose()?;
    let defines = merged
        .defines
        .into_iter()
        .map(|d| Ok(Define {
            name: d.name,
            combine: d.combine,
            body: rewrite(d.body, resolver)?,
        }))
        .collect::<Result<Vec<_>, Error>>()?;
    let merged_defines = merge_combined_defines(defines)?;
    let pruned = prune_unreachable(start.clone(), merged_defines);
    Ok(GrammarPattern {
        start,
        defines: pruned,
        includes: Vec::new(),
    })
}

fn merge_includes(
    mut grammar: GrammarPattern,
    resolver: Option<&dyn ExternalResolver>,
) -> Result<GrammarPattern, Error> {
    let includes = std::mem::take(&mut grammar.includes);
    for include in includes {
        let Some(resolver) = resolver else {
            // No resolver: nothing to splice in, leave the grammar as-is
            // (the includes list stays empty, effectively dropping the
            // directive — it cannot be simplified without its content).
            continue;
        };
        let mut included = resolver.resolve_grammar(&include.href)?;
        let override_names: HashSet<&str> = include.overrides.iter().map(|d| d.name.as_str()).collect();
        included.defines.retain(|d| !override_names.contains(d.name.as_str()));
        included.defines.extend(include.overrides);
        if include.start_override.is_some() {
            included.start = include.start_override;
        }
        grammar.defines.extend(included.defines);
        if grammar.start.is_none() {
            grammar.start = included.start;
        }
    }
    Ok(grammar)
}

fn merge_combined_defines(defines: Vec<Define>) -> Result<Vec<Define>, Error> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Define>> = HashMap::new();
    for define in defines {
        if !groups.contains_key(&define.name) {
            order.push(define.name.clone());
        }
        groups.entry(define.name.clone()).or_default().push(define);
    }

    let mut merged = Vec::new();
    for name in order {
        let group = groups.remove(&name).unwrap();
        if group.len() == 1 {
            merged.push(group.into_iter().next().unwrap());
            continue;
        }
        let none_count = group.iter().filter(|d| d.combine == Combine::None).count();
        if none_count > 1 {
            return Err(Error::Syntax {
                line: 0,
                column: 0,
                message: format!("multiple definitions of `{name}` omit a combine method"),
            });
        }
        let combinator = group
            .iter()
            .find_map(|d| match d.combine {
                Combine::Choice => Some(Pattern::Choice as fn(Box<Pattern>, Box<Pattern>) -> Pattern),
                Combine::Interleave => Some(Pattern::Interleave as fn(Box<Pattern>, Box<Pattern>) -> Pattern),
                Combine::None => None,
            })
            .unwrap_or(Pattern::Choice);
        let mut bodies = group.into_iter().map(|d| d.body);
        let first = bodies.next().unwrap();
        let body = bodies.fold(first, |acc, next| combinator(Box::new(acc), Box::new(next)));
        merged.push(Define {
            name,
            combine: Combine::None,
            body,
        });
    }
    Ok(merged)
}

fn prune_unreachable(start: Option<Pattern>, defines: Vec<Define>) -> Vec<Define> {
    let by_name: HashMap<&str, &Define> = defines.iter().map(|d| (d.name.as_str(), d)).collect();
    let mut reachable: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = Vec::new();
    if let Some(start) = &start {
        collect_refs(start, &mut stack);
    }
    while let Some(name) = stack.pop() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        if let Some(define) = by_name.get(name.as_str()) {
            collect_refs(&define.body, &mut stack);
        }
    }
    defines.into_iter().filter(|d| reachable.contains(&d.name)).collect()
}

fn collect_refs(pattern: &Pattern, out: &mut Vec<String>) {
    match pattern {
        Pattern::Ref(name) | Pattern::ParentRef(name) => out.push(name.clone()),
        Pattern::Element(_, content) => collect_refs(content, out),
        Pattern::Attribute(_, content) => collect_refs(content, out),
        Pattern::Group(l, r) | Pattern::Interleave(l, r) | Pattern::Choice(l, r) => {
            collect_refs(l, out);
            collect_refs(r, out);
        }
        Pattern::OneOrMore(x) | Pattern::ZeroOrMore(x) | Pattern::Optional(x) | Pattern::Mixed(x) | Pattern::List(x) => {
            collect_refs(x, out)
        }
        Pattern::Data { except, .. } => {
            if let Some(except) = except {
                collect_refs(except, out);
            }
        }
        Pattern::Grammar(g) => {
            if let Some(start) = &g.start {
                collect_refs(start, out);
            }
        }
        Pattern::Empty
        | Pattern::Text
        | Pattern::NotAllowed
        | Pattern::Value { .. }
        | Pattern::ExternalRef { .. } => {}
    }
}

fn mk_group(l: Pattern, r: Pattern) -> Pattern {
    if l == Pattern::NotAllowed || r == Pattern::NotAllowed {
        Pattern::NotAllowed
    } else {
        Pattern::Group(Box::new(l), Box::new(r))
    }
}

fn mk_interleave(l: Pattern, r: Pattern) -> Pattern {
    if l == Pattern::NotAllowed || r == Pattern::NotAllowed {
        Pattern::NotAllowed
    } else {
        Pattern::Interleave(Box::new(l), Box::new(r))
    }
}

fn mk_choice(l: Pattern, r: Pattern) -> Pattern {
    match (l, r) {
        (Pattern::NotAllowed, p) | (p, Pattern::NotAllowed) => p,
        (l, r) => Pattern::Choice(Box::new(l), Box::new(r)),
    }
}

fn mk_one_or_more(x: Pattern) -> Pattern {
    if x == Pattern::NotAllowed {
        Pattern::NotAllowed
    } else {
        Pattern::OneOrMore(Box::new(x))
    }
}

fn mk_list(x: Pattern) -> Pattern {
    if x == Pattern::NotAllowed {
        Pattern::NotAllowed
    } else {
        Pattern::List(Box::new(x))
    }
}

fn mk_attribute(name_class: crate::ir::NameClass, x: Pattern) -> Pattern {
    if x == Pattern::NotAllowed {
        Pattern::NotAllowed
    } else {
        Pattern::Attribute(name_class, Box::new(x))
    }
}

fn rewrite(pattern: Pattern, resolver: Option<&dyn ExternalResolver>) -> Result<Pattern, Error> {
    Ok(match pattern {
        Pattern::Empty | Pattern::Text | Pattern::NotAllowed | Pattern::Ref(_) | Pattern::ParentRef(_) => pattern,
        Pattern::Value { .. } => pattern,
        Pattern::Element(name_class, content) => {
            Pattern::Element(name_class, Box::new(rewrite(*content, resolver)?))
        }
        Pattern::Attribute(name_class, content) => mk_attribute(name_class, rewrite(*content, resolver)?),
        Pattern::Group(l, r) => mk_group(rewrite(*l, resolver)?, rewrite(*r, resolver)?),
        Pattern::Interleave(l, r) => mk_interleave(rewrite(*l, resolver)?, rewrite(*r, resolver)?),
        Pattern::Choice(l, r) => mk_choice(rewrite(*l, resolver)?, rewrite(*r, resolver)?),
        Pattern::OneOrMore(x) => mk_one_or_more(rewrite(*x, resolver)?),
        Pattern::ZeroOrMore(x) => mk_choice(mk_one_or_more(rewrite(*x, resolver)?), Pattern::Empty),
        Pattern::Optional(x) => mk_choice(rewrite(*x, resolver)?, Pattern::Empty),
        Pattern::Mixed(x) => mk_interleave(rewrite(*x, resolver)?, Pattern::Text),
        Pattern::List(x) => mk_list(rewrite(*x, resolver)?),
        Pattern::Data {
            library,
            datatype,
            params,
            except,
        } => Pattern::Data {
            library,
            datatype,
            params,
            except: except.map(|e| rewrite(*e, resolver)).transpose()?.map(Box::new),
        },
        Pattern::ExternalRef { href, ns } => match resolver {
            Some(active) => rewrite(active.resolve_pattern(&href)?, resolver)?,
            None => Pattern::ExternalRef { href, ns },
        },
        Pattern::Grammar(grammar) => Pattern::Grammar(Box::new(simplify_grammar(*grammar, resolver)?)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NameClass;

    #[test]
    fn mixed_becomes_interleave_with_text() {
        let simplified = simplify(Pattern::Mixed(Box::new(Pattern::Text)), None).unwrap();
        assert_eq!(simplified, Pattern::Interleave(Box::new(Pattern::Text), Box::new(Pattern::Text)));
    }

    #[test]
    fn optional_becomes_choice_with_empty() {
        let simplified = simplify(Pattern::Optional(Box::new(Pattern::Text)), None).unwrap();
        assert_eq!(simplified, Pattern::Choice(Box::new(Pattern::Text), Box::new(Pattern::Empty)));
    }

    #[test]
    fn attribute_with_not_allowed_content_collapses() {
        let pattern = Pattern::Attribute(NameClass::specific("", "a"), Box::new(Pattern::NotAllowed));
        assert_eq!(simplify(pattern, None).unwrap(), Pattern::NotAllowed);
    }

    #[test]
    fn choice_with_not_allowed_branch_collapses() {
        let pattern = Pattern::Choice(Box::new(Pattern::NotAllowed), Box::new(Pattern::Text));
        assert_eq!(simplify(pattern, None).unwrap(), Pattern::Text);
    }

    #[test]
    fn unreachable_define_is_dropped() {
        let grammar = GrammarPattern {
            start: Some(Pattern::Ref("root".to_string())),
            defines: vec![
                Define {
                    name: "root".to_string(),
                    combine: Combine::None,
                    body: Pattern::Text,
                },
                Define {
                    name: "orphan".to_string(),
                    combine: Combine::None,
                    body: Pattern::Text,
                },
            ],
            includes: Vec::new(),
        };
        let simplified = simplify_grammar(grammar, None).unwrap();
        assert_eq!(simplified.defines.len(), 1);
        assert_eq!(simplified.defines[0].name, "root");
    }

    #[test]
    fn multiple_defines_without_combine_is_an_error() {
        let grammar = GrammarPattern {
            start: Some(Pattern::Ref("root".to_string())),
            defines: vec![
                Define {
                    name: "root".to_string(),
                    combine: Combine::None,
                    body: Pattern::Text,
                },
                Define {
                    name: "root".to_string(),
                    combine: Combine::None,
                    body: Pattern::Empty,
                },
            ],
            includes: Vec::new(),
        };
        assert!(simplify_grammar(grammar, None).is_err());
    }

    #[test]
    fn combined_defines_merge_via_choice() {
        let grammar = GrammarPattern {
            start: Some(Pattern::Ref("root".to_string())),
            defines: vec![
                Define {
                    name: "root".to_string(),
                    combine: Combine::None,
                    body: Pattern::Text,
                },
                Define {
                    name: "root".to_string(),
                    combine: Combine::Choice,
                    body: Pattern::Empty,
                },
            ],
            includes: Vec::new(),
        };
        let simplified = simplify_grammar(grammar, None).unwrap();
        assert_eq!(simplified.defines.len(), 1);
        assert_eq!(
            simplified.defines[0].body,
            Pattern::Choice(Box::new(Pattern::Text), Box::new(Pattern::Empty))
        );
    }
}
