//! Parses RELAX NG's XML syntax into the [`crate::ir`] pattern tree.
//!
//! Mirrors the XSD front end's roxmltree traversal idiom: each element name
//! is a state, consuming attributes then descending into children.

use roxmltree::Node;

use crate::error::Error;
use crate::ir::{Combine, Define, GrammarPattern, IncludeDirective, NameClass, Pattern};

const RNG_NAMESPACE: &str = "http://relaxng.org/ns/structure/1.0";

#[derive(Clone)]
struct Context {
    ns: String,
    datatype_library: String,
}

impl Context {
    fn child_of(&self, node: Node) -> Self {
        Context {
            ns: node.attribute("ns").unwrap_or(&self.ns).to_string(),
            datatype_library: node
                .attribute("datatypeLibrary")
                .unwrap_or(&self.datatype_library)
                .to_string(),
        }
    }
}

pub fn parse_grammar(source: &str) -> Result<GrammarPattern, Error> {
    let document = roxmltree::Document::parse(source)?;
    let root = document.root_element();
    let ctx = Context {
        ns: String::new(),
        datatype_library: String::new(),
    }
    .child_of(root);
    let pattern = parse_pattern(root, &ctx)?;
    Ok(wrap_in_grammar(pattern))
}

/// RNG's "root pattern shorthand": a document whose outer element is not
/// `<grammar>` is equivalent to `<grammar><start>…</start></grammar>`.
fn wrap_in_grammar(pattern: Pattern) -> GrammarPattern {
    if let Pattern::Grammar(grammar) = pattern {
        *grammar
    } else {
        GrammarPattern {
            start: Some(pattern),
            defines: Vec::new(),
            includes: Vec::new(),
        }
    }
}

fn rng_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|c| c.is_element() && c.tag_name().namespace() == Some(RNG_NAMESPACE))
}

fn right_fold(mut patterns: Vec<Pattern>, combine: fn(Box<Pattern>, Box<Pattern>) -> Pattern) -> Pattern {
    match patterns.len() {
        0 => Pattern::Empty,
        1 => patterns.pop().unwrap(),
        _ => {
            let last = patterns.pop().unwrap();
            patterns
                .into_iter()
                .rev()
                .fold(last, |acc, next| combine(Box::new(next), Box::new(acc)))
        }
    }
}

fn parse_pattern(node: Node, ctx: &Context) -> Result<Pattern, Error> {
    let ctx = ctx.child_of(node);
    match node.tag_name().name() {
        "empty" => Ok(Pattern::Empty),
        "text" => Ok(Pattern::Text),
        "notAllowed" => Ok(Pattern::NotAllowed),
        "ref" => Ok(Pattern::Ref(attr_required(node, "name")?.to_string())),
        "parentRef" => Ok(Pattern::ParentRef(attr_required(node, "name")?.to_string())),
        "element" => parse_element_or_attribute(node, &ctx, true),
        "attribute" => parse_element_or_attribute(node, &ctx, false),
        "group" => parse_nary(node, &ctx, Pattern::Group),
        "interleave" => parse_nary(node, &ctx, Pattern::Interleave),
        "choice" => parse_nary(node, &ctx, Pattern::Choice),
        "optional" => Ok(Pattern::Optional(Box::new(parse_single_child(node, &ctx)?))),
        "zeroOrMore" => Ok(Pattern::ZeroOrMore(Box::new(parse_single_child(node, &ctx)?))),
        "oneOrMore" => Ok(Pattern::OneOrMore(Box::new(parse_single_child(node, &ctx)?))),
        "mixed" => Ok(Pattern::Mixed(Box::new(parse_single_child(node, &ctx)?))),
        "list" => Ok(Pattern::List(Box::new(parse_single_child(node, &ctx)?))),
        "data" => parse_data(node, &ctx),
        "value" => parse_value(node, &ctx),
        "externalRef" => Ok(Pattern::ExternalRef {
            href: attr_required(node, "href")?.to_string(),
            ns: ctx.ns.clone(),
        }),
        "grammar" => Ok(Pattern::Grammar(Box::new(parse_grammar_body(node, &ctx)?))),
        "div" => {
            let patterns = rng_children(node)
                .map(|c| parse_pattern(c, &ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(right_fold(patterns, Pattern::Group))
        }
        other => Err(Error::Syntax {
            line: 0,
            column: 0,
            message: format!("unexpected RNG XML element <{other}>"),
        }),
    }
}

fn parse_single_child(node: Node, ctx: &Context) -> Result<Pattern, Error> {
    let patterns = rng_children(node)
        .map(|c| parse_pattern(c, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(right_fold(patterns, Pattern::Group))
}

fn parse_nary(
    node: Node,
    ctx: &Context,
    combine: fn(Box<Pattern>, Box<Pattern>) -> Pattern,
) -> Result<Pattern, Error> {
    let patterns = rng_children(node)
        .map(|c| parse_pattern(c, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(right_fold(patterns, combine))
}

/// `element`/`attribute`: the first child is a name class unless `name=` is
/// present on the element itself (which takes precedence), then the
/// remaining children form the content, right-folded with `group`.
fn parse_element_or_attribute(node: Node, ctx: &Context, is_element: bool) -> Result<Pattern, Error> {
    let mut children = rng_children(node).peekable();

    let name_class = if let Some(name) = node.attribute("name") {
        NameClass::specific(ctx.ns.clone(), name)
    } else {
        let first = children
            .next()
            .ok_or_else(|| Error::MissingNameClass {
                element: node.tag_name().name().to_string(),
            })?;
        parse_name_class(first, ctx)?
    };

    let content_patterns = children
        .map(|c| parse_pattern(c, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let content = right_fold(content_patterns, Pattern::Group);

    Ok(if is_element {
        Pattern::Element(name_class, Box::new(content))
    } else {
        Pattern::Attribute(name_class, Box::new(content))
    })
}

fn parse_name_class(node: Node, ctx: &Context) -> Result<NameClass, Error> {
    match node.tag_name().name() {
        "name" => Ok(NameClass::specific(ctx.ns.clone(), node.text().unwrap_or("").trim())),
        "anyName" => Ok(NameClass::AnyName {
            except: parse_except_name_class(node, ctx)?,
        }),
        "nsName" => Ok(NameClass::NsName {
            ns: ctx.ns.clone(),
            except: parse_except_name_class(node, ctx)?,
        }),
        "choice" => {
            let mut members = rng_children(node)
                .map(|c| parse_name_class(c, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let last = members.pop().ok_or_else(|| Error::MissingNameClass {
                element: "choice".to_string(),
            })?;
            Ok(members
                .into_iter()
                .rev()
                .fold(last, |acc, next| NameClass::Choice(Box::new(next), Box::new(acc))))
        }
        other => Err(Error::Syntax {
            line: 0,
            column: 0,
            message: format!("expected a name class, found <{other}>"),
        }),
    }
}

fn parse_except_name_class(node: Node, ctx: &Context) -> Result<Option<Box<NameClass>>, Error> {
    rng_children(node)
        .find(|c| c.tag_name().name() == "except")
        .map(|except_node| {
            let members = rng_children(except_node)
                .map(|c| parse_name_class(c, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Box::new(members.into_iter().reduce(|l, r| {
                NameClass::Choice(Box::new(l), Box::new(r))
            }).unwrap_or(NameClass::AnyName { except: None })))
        })
        .transpose()
}

fn parse_data(node: Node, ctx: &Context) -> Result<Pattern, Error> {
    let datatype = attr_required(node, "type")?.to_string();
    let params = rng_children(node)
        .filter(|c| c.tag_name().name() == "param")
        .map(|p| (p.attribute("name").unwrap_or("").to_string(), p.text().unwrap_or("").to_string()))
        .collect();
    let except = rng_children(node)
        .find(|c| c.tag_name().name() == "except")
        .map(|except_node| {
            let patterns = rng_children(except_node)
                .map(|c| parse_pattern(c, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok::<_, Error>(Box::new(right_fold(patterns, Pattern::Choice)))
        })
        .transpose()?;
    Ok(Pattern::Data {
        library: ctx.datatype_library.clone(),
        datatype,
        params,
        except,
    })
}

fn parse_value(node: Node, ctx: &Context) -> Result<Pattern, Error> {
    Ok(Pattern::Value {
        library: node
            .attribute("datatypeLibrary")
            .unwrap_or(&ctx.datatype_library)
            .to_string(),
        datatype: node.attribute("type").unwrap_or("token").to_string(),
        value: node.text().unwrap_or("").to_string(),
        ns: node.attribute("ns").unwrap_or(&ctx.ns).to_string(),
    })
}

fn parse_grammar_body(node: Node, ctx: &Context) -> Result<GrammarPattern, Error> {
    let mut grammar = GrammarPattern::default();
    collect_grammar_content(node, ctx, &mut grammar)?;
    Ok(grammar)
}

fn collect_grammar_content(node: Node, ctx: &Context, grammar: &mut GrammarPattern) -> Result<(), Error> {
    for child in rng_children(node) {
        let ctx = ctx.child_of(child);
        match child.tag_name().name() {
            "start" => {
                let combine = parse_combine_attr(child);
                let body = parse_single_child(child, &ctx)?;
                if let (Some(existing), Combine::Choice | Combine::Interleave) = (&grammar.start, combine) {
                    let combined = match combine {
                        Combine::Choice => Pattern::Choice(Box::new(existing.clone()), Box::new(body)),
                        Combine::Interleave => {
                            Pattern::Interleave(Box::new(existing.clone()), Box::new(body))
                        }
                        Combine::None => unreachable!(),
                    };
                    grammar.start = Some(combined);
                } else {
                    grammar.start = Some(body);
                }
            }
            "define" => {
                let name = attr_required(child, "name")?.to_string();
                let combine = parse_combine_attr(child);
                let body = parse_single_child(child, &ctx)?;
                grammar.defines.push(Define { name, combine, body });
            }
            "div" => collect_grammar_content(child, &ctx, grammar)?,
            "include" => {
                let href = attr_required(child, "href")?.to_string();
                let ns = child.attribute("ns").map(String::from);
                let mut overrides = GrammarPattern::default();
                collect_grammar_content(child, &ctx, &mut overrides)?;
                grammar.includes.push(IncludeDirective {
                    href,
                    ns,
                    overrides: overrides.defines,
                    start_override: overrides.start,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_combine_attr(node: Node) -> Combine {
    match node.attribute("combine") {
        Some("choice") => Combine::Choice,
        Some("interleave") => Combine::Interleave,
        _ => Combine::None,
    }
}

fn attr_required<'a>(node: Node<'a, '_>, attribute: &str) -> Result<&'a str, Error> {
    node.attribute(attribute).ok_or_else(|| Error::Syntax {
        line: 0,
        column: 0,
        message: format!("<{}> is missing required attribute {attribute:?}", node.tag_name().name()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_element_with_name_attribute_and_attribute_child() {
        let xml = r#"<element name="card" xmlns="http://relaxng.org/ns/structure/1.0">
            <attribute name="type"><text/></attribute>
            <element name="name"><text/></element>
        </element>"#;
        let grammar = parse_grammar(xml).unwrap();
        match grammar.start.unwrap() {
            Pattern::Element(NameClass::Specific { local, .. }, content) => {
                assert_eq!(local, "card");
                match *content {
                    Pattern::Group(_, _) => {}
                    other => panic!("expected group content, got {other:?}"),
                }
            }
            other => panic!("expected element pattern, got {other:?}"),
        }
    }

    #[test]
    fn parses_grammar_with_start_and_define() {
        let xml = r#"<grammar xmlns="http://relaxng.org/ns/structure/1.0">
            <start><ref name="root"/></start>
            <define name="root"><element name="root"><text/></element></define>
        </grammar>"#;
        let grammar = parse_grammar(xml).unwrap();
        assert!(matches!(grammar.start, Some(Pattern::Ref(ref n)) if n == "root"));
        assert_eq!(grammar.defines.len(), 1);
        assert_eq!(grammar.defines[0].name, "root");
    }

    #[test]
    fn choice_name_class_resolves() {
        let xml = r#"<element xmlns="http://relaxng.org/ns/structure/1.0">
            <choice><name>a</name><name>b</name></choice>
            <text/>
        </element>"#;
        let grammar = parse_grammar(xml).unwrap();
        match grammar.start.unwrap() {
            Pattern::Element(NameClass::Choice(_, _), _) => {}
            other => panic!("expected choice name class, got {other:?}"),
        }
    }
}
