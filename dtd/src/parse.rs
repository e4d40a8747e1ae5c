//! Hand-written scanner and recursive-descent parser for the DTD subset:
//! `<!ELEMENT>`, `<!ATTLIST>`, and `<!ENTITY>` declarations, optionally
//! wrapped in a `<!DOCTYPE ... [ ... ]>` internal subset.

use std::collections::HashMap;

use crate::error::Error;
use crate::ir::{AttDef, AttType, AttlistDecl, ContentParticle, ContentSpec, DefaultDecl, Doctype, ElementDecl, EntityDecl, GroupKind, Quantifier};

pub fn parse_dtd(source: &str) -> Result<Doctype, Error> {
    let expanded = expand_parameter_entities(source);
    let mut reader = Reader::new(&expanded);
    let mut doctype = Doctype::default();
    parse_subset(&mut reader, &mut doctype)?;
    Ok(doctype)
}

/// Parameter entities (`<!ENTITY % name "value">`) are textual macros
/// resolved before declarations are parsed, matching how a DTD processor
/// expands them. External parameter entities (`SYSTEM`/`PUBLIC`) have no
/// local replacement text and are left unexpanded.
fn expand_parameter_entities(source: &str) -> String {
    let mut params = HashMap::new();
    let mut reader = Reader::new(source);
    while let Some((start, end)) = reader.find_next_markup() {
        let decl = &reader.source[start..end];
        if let Some(rest) = decl.strip_prefix("<!ENTITY") {
            let rest = rest.trim_start();
            if let Some(rest) = rest.strip_prefix('%') {
                let rest = rest.trim_start();
                if let Some(name_end) = rest.find(|c: char| c.is_whitespace()) {
                    let name = &rest[..name_end];
                    let tail = rest[name_end..].trim();
                    if let Some(value) = extract_quoted(tail) {
                        params.insert(name.to_string(), value);
                    }
                }
            }
        }
    }
    if params.is_empty() {
        return source.to_string();
    }
    let mut text = source.to_string();
    for _ in 0..8 {
        let mut changed = false;
        for (name, value) in &params {
            let marker = format!("%{name};");
            if text.contains(&marker) {
                text = text.replace(&marker, value);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    text
}

fn extract_quoted(s: &str) -> Option<String> {
    let s = s.trim();
    let quote = s.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &s[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

struct Reader<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.source[self.pos..].starts_with(s)
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n')) {
            self.bump();
        }
    }

    fn skip_ws_and_comments(&mut self) -> Result<(), Error> {
        loop {
            self.skip_ws();
            if self.starts_with("<!--") {
                for _ in 0..4 {
                    self.bump();
                }
                while !self.starts_with("-->") {
                    if self.bump().is_none() {
                        return Err(Error::Syntax {
                            line: self.line,
                            column: self.column,
                            message: "unterminated comment".to_string(),
                        });
                    }
                }
                for _ in 0..3 {
                    self.bump();
                }
            } else {
                return Ok(());
            }
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<(), Error> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(Error::Syntax {
                line: self.line,
                column: self.column,
                message: format!("expected `{}`", expected as char),
            })
        }
    }

    fn is_name_continue(byte: u8) -> bool {
        byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.' | b':')
    }

    fn read_name(&mut self) -> Result<String, Error> {
        self.skip_ws_and_comments()?;
        let start = self.pos;
        while self.peek().is_some_and(Self::is_name_continue) {
            self.bump();
        }
        if self.pos == start {
            return Err(Error::Syntax {
                line: self.line,
                column: self.column,
                message: "expected a name".to_string(),
            });
        }
        Ok(self.source[start..self.pos].to_string())
    }

    fn read_quoted_literal(&mut self) -> Result<String, Error> {
        self.skip_ws_and_comments()?;
        let (line, column) = (self.line, self.column);
        let quote = match self.peek() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => {
                return Err(Error::Syntax {
                    line,
                    column,
                    message: "expected a quoted literal".to_string(),
                })
            }
        };
        self.bump();
        let start = self.pos;
        while self.peek() != Some(quote) {
            if self.bump().is_none() {
                return Err(Error::UnterminatedLiteral { line, column });
            }
        }
        let text = self.source[start..self.pos].to_string();
        self.bump();
        Ok(text)
    }

    /// Returns the byte range of the next `<! ... >` markup declaration,
    /// skipping over anything preceding it. Used by the parameter-entity
    /// pre-pass to scan declarations without fully parsing them.
    fn find_next_markup(&mut self) -> Option<(usize, usize)> {
        loop {
            self.skip_ws();
            if self.peek().is_none() {
                return None;
            }
            if self.starts_with("<!--") {
                let _ = self.skip_ws_and_comments();
                continue;
            }
            if self.peek() == Some(b'<') && self.peek_at(1) == Some(b'!') {
                let start = self.pos;
                let mut depth = 0i32;
                loop {
                    match self.bump() {
                        Some(b'<') => depth += 1,
                        Some(b'>') => {
                            depth -= 1;
                            if depth == 0 {
                                return Some((start, self.pos));
                            }
                        }
                        Some(b'"') | Some(b'\'') => {
                            let quote = self.bytes[self.pos - 1];
                            while self.peek() != Some(quote) {
                                if self.bump().is_none() {
                                    return Some((start, self.pos));
                                }
                            }
                            self.bump();
                        }
                        None => return Some((start, self.pos)),
                        _ => {}
                    }
                }
            } else {
                self.bump();
            }
        }
    }
}

fn parse_subset(reader: &mut Reader, doctype: &mut Doctype) -> Result<(), Error> {
    loop {
        reader.skip_ws_and_comments()?;
        if reader.peek().is_none() {
            return Ok(());
        }
        if reader.starts_with("<!DOCTYPE") {
            for _ in 0.."<!DOCTYPE".len() {
                reader.bump();
            }
            skip_to_internal_subset_or_end(reader, doctype)?;
            continue;
        }
        if reader.starts_with("<!ELEMENT") {
            parse_element_decl(reader, doctype)?;
        } else if reader.starts_with("<!ATTLIST") {
            parse_attlist_decl(reader, doctype)?;
        } else if reader.starts_with("<!ENTITY") {
            parse_entity_decl(reader, doctype)?;
        } else if reader.starts_with("<!NOTATION") {
            skip_declaration(reader)?;
        } else if reader.starts_with("]>") {
            reader.bump();
            reader.bump();
        } else if reader.peek() == Some(b']') {
            reader.bump();
        } else {
            return Err(Error::Syntax {
                line: reader.line,
                column: reader.column,
                message: "expected a markup declaration".to_string(),
            });
        }
    }
}

fn skip_to_internal_subset_or_end(reader: &mut Reader, doctype: &mut Doctype) -> Result<(), Error> {
    loop {
        reader.skip_ws_and_comments()?;
        match reader.peek() {
            Some(b'[') => {
                reader.bump();
                return parse_subset(reader, doctype);
            }
            Some(b'>') => {
                reader.bump();
                return Ok(());
            }
            Some(_) => {
                reader.bump();
            }
            None => {
                return Err(Error::Syntax {
                    line: reader.line,
                    column: reader.column,
                    message: "unterminated DOCTYPE declaration".to_string(),
                })
            }
        }
    }
}

fn skip_declaration(reader: &mut Reader) -> Result<(), Error> {
    while reader.peek() != Some(b'>') {
        if reader.bump().is_none() {
            return Err(Error::Syntax {
                line: reader.line,
                column: reader.column,
                message: "unterminated declaration".to_string(),
            });
        }
    }
    reader.bump();
    Ok(())
}

fn parse_element_decl(reader: &mut Reader, doctype: &mut Doctype) -> Result<(), Error> {
    for _ in 0.."<!ELEMENT".len() {
        reader.bump();
    }
    let name = reader.read_name()?;
    let content_spec = parse_content_spec(reader)?;
    reader.skip_ws_and_comments()?;
    reader.expect_byte(b'>')?;
    doctype.elements.push(ElementDecl { name, content_spec });
    Ok(())
}

fn parse_content_spec(reader: &mut Reader) -> Result<ContentSpec, Error> {
    reader.skip_ws_and_comments()?;
    if reader.starts_with("EMPTY") {
        for _ in 0.."EMPTY".len() {
            reader.bump();
        }
        return Ok(ContentSpec::Empty);
    }
    if reader.starts_with("ANY") {
        for _ in 0.."ANY".len() {
            reader.bump();
        }
        return Ok(ContentSpec::Any);
    }
    reader.expect_byte(b'(')?;
    reader.skip_ws_and_comments()?;
    if reader.starts_with("#PCDATA") {
        for _ in 0.."#PCDATA".len() {
            reader.bump();
        }
        let mut names = Vec::new();
        loop {
            reader.skip_ws_and_comments()?;
            match reader.peek() {
                Some(b'|') => {
                    reader.bump();
                    names.push(reader.read_name()?);
                }
                Some(b')') => {
                    reader.bump();
                    break;
                }
                _ => {
                    return Err(Error::Syntax {
                        line: reader.line,
                        column: reader.column,
                        message: "expected `|` or `)` in mixed content".to_string(),
                    })
                }
            }
        }
        // A trailing `*` is required by the DTD grammar when names are
        // listed; a bare `(#PCDATA)` has none.
        if reader.peek() == Some(b'*') {
            reader.bump();
        }
        return Ok(if names.is_empty() {
            ContentSpec::PcdataOnly
        } else {
            ContentSpec::Mixed(names)
        });
    }
    let particle = parse_group_body(reader)?;
    Ok(ContentSpec::Children(particle))
}

/// Parses the body of a parenthesized group, assuming the opening `(` has
/// already been consumed, including its own closing `)` and quantifier.
fn parse_group_body(reader: &mut Reader) -> Result<ContentParticle, Error> {
    let mut items = vec![parse_particle(reader)?];
    let mut kind = None;
    loop {
        reader.skip_ws_and_comments()?;
        match reader.peek() {
            Some(b',') => {
                reader.bump();
                kind = Some(kind.unwrap_or(GroupKind::Sequence));
                items.push(parse_particle(reader)?);
            }
            Some(b'|') => {
                reader.bump();
                kind = Some(kind.unwrap_or(GroupKind::Choice));
                items.push(parse_particle(reader)?);
            }
            Some(b')') => {
                reader.bump();
                break;
            }
            _ => {
                return Err(Error::Syntax {
                    line: reader.line,
                    column: reader.column,
                    message: "expected `,`, `|`, or `)` in content model group".to_string(),
                })
            }
        }
    }
    let quantifier = parse_quantifier(reader);
    Ok(ContentParticle::Group {
        kind: kind.unwrap_or(GroupKind::Sequence),
        items,
        quantifier,
    })
}

fn parse_particle(reader: &mut Reader) -> Result<ContentParticle, Error> {
    reader.skip_ws_and_comments()?;
    if reader.peek() == Some(b'(') {
        reader.bump();
        parse_group_body(reader)
    } else {
        let name = reader.read_name()?;
        let quantifier = parse_quantifier(reader);
        Ok(ContentParticle::Name(name, quantifier))
    }
}

fn parse_quantifier(reader: &mut Reader) -> Quantifier {
    match reader.peek() {
        Some(b'*') => {
            reader.bump();
            Quantifier::ZeroOrMore
        }
        Some(b'+') => {
            reader.bump();
            Quantifier::OneOrMore
        }
        Some(b'?') => {
            reader.bump();
            Quantifier::ZeroOrOne
        }
        _ => Quantifier::One,
    }
}

fn parse_attlist_decl(reader: &mut Reader, doctype: &mut Doctype) -> Result<(), Error> {
    for _ in 0.."<!ATTLIST".len() {
        reader.bump();
    }
    let element_name = reader.read_name()?;
    let mut attributes = Vec::new();
    loop {
        reader.skip_ws_and_comments()?;
        if reader.peek() == Some(b'>') {
            reader.bump();
            break;
        }
        attributes.push(parse_att_def(reader)?);
    }
    doctype.attlists.push(AttlistDecl { element_name, attributes });
    Ok(())
}

fn parse_att_def(reader: &mut Reader) -> Result<AttDef, Error> {
    let name = reader.read_name()?;
    let att_type = parse_att_type(reader)?;
    let default = parse_default_decl(reader)?;
    Ok(AttDef { name, att_type, default })
}

fn parse_att_type(reader: &mut Reader) -> Result<AttType, Error> {
    reader.skip_ws_and_comments()?;
    if reader.peek() == Some(b'(') {
        reader.bump();
        return Ok(AttType::Enumeration(parse_name_list(reader)?));
    }
    if reader.starts_with("NOTATION") {
        for _ in 0.."NOTATION".len() {
            reader.bump();
        }
        reader.skip_ws_and_comments()?;
        reader.expect_byte(b'(')?;
        return Ok(AttType::Notation(parse_name_list(reader)?));
    }
    let keyword = reader.read_name()?;
    match keyword.as_str() {
        "CDATA" => Ok(AttType::CData),
        "ID" => Ok(AttType::Id),
        "IDREF" => Ok(AttType::IdRef),
        "IDREFS" => Ok(AttType::IdRefs),
        "ENTITY" => Ok(AttType::Entity),
        "ENTITIES" => Ok(AttType::Entities),
        "NMTOKEN" => Ok(AttType::Nmtoken),
        "NMTOKENS" => Ok(AttType::Nmtokens),
        other => Err(Error::UnknownAttType(other.to_string())),
    }
}

fn parse_name_list(reader: &mut Reader) -> Result<Vec<String>, Error> {
    let mut names = vec![reader.read_name()?];
    loop {
        reader.skip_ws_and_comments()?;
        match reader.peek() {
            Some(b'|') => {
                reader.bump();
                names.push(reader.read_name()?);
            }
            Some(b')') => {
                reader.bump();
                return Ok(names);
            }
            _ => {
                return Err(Error::Syntax {
                    line: reader.line,
                    column: reader.column,
                    message: "expected `|` or `)` in name list".to_string(),
                })
            }
        }
    }
}

fn parse_default_decl(reader: &mut Reader) -> Result<DefaultDecl, Error> {
    reader.skip_ws_and_comments()?;
    if reader.peek() == Some(b'#') {
        reader.bump();
        let keyword = format!("#{}", reader.read_name()?);
        return match keyword.as_str() {
            "#REQUIRED" => Ok(DefaultDecl::Required),
            "#IMPLIED" => Ok(DefaultDecl::Implied),
            "#FIXED" => Ok(DefaultDecl::Fixed(reader.read_quoted_literal()?)),
            other => Err(Error::Syntax {
                line: reader.line,
                column: reader.column,
                message: format!("unknown default declaration keyword `{other}`"),
            }),
        };
    }
    Ok(DefaultDecl::Value(reader.read_quoted_literal()?))
}

fn parse_entity_decl(reader: &mut Reader, doctype: &mut Doctype) -> Result<(), Error> {
    for _ in 0.."<!ENTITY".len() {
        reader.bump();
    }
    reader.skip_ws_and_comments()?;
    let is_parameter = reader.peek() == Some(b'%');
    if is_parameter {
        reader.bump();
    }
    let name = reader.read_name()?;
    reader.skip_ws_and_comments()?;
    if reader.starts_with("SYSTEM") || reader.starts_with("PUBLIC") {
        // External entities have no local replacement text; skip to `>`.
        skip_declaration(reader)?;
        return Ok(());
    }
    let value = reader.read_quoted_literal()?;
    reader.skip_ws_and_comments()?;
    reader.expect_byte(b'>')?;
    doctype.entities.push(EntityDecl { name, value, is_parameter });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_and_any_elements() {
        let dtd = parse_dtd("<!ELEMENT br EMPTY><!ELEMENT div ANY>").unwrap();
        assert_eq!(dtd.elements[0].content_spec, ContentSpec::Empty);
        assert_eq!(dtd.elements[1].content_spec, ContentSpec::Any);
    }

    #[test]
    fn parses_mixed_content() {
        let dtd = parse_dtd("<!ELEMENT p (#PCDATA|b|i)*>").unwrap();
        match &dtd.elements[0].content_spec {
            ContentSpec::Mixed(names) => assert_eq!(names, &vec!["b".to_string(), "i".to_string()]),
            other => panic!("expected mixed content, got {other:?}"),
        }
    }

    #[test]
    fn parses_sequence_with_quantifiers() {
        let dtd = parse_dtd("<!ELEMENT book (title, author+, chapter*)>").unwrap();
        match &dtd.elements[0].content_spec {
            ContentSpec::Children(ContentParticle::Group { kind, items, .. }) => {
                assert_eq!(*kind, GroupKind::Sequence);
                assert_eq!(items.len(), 3);
                assert_eq!(items[1], ContentParticle::Name("author".to_string(), Quantifier::OneOrMore));
            }
            other => panic!("expected a children group, got {other:?}"),
        }
    }

    #[test]
    fn parses_attlist_with_enumeration_and_defaults() {
        let dtd = parse_dtd(
            r#"<!ATTLIST book
                id ID #REQUIRED
                status (draft|final) "draft"
                lang CDATA #IMPLIED
            >"#,
        )
        .unwrap();
        let attlist = &dtd.attlists[0];
        assert_eq!(attlist.attributes[0].att_type, AttType::Id);
        assert_eq!(attlist.attributes[0].default, DefaultDecl::Required);
        assert_eq!(
            attlist.attributes[1].att_type,
            AttType::Enumeration(vec!["draft".to_string(), "final".to_string()])
        );
        assert_eq!(attlist.attributes[1].default, DefaultDecl::Value("draft".to_string()));
    }

    #[test]
    fn expands_parameter_entities() {
        let dtd = parse_dtd(
            r#"<!ENTITY % common.atts "id ID #IMPLIED">
               <!ATTLIST book %common.atts;>"#,
        )
        .unwrap();
        assert_eq!(dtd.attlists[0].attributes[0].name, "id");
    }

    #[test]
    fn doctype_wrapper_internal_subset_is_parsed() {
        let dtd = parse_dtd("<!DOCTYPE book [ <!ELEMENT book (title)> ]>").unwrap();
        assert_eq!(dtd.elements[0].name, "book");
    }
}
