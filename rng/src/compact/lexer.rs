//! Tokenizer for RELAX NG compact syntax.

use crate::error::Error;

const KEYWORDS: &[&str] = &[
    "element", "attribute", "namespace", "default", "datatypes", "div", "empty", "external",
    "grammar", "include", "inherit", "list", "mixed", "notAllowed", "parent", "start", "string",
    "token", "text",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(String),
    Identifier(String),
    PrefixedName(String, String),
    Literal(String),
    ParamRef(String),
    Equals,
    ChoiceAssign,
    InterleaveAssign,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Pipe,
    Amp,
    Star,
    Plus,
    Question,
    Minus,
    Tilde,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'#') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                Some(b'[') => {
                    let mut depth = 0;
                    loop {
                        match self.advance() {
                            Some(b'[') => depth += 1,
                            Some(b']') => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            None => {
                                return Err(Error::Syntax {
                                    line: self.line,
                                    column: self.column,
                                    message: "unterminated annotation block".to_string(),
                                })
                            }
                            _ => {}
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn is_name_start(byte: u8) -> bool {
        byte.is_ascii_alphabetic() || byte == b'_'
    }

    fn is_name_continue(byte: u8) -> bool {
        byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'.' || byte == b'-'
    }

    fn read_identifier_text(&mut self) -> String {
        let start = self.pos;
        while self.peek_byte().is_some_and(Self::is_name_continue) {
            self.advance();
        }
        String::from_utf8_lossy(&self.source[start..self.pos]).into_owned()
    }

    fn read_literal(&mut self) -> Result<String, Error> {
        let triple = self.source[self.pos..].starts_with(b"\"\"\"") || self.source[self.pos..].starts_with(b"'''");
        let quote = self.peek_byte().unwrap();
        let quote_len = if triple { 3 } else { 1 };
        for _ in 0..quote_len {
            self.advance();
        }
        let start = self.pos;
        loop {
            if triple {
                if self.source[self.pos..].starts_with(&[quote, quote, quote]) {
                    let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                    for _ in 0..3 {
                        self.advance();
                    }
                    return Ok(text);
                }
            } else if self.peek_byte() == Some(quote) {
                let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                self.advance();
                return Ok(text);
            }
            if self.advance().is_none() {
                return Err(Error::UnterminatedLiteral);
            }
        }
    }

    /// Reads one literal and any subsequent `~`-concatenated literals.
    fn read_literal_run(&mut self) -> Result<String, Error> {
        let mut text = self.read_literal()?;
        loop {
            self.skip_trivia()?;
            if self.peek_byte() == Some(b'~') {
                let save = (self.pos, self.line, self.column);
                self.advance();
                self.skip_trivia()?;
                match self.peek_byte() {
                    Some(b'"') | Some(b'\'') => text.push_str(&self.read_literal()?),
                    _ => {
                        (self.pos, self.line, self.column) = save;
                        break;
                    }
                }
            } else {
                break;
            }
        }
        Ok(text)
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let Some(byte) = self.peek_byte() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                column,
            });
        };

        let kind = match byte {
            b'"' | b'\'' => TokenKind::Literal(self.read_literal_run()?),
            b'\\' => {
                self.advance();
                let name = self.read_identifier_text();
                if KEYWORDS.contains(&name.as_str()) {
                    TokenKind::Identifier(name)
                } else {
                    return Err(Error::UnknownEscape(name));
                }
            }
            b'%' => {
                self.advance();
                let name = self.read_identifier_text();
                if self.peek_byte() != Some(b';') {
                    return Err(Error::Syntax {
                        line,
                        column,
                        message: "expected `;` to close parameter reference".to_string(),
                    });
                }
                self.advance();
                TokenKind::ParamRef(name)
            }
            b'=' => {
                self.advance();
                TokenKind::Equals
            }
            b'|' => {
                self.advance();
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    TokenKind::ChoiceAssign
                } else {
                    TokenKind::Pipe
                }
            }
            b'&' => {
                self.advance();
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    TokenKind::InterleaveAssign
                } else {
                    TokenKind::Amp
                }
            }
            b'{' => {
                self.advance();
                TokenKind::LBrace
            }
            b'}' => {
                self.advance();
                TokenKind::RBrace
            }
            b'(' => {
                self.advance();
                TokenKind::LParen
            }
            b')' => {
                self.advance();
                TokenKind::RParen
            }
            b',' => {
                self.advance();
                TokenKind::Comma
            }
            b'*' => {
                self.advance();
                TokenKind::Star
            }
            b'+' => {
                self.advance();
                TokenKind::Plus
            }
            b'?' => {
                self.advance();
                TokenKind::Question
            }
            b'-' => {
                self.advance();
                TokenKind::Minus
            }
            b'~' => {
                self.advance();
                TokenKind::Tilde
            }
            b if Self::is_name_start(b) => {
                let name = self.read_identifier_text();
                if self.peek_byte() == Some(b':') && self.source.get(self.pos + 1) != Some(&b':') {
                    self.advance();
                    let local = if self.peek_byte() == Some(b'*') {
                        self.advance();
                        "*".to_string()
                    } else {
                        self.read_identifier_text()
                    };
                    TokenKind::PrefixedName(name, local)
                } else if KEYWORDS.contains(&name.as_str()) {
                    TokenKind::Keyword(name)
                } else {
                    TokenKind::Identifier(name)
                }
            }
            other => {
                return Err(Error::Syntax {
                    line,
                    column,
                    message: format!("unexpected character {:?}", other as char),
                })
            }
        };
        Ok(Token { kind, line, column })
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                return Ok(tokens);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_keywords_and_identifiers() {
        assert_eq!(
            kinds("element foo"),
            vec![
                TokenKind::Keyword("element".to_string()),
                TokenKind::Identifier("foo".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenizes_prefixed_name_and_wildcard() {
        assert_eq!(
            kinds("xs:string xs:*"),
            vec![
                TokenKind::PrefixedName("xs".to_string(), "string".to_string()),
                TokenKind::PrefixedName("xs".to_string(), "*".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn concatenates_tilde_joined_literals() {
        assert_eq!(
            kinds(r#""a" ~ "b""#),
            vec![TokenKind::Literal("ab".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn triple_quoted_literal_allows_embedded_quotes() {
        assert_eq!(
            kinds(r#"""" he said "hi" """"#),
            vec![
                TokenKind::Literal(r#" he said "hi" "#.to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn escaped_keyword_becomes_identifier() {
        assert_eq!(
            kinds(r"\element"),
            vec![TokenKind::Identifier("element".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn skips_comments_and_annotations() {
        assert_eq!(
            kinds("# a comment\n[ foo = \"bar\" ]\nstart"),
            vec![TokenKind::Keyword("start".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn parameter_reference_token() {
        assert_eq!(
            kinds("%foo;"),
            vec![TokenKind::ParamRef("foo".to_string()), TokenKind::Eof]
        );
    }
}
