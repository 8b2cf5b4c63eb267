// ABOUTME: Recursive-descent parser for placeholder bodies
// ABOUTME: Handles identifiers, key refinements, filter chains with quoted arguments, and defaults

use super::error::ParseError;
use super::placeholder::{FilterCall, PlaceholderKind};

/// Classify the text between `{{` and `}}`.
pub(crate) fn parse_body(body: &str) -> PlaceholderKind {
    let result = match body.chars().next() {
        None => Err(ParseError::Empty),
        Some('/') => parse_file(body),
        Some('$') => Cursor::new(body, 1).variable(),
        Some(_) => Err(ParseError::UnknownForm),
    };

    result.unwrap_or_else(|error| PlaceholderKind::Malformed { error })
}

fn parse_file(body: &str) -> Result<PlaceholderKind, ParseError> {
    if body.len() == 1 {
        return Err(ParseError::EmptyPath);
    }
    Ok(PlaceholderKind::File {
        path: body.replace("\\}", "}"),
    })
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_key_char(c: char) -> bool {
    !matches!(c, ':' | '|' | '(' | ')' | '}') && !c.is_whitespace()
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn identifier(&mut self) -> Option<&'a str> {
        match self.peek() {
            Some(c) if is_identifier_start(c) => Some(self.take_while(is_identifier_char)),
            _ => None,
        }
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(ch) => ParseError::UnexpectedChar {
                ch,
                offset: self.pos,
            },
            None => ParseError::MissingIdentifier,
        }
    }

    // variable := identifier ('.' key)? (':' filter)* ('|default=' literal)?
    fn variable(mut self) -> Result<PlaceholderKind, ParseError> {
        let type_name = self.identifier().ok_or(ParseError::MissingIdentifier)?;

        let key = if self.eat('.') {
            let key = self.take_while(is_key_char);
            if key.is_empty() {
                return Err(ParseError::MissingKey);
            }
            key
        } else {
            type_name
        };

        let mut filters = Vec::new();
        while self.eat(':') {
            filters.push(self.filter()?);
        }

        let default = if self.eat('|') {
            let rest = &self.src[self.pos..];
            let literal = rest
                .strip_prefix("default=")
                .ok_or(ParseError::InvalidDefault)?;
            self.pos = self.src.len();
            Some(literal.to_string())
        } else {
            None
        };

        if self.peek().is_some() {
            return Err(self.unexpected());
        }

        Ok(PlaceholderKind::Variable {
            type_name: type_name.to_string(),
            key: key.to_string(),
            filters,
            default,
        })
    }

    // filter := identifier ('(' argument ')')?
    fn filter(&mut self) -> Result<FilterCall, ParseError> {
        let offset = self.pos;
        let name = self
            .identifier()
            .ok_or(ParseError::MissingFilterName { offset })?
            .to_string();

        let arg = if self.eat('(') {
            Some(self.argument(&name)?)
        } else {
            None
        };

        Ok(FilterCall { name, arg })
    }

    // argument := (quoted | [^()"'])* ')'
    fn argument(&mut self, filter: &str) -> Result<String, ParseError> {
        let start = self.pos;
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnterminatedArgument {
                        filter: filter.to_string(),
                    })
                }
                Some(')') => return Ok(self.src[start..self.pos - 1].to_string()),
                Some('(') => {
                    return Err(ParseError::NestedParentheses {
                        filter: filter.to_string(),
                    })
                }
                Some(q @ ('"' | '\'')) => self.quoted(q, filter)?,
                Some(_) => {}
            }
        }
    }

    fn quoted(&mut self, quote: char, filter: &str) -> Result<(), ParseError> {
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnterminatedQuote {
                        filter: filter.to_string(),
                    })
                }
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => return Ok(()),
                Some(_) => {}
            }
        }
    }
}
