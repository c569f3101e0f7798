//! Restricted literal evaluator.
//!
//! Accepts only constant expressions: string, number, boolean, `null` and
//! `undefined` literals, array and object literals, parentheses, and `+`
//! chains. Anything else (identifiers, calls, member access, template
//! substitutions) is rejected with [`NotLiteral`]; nothing is ever executed.

use std::fmt;

use thiserror::Error;

use crate::core::scan::{find_top_level, split_top_level};
use crate::utils::{format_js_number, is_identifier};

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<LiteralValue>),
    /// Entries in source order; a repeated key overwrites in place.
    Object(Vec<(String, LiteralValue)>),
}

impl LiteralValue {
    /// `String(value)` for primitives; `None` for arrays and objects.
    pub fn to_js_string(&self) -> Option<String> {
        match self {
            LiteralValue::Undefined => Some("undefined".to_string()),
            LiteralValue::Null => Some("null".to_string()),
            LiteralValue::Bool(b) => Some(b.to_string()),
            LiteralValue::Number(n) => Some(format_js_number(*n)),
            LiteralValue::String(s) => Some(s.clone()),
            LiteralValue::Array(_) | LiteralValue::Object(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&LiteralValue> {
        match self {
            LiteralValue::Object(entries) => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a literal expression at offset {offset}")]
pub struct NotLiteral {
    pub offset: usize,
}

/// Evaluate `expression` if it is a constant literal expression.
pub fn evaluate(expression: &str) -> Result<LiteralValue, NotLiteral> {
    let mut parser = Parser {
        input: expression,
        pos: 0,
    };
    let value = parser.additive()?;
    parser.skip_whitespace();
    if parser.pos != expression.len() {
        return Err(parser.error());
    }
    Ok(value)
}

/// Split an object literal into `(key, raw value text)` pairs without
/// evaluating the values. Shorthand entries (`{ name }`) map to their own
/// identifier. Returns `None` if `text` is not an object literal.
pub fn object_entries(text: &str) -> Option<Vec<(String, String)>> {
    let body = text.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut entries = Vec::new();
    for part in split_top_level(body, ',')? {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match find_top_level(part, ':') {
            Some(colon) => {
                let key = property_key(part[..colon].trim())?;
                entries.push((key, part[colon + 1..].trim().to_string()));
            }
            None if is_identifier(part) => entries.push((part.to_string(), part.to_string())),
            None => return None,
        }
    }
    Some(entries)
}

fn property_key(raw: &str) -> Option<String> {
    if is_identifier(raw) {
        return Some(raw.to_string());
    }
    match evaluate(raw).ok()? {
        value @ (LiteralValue::String(_) | LiteralValue::Number(_)) => value.to_js_string(),
        _ => None,
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self) -> NotLiteral {
        NotLiteral { offset: self.pos }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn additive(&mut self) -> Result<LiteralValue, NotLiteral> {
        let mut value = self.unary()?;
        loop {
            self.skip_whitespace();
            let rest = &self.input[self.pos..];
            if !rest.starts_with('+') || rest.starts_with("++") || rest.starts_with("+=") {
                return Ok(value);
            }
            self.pos += 1;
            let offset = self.pos;
            let rhs = self.unary()?;
            value = add(value, rhs).ok_or(NotLiteral { offset })?;
        }
    }

    fn unary(&mut self) -> Result<LiteralValue, NotLiteral> {
        self.skip_whitespace();
        match self.peek() {
            Some(sign @ ('-' | '+')) => {
                self.pos += 1;
                let operand = self.unary()?;
                let number = operand.as_number().ok_or_else(|| self.error())?;
                Ok(LiteralValue::Number(if sign == '-' { -number } else { number }))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<LiteralValue, NotLiteral> {
        self.skip_whitespace();
        match self.peek() {
            Some(q @ ('\'' | '"' | '`')) => {
                self.pos += 1;
                self.string(q).map(LiteralValue::String)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some('(') => {
                self.pos += 1;
                let value = self.additive()?;
                if !self.eat(')') {
                    return Err(self.error());
                }
                Ok(value)
            }
            Some('[') => {
                self.pos += 1;
                self.array()
            }
            Some('{') => {
                self.pos += 1;
                self.object()
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                match self.identifier() {
                    "true" => Ok(LiteralValue::Bool(true)),
                    "false" => Ok(LiteralValue::Bool(false)),
                    "null" => Ok(LiteralValue::Null),
                    "undefined" => Ok(LiteralValue::Undefined),
                    _ => Err(self.error()),
                }
            }
            _ => Err(self.error()),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_' || c == '$') {
                break;
            }
            self.pos += 1;
        }
        &input[start..self.pos]
    }

    fn string(&mut self, quote: char) -> Result<String, NotLiteral> {
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or_else(|| self.error())?;
            match c {
                c if c == quote => return Ok(out),
                '\\' => match self.bump().ok_or_else(|| self.error())? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    '\n' => {}
                    other => out.push(other),
                },
                '$' if quote == '`' && self.peek() == Some('{') => return Err(self.error()),
                '\n' if quote != '`' => return Err(self.error()),
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<LiteralValue, NotLiteral> {
        let start = self.pos;
        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {}
                '.' if !seen_dot && !seen_exp => seen_dot = true,
                'e' | 'E' if !seen_exp => {
                    seen_exp = true;
                    if let Some(sign @ ('+' | '-')) = self.input[self.pos + 1..].chars().next() {
                        self.pos += sign.len_utf8();
                    }
                }
                _ => break,
            }
            self.pos += 1;
        }
        self.input[start..self.pos]
            .parse::<f64>()
            .map(LiteralValue::Number)
            .map_err(|_| NotLiteral { offset: start })
    }

    fn array(&mut self) -> Result<LiteralValue, NotLiteral> {
        let mut items = Vec::new();
        loop {
            if self.eat(']') {
                return Ok(LiteralValue::Array(items));
            }
            items.push(self.additive()?);
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(LiteralValue::Array(items));
            }
            return Err(self.error());
        }
    }

    fn object(&mut self) -> Result<LiteralValue, NotLiteral> {
        let mut entries: Vec<(String, LiteralValue)> = Vec::new();
        loop {
            if self.eat('}') {
                return Ok(LiteralValue::Object(entries));
            }
            self.skip_whitespace();
            let key = match self.primary_key()? {
                Some(key) => key,
                None => return Err(self.error()),
            };
            if !self.eat(':') {
                return Err(self.error());
            }
            let value = self.additive()?;
            match entries.iter_mut().find(|(name, _)| *name == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                return Ok(LiteralValue::Object(entries));
            }
            return Err(self.error());
        }
    }

    fn primary_key(&mut self) -> Result<Option<String>, NotLiteral> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                Ok(Some(self.identifier().to_string()))
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(q).map(Some)
            }
            Some(c) if c.is_ascii_digit() => Ok(self.number()?.to_js_string()),
            _ => Ok(None),
        }
    }
}

/// JavaScript `+` restricted to strings and numbers.
fn add(lhs: LiteralValue, rhs: LiteralValue) -> Option<LiteralValue> {
    match (&lhs, &rhs) {
        (LiteralValue::Number(a), LiteralValue::Number(b)) => Some(LiteralValue::Number(a + b)),
        (LiteralValue::String(_), _) | (_, LiteralValue::String(_)) => {
            let mut text = lhs.to_js_string()?;
            text.push_str(&rhs.to_js_string()?);
            Some(LiteralValue::String(text))
        }
        _ => None,
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_js_string() {
            Some(text) => f.write_str(&text),
            None => match self {
                LiteralValue::Array(items) => {
                    let parts: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                    f.write_str(&parts.join(","))
                }
                _ => f.write_str("[object Object]"),
            },
        }
    }
}
