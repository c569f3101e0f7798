//! Markup scanner for template regions.
//!
//! Walks the template left to right and classifies runs as tags, comments,
//! doctypes, raw text or text. An element stack tracks the `translate`
//! attribute so every text run and start tag carries its effective
//! translate flag. The scanner only reads; rewriting happens elsewhere.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::core::scan::Quote;
use crate::core::span::SourceSpan;

const NAME_CHARS: &str = r"\-\.0-9_a-zA-Z\x{00B7}\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{037D}\x{037F}-\x{1FFF}\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}";

fn qualified_name() -> String {
    let ncname = format!("[a-zA-Z_][{}]*", NAME_CHARS);
    format!("((?:{ncname}:)?{ncname})")
}

static START_TAG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^<{}", qualified_name())).unwrap());
static START_TAG_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(/?)>").unwrap());
static END_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^</{}[^>]*>", qualified_name())).unwrap());
static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^<!DOCTYPE [^>]+>").unwrap());
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .unwrap()
});
static DYNAMIC_ARG_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*((?:v-[\w-]+:|@|:|#)\[[^=]+\][^\s"'<>/=]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
    .unwrap()
});
static BINDING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?::|\.|v-bind:)").unwrap());

/// Elements whose content is opaque text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFrame {
    pub tag_name: String,
    pub translate_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    /// Span of the value text, excluding quotes.
    pub span: SourceSpan,
    pub text: String,
    pub quote: Option<Quote>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// From the first character of the name to the end of the value
    /// (closing quote included), leading whitespace excluded.
    pub span: SourceSpan,
    pub name: String,
    pub value: Option<AttributeValue>,
    /// `:[key]="..."` style attribute whose name is itself an expression.
    pub dynamic_argument: bool,
}

impl Attribute {
    /// The binding prefix (`:`, `.` or `v-bind:`) when the value is an expression.
    pub fn binding_prefix(&self) -> Option<&str> {
        BINDING_PREFIX.find(&self.name).map(|m| m.as_str())
    }

    /// Attribute name with the binding prefix removed.
    pub fn static_name(&self) -> &str {
        match self.binding_prefix() {
            Some(prefix) => &self.name[prefix.len()..],
            None => &self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub span: SourceSpan,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    /// Effective flag once every attribute of the tag has been seen.
    pub translate: bool,
    /// The outermost `<template>` element; its attributes are never processed.
    pub root: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text { span: SourceSpan, translate: bool },
    Comment(SourceSpan),
    Doctype(SourceSpan),
    StartTag(StartTag),
    EndTag { span: SourceSpan, name: String },
    /// Content of a script, style or textarea element.
    RawText(SourceSpan),
}

#[derive(Debug, Clone, Default)]
pub struct MarkupScan {
    pub tokens: Vec<Token>,
    /// Offset where scanning stopped; everything after it is left alone.
    pub end: usize,
}

impl MarkupScan {
    /// Text runs inside translate-enabled elements.
    pub fn translatable_text(&self) -> impl Iterator<Item = SourceSpan> + '_ {
        self.tokens.iter().filter_map(|token| match token {
            Token::Text {
                span,
                translate: true,
            } => Some(*span),
            _ => None,
        })
    }

    /// Start tags whose attribute values may be rewritten.
    pub fn translatable_tags(&self) -> impl Iterator<Item = &StartTag> + '_ {
        self.tokens.iter().filter_map(|token| match token {
            Token::StartTag(tag) if tag.translate && !tag.root => Some(tag),
            _ => None,
        })
    }
}

/// Scan `source[region]`.
///
/// Top-level text is translate-enabled. Scanning stops when the root
/// `<template>` element closes or when an end tag matches no open element.
pub fn scan(source: &str, region: SourceSpan) -> MarkupScan {
    Scanner {
        source,
        end: region.end,
        pos: region.begin,
        stack: Vec::new(),
        tokens: Vec::new(),
    }
    .run()
}

struct Scanner<'a> {
    source: &'a str,
    end: usize,
    pos: usize,
    stack: Vec<ElementFrame>,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..self.end]
    }

    fn translate_enabled(&self) -> bool {
        self.stack.last().is_none_or(|frame| frame.translate_enabled)
    }

    fn run(mut self) -> MarkupScan {
        while self.pos < self.end {
            if self.rest().starts_with('<') && self.markup() {
                continue;
            }
            self.text();
        }
        MarkupScan {
            tokens: self.tokens,
            end: self.pos.min(self.end),
        }
    }

    /// Try every construct starting with `<`. Returns false when none applies.
    fn markup(&mut self) -> bool {
        let start = self.pos;
        let rest = self.rest();

        if rest.starts_with("<!--") {
            let len = rest.find("-->").map_or(rest.len(), |i| i + 3);
            self.pos += len;
            self.tokens.push(Token::Comment(SourceSpan::new(start, self.pos)));
            return true;
        }
        if rest.starts_with("<![") {
            let len = rest.find("]>").map_or(rest.len(), |i| i + 2);
            self.pos += len;
            self.tokens.push(Token::Comment(SourceSpan::new(start, self.pos)));
            return true;
        }
        if let Some(m) = DOCTYPE.find(rest) {
            self.pos += m.end();
            self.tokens.push(Token::Doctype(SourceSpan::new(start, self.pos)));
            return true;
        }
        if let Some(caps) = END_TAG.captures(rest) {
            let len = caps[0].len();
            let name = caps[1].to_string();
            self.end_tag(start, len, name);
            return true;
        }
        if let Some(open) = read_start_tag(self.source, start, self.end) {
            self.start_tag(start, open);
            return true;
        }
        false
    }

    fn end_tag(&mut self, start: usize, len: usize, name: String) {
        let Some(index) = self.stack.iter().rposition(|frame| frame.tag_name == name) else {
            // Unmatched end tag: stop and leave the rest untouched.
            self.end = start;
            return;
        };
        self.pos = start + len;
        self.stack.truncate(index);
        let closes_root = index == 0 && name == "template";
        self.tokens.push(Token::EndTag {
            span: SourceSpan::new(start, self.pos),
            name,
        });
        if closes_root {
            self.end = self.pos;
        }
    }

    fn start_tag(&mut self, start: usize, open: OpenTag) {
        let name = open.name;
        let root = self.stack.is_empty() && name == "template";
        self.pos = open.end;

        let self_closing = match open.close {
            TagClose::Open => false,
            TagClose::SelfClosing => true,
            TagClose::Missing => {
                // No `>`: copy what was consumed through untouched.
                self.tokens.push(Token::Text {
                    span: SourceSpan::new(start, self.pos),
                    translate: false,
                });
                return;
            }
        };

        let mut translate = self.translate_enabled();
        if !root {
            for attribute in open.attributes.iter().filter(|a| a.name == "translate") {
                translate = match attribute.value.as_ref().map_or("", |v| v.text.as_str()) {
                    "yes" | "" => true,
                    "no" => false,
                    _ => translate,
                };
            }
        }

        self.tokens.push(Token::StartTag(StartTag {
            span: SourceSpan::new(start, self.pos),
            name: name.clone(),
            attributes: open.attributes,
            self_closing,
            translate,
            root,
        }));

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            self.raw_text(&name);
            return;
        }
        self.stack.push(ElementFrame {
            tag_name: name,
            translate_enabled: translate,
        });
    }

    /// Skip to the matching `</name ...>` of a raw text element.
    fn raw_text(&mut self, name: &str) {
        let content_start = self.pos;
        let Some(close) = find_end_tag(self.source, content_start, self.end, name) else {
            self.tokens
                .push(Token::RawText(SourceSpan::new(content_start, self.end)));
            self.pos = self.end;
            return;
        };
        self.tokens
            .push(Token::RawText(SourceSpan::new(content_start, close.begin)));
        self.tokens.push(Token::EndTag {
            span: close,
            name: name.to_string(),
        });
        self.pos = close.end;
    }

    /// Consume a text run up to the next `<` that begins real markup.
    fn text(&mut self) {
        let start = self.pos;
        let rest = self.rest();
        let mut text_end = if rest.starts_with('<') { 1 } else { 0 };
        loop {
            match rest[text_end..].find('<') {
                Some(i) => {
                    text_end += i;
                    if starts_markup(&rest[text_end..]) {
                        break;
                    }
                    text_end += 1;
                }
                None => {
                    text_end = rest.len();
                    break;
                }
            }
        }
        self.pos += text_end;
        self.tokens.push(Token::Text {
            span: SourceSpan::new(start, self.pos),
            translate: self.translate_enabled(),
        });
    }
}

/// How a start tag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagClose {
    Open,
    SelfClosing,
    /// Attributes ran into something other than `>` or `/>`.
    Missing,
}

#[derive(Debug, Clone)]
pub(crate) struct OpenTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Offset just past the tag, or past the last attribute when unclosed.
    pub end: usize,
    pub close: TagClose,
}

/// Read the start tag at `source[start..]`, looking no further than `limit`.
pub(crate) fn read_start_tag(source: &str, start: usize, limit: usize) -> Option<OpenTag> {
    let caps = START_TAG_OPEN.captures(&source[start..limit])?;
    let name = caps[1].to_string();
    let mut pos = start + caps[0].len();
    let mut attributes = Vec::new();

    loop {
        let rest = &source[pos..limit];
        let (caps, dynamic_argument) = match DYNAMIC_ARG_ATTRIBUTE.captures(rest) {
            Some(caps) => (caps, true),
            None => match ATTRIBUTE.captures(rest) {
                Some(caps) => (caps, false),
                None => break,
            },
        };
        attributes.push(build_attribute(&caps, pos, dynamic_argument));
        pos += caps[0].len();
    }

    let close = match START_TAG_CLOSE.captures(&source[pos..limit]) {
        Some(close) => {
            pos += close[0].len();
            if close[1].is_empty() {
                TagClose::Open
            } else {
                TagClose::SelfClosing
            }
        }
        None => TagClose::Missing,
    };
    Some(OpenTag {
        name,
        attributes,
        end: pos,
        close,
    })
}

/// Span of the first `</name ...>` in `source[from..limit]`.
pub(crate) fn find_end_tag(source: &str, from: usize, limit: usize, name: &str) -> Option<SourceSpan> {
    let needle = format!("</{}", name);
    let text = &source[from..limit];
    let mut search = 0;
    while let Some(found) = text[search..].find(&needle) {
        let at = search + found;
        let after = &text[at + needle.len()..];
        let boundary = after
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c.is_whitespace());
        if boundary && let Some(gt) = after.find('>') {
            return Some(SourceSpan::new(from + at, from + at + needle.len() + gt + 1));
        }
        search = at + needle.len();
    }
    None
}

fn starts_markup(rest: &str) -> bool {
    rest.starts_with("<!--")
        || rest.starts_with("<![")
        || END_TAG.is_match(rest)
        || START_TAG_OPEN.is_match(rest)
}

fn build_attribute(caps: &Captures<'_>, base: usize, dynamic_argument: bool) -> Attribute {
    let name = caps.get(1).map_or("", |m| m.as_str());
    let name_start = caps.get(1).map_or(0, |m| m.start());
    let whole_end = caps.get(0).map_or(0, |m| m.end());

    let value = [(2, Some(Quote::Double)), (3, Some(Quote::Single)), (4, None)]
        .into_iter()
        .find_map(|(group, quote)| {
            caps.get(group).map(|m| AttributeValue {
                span: SourceSpan::new(base + m.start(), base + m.end()),
                text: m.as_str().to_string(),
                quote,
            })
        });

    Attribute {
        span: SourceSpan::new(base + name_start, base + whole_end),
        name: name.to_string(),
        value,
        dynamic_argument,
    }
}
