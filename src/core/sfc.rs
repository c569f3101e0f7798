//! Locating the top-level blocks of a single-file component.
//!
//! Only the outer structure is recognized: `<template>`, `<script>`,
//! `<style>` and custom blocks at depth zero. Nested `<template>` elements
//! are balanced so the root template closes at the right tag.

use crate::core::markup::{Attribute, TagClose, find_end_tag, read_start_tag};
use crate::core::span::{LineIndex, SourceSpan};
use crate::error::TransformError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    /// From `<name` through the closing tag.
    pub span: SourceSpan,
    /// Between the start tag's `>` and the closing tag.
    pub content: SourceSpan,
    pub attributes: Vec<Attribute>,
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_ref().map_or("", |v| v.text.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentLayout {
    pub blocks: Vec<Block>,
}

impl ComponentLayout {
    pub fn template(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name == "template")
    }

    pub fn custom_blocks<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Block> + 'a {
        self.blocks.iter().filter(move |b| b.name == name)
    }
}

/// Find every top-level block in `source`.
///
/// A `<template>` without its closing tag is the one hard error; other
/// unterminated blocks run to the end of the input.
pub fn locate_blocks(source: &str) -> Result<ComponentLayout, TransformError> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find('<') {
        let at = pos + found;
        let rest = &source[at..];
        if rest.starts_with("<!--") {
            pos = at + rest.find("-->").map_or(rest.len(), |end| end + 3);
            continue;
        }
        let Some(open) = read_start_tag(source, at, source.len()) else {
            pos = at + 1;
            continue;
        };

        let content_start = open.end;
        match open.close {
            TagClose::Open => {}
            TagClose::SelfClosing => {
                blocks.push(Block {
                    name: open.name,
                    span: SourceSpan::new(at, open.end),
                    content: SourceSpan::new(open.end, open.end),
                    attributes: open.attributes,
                });
                pos = open.end;
                continue;
            }
            TagClose::Missing if open.name == "template" => {
                return Err(unterminated(source, at));
            }
            TagClose::Missing => {
                pos = open.end.max(at + 1);
                continue;
            }
        }

        let close = if open.name == "template" {
            find_template_close(source, content_start)
        } else {
            find_end_tag(source, content_start, source.len(), &open.name)
        };
        let (content_end, block_end) = match close {
            Some(close) => (close.begin, close.end),
            None if open.name == "template" => return Err(unterminated(source, at)),
            None => (source.len(), source.len()),
        };

        blocks.push(Block {
            name: open.name,
            span: SourceSpan::new(at, block_end),
            content: SourceSpan::new(content_start, content_end),
            attributes: open.attributes,
        });
        pos = block_end;
    }

    Ok(ComponentLayout { blocks })
}

fn unterminated(source: &str, offset: usize) -> TransformError {
    TransformError::UnterminatedTemplate(LineIndex::new(source).location(source, offset))
}

/// The `</template>` closing the template whose content starts at `from`.
fn find_template_close(source: &str, from: usize) -> Option<SourceSpan> {
    let mut depth = 1usize;
    let mut search = from;
    loop {
        let close = find_end_tag(source, search, source.len(), "template")?;
        let nested_open = source[search..close.begin]
            .match_indices("<template")
            .map(|(i, _)| search + i)
            .find_map(|at| {
                read_start_tag(source, at, source.len())
                    .filter(|tag| tag.name == "template" && tag.close != TagClose::Missing)
                    .map(|tag| (tag.end, tag.close))
            });

        match nested_open {
            Some((end, TagClose::Open)) => {
                depth += 1;
                search = end;
            }
            Some((end, _)) => search = end,
            None => {
                depth -= 1;
                if depth == 0 {
                    return Some(close);
                }
                search = close.end;
            }
        }
    }
}
