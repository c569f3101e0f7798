//! Splicing replacement text into the original source.

use crate::core::span::SourceSpan;

/// Replace `source[span]` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: SourceSpan,
    pub replacement: String,
}

impl Edit {
    pub fn new(span: SourceSpan, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn delete(span: SourceSpan) -> Self {
        Self::new(span, String::new())
    }
}

/// Apply `edits` to `source`. Everything outside the edited spans is copied
/// byte for byte.
///
/// Edits are sorted by position first. An edit overlapping an earlier one
/// is dropped, so the first edit covering a byte wins.
pub fn apply_edits(source: &str, edits: &[Edit]) -> String {
    if edits.is_empty() {
        return source.to_string();
    }

    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.span.begin, edit.span.end));

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in sorted {
        if edit.span.begin < cursor {
            continue;
        }
        output.push_str(&source[cursor..edit.span.begin]);
        output.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    output.push_str(&source[cursor..]);
    output
}
