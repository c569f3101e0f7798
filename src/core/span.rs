use std::fmt;

/// Half-open byte range `[begin, end)` into the original source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceSpan {
    pub begin: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "span begin {} after end {}", begin, end);
        Self { begin, end }
    }

    /// Shift both ends by `base`, turning a snippet-relative span absolute.
    pub fn offset(self, base: usize) -> Self {
        Self::new(self.begin + base, self.end + base)
    }

    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.begin..self.end]
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.begin, self.end)
    }
}

/// 1-based line/column position, used for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceLocation {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Line start offsets for O(log n) offset-to-location lookups.
///
/// Line 1 starts at offset 0, line 2 starts after the first `'\n'`, etc.
#[derive(Debug, Clone)]
pub struct LineIndex {
    offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut offsets = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                offsets.push(i + 1);
            }
        }
        Self { offsets }
    }

    /// Columns count characters, not bytes.
    pub fn location(&self, content: &str, offset: usize) -> SourceLocation {
        let line = match self.offsets.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        };
        let line_start = self.offsets[line - 1];
        let offset = offset.min(content.len());
        let col = content[line_start..offset].chars().count() + 1;
        SourceLocation { line, col }
    }

    /// Text of the 1-based `line`, without its terminator.
    pub fn line_text<'a>(&self, content: &'a str, line: usize) -> &'a str {
        let Some(&start) = self.offsets.get(line.wrapping_sub(1)) else {
            return "";
        };
        let end = self
            .offsets
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(content.len());
        content[start..end].trim_end_matches('\r')
    }
}
