//! Bracket and quote tracking shared by the extractor, the call-argument
//! parser and the literal evaluator.
//!
//! The scanner never parses the host expression language. It only knows
//! which bracket kinds are open and whether the cursor sits inside a string,
//! which is enough to find the boundaries of a balanced expression.
//! Escaped quote characters are not recognized.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
    Back,
}

impl Quote {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            '`' => Some(Quote::Back),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
            Quote::Back => '`',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Paren,
    Square,
    Curly,
}

impl Bracket {
    fn opening(c: char) -> Option<Self> {
        match c {
            '(' => Some(Bracket::Paren),
            '[' => Some(Bracket::Square),
            '{' => Some(Bracket::Curly),
            _ => None,
        }
    }

    fn closing(c: char) -> Option<Self> {
        match c {
            ')' => Some(Bracket::Paren),
            ']' => Some(Bracket::Square),
            '}' => Some(Bracket::Curly),
            _ => None,
        }
    }
}

/// Outcome of feeding one character to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still inside the expression (or nothing was open to begin with).
    Continue,
    /// A closer emptied a non-empty stack.
    Closed,
    /// A closer did not match the innermost open bracket.
    Mismatch,
}

#[derive(Debug, Clone, Default)]
pub struct BracketScanner {
    stack: Vec<Bracket>,
    quote: Option<Quote>,
}

impl BracketScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scanner positioned just after an already consumed opening bracket.
    pub fn opened(bracket: Bracket) -> Self {
        Self {
            stack: vec![bracket],
            quote: None,
        }
    }

    pub fn feed(&mut self, c: char) -> Step {
        if let Some(quote) = self.quote {
            if c == quote.as_char() {
                self.quote = None;
            }
            return Step::Continue;
        }
        if let Some(quote) = Quote::from_char(c) {
            self.quote = Some(quote);
            return Step::Continue;
        }
        if let Some(bracket) = Bracket::opening(c) {
            self.stack.push(bracket);
            return Step::Continue;
        }
        if let Some(bracket) = Bracket::closing(c) {
            return match self.stack.last() {
                Some(top) if *top == bracket => {
                    self.stack.pop();
                    if self.stack.is_empty() {
                        Step::Closed
                    } else {
                        Step::Continue
                    }
                }
                _ => Step::Mismatch,
            };
        }
        Step::Continue
    }

    /// True when nothing is open: no bracket and no string.
    pub fn is_balanced(&self) -> bool {
        self.stack.is_empty() && self.quote.is_none()
    }
}

/// Byte offset just past the bracket closing the one already open at the
/// start of `text`, or `None` when the walk mismatches or runs out of input.
pub fn find_closing(text: &str, open: Bracket) -> Option<usize> {
    let mut scanner = BracketScanner::opened(open);
    for (i, c) in text.char_indices() {
        match scanner.feed(c) {
            Step::Continue => {}
            Step::Closed => return Some(i + c.len_utf8()),
            Step::Mismatch => return None,
        }
    }
    None
}

/// Split `text` on `separator` occurrences at depth zero and outside strings.
///
/// Returns `None` if the brackets in `text` are unbalanced.
pub fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut scanner = BracketScanner::new();
    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == separator && scanner.is_balanced() {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
            continue;
        }
        if scanner.feed(c) == Step::Mismatch {
            return None;
        }
    }
    if !scanner.is_balanced() {
        return None;
    }
    parts.push(&text[start..]);
    Some(parts)
}

/// Position of the first `separator` at depth zero outside strings.
pub fn find_top_level(text: &str, separator: char) -> Option<usize> {
    let mut scanner = BracketScanner::new();
    for (i, c) in text.char_indices() {
        if c == separator && scanner.is_balanced() {
            return Some(i);
        }
        if scanner.feed(c) == Step::Mismatch {
            return None;
        }
    }
    None
}
