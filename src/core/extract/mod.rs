//! Expression extraction: locating translation calls inside a text
//! interpolation or a bound attribute value.
//!
//! The extractor works on a snippet (the trimmed inside of `{{ }}` or an
//! attribute value) and reports spans relative to a caller-supplied base
//! offset, so every candidate maps straight back into the original source.

pub mod call;

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::scan::{Bracket, BracketScanner, Step};
use crate::core::span::SourceSpan;

pub use call::{ParsedCall, parse_call, parse_key, parse_params, split_locale};

/// Canonical translation function a source-level name maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FunctionKind {
    /// `t('key', params?, locale?)`
    #[serde(rename = "t")]
    Translate,
    /// `te('key', locale?)`: whether the key resolves at all.
    #[serde(rename = "te")]
    Exists,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Translate => write!(f, "t"),
            FunctionKind::Exists => write!(f, "te"),
        }
    }
}

/// Source function name → canonical kind, e.g. `{"t": t, "$t": t}`.
pub type FunctionNameMappings = BTreeMap<String, FunctionKind>;

pub fn default_function_names() -> FunctionNameMappings {
    BTreeMap::from([("t".to_string(), FunctionKind::Translate)])
}

/// Where a candidate was found; decides how a collapsed result is spliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    Text,
    Attribute,
}

/// A balanced call to a recognized translation function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateExpression {
    /// Absolute span of `name(...)`.
    pub span: SourceSpan,
    /// Exactly `source[span.begin..span.end]`.
    pub content: String,
    /// The name as written in the source (`$t`, `t`, ...).
    pub function_name: String,
    pub function: FunctionKind,
    pub kind: ExpressionKind,
    /// Only whitespace surrounds the call in its snippet.
    pub sole: bool,
}

impl CandidateExpression {
    /// The argument list between the call's parentheses, untrimmed.
    pub fn arguments(&self) -> &str {
        let open = self.content.find('(').map(|i| i + 1).unwrap_or(0);
        let close = self.content.len().saturating_sub(1).max(open);
        &self.content[open..close]
    }
}

/// Operators after which a call counts as being in expression position.
const PRECEDING_OPERATORS: &str =
    r"^|\+|-|\*|/|\+\+|--|\(|!|==|===|!==|!=|%|\*\*|\{|\[|,|\*=|/=|%=|\+=|-=|\^|\^=|\?\.|\?";

/// Finds translation calls for one set of function names.
///
/// Build it once per transform; the pattern depends only on the names.
#[derive(Debug, Clone)]
pub struct Extractor {
    pattern: Option<Regex>,
    mappings: FunctionNameMappings,
}

impl Extractor {
    pub fn new(mappings: &FunctionNameMappings) -> Result<Self, regex::Error> {
        if mappings.is_empty() {
            return Ok(Self {
                pattern: None,
                mappings: FunctionNameMappings::new(),
            });
        }
        // Longest names first so `te` is not shadowed by `t`.
        let mut names: Vec<&String> = mappings.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let group = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"({})\s*({})\s*\(", PRECEDING_OPERATORS, group))?;
        Ok(Self {
            pattern: Some(pattern),
            mappings: mappings.clone(),
        })
    }

    /// Every top-level call in `snippet`, in source order.
    ///
    /// A call nested inside an accepted candidate is never reported on its
    /// own: the outer call wins and the inner text stays part of its content.
    pub fn extract(
        &self,
        snippet: &str,
        base: usize,
        kind: ExpressionKind,
    ) -> Vec<CandidateExpression> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        let mut candidates: Vec<CandidateExpression> = Vec::new();
        for caps in pattern.captures_iter(snippet) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };

            if let Some(last) = candidates.last()
                && base + whole.start() < last.span.end
            {
                continue;
            }

            let Some(end) = walk_arguments(snippet, whole.end()) else {
                continue;
            };
            let Some(&function) = self.mappings.get(name.as_str()) else {
                continue;
            };

            let sole =
                snippet[..name.start()].trim().is_empty() && snippet[end..].trim().is_empty();
            candidates.push(CandidateExpression {
                span: SourceSpan::new(name.start(), end).offset(base),
                content: snippet[name.start()..end].to_string(),
                function_name: name.as_str().to_string(),
                function,
                kind,
                sole,
            });
        }
        candidates
    }
}

/// Walk from just after a call's `(` to just after its matching `)`.
fn walk_arguments(snippet: &str, start: usize) -> Option<usize> {
    let mut scanner = BracketScanner::opened(Bracket::Paren);
    for (i, c) in snippet[start..].char_indices() {
        match scanner.feed(c) {
            Step::Continue => {}
            Step::Closed => return Some(start + i + c.len_utf8()),
            Step::Mismatch => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn extractor(names: &[(&str, FunctionKind)]) -> Extractor {
        let mappings = names
            .iter()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect();
        Extractor::new(&mappings).unwrap()
    }

    fn contents(candidates: &[CandidateExpression]) -> Vec<&str> {
        candidates.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_single_call() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("t('hi')", 10, ExpressionKind::Text);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, SourceSpan::new(10, 17));
        assert_eq!(found[0].content, "t('hi')");
        assert_eq!(found[0].function_name, "t");
        assert_eq!(found[0].kind, ExpressionKind::Text);
        assert_eq!(found[0].arguments(), "'hi'");
    }

    #[test]
    fn test_sole_call() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        assert!(ex.extract("  t('hi') ", 0, ExpressionKind::Text)[0].sole);

        let found = ex.extract("t('a') + t('b')", 0, ExpressionKind::Text);
        assert_eq!(found.iter().map(|c| c.sole).collect::<Vec<_>>(), vec![false, false]);
        assert!(!ex.extract("(t('a'))", 0, ExpressionKind::Attribute)[0].sole);
    }

    #[test]
    fn test_calls_after_operators() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("t('a') + ' ' + t('b')", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t('a')", "t('b')"]);
        assert_eq!(found[1].span, SourceSpan::new(15, 21));
    }

    #[test]
    fn test_identifier_suffix_is_not_a_call() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        assert!(ex.extract("format('x')", 0, ExpressionKind::Text).is_empty());
        assert!(ex.extract("a.t('x')", 0, ExpressionKind::Text).is_empty());
        assert!(ex.extract("test('x')", 0, ExpressionKind::Text).is_empty());
    }

    #[test]
    fn test_call_as_argument() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("upper(t('a'))", 0, ExpressionKind::Attribute);
        assert_eq!(contents(&found), vec!["t('a')"]);
        assert_eq!(found[0].span, SourceSpan::new(6, 12));
    }

    #[test]
    fn test_nested_call_is_left_inside_outer() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("t(t('inner'))", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t(t('inner'))"]);
    }

    #[test]
    fn test_nested_call_in_params_is_skipped() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("t('a', {x: t('b')}) + t('c')", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t('a', {x: t('b')})", "t('c')"]);
    }

    #[test]
    fn test_unbalanced_call_is_skipped() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        assert!(ex.extract("t('a'", 0, ExpressionKind::Text).is_empty());
        assert!(ex.extract("t('a']", 0, ExpressionKind::Text).is_empty());

        // Scanning resumes after the failed call's parenthesis.
        let found = ex.extract("t(] + t('ok')", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t('ok')"]);
    }

    #[test]
    fn test_brackets_inside_strings() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("t('a)b', {n: \"(\"})", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t('a)b', {n: \"(\"})"]);
    }

    #[test]
    fn test_whitespace_between_name_and_paren() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("!  t ('x')", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t ('x')"]);
        assert_eq!(found[0].span.begin, 3);
    }

    #[test]
    fn test_aliases_and_kinds() {
        let ex = extractor(&[
            ("t", FunctionKind::Translate),
            ("$t", FunctionKind::Translate),
            ("te", FunctionKind::Exists),
        ]);
        let found = ex.extract("$t('a') + te('b') + t('c')", 0, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["$t('a')", "te('b')", "t('c')"]);
        assert_eq!(found[1].function, FunctionKind::Exists);
        assert_eq!(found[0].function_name, "$t");
    }

    #[test]
    fn test_no_function_names() {
        let ex = Extractor::new(&FunctionNameMappings::new()).unwrap();
        assert!(ex.extract("t('a')", 0, ExpressionKind::Text).is_empty());
    }

    #[test]
    fn test_non_ascii_content() {
        let ex = extractor(&[("t", FunctionKind::Translate)]);
        let found = ex.extract("'é' + t('ü')", 4, ExpressionKind::Text);
        assert_eq!(contents(&found), vec!["t('ü')"]);
        assert_eq!(found[0].span, SourceSpan::new(11, 18));
    }
}
