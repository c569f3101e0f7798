//! Issue types produced while transforming components.
//!
//! The library never prints: every skipped call or unusable metadata block
//! becomes an issue, and the CLI decides how to report it.

use enum_dispatch::enum_dispatch;

use crate::core::SourceLocation;
use crate::error::TranslateError;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    SkippedTranslation,
    InvalidBlock,
    MessageLoad,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::SkippedTranslation => write!(f, "skipped-translation"),
            Rule::InvalidBlock => write!(f, "invalid-block"),
            Rule::MessageLoad => write!(f, "message-load"),
        }
    }
}

// ============================================================
// Source Context
// ============================================================

/// Position in a component file, with the line for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    pub file_path: String,
    pub location: SourceLocation,
    pub source_line: String,
}

impl SourceContext {
    pub fn new(
        file_path: impl Into<String>,
        location: SourceLocation,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            location,
            source_line: source_line.into(),
        }
    }

    // Convenience accessors
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn line(&self) -> usize {
        self.location.line
    }

    pub fn col(&self) -> usize {
        self.location.col
    }
}

// ============================================================
// Issue Types
// ============================================================

/// A translation call left untouched because it could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTranslationIssue {
    pub context: SourceContext,
    /// The call as written, e.g. `t('home.title')`.
    pub expression: String,
    pub error: TranslateError,
}

impl SkippedTranslationIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::SkippedTranslation
    }
}

/// A metadata block whose messages could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBlockIssue {
    pub context: SourceContext,
    /// Block tag name, e.g. `i18n`.
    pub block: String,
    pub error: String,
}

impl InvalidBlockIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::InvalidBlock
    }
}

/// A message file that failed to load, fully or in part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLoadIssue {
    pub file_path: String,
    pub error: String,
}

impl MessageLoadIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::MessageLoad
    }
}

// ============================================================
// Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    SkippedTranslation(SkippedTranslationIssue),
    InvalidBlock(InvalidBlockIssue),
    MessageLoad(MessageLoadIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::SkippedTranslation(_) => SkippedTranslationIssue::severity(),
            Issue::InvalidBlock(_) => InvalidBlockIssue::severity(),
            Issue::MessageLoad(_) => MessageLoadIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::SkippedTranslation(_) => SkippedTranslationIssue::rule(),
            Issue::InvalidBlock(_) => InvalidBlockIssue::rule(),
            Issue::MessageLoad(_) => MessageLoadIssue::rule(),
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// Component location (has source_line for context display).
    Source(&'a SourceContext),
    /// File-level only.
    File { path: &'a str },
}

/// Trait for types that can be reported to CLI.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<&str> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for SkippedTranslationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        format!("skipped translation \"{}\"", self.expression)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<&str> {
        match &self.error {
            TranslateError::UnknownKey { .. } | TranslateError::UnknownMessage(_) => {
                Some("add the key to the message catalog or fix the key")
            }
            TranslateError::Call(_) => Some("the first argument must be a string literal key"),
            TranslateError::MissingVariable { .. } | TranslateError::UnknownVariable(_) => {
                Some("pass every placeholder in the params object")
            }
            _ => None,
        }
    }

    fn details(&self) -> Option<String> {
        Some(self.error.to_string())
    }
}

impl Report for InvalidBlockIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Source(&self.context)
    }

    fn message(&self) -> String {
        format!("ignored <{}> block", self.block)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

impl Report for MessageLoadIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        "could not load messages".to_string()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}
