//! Error taxonomy for call parsing, translation and whole-file transforms.
//!
//! Per-candidate errors (`CallError`, `TranslateError`) never abort a
//! transform on their own: the original call text is kept and the error is
//! reported as an issue. Only `TransformError` reaches the caller.

use thiserror::Error;

use crate::core::SourceLocation;

/// The call's argument list could not be decomposed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("dynamic key `{0}` cannot be resolved at build time")]
    DynamicKey(String),
    #[error("tagged template literals are not supported: {0}")]
    TaggedTemplateUnsupported(String),
    #[error("invalid params: {0}")]
    InvalidParams(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Call(#[from] CallError),
    #[error("no translation for key `{key}` in locale `{locale}`")]
    UnknownKey { key: String, locale: String },
    #[error("unknown message `{0}`")]
    UnknownMessage(String),
    #[error("unknown term `-{0}`")]
    UnknownTerm(String),
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),
    #[error("message `{0}` has no value")]
    NoValue(String),
    #[error("unknown variable `${0}`")]
    UnknownVariable(String),
    #[error("missing value for `{{{variable}}}` in `{key}`")]
    MissingVariable { variable: String, key: String },
    #[error("unknown function `{0}()`")]
    UnknownFunction(String),
    #[error("select expression in `{0}` has no default variant")]
    NoDefaultVariant(String),
    #[error("too many placeables expanded: {count}, max allowed is {max}")]
    ExpansionLimitExceeded { count: usize, max: usize },
    #[error("cyclic reference to `{0}`")]
    CyclicReference(String),
    #[error("invalid locale `{0}`")]
    InvalidLocale(String),
    #[error("{0}")]
    InvalidParams(String),
}

impl TranslateError {
    /// Whether the error means the key simply has no translation.
    ///
    /// These are the errors `OnMissing::Error` turns into a hard failure.
    pub fn is_missing_translation(&self) -> bool {
        matches!(
            self,
            TranslateError::UnknownKey { .. } | TranslateError::UnknownMessage(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("template block opened at {0} is never closed")]
    UnterminatedTemplate(SourceLocation),
    #[error("invalid function names: {0}")]
    FunctionNames(String),
    #[error("{location}: {error} in `{expression}`")]
    MissingTranslation {
        location: SourceLocation,
        expression: String,
        error: TranslateError,
    },
}
