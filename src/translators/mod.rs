//! Translation backends.
//!
//! A backend turns one candidate call into replacement code. Both backends
//! sit behind the [`Translate`] trait and are selected at startup through
//! the closed [`Translator`] enum.

pub mod catalog;
pub mod fluent;
pub mod plural;

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::core::extract::{CandidateExpression, FunctionNameMappings};
use crate::core::parsers::{MessageScanWarning, ftl, json, json::LocaleMessages};
use crate::error::TranslateError;

pub use catalog::CatalogTranslator;
pub use fluent::FluentTranslator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateResult {
    /// JavaScript expression replacing the call.
    pub content: String,
    /// The enclosing interpolation or binding may collapse to a literal,
    /// provided the rewritten expression turns out to be a constant string.
    pub optimized: bool,
}

impl TranslateResult {
    pub fn literal(content: String) -> Self {
        Self {
            content,
            optimized: true,
        }
    }

    pub fn runtime(content: String) -> Self {
        Self {
            content,
            optimized: false,
        }
    }
}

/// Per-transform translation state, built once from the options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationContext {
    pub locale: String,
    pub fallback: String,
    /// Messages from the file's own metadata block. Consulted before the
    /// catalog by the catalog backend.
    pub overlay: LocaleMessages,
}

impl TranslationContext {
    pub fn new(locale: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback: fallback.into(),
            overlay: LocaleMessages::new(),
        }
    }

    pub fn with_overlay(mut self, overlay: LocaleMessages) -> Self {
        self.overlay = overlay;
        self
    }

    /// Locales to try, in order: the explicit one (or the current locale),
    /// then the fallback.
    pub fn locale_chain<'a>(&'a self, explicit: Option<&'a str>) -> Vec<&'a str> {
        let first = explicit.unwrap_or(&self.locale);
        let mut chain = vec![first];
        if !self.fallback.is_empty() && self.fallback != first {
            chain.push(&self.fallback);
        }
        chain
    }
}

#[enum_dispatch]
pub trait Translate {
    /// Source function names this backend answers to.
    fn function_names(&self) -> &FunctionNameMappings;

    fn translate(
        &self,
        candidate: &CandidateExpression,
        context: &TranslationContext,
    ) -> Result<TranslateResult, TranslateError>;
}

#[enum_dispatch(Translate)]
#[derive(Debug, Clone)]
pub enum Translator {
    Catalog(CatalogTranslator),
    Fluent(FluentTranslator),
}

impl Translator {
    /// Load every catalog of `kind` under `message_dir`.
    ///
    /// Unreadable or malformed files come back as warnings; a missing
    /// directory is an error.
    pub fn load(
        kind: TranslatorKind,
        message_dir: &Path,
        function_names: FunctionNameMappings,
        use_isolating: bool,
    ) -> Result<(Self, Vec<MessageScanWarning>)> {
        match kind {
            TranslatorKind::Catalog => {
                let scanned = json::scan_message_files(message_dir)?;
                let translator = CatalogTranslator::new(scanned.messages, function_names);
                Ok((translator.into(), scanned.warnings))
            }
            TranslatorKind::Fluent => {
                let scanned = ftl::scan_message_files(message_dir)?;
                let translator = FluentTranslator::new(scanned.messages, function_names)
                    .with_isolating(use_isolating);
                Ok((translator.into(), scanned.warnings))
            }
        }
    }
}

/// Which backend a project uses.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorKind {
    /// `<locale>.json` catalogs with `{name}` placeholders.
    #[default]
    Catalog,
    /// `<locale>.ftl` Fluent resources.
    Fluent,
}
