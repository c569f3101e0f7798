//! bake-i18n - build-time translation baking for component templates
//!
//! Finds translation calls such as `t('key', params, locale)` inside template
//! interpolations and bound attributes, resolves them against a message
//! catalog, and splices the result back into the source. Calls that resolve
//! to constants collapse to plain text.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Template scanning, call extraction and rewriting
//! - `error`: Typed errors of the transform pipeline
//! - `issues`: Diagnostics collected during a transform
//! - `translators`: The catalog and Fluent backends
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod issues;
pub mod translators;
pub mod utils;

pub use crate::core::{
    OnMissing, TransformOptions, TransformOutput, transform_component, transform_template,
};
pub use crate::translators::{Translate, TranslationContext, Translator, TranslatorKind};
