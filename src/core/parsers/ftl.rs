//! Fluent resources.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use fluent_syntax::ast::{Entry, Message, Term};
use fluent_syntax::parser;

use super::ScanMessagesResult;

/// Messages and terms of one locale, by id (terms without the leading `-`).
#[derive(Debug, Default, Clone)]
pub struct FluentCatalog {
    pub messages: HashMap<String, Message<String>>,
    pub terms: HashMap<String, Term<String>>,
}

/// Parse a resource. Syntax errors come back as warnings; the entries that
/// did parse are kept.
pub fn parse_ftl(content: &str) -> (FluentCatalog, Vec<String>) {
    let (resource, errors) = match parser::parse(content.to_string()) {
        Ok(resource) => (resource, Vec::new()),
        Err((resource, errors)) => (resource, errors),
    };

    let mut catalog = FluentCatalog::default();
    for entry in resource.body {
        match entry {
            Entry::Message(message) => {
                catalog.messages.insert(message.id.name.clone(), message);
            }
            Entry::Term(term) => {
                catalog.terms.insert(term.id.name.clone(), term);
            }
            _ => {}
        }
    }

    let warnings = errors
        .iter()
        .map(|e| format!("{:?} at bytes {:?}", e.kind, e.pos))
        .collect();
    (catalog, warnings)
}

pub fn parse_ftl_file(path: &Path) -> Result<(FluentCatalog, Vec<String>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(parse_ftl(&content))
}

/// Load every `<locale>.ftl` under `message_dir`.
pub fn scan_message_files(
    message_dir: impl AsRef<Path>,
) -> Result<ScanMessagesResult<FluentCatalog>> {
    super::scan_message_files(message_dir, "ftl", parse_ftl_file)
}
