//! Loaders for message catalogs.
//!
//! - `json`: nested JSON catalogs (`<locale>.json`) and custom-block payloads
//! - `ftl`: Fluent resources (`<locale>.ftl`)

pub mod ftl;
pub mod json;

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Result, bail};

/// A recoverable problem found while loading message files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageScanWarning {
    pub file_path: String,
    pub error: String,
}

#[derive(Debug)]
pub struct ScanMessagesResult<M> {
    /// Locale → parsed messages.
    pub messages: BTreeMap<String, M>,
    pub warnings: Vec<MessageScanWarning>,
}

impl<M> Default for ScanMessagesResult<M> {
    fn default() -> Self {
        Self {
            messages: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }
}

/// Extracts locale from filename.
///
/// Examples:
/// - "en.json" -> Some("en")
/// - "zh-CN.ftl" -> Some("zh-CN")
/// - "/path/to/locales/ja.json" -> Some("ja")
pub fn extract_locale(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// Load every `*.<extension>` file directly under `message_dir`.
///
/// `parse` returns the messages plus per-file warnings. A file that fails to
/// parse is reported as a warning and skipped.
pub fn scan_message_files<M, F>(
    message_dir: impl AsRef<Path>,
    extension: &str,
    parse: F,
) -> Result<ScanMessagesResult<M>>
where
    F: Fn(&Path) -> Result<(M, Vec<String>)>,
{
    let message_dir = message_dir.as_ref();
    let mut result = ScanMessagesResult::default();

    if !message_dir.exists() {
        bail!(
            "Messages directory '{}' does not exist.\n\
             Hint: Check your .bakerc.json 'messagesRoot' setting.",
            message_dir.display()
        );
    }

    if !message_dir.is_dir() {
        bail!("'{}' is not a directory.", message_dir.display());
    }

    let mut paths: Vec<_> = fs::read_dir(message_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    for path in paths {
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(locale) = extract_locale(&path) else {
            continue;
        };
        let file_path = path.to_string_lossy().to_string();
        match parse(&path) {
            Ok((messages, warnings)) => {
                result.messages.insert(locale, messages);
                result
                    .warnings
                    .extend(warnings.into_iter().map(|error| MessageScanWarning {
                        file_path: file_path.clone(),
                        error,
                    }));
            }
            Err(e) => {
                result.warnings.push(MessageScanWarning {
                    file_path,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    Ok(result)
}
