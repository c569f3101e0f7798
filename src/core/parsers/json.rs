//! Nested JSON catalogs.
//!
//! `{"home": {"title": "Home"}}` flattens to `home.title → Home`. Only
//! string leaves are messages; anything else is skipped with a warning.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::ScanMessagesResult;

/// Flattened key → message text for one locale.
pub type Messages = BTreeMap<String, String>;

/// Locale → messages.
pub type LocaleMessages = BTreeMap<String, Messages>;

/// Parse one catalog file. Returns the messages and the skipped-leaf warnings.
pub fn parse_json_file(path: &Path) -> Result<(Messages, Vec<String>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_json_messages(&content)
}

/// Parse catalog text. The top-level value must be an object.
pub fn parse_json_messages(content: &str) -> Result<(Messages, Vec<String>)> {
    let json: Value = serde_json::from_str(content).context("Invalid JSON")?;
    if !json.is_object() {
        bail!("expected a JSON object at the top level");
    }

    let mut messages = Messages::new();
    let mut warnings = Vec::new();
    flatten_json(&json, "", &mut messages, &mut warnings);
    Ok((messages, warnings))
}

/// Parse a custom-block payload `{"<locale>": {<nested messages>}}`.
pub fn parse_block_messages(content: &str) -> Result<(LocaleMessages, Vec<String>)> {
    if content.trim().is_empty() {
        return Ok((LocaleMessages::new(), Vec::new()));
    }
    let json: Value = serde_json::from_str(content).context("Invalid JSON")?;
    let Value::Object(locales) = json else {
        bail!("expected an object keyed by locale");
    };

    let mut all = LocaleMessages::new();
    let mut warnings = Vec::new();
    for (locale, value) in &locales {
        if !value.is_object() {
            warnings.push(format!("locale `{}` is not an object", locale));
            continue;
        }
        let mut messages = Messages::new();
        flatten_json(value, "", &mut messages, &mut warnings);
        all.insert(locale.clone(), messages);
    }
    Ok((all, warnings))
}

/// Load every `<locale>.json` under `message_dir`.
pub fn scan_message_files(message_dir: impl AsRef<Path>) -> Result<ScanMessagesResult<Messages>> {
    super::scan_message_files(message_dir, "json", parse_json_file)
}

fn flatten_json(value: &Value, prefix: &str, messages: &mut Messages, warnings: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten_json(v, &key, messages, warnings);
            }
        }
        Value::String(s) => {
            messages.insert(prefix.to_string(), s.clone());
        }
        other => {
            warnings.push(format!(
                "skipped non-string value at `{}`: {}",
                prefix, other
            ));
        }
    }
}
