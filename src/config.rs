use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::OnMissing;
use crate::core::extract::{FunctionNameMappings, default_function_names};
use crate::translators::TranslatorKind;

pub const CONFIG_FILE_NAME: &str = ".bakerc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub translator: TranslatorKind,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_locale")]
    pub fallback: String,
    #[serde(default = "default_function_names")]
    pub function_names: FunctionNameMappings,
    #[serde(default = "default_messages_root")]
    pub messages_root: String,
    #[serde(default = "default_block_name")]
    pub block_name: String,
    #[serde(default = "default_remove_block")]
    pub remove_block: bool,
    #[serde(default)]
    pub on_missing: OnMissing,
    #[serde(default)]
    pub use_isolating: bool,
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    #[serde(default)]
    pub ignores: Vec<String>,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_messages_root() -> String {
    "./locales".to_string()
}

fn default_block_name() -> String {
    "i18n".to_string()
}

fn default_remove_block() -> bool {
    true
}

fn default_includes() -> Vec<String> {
    vec!["src".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translator: TranslatorKind::default(),
            locale: default_locale(),
            fallback: default_locale(),
            function_names: default_function_names(),
            messages_root: default_messages_root(),
            block_name: default_block_name(),
            remove_block: default_remove_block(),
            on_missing: OnMissing::default(),
            use_isolating: false,
            includes: default_includes(),
            ignores: Vec::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Rejects invalid glob patterns in `ignores`/`includes` and an empty
    /// `functionNames` map.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Includes without wildcards are literal directories, so `[id]` stays valid.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        if self.function_names.is_empty() {
            bail!("'functionNames' must map at least one function name");
        }
        if self.locale.trim().is_empty() {
            bail!("'locale' must not be empty");
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Directory the config was found in, or the start directory for defaults.
    pub root: PathBuf,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            let root = path
                .parent()
                .map_or_else(|| start_dir.to_path_buf(), Path::to_path_buf);
            Ok(ConfigLoadResult {
                config,
                root,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            root: start_dir.to_path_buf(),
            from_file: false,
        }),
    }
}
