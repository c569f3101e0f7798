//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `transform`: Bake translations into component files
//! - `init`: Initialize a `.bakerc.json` configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::translators::TranslatorKind;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct TransformArgs {
    /// Component files or directories (default: `includes` from the config)
    pub paths: Vec<PathBuf>,

    /// Rewrite files in place
    #[arg(long, conflicts_with = "out_dir")]
    pub write: bool,

    /// Write transformed files under this directory, mirroring their paths
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Translation backend (overrides config file)
    #[arg(long, value_enum)]
    pub translator: Option<TranslatorKind>,

    /// Target locale (overrides config file)
    #[arg(long)]
    pub locale: Option<String>,

    /// Fallback locale (overrides config file)
    #[arg(long)]
    pub fallback: Option<String>,

    /// Messages directory path (overrides config file)
    #[arg(long)]
    pub messages_root: Option<PathBuf>,

    /// Fail on missing translations and on any reported issue
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replace translation calls in component templates with their translations
    Transform(TransformArgs),
    /// Initialize a new .bakerc.json configuration file
    Init,
}
