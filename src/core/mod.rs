//! Core transform engine.
//!
//! - `sfc` / `markup`: component blocks and template markup
//! - `scan` / `extract`: balanced call extraction and argument parsing
//! - `literal`: constant-expression evaluation
//! - `rewrite` / `transform`: splicing results back into the source
//! - `parsers`: message catalog loaders
//! - `file_scanner`: component discovery

pub mod extract;
pub mod file_scanner;
pub mod literal;
pub mod markup;
pub mod parsers;
pub mod rewrite;
pub mod scan;
pub mod sfc;
pub mod span;
pub mod transform;

pub use span::{LineIndex, SourceLocation, SourceSpan};
pub use transform::{
    OnMissing, TransformOptions, TransformOutput, transform_component, transform_template,
};
