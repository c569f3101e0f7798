//! The transform pipeline.
//!
//! Locate the template, scan its markup, extract calls from interpolations
//! and bound attributes, translate them, and splice the results back into
//! the source. A call that cannot be translated keeps its original text and
//! becomes an issue.

use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::extract::{CandidateExpression, ExpressionKind, Extractor};
use crate::core::literal::{LiteralValue, evaluate};
use crate::core::markup::{self, Attribute};
use crate::core::parsers::json::{LocaleMessages, parse_block_messages};
use crate::core::rewrite::{Edit, apply_edits};
use crate::core::scan::Quote;
use crate::core::sfc::{Block, locate_blocks};
use crate::core::span::{LineIndex, SourceSpan};
use crate::error::{TransformError, TranslateError};
use crate::issues::{InvalidBlockIssue, Issue, SkippedTranslationIssue, SourceContext};
use crate::translators::{Translate, TranslationContext, Translator};
use crate::utils::escape_markup_quotes;

static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{(.+?)\}\}").unwrap());

/// What to do with a call whose key has no translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OnMissing {
    /// Keep the call and report an issue.
    #[default]
    Skip,
    /// Fail the whole transform.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub locale: String,
    pub fallback: String,
    /// Custom block carrying per-file messages.
    pub block_name: String,
    /// Strip that block from the output once the template has at least one
    /// translation call.
    pub remove_block: bool,
    pub on_missing: OnMissing,
    /// Path shown in issues.
    pub file_path: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            fallback: "en".to_string(),
            block_name: "i18n".to_string(),
            remove_block: true,
            on_missing: OnMissing::Skip,
            file_path: "<input>".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    pub issues: Vec<Issue>,
    /// Calls replaced with their translation.
    pub translated: usize,
}

impl TransformOutput {
    fn unchanged(source: &str) -> Self {
        Self {
            code: source.to_string(),
            ..Default::default()
        }
    }
}

/// Transform a whole component file.
///
/// Without a `<template>` block the source comes back unchanged.
pub fn transform_component(
    source: &str,
    options: &TransformOptions,
    translator: &Translator,
) -> Result<TransformOutput, TransformError> {
    let layout = locate_blocks(source)?;
    let Some(template) = layout.template() else {
        return Ok(TransformOutput::unchanged(source));
    };

    let lines = LineIndex::new(source);
    let mut removals = Vec::new();
    let mut issues = Vec::new();
    let mut overlay = LocaleMessages::new();

    for block in layout.custom_blocks(&options.block_name) {
        let context = source_context(source, &lines, options, block.span.begin);
        match block_messages(source, block) {
            Ok((messages, warnings)) => {
                for (locale, entries) in messages {
                    overlay.entry(locale).or_default().extend(entries);
                }
                issues.extend(warnings.into_iter().map(|error| {
                    Issue::InvalidBlock(InvalidBlockIssue {
                        context: context.clone(),
                        block: block.name.clone(),
                        error,
                    })
                }));
            }
            Err(error) => issues.push(Issue::InvalidBlock(InvalidBlockIssue {
                context,
                block: block.name.clone(),
                error,
            })),
        }
        if options.remove_block {
            removals.push(Edit::delete(with_trailing_newline(source, block.span)));
        }
    }

    let context =
        TranslationContext::new(&options.locale, &options.fallback).with_overlay(overlay);
    let mut rewriter = Rewriter::new(source, lines, options, translator, &context)?;
    rewriter.region(template.span)?;

    // A file without any translation call comes back byte for byte.
    let mut edits = rewriter.edits;
    if rewriter.recognized > 0 {
        edits.extend(removals);
    }
    issues.extend(rewriter.issues);
    Ok(TransformOutput {
        code: apply_edits(source, &edits),
        issues,
        translated: rewriter.translated,
    })
}

/// Transform template markup on its own, with no surrounding component.
pub fn transform_template(
    source: &str,
    options: &TransformOptions,
    translator: &Translator,
) -> Result<TransformOutput, TransformError> {
    let context = TranslationContext::new(&options.locale, &options.fallback);
    let mut rewriter = Rewriter::new(source, LineIndex::new(source), options, translator, &context)?;
    rewriter.region(SourceSpan::new(0, source.len()))?;

    Ok(TransformOutput {
        code: apply_edits(source, &rewriter.edits),
        issues: rewriter.issues,
        translated: rewriter.translated,
    })
}

fn block_messages(source: &str, block: &Block) -> Result<(LocaleMessages, Vec<String>), String> {
    match block.attribute("lang") {
        None | Some("json") => {}
        Some(lang) => return Err(format!("unsupported block language `{}`", lang)),
    }
    parse_block_messages(block.content.slice(source)).map_err(|e| format!("{:#}", e))
}

fn source_context(
    source: &str,
    lines: &LineIndex,
    options: &TransformOptions,
    offset: usize,
) -> SourceContext {
    let location = lines.location(source, offset);
    SourceContext::new(
        &options.file_path,
        location,
        lines.line_text(source, location.line),
    )
}

/// Extend a removed block over the line break that follows it.
fn with_trailing_newline(source: &str, span: SourceSpan) -> SourceSpan {
    let rest = &source[span.end..];
    let extra = if rest.starts_with("\r\n") {
        2
    } else if rest.starts_with('\n') {
        1
    } else {
        0
    };
    SourceSpan::new(span.begin, span.end + extra)
}

/// Escape the attribute's own quote character inside generated code.
fn escape_for_quote(code: &str, quote: Option<Quote>) -> String {
    match quote {
        Some(Quote::Double) => code.replace('"', "&quot;"),
        Some(Quote::Single) => code.replace('\'', "&#39;"),
        _ => code.to_string(),
    }
}

/// Result of translating the calls inside one expression.
struct Resolved {
    /// One edit per translated call.
    edits: Vec<Edit>,
    /// Set when the whole rewritten expression is a constant.
    literal: Option<String>,
}

struct Rewriter<'a> {
    source: &'a str,
    lines: LineIndex,
    options: &'a TransformOptions,
    translator: &'a Translator,
    context: &'a TranslationContext,
    extractor: Extractor,
    edits: Vec<Edit>,
    issues: Vec<Issue>,
    /// Calls found, translated or not.
    recognized: usize,
    translated: usize,
}

impl<'a> Rewriter<'a> {
    fn new(
        source: &'a str,
        lines: LineIndex,
        options: &'a TransformOptions,
        translator: &'a Translator,
        context: &'a TranslationContext,
    ) -> Result<Self, TransformError> {
        let extractor = Extractor::new(translator.function_names())
            .map_err(|e| TransformError::FunctionNames(e.to_string()))?;
        Ok(Self {
            source,
            lines,
            options,
            translator,
            context,
            extractor,
            edits: Vec::new(),
            issues: Vec::new(),
            recognized: 0,
            translated: 0,
        })
    }

    fn region(&mut self, region: SourceSpan) -> Result<(), TransformError> {
        let scan = markup::scan(self.source, region);
        for span in scan.translatable_text() {
            self.text(span)?;
        }
        for tag in scan.translatable_tags() {
            for attribute in &tag.attributes {
                self.attribute(attribute)?;
            }
        }
        self.issues.sort_by_key(|issue| match issue {
            Issue::SkippedTranslation(i) => (i.context.line(), i.context.col()),
            Issue::InvalidBlock(i) => (i.context.line(), i.context.col()),
            Issue::MessageLoad(_) => (0, 0),
        });
        Ok(())
    }

    fn text(&mut self, span: SourceSpan) -> Result<(), TransformError> {
        let text = span.slice(self.source);
        for caps in INTERPOLATION.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let inner = SourceSpan::new(span.begin + inner.start(), span.begin + inner.end());
            let Some(resolved) = self.resolve(inner, ExpressionKind::Text)? else {
                continue;
            };
            match resolved.literal {
                Some(literal) => {
                    let wrapper =
                        SourceSpan::new(span.begin + whole.start(), span.begin + whole.end());
                    self.edits
                        .push(Edit::new(wrapper, escape_markup_quotes(&literal)));
                }
                None => self.edits.extend(resolved.edits),
            }
        }
        Ok(())
    }

    /// Only bound attributes (`:x`, `.x`, `v-bind:x`) hold expressions.
    fn attribute(&mut self, attribute: &Attribute) -> Result<(), TransformError> {
        if attribute.binding_prefix().is_none() {
            return Ok(());
        }
        let Some(value) = &attribute.value else {
            return Ok(());
        };
        let Some(resolved) = self.resolve(value.span, ExpressionKind::Attribute)? else {
            return Ok(());
        };

        match resolved.literal {
            Some(literal) if !attribute.dynamic_argument => {
                self.edits.push(Edit::new(
                    attribute.span,
                    format!(
                        "{}=\"{}\"",
                        attribute.static_name(),
                        escape_markup_quotes(&literal)
                    ),
                ));
            }
            _ => self.edits.extend(resolved.edits.into_iter().map(|edit| {
                Edit::new(edit.span, escape_for_quote(&edit.replacement, value.quote))
            })),
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        inner: SourceSpan,
        kind: ExpressionKind,
    ) -> Result<Option<Resolved>, TransformError> {
        let snippet = inner.slice(self.source);
        let candidates = self.extractor.extract(snippet, inner.begin, kind);
        if candidates.is_empty() {
            return Ok(None);
        }
        self.recognized += candidates.len();

        let mut edits = Vec::with_capacity(candidates.len());
        let mut all_optimized = true;
        for candidate in candidates {
            match self.translator.translate(&candidate, self.context) {
                Ok(result) => {
                    all_optimized &= result.optimized;
                    edits.push(Edit::new(candidate.span, result.content));
                }
                Err(error) => {
                    all_optimized = false;
                    self.skip(candidate, error)?;
                }
            }
        }
        if edits.is_empty() {
            return Ok(None);
        }
        self.translated += edits.len();

        let literal = if all_optimized {
            let relative: Vec<Edit> = edits
                .iter()
                .map(|edit| {
                    Edit::new(
                        SourceSpan::new(edit.span.begin - inner.begin, edit.span.end - inner.begin),
                        edit.replacement.clone(),
                    )
                })
                .collect();
            let rewritten = apply_edits(snippet, &relative);
            // Only strings collapse; a boolean or number binding keeps its type.
            match evaluate(rewritten.trim()) {
                Ok(LiteralValue::String(text)) => Some(text),
                _ => None,
            }
        } else {
            None
        };

        Ok(Some(Resolved { edits, literal }))
    }

    fn skip(
        &mut self,
        candidate: CandidateExpression,
        error: TranslateError,
    ) -> Result<(), TransformError> {
        let context = source_context(self.source, &self.lines, self.options, candidate.span.begin);
        if self.options.on_missing == OnMissing::Error && error.is_missing_translation() {
            return Err(TransformError::MissingTranslation {
                location: context.location,
                expression: candidate.content,
                error,
            });
        }
        self.issues
            .push(Issue::SkippedTranslation(SkippedTranslationIssue {
                context,
                expression: candidate.content,
                error,
            }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::extract::default_function_names;
    use crate::core::span::SourceLocation;
    use crate::translators::CatalogTranslator;

    fn translator() -> Translator {
        let messages = LocaleMessages::from([(
            "en".to_string(),
            [
                ("hi", "Hi"),
                ("hello", "Hello, {name}!"),
                ("quote", "Say \"cheese\""),
                ("title", "Home"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        )]);
        Translator::Catalog(CatalogTranslator::new(messages, default_function_names()))
    }

    fn component(source: &str) -> TransformOutput {
        transform_component(source, &TransformOptions::default(), &translator()).unwrap()
    }

    #[test]
    fn test_text_collapses_to_literal() {
        let out = component("<template>\n  <p>{{ t('hi') }}</p>\n</template>\n");
        assert_eq!(out.code, "<template>\n  <p>Hi</p>\n</template>\n");
        assert_eq!(out.translated, 1);
        assert!(out.issues.is_empty());
    }

    #[test]
    fn test_concatenation_collapses() {
        let out = component("<template><p>{{ t('hi') + ', ' + t('title') }}</p></template>");
        assert_eq!(out.code, "<template><p>Hi, Home</p></template>");
    }

    #[test]
    fn test_runtime_expression_keeps_delimiters() {
        let out = component("<template><p>{{ t('hi') + user }}</p></template>");
        assert_eq!(out.code, "<template><p>{{ 'Hi' + user }}</p></template>");
    }

    #[test]
    fn test_bound_attribute_becomes_static() {
        let out = component("<template><img :alt=\"t('title')\" v-bind:title='t(\"hi\")'></template>");
        assert_eq!(out.code, "<template><img alt=\"Home\" title=\"Hi\"></template>");
    }

    #[test]
    fn test_attribute_code_is_quote_escaped() {
        let out = component(
            "<template><a :title=\"t('hello', { name: user.name })\">x</a></template>",
        );
        assert_snapshot!(out.code, @r#"<template><a :title="(function(p){return 'Hello, ' + (p['name'] == null ? '' : p['name']) + '!';})({ name: user.name })">x</a></template>"#);

        let out = component("<template><a :title=\"t('quote') + x\">x</a></template>");
        assert_eq!(
            out.code,
            "<template><a :title=\"'Say &quot;cheese&quot;' + x\">x</a></template>"
        );
    }

    #[test]
    fn test_collapsed_quotes_are_escaped() {
        let out = component("<template><p>{{ t('quote') }}</p></template>");
        assert_eq!(out.code, "<template><p>Say &quot;cheese&quot;</p></template>");
    }

    #[test]
    fn test_doctype_and_conditional_comments_untouched() {
        let out = component(
            "<template><!DOCTYPE html><![if IE]>{{ t('hi') }}<![endif]><![CDATA[ {{ t('hi') }} ]]><p>{{ t('hi') }}</p></template>",
        );
        assert_eq!(
            out.code,
            "<template><!DOCTYPE html><![if IE]>Hi<![endif]><![CDATA[ {{ t('hi') }} ]]><p>Hi</p></template>"
        );
        assert_eq!(out.translated, 2);
    }

    #[test]
    fn test_unbound_and_root_attributes_untouched() {
        let source = "<template :a=\"t('hi')\"><p title=\"t('hi')\">x</p></template>";
        assert_eq!(component(source).code, source);
    }

    #[test]
    fn test_translate_no_disables_tag_and_children() {
        let source = "<template><div translate=\"no\" :title=\"t('hi')\"><span>{{ t('hi') }}</span></div></template>";
        assert_eq!(component(source).code, source);
    }

    #[test]
    fn test_unknown_key_is_kept_and_reported() {
        let out = component("<template>\n<p>{{ t('doesNotExist') }}</p>\n</template>");
        assert_eq!(out.code, "<template>\n<p>{{ t('doesNotExist') }}</p>\n</template>");
        assert_eq!(out.translated, 0);
        assert_eq!(out.issues.len(), 1);
        let Issue::SkippedTranslation(issue) = &out.issues[0] else {
            panic!("expected a skipped translation");
        };
        assert_eq!(issue.expression, "t('doesNotExist')");
        assert_eq!(issue.context.location, SourceLocation { line: 2, col: 7 });
        assert_eq!(issue.context.source_line, "<p>{{ t('doesNotExist') }}</p>");
    }

    #[test]
    fn test_partial_failure_keeps_other_translations() {
        let out = component("<template><p>{{ t('hi') + t('nope') }}</p></template>");
        assert_eq!(out.code, "<template><p>{{ 'Hi' + t('nope') }}</p></template>");
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_on_missing_error() {
        let options = TransformOptions {
            on_missing: OnMissing::Error,
            ..Default::default()
        };
        let err = transform_component(
            "<template><p>{{ t('nope') }}</p></template>",
            &options,
            &translator(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::MissingTranslation { .. }));

        // Malformed calls are still only skipped.
        let out = transform_component(
            "<template><p>{{ t(key) }}</p></template>",
            &options,
            &translator(),
        )
        .unwrap();
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_custom_block_overlay_and_removal() {
        let source = "<template><p>{{ t('local') }}</p></template>\n<i18n>\n{\"en\": {\"local\": \"Local\"}}\n</i18n>\n<script>\nexport default {}\n</script>\n";
        let out = component(source);
        assert_eq!(
            out.code,
            "<template><p>Local</p></template>\n<script>\nexport default {}\n</script>\n"
        );

        let options = TransformOptions {
            remove_block: false,
            ..Default::default()
        };
        let out = transform_component(source, &options, &translator()).unwrap();
        assert!(out.code.contains("<i18n>"));
        assert!(out.code.starts_with("<template><p>Local</p></template>"));
    }

    #[test]
    fn test_block_kept_without_calls() {
        let source = "<template>\n  <p>plain</p>\n</template>\n<i18n>{\"en\": {}}</i18n>\n";
        let out = component(source);
        assert_eq!(out.code, source);
        assert_eq!(out.translated, 0);

        // An untranslatable call still counts; the block goes.
        let out = component("<template>{{ t('nope') }}</template>\n<i18n>{}</i18n>\n");
        assert_eq!(out.code, "<template>{{ t('nope') }}</template>\n");
    }

    #[test]
    fn test_invalid_block_is_reported() {
        let out = component("<template><p>{{ t('hi') }}</p></template>\n<i18n>{ nope</i18n>\n");
        assert_eq!(out.code, "<template><p>Hi</p></template>\n");
        assert_eq!(out.issues.len(), 1);
        assert!(matches!(out.issues[0], Issue::InvalidBlock(_)));
    }

    #[test]
    fn test_no_template_is_unchanged() {
        let source = "<script>const t = x => x; t('hi')</script>\n<i18n>{}</i18n>";
        let out = component(source);
        assert_eq!(out.code, source);
    }

    #[test]
    fn test_unterminated_template() {
        let err = transform_component(
            "<template><p>{{ t('hi') }}</p>",
            &TransformOptions::default(),
            &translator(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransformError::UnterminatedTemplate(SourceLocation { line: 1, col: 1 })
        );
    }

    #[test]
    fn test_transform_template_fragment() {
        let out = transform_template(
            "<p>{{ t('hi') }}</p><b :title=\"t('title')\"></b>",
            &TransformOptions::default(),
            &translator(),
        )
        .unwrap();
        assert_eq!(out.code, "<p>Hi</p><b title=\"Home\"></b>");
        assert_eq!(out.translated, 2);
    }

    #[test]
    fn test_with_trailing_newline() {
        assert_eq!(
            with_trailing_newline("ab\r\nc", SourceSpan::new(0, 2)),
            SourceSpan::new(0, 4)
        );
        assert_eq!(with_trailing_newline("ab", SourceSpan::new(0, 2)), SourceSpan::new(0, 2));
    }
}
