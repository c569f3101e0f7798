//! Fluent backend.
//!
//! A message pattern compiles to a JavaScript expression. Constant pieces
//! fold into one string literal; runtime arguments, `NUMBER()` and
//! `DATETIME()` calls and selectors over runtime values stay as code.

use std::collections::{BTreeMap, HashMap, HashSet};

use fluent_syntax::ast::{
    CallArguments, Expression, InlineExpression, Pattern, PatternElement, Variant, VariantKey,
};
use icu_plurals::PluralRules;

use crate::core::extract::{
    CandidateExpression, FunctionKind, FunctionNameMappings, ParsedCall, parse_call,
};
use crate::core::literal::{LiteralValue, evaluate, object_entries};
use crate::core::parsers::ftl::FluentCatalog;
use crate::error::{CallError, TranslateError};
use crate::translators::plural::{cardinal_rules, category_name};
use crate::translators::{Translate, TranslateResult, TranslationContext};
use crate::utils::{format_js_number, js_string_literal};

/// Placeables expanded per translation before giving up.
const MAX_PLACEABLES: usize = 100;

// Unicode bidi isolation marks.
const FSI: &str = "\u{2068}";
const PDI: &str = "\u{2069}";

#[derive(Debug, Clone, Default)]
pub struct FluentTranslator {
    catalogs: BTreeMap<String, FluentCatalog>,
    function_names: FunctionNameMappings,
    use_isolating: bool,
}

impl FluentTranslator {
    pub fn new(catalogs: BTreeMap<String, FluentCatalog>, function_names: FunctionNameMappings) -> Self {
        Self {
            catalogs,
            function_names,
            use_isolating: false,
        }
    }

    pub fn with_isolating(mut self, use_isolating: bool) -> Self {
        self.use_isolating = use_isolating;
        self
    }

    fn find<'a>(
        &'a self,
        id: &str,
        explicit: Option<&'a str>,
        context: &'a TranslationContext,
    ) -> Option<(&'a str, &'a FluentCatalog)> {
        context.locale_chain(explicit).into_iter().find_map(|locale| {
            self.catalogs
                .get(locale)
                .filter(|catalog| catalog.messages.contains_key(id))
                .map(|catalog| (locale, catalog))
        })
    }

    fn exists(&self, call: &ParsedCall, context: &TranslationContext) -> bool {
        let (id, attribute) = split_key(&call.key);
        self.find(id, call.locale.as_deref(), context)
            .and_then(|(_, catalog)| catalog.messages.get(id))
            .is_some_and(|message| match attribute {
                Some(attr) => message.attributes.iter().any(|a| a.id.name == attr),
                None => message.value.is_some(),
            })
    }

    /// The compiled expression for a `t()` call.
    fn translate_call(
        &self,
        call: &ParsedCall,
        context: &TranslationContext,
    ) -> Result<String, TranslateError> {
        let (id, attribute) = split_key(&call.key);
        let Some((locale, catalog)) = self.find(id, call.locale.as_deref(), context) else {
            return Err(TranslateError::UnknownMessage(call.key.clone()));
        };
        let Some(message) = catalog.messages.get(id) else {
            return Err(TranslateError::UnknownMessage(call.key.clone()));
        };

        let pattern = match attribute {
            Some(attr) => message
                .attributes
                .iter()
                .find(|a| a.id.name == attr)
                .map(|a| &a.value)
                .ok_or_else(|| TranslateError::UnknownAttribute(call.key.clone()))?,
            None => message
                .value
                .as_ref()
                .ok_or_else(|| TranslateError::NoValue(call.key.clone()))?,
        };

        let args = compile_args(call.params.as_deref())?;
        let mut compiler = Compiler {
            catalog,
            locale,
            key: &call.key,
            args: &args,
            use_isolating: self.use_isolating,
            placeables: 0,
            resolving: HashSet::new(),
            rules: None,
        };
        let value = compiler.pattern(&call.key, pattern, None)?;

        Ok(match value.constant_text() {
            Some(text) => js_string_literal(&text),
            None => value.into_code(),
        })
    }
}

impl Translate for FluentTranslator {
    fn function_names(&self) -> &FunctionNameMappings {
        &self.function_names
    }

    fn translate(
        &self,
        candidate: &CandidateExpression,
        context: &TranslationContext,
    ) -> Result<TranslateResult, TranslateError> {
        let call = parse_call(candidate.arguments())?;
        match candidate.function {
            FunctionKind::Translate => {
                let content = self.translate_call(&call, context)?;
                Ok(TranslateResult {
                    content,
                    optimized: candidate.sole,
                })
            }
            FunctionKind::Exists => Ok(TranslateResult::literal(
                self.exists(&call, context).to_string(),
            )),
        }
    }
}

/// `login.title` addresses the `title` attribute of `login`.
fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once('.') {
        Some((id, attr)) => (id, Some(attr)),
        None => (key, None),
    }
}

type Args = HashMap<String, Value>;

/// String and number literals become constants; any other value is kept
/// as runtime code.
fn compile_args(params: Option<&str>) -> Result<Args, TranslateError> {
    let Some(params) = params else {
        return Ok(Args::new());
    };
    let entries = object_entries(params).ok_or_else(|| {
        CallError::InvalidParams("params should be an object literal".to_string())
    })?;
    Ok(entries
        .into_iter()
        .map(|(name, raw)| {
            let value = match evaluate(&raw) {
                Ok(LiteralValue::String(s)) => Value::Text(s),
                Ok(LiteralValue::Number(n)) => Value::Number(n),
                _ => Value::Code(raw),
            };
            (name, value)
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Number(f64),
    /// Runtime JavaScript.
    Code(String),
    /// `NUMBER(argument, options)`; selectable through plural rules.
    Formatted {
        code: String,
        argument: Box<Value>,
        options: String,
    },
}

impl Value {
    fn constant_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(format_js_number(*n)),
            Value::Code(_) | Value::Formatted { .. } => None,
        }
    }

    /// As an operand of `+` or a ternary arm.
    fn to_code(&self) -> String {
        match self {
            Value::Text(s) => js_string_literal(s),
            Value::Number(n) => js_string_literal(&format_js_number(*n)),
            Value::Code(code) => parenthesize(code),
            Value::Formatted { code, .. } => code.clone(),
        }
    }

    /// As a raw operand; numbers stay numbers.
    fn operand(&self) -> String {
        match self {
            Value::Number(n) => format_js_number(*n),
            other => other.to_code(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn into_code(self) -> String {
        match self {
            Value::Code(code) => code,
            other => other.to_code(),
        }
    }
}

fn parenthesize(code: &str) -> String {
    if code
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.'))
    {
        code.to_string()
    } else {
        format!("({})", code)
    }
}

/// Join pattern parts with `+`, folding adjacent constants.
fn concat(parts: Vec<Value>) -> Value {
    let mut merged: Vec<Value> = Vec::new();
    for part in parts {
        match part.constant_text() {
            Some(text) => match merged.last_mut() {
                Some(Value::Text(prev)) => prev.push_str(&text),
                _ => merged.push(Value::Text(text)),
            },
            None => merged.push(part),
        }
    }
    merged.retain(|part| !matches!(part, Value::Text(s) if s.is_empty()));

    match merged.len() {
        0 => Value::Text(String::new()),
        1 => merged.pop().unwrap_or_else(|| Value::Text(String::new())),
        _ => {
            let mut code: Vec<String> = merged.iter().map(Value::to_code).collect();
            if !matches!(merged[0], Value::Text(_)) {
                code.insert(0, "''".to_string());
            }
            Value::Code(code.join(" + "))
        }
    }
}

struct Compiler<'a> {
    catalog: &'a FluentCatalog,
    locale: &'a str,
    key: &'a str,
    args: &'a Args,
    use_isolating: bool,
    placeables: usize,
    /// Messages and terms currently being expanded.
    resolving: HashSet<String>,
    rules: Option<PluralRules>,
}

impl<'a> Compiler<'a> {
    fn pattern(
        &mut self,
        name: &str,
        pattern: &'a Pattern<String>,
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        if !self.resolving.insert(name.to_string()) {
            return Err(TranslateError::CyclicReference(name.to_string()));
        }
        let value = self.elements(pattern, params)?;
        self.resolving.remove(name);
        Ok(value)
    }

    fn elements(
        &mut self,
        pattern: &'a Pattern<String>,
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        let isolate = self.use_isolating && pattern.elements.len() > 1;
        let mut parts = Vec::with_capacity(pattern.elements.len());
        for element in &pattern.elements {
            match element {
                PatternElement::TextElement { value } => parts.push(Value::Text(value.clone())),
                PatternElement::Placeable { expression } => {
                    self.placeables += 1;
                    if self.placeables > MAX_PLACEABLES {
                        return Err(TranslateError::ExpansionLimitExceeded {
                            count: self.placeables,
                            max: MAX_PLACEABLES,
                        });
                    }
                    if isolate {
                        parts.push(Value::Text(FSI.to_string()));
                    }
                    parts.push(self.expression(expression, params)?);
                    if isolate {
                        parts.push(Value::Text(PDI.to_string()));
                    }
                }
            }
        }
        Ok(concat(parts))
    }

    fn expression(
        &mut self,
        expression: &'a Expression<String>,
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        match expression {
            Expression::Inline(inline) => self.inline(inline, params),
            Expression::Select { selector, variants } => self.select(selector, variants, params),
        }
    }

    fn inline(
        &mut self,
        expression: &'a InlineExpression<String>,
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        let catalog = self.catalog;
        match expression {
            InlineExpression::StringLiteral { value } => Ok(Value::Text(unescape(value))),
            InlineExpression::NumberLiteral { value } => Ok(value
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::Text(value.clone()))),
            InlineExpression::VariableReference { id } => match params {
                // Inside a term only its own arguments are visible.
                Some(params) => Ok(params
                    .get(&id.name)
                    .cloned()
                    .unwrap_or_else(|| Value::Text(format!("{{${}}}", id.name)))),
                None => self
                    .args
                    .get(&id.name)
                    .cloned()
                    .ok_or_else(|| TranslateError::UnknownVariable(id.name.clone())),
            },
            InlineExpression::MessageReference { id, attribute } => {
                let message = catalog
                    .messages
                    .get(&id.name)
                    .ok_or_else(|| TranslateError::UnknownMessage(id.name.clone()))?;
                match attribute {
                    Some(attr) => {
                        let name = format!("{}.{}", id.name, attr.name);
                        let attribute = message
                            .attributes
                            .iter()
                            .find(|a| a.id.name == attr.name)
                            .ok_or_else(|| TranslateError::UnknownAttribute(name.clone()))?;
                        self.pattern(&name, &attribute.value, None)
                    }
                    None => {
                        let value = message
                            .value
                            .as_ref()
                            .ok_or_else(|| TranslateError::NoValue(id.name.clone()))?;
                        self.pattern(&id.name, value, None)
                    }
                }
            }
            InlineExpression::TermReference {
                id,
                attribute,
                arguments,
            } => {
                let term = catalog
                    .terms
                    .get(&id.name)
                    .ok_or_else(|| TranslateError::UnknownTerm(id.name.clone()))?;
                let mut term_params = Args::new();
                if let Some(arguments) = arguments {
                    for named in &arguments.named {
                        let value = self.inline(&named.value, params)?;
                        term_params.insert(named.name.name.clone(), value);
                    }
                }
                match attribute {
                    Some(attr) => {
                        let name = format!("-{}.{}", id.name, attr.name);
                        let attribute = term
                            .attributes
                            .iter()
                            .find(|a| a.id.name == attr.name)
                            .ok_or_else(|| TranslateError::UnknownAttribute(name.clone()))?;
                        self.pattern(&name, &attribute.value, Some(&term_params))
                    }
                    None => {
                        let name = format!("-{}", id.name);
                        self.pattern(&name, &term.value, Some(&term_params))
                    }
                }
            }
            InlineExpression::FunctionReference { id, arguments } => {
                self.function(&id.name, arguments, params)
            }
            InlineExpression::Placeable { expression } => self.expression(expression, params),
        }
    }

    /// `NUMBER()` and `DATETIME()` format at runtime through `Intl`.
    fn function(
        &mut self,
        name: &str,
        arguments: &'a CallArguments<String>,
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        let formatter = match name {
            "NUMBER" => "NumberFormat",
            "DATETIME" => "DateTimeFormat",
            _ => return Err(TranslateError::UnknownFunction(name.to_string())),
        };
        let Some(first) = arguments.positional.first() else {
            return Err(TranslateError::InvalidParams(format!(
                "{}() expects an argument",
                name
            )));
        };
        let argument = self.inline(first, params)?;

        let mut options = Vec::with_capacity(arguments.named.len());
        for named in &arguments.named {
            let value = self.inline(&named.value, params)?;
            options.push(format!("{}: {}", named.name.name, value.operand()));
        }
        let options = if options.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", options.join(", "))
        };

        let code = format!(
            "new Intl.{}([{}], {}).format({})",
            formatter,
            js_string_literal(self.locale),
            options,
            argument.operand()
        );
        Ok(if name == "NUMBER" {
            Value::Formatted {
                code,
                argument: Box::new(argument),
                options,
            }
        } else {
            Value::Code(code)
        })
    }

    fn select(
        &mut self,
        selector: &'a InlineExpression<String>,
        variants: &'a [Variant<String>],
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        let selector = self.inline(selector, params)?;
        let Some(default) = variants.iter().position(|v| v.default) else {
            return Err(TranslateError::NoDefaultVariant(self.key.to_string()));
        };

        let number = match &selector {
            Value::Number(n) => Some(*n),
            Value::Formatted { argument, .. } => argument.as_ref().as_number(),
            _ => None,
        };

        if let Some(n) = number {
            let category = self.category(n)?;
            let chosen = variants
                .iter()
                .find(|v| match &v.key {
                    VariantKey::NumberLiteral { value } => value.parse::<f64>().ok() == Some(n),
                    VariantKey::Identifier { name } => name == category,
                })
                .unwrap_or(&variants[default]);
            return self.elements(&chosen.value, params);
        }

        if let Value::Text(text) = &selector {
            let chosen = variants
                .iter()
                .find(|v| matches!(&v.key, VariantKey::Identifier { name } if name == text))
                .unwrap_or(&variants[default]);
            return self.elements(&chosen.value, params);
        }

        self.runtime_select(&selector, variants, default, params)
    }

    /// `[() => a, () => b][(function(s){var c = ...; return s === 1 ? 0 : ..;})(x)]()`
    ///
    /// The selector function only returns an arm index. Arms are
    /// parameterless arrows outside of it, so argument code in them is never
    /// shadowed by the selector's locals.
    fn runtime_select(
        &mut self,
        selector: &Value,
        variants: &'a [Variant<String>],
        default: usize,
        params: Option<&Args>,
    ) -> Result<Value, TranslateError> {
        let (subject, options) = match selector {
            Value::Formatted {
                argument, options, ..
            } => (argument.operand(), options.clone()),
            other => (other.operand(), "{}".to_string()),
        };

        let mut arms = Vec::with_capacity(variants.len());
        let mut branches = Vec::new();
        for (i, variant) in variants.iter().enumerate() {
            arms.push(format!("() => {}", self.elements(&variant.value, params)?.to_code()));
            if i == default {
                continue;
            }
            let condition = match &variant.key {
                VariantKey::NumberLiteral { value } => format!(
                    "s === {}",
                    value
                        .parse::<f64>()
                        .map(format_js_number)
                        .unwrap_or_else(|_| value.clone())
                ),
                VariantKey::Identifier { name } => {
                    let name = js_string_literal(name);
                    format!("s === {} || c === {}", name, name)
                }
            };
            branches.push(format!("{} ? {} : ", condition, i));
        }

        Ok(Value::Code(format!(
            "[{}][(function(s){{var c = typeof s === 'number' ? new Intl.PluralRules([{}], {}).select(s) : null; return {}{};}})({})]()",
            arms.join(", "),
            js_string_literal(self.locale),
            options,
            branches.concat(),
            default,
            subject
        )))
    }

    fn category(&mut self, value: f64) -> Result<&'static str, TranslateError> {
        let rules = match self.rules.take() {
            Some(rules) => rules,
            None => cardinal_rules(self.locale)?,
        };
        let category = category_name(&rules, value);
        self.rules = Some(rules);
        Ok(category)
    }
}

/// Resolve the escapes Fluent string literals allow: `\\`, `\"`,
/// `\uXXXX` and `\UXXXXXX`.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => push_code_point(&mut out, &mut chars, 4),
            Some('U') => push_code_point(&mut out, &mut chars, 6),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, chars: &mut std::str::Chars<'_>, len: usize) {
    let hex: String = chars.by_ref().take(len).collect();
    let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
    out.push(decoded.unwrap_or('\u{FFFD}'));
}
