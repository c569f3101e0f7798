//! Key/placeholder catalog backend.
//!
//! Messages are plain strings with `{name}` placeholders. Literal params are
//! substituted at build time; runtime params get an inline function that
//! performs the substitution when the template renders.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::extract::{
    CandidateExpression, FunctionKind, FunctionNameMappings, ParsedCall, parse_call, parse_params,
};
use crate::core::literal::{LiteralValue, evaluate};
use crate::core::parsers::json::LocaleMessages;
use crate::error::{CallError, TranslateError};
use crate::translators::{Translate, TranslateResult, TranslationContext};
use crate::utils::js_string_literal;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([^{}\s]+)\s*\}").unwrap());

#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    messages: LocaleMessages,
    function_names: FunctionNameMappings,
}

impl CatalogTranslator {
    pub fn new(messages: LocaleMessages, function_names: FunctionNameMappings) -> Self {
        Self {
            messages,
            function_names,
        }
    }

    /// First message for `key` along the locale chain. The file overlay
    /// wins over the catalog within each locale.
    fn lookup<'a>(
        &'a self,
        key: &str,
        explicit: Option<&'a str>,
        context: &'a TranslationContext,
    ) -> Option<&'a str> {
        context.locale_chain(explicit).into_iter().find_map(|locale| {
            context
                .overlay
                .get(locale)
                .and_then(|messages| messages.get(key))
                .or_else(|| self.messages.get(locale).and_then(|m| m.get(key)))
                .map(String::as_str)
        })
    }

    fn translate_call(
        &self,
        call: &ParsedCall,
        context: &TranslationContext,
    ) -> Result<TranslateResult, TranslateError> {
        let Some(template) = self.lookup(&call.key, call.locale.as_deref(), context) else {
            return Err(TranslateError::UnknownKey {
                key: call.key.clone(),
                locale: call.locale.clone().unwrap_or_else(|| context.locale.clone()),
            });
        };

        let has_placeholders = PLACEHOLDER.is_match(template);
        let Some(params) = call.params.as_deref() else {
            if let Some(caps) = PLACEHOLDER.captures(template) {
                return Err(TranslateError::MissingVariable {
                    variable: caps[1].to_string(),
                    key: call.key.clone(),
                });
            }
            return Ok(TranslateResult::literal(js_string_literal(template)));
        };

        let (object, trailing) = parse_params(params)?;
        if !trailing.is_empty() {
            return Err(CallError::InvalidParams(format!(
                "unexpected `{}` after params",
                trailing
            ))
            .into());
        }
        if !has_placeholders {
            return Ok(TranslateResult::literal(js_string_literal(template)));
        }

        match evaluate(object) {
            Ok(values @ LiteralValue::Object(_)) => {
                let text = substitute(template, &call.key, &values)?;
                Ok(TranslateResult::literal(js_string_literal(&text)))
            }
            Ok(_) => Err(CallError::InvalidParams(
                "params should be an object literal".to_string(),
            )
            .into()),
            Err(_) => Ok(TranslateResult::runtime(compile_runtime(template, object))),
        }
    }
}

impl Translate for CatalogTranslator {
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
            FunctionKind::Translate => self.translate_call(&call, context),
            FunctionKind::Exists => {
                let exists = self
                    .lookup(&call.key, call.locale.as_deref(), context)
                    .is_some();
                Ok(TranslateResult::literal(exists.to_string()))
            }
        }
    }
}

/// Replace every placeholder with its literal value.
fn substitute(template: &str, key: &str, values: &LiteralValue) -> Result<String, TranslateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = match values.get(name.as_str()) {
            None | Some(LiteralValue::Undefined) | Some(LiteralValue::Null) => {
                return Err(TranslateError::MissingVariable {
                    variable: name.as_str().to_string(),
                    key: key.to_string(),
                });
            }
            Some(value) => value.to_string(),
        };
        out.push_str(&template[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&template[last..]);
    Ok(out)
}

/// `(function(p){return 'Hello, ' + (p['name'] == null ? '' : p['name']);})(params)`
fn compile_runtime(template: &str, params: &str) -> String {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push(js_string_literal(&template[last..whole.start()]));
        }
        let access = format!("p[{}]", js_string_literal(name.as_str()));
        parts.push(format!("({} == null ? '' : {})", access, access));
        last = whole.end();
    }
    if last < template.len() {
        parts.push(js_string_literal(&template[last..]));
    }
    // Keep string concatenation even when the first part is a placeholder.
    if parts.len() < 2 || !parts[0].starts_with('\'') {
        parts.insert(0, "''".to_string());
    }
    format!(
        "(function(p){{return {};}})({})",
        parts.join(" + "),
        params
    )
}
