//! Decomposing a call's argument list into key, params and locale.
//!
//! `t('key', { name: user.name }, 'fr')` splits into the key `key`, the
//! params text `{ name: user.name }` and the locale `fr`. Only quote and
//! bracket nesting is tracked, nothing is evaluated here.

use crate::core::scan::{Bracket, Quote, find_closing};
use crate::error::CallError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub key: String,
    /// Raw params expression, trimmed.
    pub params: Option<String>,
    /// Contents of the trailing locale literal.
    pub locale: Option<String>,
}

/// Parse the text between a call's parentheses.
pub fn parse_call(arguments: &str) -> Result<ParsedCall, CallError> {
    let (key, rest) = parse_key(arguments)?;
    let (params, locale) = split_locale(rest)?;
    Ok(ParsedCall {
        key,
        params: params.map(str::to_string),
        locale,
    })
}

/// Split off the leading key literal, returning its contents and the
/// remaining arguments with the separating comma removed.
pub fn parse_key(arguments: &str) -> Result<(String, &str), CallError> {
    let trimmed = arguments.trim();
    if trimmed.is_empty() {
        return Err(CallError::InvalidKey("key is required".to_string()));
    }
    if trimmed.chars().filter(|c| Quote::from_char(*c).is_some()).count() < 2 {
        return Err(CallError::InvalidKey("key should be a string".to_string()));
    }

    let mut quote: Option<Quote> = None;
    let mut key_start = 0;
    for (i, c) in trimmed.char_indices() {
        match quote {
            None => {
                if c == ',' {
                    return Err(CallError::InvalidKey("key is required".to_string()));
                }
                match Quote::from_char(c) {
                    Some(q) if i == 0 => {
                        quote = Some(q);
                        key_start = i + 1;
                    }
                    _ => {
                        return Err(CallError::InvalidKey(
                            "key should be a string literal".to_string(),
                        ));
                    }
                }
            }
            Some(q) if c == q.as_char() => {
                let key = &trimmed[key_start..i];
                if q == Quote::Back && key.contains("${") {
                    return Err(CallError::DynamicKey(key.to_string()));
                }
                let rest = trimmed[i + 1..].trim_start();
                let rest = match rest.strip_prefix(',') {
                    Some(after_comma) => after_comma.trim(),
                    None if rest.is_empty() => rest,
                    None => {
                        return Err(CallError::InvalidKey(format!(
                            "unexpected `{}` after key",
                            rest
                        )));
                    }
                };
                return Ok((key.to_string(), rest));
            }
            Some(_) => {}
        }
    }
    Err(CallError::InvalidKey("key is required".to_string()))
}

/// Split a leading object literal off `expression`.
///
/// Returns the brace-delimited text and whatever follows it, trimmed.
pub fn parse_params(expression: &str) -> Result<(&str, &str), CallError> {
    let expression = expression.trim();
    let Some(body) = expression.strip_prefix('{') else {
        return Err(CallError::InvalidParams(
            "params should be an object literal".to_string(),
        ));
    };
    let Some(close) = find_closing(body, Bracket::Curly) else {
        return Err(CallError::InvalidParams(
            "params object is not balanced".to_string(),
        ));
    };
    let end = close + 1;
    Ok((&expression[..end], expression[end..].trim()))
}

/// Separate an optional trailing locale literal from the params.
///
/// Scans backward from the end: when the last token is a quoted literal it is
/// the locale and anything before the preceding comma is params. A literal
/// directly attached to other text (a tagged template) is rejected.
pub fn split_locale(rest: &str) -> Result<(Option<&str>, Option<String>), CallError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok((None, None));
    }

    let Some(last) = rest.chars().last() else {
        return Ok((None, None));
    };
    let Some(quote) = Quote::from_char(last) else {
        return Ok((Some(rest), None));
    };

    let body = &rest[..rest.len() - 1];
    let Some(open) = body.rfind(quote.as_char()) else {
        return Ok((Some(rest), None));
    };
    let locale = &body[open + 1..];
    if quote == Quote::Back && locale.contains("${") {
        return Ok((Some(rest), None));
    }

    let before = body[..open].trim_end();
    if before.is_empty() {
        return Ok((None, Some(locale.to_string())));
    }
    match before.strip_suffix(',') {
        Some(params) => {
            let params = params.trim();
            Ok(((!params.is_empty()).then_some(params), Some(locale.to_string())))
        }
        None => Err(CallError::TaggedTemplateUnsupported(rest.to_string())),
    }
}
