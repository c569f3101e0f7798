//! Common utility functions shared across the codebase.

/// Render `text` as a single-quoted JavaScript string literal.
///
/// # Examples
///
/// ```
/// use bake_i18n::utils::js_string_literal;
///
/// assert_eq!(js_string_literal("Hi"), "'Hi'");
/// assert_eq!(js_string_literal("It's"), r"'It\'s'");
/// assert_eq!(js_string_literal("a\nb"), r"'a\nb'");
/// ```
pub fn js_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Escape quote characters so `text` can sit in markup, inside or outside
/// an attribute value.
///
/// # Examples
///
/// ```
/// use bake_i18n::utils::escape_markup_quotes;
///
/// assert_eq!(escape_markup_quotes(r#"say "hi" it's"#), "say &quot;hi&quot; it&#39;s");
/// ```
pub fn escape_markup_quotes(text: &str) -> String {
    text.replace('"', "&quot;").replace('\'', "&#39;")
}

/// Format a number the way JavaScript's `String(n)` does for common values.
///
/// # Examples
///
/// ```
/// use bake_i18n::utils::format_js_number;
///
/// assert_eq!(format_js_number(3.0), "3");
/// assert_eq!(format_js_number(-0.0), "0");
/// assert_eq!(format_js_number(1.5), "1.5");
/// assert_eq!(format_js_number(f64::NAN), "NaN");
/// ```
pub fn format_js_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e21 {
        return format!("{:.0}", value);
    }
    format!("{}", value)
}

/// Checks if `name` is a plain JavaScript identifier (ASCII subset).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
