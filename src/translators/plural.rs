//! CLDR plural categories for literal numeric selectors.

use fixed_decimal::Decimal;
use icu_locale::Locale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};

use crate::error::TranslateError;
use crate::utils::format_js_number;

/// Build cardinal plural rules for `locale`.
pub fn cardinal_rules(locale: &str) -> Result<PluralRules, TranslateError> {
    let parsed: Locale = locale
        .parse()
        .map_err(|_| TranslateError::InvalidLocale(locale.to_string()))?;
    PluralRules::try_new(parsed.into(), PluralRuleType::Cardinal.into())
        .map_err(|_| TranslateError::InvalidLocale(locale.to_string()))
}

/// The category name a selector value falls into.
///
/// Operands come from the number's JS string form, so fraction digits count
/// the same way `Intl.PluralRules` sees them at runtime.
pub fn category_name(rules: &PluralRules, value: f64) -> &'static str {
    if !value.is_finite() {
        return "other";
    }
    let category = match Decimal::try_from_str(&format_js_number(value)) {
        Ok(decimal) => rules.category_for(&decimal),
        // Exponent forms, only printed for very large or very small values.
        Err(_) => rules.category_for(value.abs().trunc() as u64),
    };
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}
