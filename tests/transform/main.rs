use std::collections::BTreeMap;

use bake_i18n::core::extract::{
    ExpressionKind, Extractor, FunctionKind, FunctionNameMappings, default_function_names,
};
use bake_i18n::core::parsers::ftl::parse_ftl;
use bake_i18n::core::parsers::json::LocaleMessages;
use bake_i18n::issues::Issue;
use bake_i18n::translators::{CatalogTranslator, FluentTranslator};
use bake_i18n::{OnMissing, TransformOptions, Translator, transform_component, transform_template};
use pretty_assertions::assert_eq;

fn function_names() -> FunctionNameMappings {
    let mut names = default_function_names();
    names.insert("$t".to_string(), FunctionKind::Translate);
    names.insert("te".to_string(), FunctionKind::Exists);
    names
}

fn catalog() -> Translator {
    let messages: LocaleMessages = BTreeMap::from([
        (
            "en".to_string(),
            BTreeMap::from([
                ("hi".to_string(), "Hi".to_string()),
                ("hello".to_string(), "Hello, {name}!".to_string()),
                ("nav.home".to_string(), "Home".to_string()),
            ]),
        ),
        (
            "de".to_string(),
            BTreeMap::from([("hi".to_string(), "Hallo".to_string())]),
        ),
    ]);
    CatalogTranslator::new(messages, function_names()).into()
}

fn fluent() -> Translator {
    let (en, warnings) = parse_ftl(
        "-brand = Bake\n\
         hi = Hi from { -brand }\n\
         hello = Hello, { $name }!\n\
         emails = { $count ->\n    [one] One email\n   *[other] { $count } emails\n}\n",
    );
    assert!(warnings.is_empty());
    FluentTranslator::new(BTreeMap::from([("en".to_string(), en)]), function_names()).into()
}

fn run(source: &str, translator: &Translator) -> bake_i18n::TransformOutput {
    transform_component(source, &TransformOptions::default(), translator).unwrap()
}

#[test]
fn test_source_without_calls_is_unchanged() {
    let source = "<template>\n  <div class=\"app\" :id=\"uid\">\n    {{ user.name }} &amp; <b>{{ count + 1 }}</b>\n  </div>\n</template>\n\n<script>\nexport default { name: 'App' }\n</script>\n<style scoped>\n.app { color: red }\n</style>\n";
    let out = run(source, &catalog());
    assert_eq!(out.code, source);
    assert!(out.issues.is_empty());
    assert_eq!(out.translated, 0);
}

#[test]
fn test_candidates_are_balanced() {
    let extractor = Extractor::new(&function_names()).unwrap();
    let snippet = "a + t('x', { n: [1, (2)] }) - $t(\"y)\", f(g[0])) + t('oops', (";
    let candidates = extractor.extract(snippet, 10, ExpressionKind::Text);

    let contents: Vec<&str> = candidates.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["t('x', { n: [1, (2)] })", "$t(\"y)\", f(g[0]))"]);
    for candidate in &candidates {
        assert_eq!(&snippet[candidate.span.begin - 10..candidate.span.end - 10], candidate.content);
        let mut depth = 0i32;
        let mut quote = None;
        for c in candidate.content.chars() {
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"' | '`') => quote = Some(c),
                (None, '(' | '[' | '{') => depth += 1,
                (None, ')' | ']' | '}') => depth -= 1,
                _ => {}
            }
        }
        assert_eq!(depth, 0);
    }
}

#[test]
fn test_nested_call_stays_inside_outer() {
    let extractor = Extractor::new(&function_names()).unwrap();
    let candidates = extractor.extract("t(t('inner'))", 0, ExpressionKind::Text);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].content, "t(t('inner'))");

    // The outer key is not a literal, so the whole call is left alone.
    let source = "<template><p>{{ t(t('inner')) }}</p></template>";
    let out = run(source, &catalog());
    assert_eq!(out.code, source);
    assert_eq!(out.issues.len(), 1);
}

#[test]
fn test_translate_scope_is_inherited() {
    let disabled = "<template><div translate=\"no\"><span>{{ t('hi') }}</span></div></template>";
    assert_eq!(run(disabled, &catalog()).code, disabled);

    let enabled = "<template><div><span>{{ t('hi') }}</span></div></template>";
    assert_eq!(
        run(enabled, &catalog()).code,
        "<template><div><span>Hi</span></div></template>"
    );

    let reenabled = "<template><div translate=\"no\"><p translate=\"yes\">{{ t('hi') }}</p><p>{{ t('hi') }}</p></div></template>";
    assert_eq!(
        run(reenabled, &catalog()).code,
        "<template><div translate=\"no\"><p translate=\"yes\">Hi</p><p>{{ t('hi') }}</p></div></template>"
    );
}

#[test]
fn test_literal_collapse() {
    let out = run("<template>{{ t('hi') }}</template>", &catalog());
    assert_eq!(out.code, "<template>Hi</template>");
    assert_eq!(out.translated, 1);

    let out = run(
        "<template><a :title=\"$t('nav.home')\">{{ t('hi', 'de') }}</a></template>",
        &catalog(),
    );
    assert_eq!(out.code, "<template><a title=\"Home\">Hallo</a></template>");
}

#[test]
fn test_runtime_params_keep_delimiters() {
    for translator in [catalog(), fluent()] {
        let out = run(
            "<template><p>{{ t('hello', {name: user.name}) }}</p></template>",
            &translator,
        );
        assert!(out.code.starts_with("<template><p>{{ "));
        assert!(out.code.ends_with(" }}</p></template>"));
        assert!(out.code.contains("user.name"));
        assert!(!out.code.contains("t('hello'"));
        assert!(out.issues.is_empty());
    }
}

#[test]
fn test_unknown_key_is_left_and_reported() {
    let source = "<template>\n  <p>{{ t('doesNotExist') }}</p>\n</template>";
    let out = run(source, &catalog());
    assert_eq!(out.code, source);
    assert_eq!(out.issues.len(), 1);
    assert!(matches!(out.issues[0], Issue::SkippedTranslation(_)));

    let options = TransformOptions {
        on_missing: OnMissing::Error,
        ..Default::default()
    };
    assert!(transform_component(source, &options, &catalog()).is_err());
}

#[test]
fn test_script_and_style_are_opaque() {
    let source = "<template><pre><script>const t = x => x; t('hi')</script></pre><textarea>{{ t('hi') }}</textarea></template>\n<script>\nconst t = x => x;\nt('hi')\n</script>\n";
    let out = run(source, &catalog());
    assert_eq!(out.code, source);
    assert!(out.issues.is_empty());
}

#[test]
fn test_second_run_is_idempotent() {
    let source = "<template>\n  <h1 :title=\"t('nav.home')\">{{ t('hi') }}</h1>\n  <p>{{ t('hello', { name: 'Ana' }) }}</p>\n</template>\n";
    let once = run(source, &catalog());
    assert_eq!(
        once.code,
        "<template>\n  <h1 title=\"Home\">Hi</h1>\n  <p>Hello, Ana!</p>\n</template>\n"
    );
    let twice = run(&once.code, &catalog());
    assert_eq!(twice.code, once.code);
    assert_eq!(twice.translated, 0);
}

#[test]
fn test_fluent_backend() {
    let translator = fluent();
    let out = run(
        "<template><h1>{{ t('hi') }}</h1><p>{{ t('emails', { count: 1 }) }}</p><p>{{ t('emails', { count: 5 }) }}</p></template>",
        &translator,
    );
    assert_eq!(
        out.code,
        "<template><h1>Hi from Bake</h1><p>One email</p><p>5 emails</p></template>"
    );

    let out = run("<template><p>{{ t('emails', { count: n }) }}</p></template>", &translator);
    assert!(out.code.contains("Intl.PluralRules(['en']"));
    assert!(out.code.ends_with("})(n)]() }}</p></template>"));
}

#[test]
fn test_exists_function() {
    let out = run(
        "<template><div :hidden=\"te('missing')\"><comp :visible=\"te('hi')\"/></div>{{ te('hi') }}</template>",
        &catalog(),
    );
    // Booleans never collapse into static attributes or text.
    assert_eq!(
        out.code,
        "<template><div :hidden=\"false\"><comp :visible=\"true\"/></div>{{ true }}</template>"
    );
    assert_eq!(out.translated, 3);
}

#[test]
fn test_template_fragment() {
    let out = transform_template(
        "<p>{{ t('hi') }}</p>{{ t('hi', 'de') }}",
        &TransformOptions::default(),
        &catalog(),
    )
    .unwrap();
    assert_eq!(out.code, "<p>Hi</p>Hallo");
}
