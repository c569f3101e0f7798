use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, run};

const APP: &str = "<template>\n  <h1 :title=\"t('title')\">{{ t('greeting', { name: 'Ana' }) }}</h1>\n</template>\n\n<script>\nexport default {}\n</script>\n";

const APP_BAKED: &str =
    "<template>\n  <h1 title=\"Home\">Hello, Ana!</h1>\n</template>\n\n<script>\nexport default {}\n</script>\n";

const MESSAGES: &str = r#"{ "title": "Home", "greeting": "Hello, {name}!", "nav": { "about": "About" } }"#;

#[test]
fn test_single_file_to_stdout() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("src/App.vue", APP)?;

    let out = run(test.transform_command().arg("src/App.vue"))?;
    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout, APP_BAKED);
    assert!(out.stderr.contains("Transformed 1 file (2 translations)"));
    assert_eq!(test.read_file("src/App.vue")?, APP);

    Ok(())
}

#[test]
fn test_write_in_place_uses_config_includes() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("src/App.vue", APP)?;
    test.write_file(
        "src/components/Nav.vue",
        "<template><a>{{ t('nav.about') }}</a></template>\n",
    )?;
    test.write_file("docs/Demo.vue", APP)?;

    let out = run(test.transform_command().arg("--write"))?;
    assert_eq!(out.code, Some(0));
    assert!(out.stdout.is_empty());
    assert_eq!(test.read_file("src/App.vue")?, APP_BAKED);
    assert_eq!(
        test.read_file("src/components/Nav.vue")?,
        "<template><a>About</a></template>\n"
    );
    assert_eq!(test.read_file("docs/Demo.vue")?, APP);

    Ok(())
}

#[test]
fn test_out_dir_mirrors_paths() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("src/App.vue", APP)?;
    test.write_file("src/pages/Index.vue", "<template>{{ t('title') }}</template>")?;

    let out = run(test.transform_command().args(["src", "--out-dir", "dist"]))?;
    assert_eq!(out.code, Some(0));
    assert_eq!(test.read_file("dist/src/App.vue")?, APP_BAKED);
    assert_eq!(
        test.read_file("dist/src/pages/Index.vue")?,
        "<template>Home</template>"
    );
    assert_eq!(test.read_file("src/App.vue")?, APP);

    Ok(())
}

#[test]
fn test_multiple_files_need_an_output() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("src/A.vue", APP)?;
    test.write_file("src/B.vue", APP)?;

    let out = run(&mut test.transform_command())?;
    assert_eq!(out.code, Some(2));
    assert!(out.stderr.contains("use --write or --out-dir"));

    Ok(())
}

#[test]
fn test_missing_key_is_reported() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    let source = "<template>\n  <p>{{ t('nope') }}</p>\n</template>\n";
    test.write_file("src/App.vue", source)?;

    let out = run(test.transform_command().arg("src/App.vue"))?;
    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout, source);
    assert!(out.stderr.contains("warning: skipped translation \"t('nope')\"  skipped-translation"));
    assert!(out.stderr.contains("--> src/App.vue:2:9"));
    assert!(out.stderr.contains("2 |   <p>{{ t('nope') }}</p>"));
    assert!(out.stderr.contains("= note: no translation for key `nope`"));

    Ok(())
}

#[test]
fn test_strict_fails_on_missing_key() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("src/App.vue", "<template><p>{{ t('nope') }}</p></template>")?;

    let out = run(test.transform_command().args(["src/App.vue", "--strict"]))?;
    assert_eq!(out.code, Some(1));
    assert!(out.stdout.is_empty());
    assert!(out.stderr.contains("error: could not transform src/App.vue"));
    assert!(out.stderr.contains("1 file failed"));

    Ok(())
}

#[test]
fn test_locale_override_and_fallback() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("locales/de.json", r#"{ "title": "Startseite" }"#)?;
    test.write_file("src/App.vue", APP)?;

    let out = run(test.transform_command().args(["src/App.vue", "--locale", "de"]))?;
    assert_eq!(out.code, Some(0));
    assert!(out.stdout.contains("<h1 title=\"Startseite\">Hello, Ana!</h1>"));

    Ok(())
}

#[test]
fn test_fluent_translator_from_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        ".bakerc.json",
        r#"{ "translator": "fluent", "messagesRoot": "./i18n" }"#,
    )?;
    test.write_file(
        "i18n/en.ftl",
        "items = { $n ->\n    [one] One item\n   *[other] { $n } items\n}\n",
    )?;
    test.write_file(
        "src/List.vue",
        "<template><p>{{ t('items', { n: 1 }) }}</p><p>{{ t('items', { n: 3 }) }}</p></template>\n",
    )?;

    let out = run(test.transform_command().arg("src/List.vue"))?;
    assert_eq!(out.code, Some(0));
    assert_eq!(
        out.stdout,
        "<template><p>One item</p><p>3 items</p></template>\n"
    );

    Ok(())
}

#[test]
fn test_missing_messages_root_is_an_internal_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("src/App.vue", APP)?;

    let out = run(test.transform_command().arg("src/App.vue"))?;
    assert_eq!(out.code, Some(2));
    assert!(out.stderr.contains("does not exist"));

    Ok(())
}

#[test]
fn test_verbose_reports_message_load_warnings() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;
    test.write_file("locales/fr.json", "[]")?;
    test.write_file("src/App.vue", APP)?;

    let out = run(test.transform_command().args(["src/App.vue", "-v"]))?;
    assert_eq!(out.code, Some(0));
    assert!(out.stderr.contains("could not load messages"));
    assert!(out.stderr.contains("fr.json"));
    assert!(out.stderr.contains("Transformed src/App.vue (2 translated)"));

    let quiet = run(test.transform_command().arg("src/App.vue"))?;
    assert!(!quiet.stderr.contains("could not load messages"));

    Ok(())
}

#[test]
fn test_no_components_found() -> Result<()> {
    let test = CliTest::with_catalog(MESSAGES)?;

    let out = run(&mut test.transform_command())?;
    assert_eq!(out.code, Some(0));
    assert!(out.stderr.contains("No component files found"));

    Ok(())
}
