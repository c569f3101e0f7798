use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, run};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in [
        "translator",
        "locale",
        "fallback",
        "functionNames",
        "messagesRoot",
        "blockName",
        "removeBlock",
        "onMissing",
        "includes",
        "ignores",
    ] {
        assert!(parsed.get(field).is_some(), "Config should have '{}' field", field);
    }
    assert_eq!(parsed["functionNames"]["t"], "t");
    assert_eq!(parsed["onMissing"], "skip");

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let out = run(test.command().arg("init"))?;
    assert_eq!(out.code, Some(0));
    assert_eq!(out.stdout, "\u{2713} Created .bakerc.json\n");

    let content = test.read_file(".bakerc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".bakerc.json", "{}")?;

    let out = run(test.command().arg("init"))?;
    assert_eq!(out.code, Some(1));
    assert_eq!(out.stderr, "Error: .bakerc.json already exists\n");
    assert_eq!(test.read_file(".bakerc.json")?, "{}");

    Ok(())
}
