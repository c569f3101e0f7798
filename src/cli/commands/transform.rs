use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use rayon::prelude::*;

use super::super::args::TransformArgs;
use super::super::exit_status::ExitStatus;
use super::super::report::{print_failures_to, print_file_error_to, print_success_to, report};
use crate::config::{Config, load_config};
use crate::core::file_scanner::scan_files;
use crate::core::{OnMissing, TransformOptions, TransformOutput, transform_component};
use crate::issues::{Issue, MessageLoadIssue};
use crate::translators::Translator;

/// Where transformed code goes.
enum Output {
    Stdout,
    InPlace,
    Mirror(PathBuf),
}

struct FileOutcome {
    display_path: String,
    result: Result<TransformOutput>,
}

pub fn transform(args: TransformArgs) -> Result<ExitStatus> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;
    let loaded = load_config(&cwd)?;
    let root = loaded.root;
    let config = apply_overrides(loaded.config, &args);
    config.validate()?;
    let verbose = args.verbose;

    let messages_root = match &args.messages_root {
        Some(path) => cwd.join(path),
        None => root.join(&config.messages_root),
    };
    let (translator, warnings) = Translator::load(
        config.translator,
        &messages_root,
        config.function_names.clone(),
        config.use_isolating,
    )?;
    let load_issues: Vec<Issue> = warnings
        .into_iter()
        .map(|w| {
            Issue::MessageLoad(MessageLoadIssue {
                file_path: w.file_path,
                error: w.error,
            })
        })
        .collect();

    let files = collect_files(&args.paths, &config, &root, &cwd, verbose)?;
    if files.is_empty() {
        eprintln!("{} No component files found", "warning:".bold().yellow());
        return Ok(ExitStatus::Success);
    }

    let output = match (&args.out_dir, args.write) {
        (Some(dir), _) => Output::Mirror(cwd.join(dir)),
        (None, true) => Output::InPlace,
        (None, false) if files.len() == 1 => Output::Stdout,
        (None, false) => bail!(
            "{} files matched; use --write or --out-dir to transform more than one file",
            files.len()
        ),
    };

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| {
            let display_path = display_path(path, &cwd);
            let result = process_file(path, &display_path, &config, &translator, &output, &cwd);
            FileOutcome {
                display_path,
                result,
            }
        })
        .collect();

    let mut issues = if verbose { load_issues } else { Vec::new() };
    let mut failed = 0;
    let mut translated = 0;
    let mut stderr = std::io::stderr().lock();
    for outcome in outcomes {
        match outcome.result {
            Ok(out) => {
                if verbose {
                    eprintln!(
                        "{} {} ({} translated)",
                        "Transformed".green().bold(),
                        outcome.display_path,
                        out.translated
                    );
                }
                if matches!(output, Output::Stdout) {
                    print!("{}", out.code);
                }
                translated += out.translated;
                issues.extend(out.issues);
            }
            Err(err) => {
                failed += 1;
                print_file_error_to(&outcome.display_path, &err, &mut stderr);
            }
        }
    }
    drop(stderr);

    report(&issues);
    print_failures_to(failed, &mut std::io::stderr().lock());
    if failed == 0 {
        print_success_to(files.len(), translated, &mut std::io::stderr().lock());
    }

    if failed > 0 || (args.strict && !issues.is_empty()) {
        Ok(ExitStatus::Failure)
    } else {
        Ok(ExitStatus::Success)
    }
}

fn apply_overrides(mut config: Config, args: &TransformArgs) -> Config {
    if let Some(translator) = args.translator {
        config.translator = translator;
    }
    if let Some(locale) = &args.locale {
        config.locale = locale.clone();
    }
    if let Some(fallback) = &args.fallback {
        config.fallback = fallback.clone();
    }
    if args.strict {
        config.on_missing = OnMissing::Error;
    }
    config
}

/// Explicit files are taken as given; directories are walked for components.
/// With no paths the config `includes` are scanned from the project root.
fn collect_files(
    paths: &[PathBuf],
    config: &Config,
    root: &Path,
    cwd: &Path,
    verbose: bool,
) -> Result<Vec<PathBuf>> {
    if paths.is_empty() {
        let scanned = scan_files(root, &config.includes, &config.ignores, verbose);
        return Ok(scanned.files.into_iter().map(PathBuf::from).collect());
    }

    let mut files = Vec::new();
    for path in paths {
        let path = cwd.join(path);
        if path.is_dir() {
            let scanned = scan_files(&path, &[], &config.ignores, verbose);
            files.extend(scanned.files.into_iter().map(PathBuf::from));
        } else if path.is_file() {
            files.push(path);
        } else {
            bail!("Path does not exist: {}", path.display());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn process_file(
    path: &Path,
    display_path: &str,
    config: &Config,
    translator: &Translator,
    output: &Output,
    cwd: &Path,
) -> Result<TransformOutput> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let options = TransformOptions {
        locale: config.locale.clone(),
        fallback: config.fallback.clone(),
        block_name: config.block_name.clone(),
        remove_block: config.remove_block,
        on_missing: config.on_missing,
        file_path: display_path.to_string(),
    };
    let out = transform_component(&source, &options, translator)?;

    match output {
        Output::Stdout => {}
        Output::InPlace => {
            if out.code != source {
                fs::write(path, &out.code)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }
        Output::Mirror(dir) => {
            let relative = path.strip_prefix(cwd).unwrap_or(path);
            let relative = relative.strip_prefix("/").unwrap_or(relative);
            let target = dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&target, &out.code)
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }
    }

    Ok(out)
}

fn display_path(path: &Path, cwd: &Path) -> String {
    path.strip_prefix(cwd)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
