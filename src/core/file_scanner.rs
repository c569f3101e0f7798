use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Extensions of component files the transformer accepts.
pub const COMPONENT_EXTENSIONS: &[&str] = &["vue"];

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Sorted, deduplicated component paths.
    pub files: BTreeSet<String>,
    pub skipped_count: usize,
}

/// Collect component files under `base_dir`.
///
/// `includes` narrows the walk to the given directories (literal paths or
/// globs); an empty list walks `base_dir` itself. `ignores` drops paths by
/// literal prefix or glob.
pub fn scan_files(
    base_dir: &Path,
    includes: &[String],
    ignore_patterns: &[String],
    verbose: bool,
) -> ScanResult {
    let mut result = ScanResult::default();

    let mut literal_ignore_paths: Vec<PathBuf> = Vec::new();
    let mut glob_patterns: Vec<Pattern> = Vec::new();
    for p in ignore_patterns {
        if is_glob_pattern(p) {
            match Pattern::new(p) {
                Ok(pattern) => glob_patterns.push(pattern),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid ignore pattern '{}': {}",
                            "warning:".bold().yellow(),
                            p,
                            e
                        );
                    }
                }
            }
        } else {
            literal_ignore_paths.push(base_dir.join(p));
        }
    }

    for dir in include_dirs(base_dir, includes, verbose) {
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    if verbose {
                        eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                    }
                    continue;
                }
            };
            let path = entry.path();
            let path_str = path.to_string_lossy();

            if literal_ignore_paths
                .iter()
                .any(|ignore_path| path.starts_with(ignore_path))
            {
                continue;
            }
            if glob_patterns.iter().any(|p| p.matches(&path_str)) {
                continue;
            }

            if path.is_file() && is_component_file(path) {
                result.files.insert(path_str.into());
            }
        }
    }

    result
}

fn include_dirs(base_dir: &Path, includes: &[String], verbose: bool) -> Vec<PathBuf> {
    if includes.is_empty() {
        return vec![base_dir.to_path_buf()];
    }

    let mut paths = Vec::new();
    for inc in includes {
        if is_glob_pattern(inc) {
            let full_pattern = base_dir.join(inc);
            match glob(&full_pattern.to_string_lossy()) {
                Ok(entries) => paths.extend(entries.flatten().filter(|entry| entry.is_dir())),
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid glob pattern '{}': {}",
                            "warning:".bold().yellow(),
                            inc,
                            e
                        );
                    }
                }
            }
        } else {
            let path = base_dir.join(inc);
            if path.exists() {
                paths.push(path);
            } else if verbose {
                eprintln!(
                    "{} Include path does not exist: {}",
                    "warning:".bold().yellow(),
                    path.display()
                );
            }
        }
    }
    paths
}

pub fn is_component_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| COMPONENT_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_scan_component_files() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("App.vue")).unwrap();
        File::create(dir.path().join("main.ts")).unwrap();
        File::create(dir.path().join("style.css")).unwrap();

        let result = scan_files(dir.path(), &[], &[], false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files.iter().any(|f| f.ends_with("App.vue")));
    }

    #[test]
    fn test_scan_with_includes() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src").join("components");
        fs::create_dir_all(&src).unwrap();
        File::create(src.join("Button.vue")).unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        File::create(docs.join("Demo.vue")).unwrap();

        let result = scan_files(dir.path(), &["src".to_owned(), "missing".to_owned()], &[], false);

        assert_eq!(result.files.len(), 1);
        assert!(result.files.iter().any(|f| f.ends_with("components/Button.vue")));
    }

    #[test]
    fn test_scan_with_glob_include() {
        let dir = tempdir().unwrap();
        for sub in ["pages", "layouts"] {
            let path = dir.path().join("src").join(sub);
            fs::create_dir_all(&path).unwrap();
            File::create(path.join("Index.vue")).unwrap();
        }
        File::create(dir.path().join("src").join("Root.vue")).unwrap();

        let result = scan_files(dir.path(), &["src/*".to_owned()], &[], false);

        assert_eq!(result.files.len(), 2);
        assert!(!result.files.iter().any(|f| f.ends_with("Root.vue")));
    }

    #[test]
    fn test_scan_ignores_literal_and_glob() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let generated = src.join("generated");
        fs::create_dir_all(&generated).unwrap();
        File::create(src.join("App.vue")).unwrap();
        File::create(src.join("App.story.vue")).unwrap();
        File::create(generated.join("Auto.vue")).unwrap();

        let result = scan_files(
            dir.path(),
            &["src".to_owned()],
            &["src/generated".to_owned(), "**/*.story.vue".to_owned()],
            false,
        );

        assert_eq!(result.files.len(), 1);
        assert!(result.files.iter().any(|f| f.ends_with("App.vue")));
    }

    #[test]
    fn test_overlapping_includes_are_deduplicated() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("src").join("components");
        fs::create_dir_all(&nested).unwrap();
        File::create(nested.join("Button.vue")).unwrap();

        let result = scan_files(
            dir.path(),
            &["src".to_owned(), "src/components".to_owned()],
            &[],
            false,
        );

        assert_eq!(result.files.len(), 1);
    }

    #[test]
    fn test_is_component_file() {
        assert!(is_component_file(Path::new("App.vue")));
        assert!(!is_component_file(Path::new("App.ts")));
        assert!(!is_component_file(Path::new("vue")));
    }

    #[test]
    fn test_is_glob_pattern() {
        assert!(is_glob_pattern("src/*"));
        assert!(is_glob_pattern("src/**/*.vue"));
        assert!(!is_glob_pattern("src/[id]"));
    }
}
