use std::fs;
use std::path::Path;

use rollkit_core::error::Error;
use rollkit_core::scanner::{fuzzy_match, Scanner};
use tempfile::TempDir;

fn create_test_package(dir: &Path, name: &str, private: bool, build_options: bool) {
    let pkg_dir = dir.join(name);
    fs::create_dir_all(&pkg_dir).unwrap();

    let options = if build_options {
        r#", "buildOptions": { "formats": ["esm", "cjs"] }"#
    } else {
        ""
    };
    let manifest = format!(
        r#"{{ "name": "@scope/{}", "version": "1.0.0", "private": {}{} }}"#,
        name, private, options
    );
    fs::write(pkg_dir.join("package.json"), manifest).unwrap();
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_all_packages_sorted() {
    let temp_dir = TempDir::new().unwrap();
    let packages_dir = temp_dir.path().join("packages");

    create_test_package(&packages_dir, "shared", false, false);
    create_test_package(&packages_dir, "core", false, true);
    create_test_package(&packages_dir, "playground", true, false);

    let packages = Scanner::new(&packages_dir).all_packages().unwrap();

    let found: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(found, vec!["core", "playground", "shared"]);
    assert_eq!(packages[0].manifest.name.as_deref(), Some("@scope/core"));
}

#[test]
fn test_targets_exclude_private_without_build_options() {
    let temp_dir = TempDir::new().unwrap();
    let packages_dir = temp_dir.path().join("packages");

    create_test_package(&packages_dir, "core", false, false);
    create_test_package(&packages_dir, "playground", true, false);
    create_test_package(&packages_dir, "internal", true, true);

    let targets = Scanner::new(&packages_dir).target_names().unwrap();
    assert_eq!(targets, names(&["core", "internal"]));
}

#[test]
fn test_skips_hidden_and_manifestless_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let packages_dir = temp_dir.path().join("packages");

    create_test_package(&packages_dir, "core", false, false);
    create_test_package(&packages_dir, ".cache", false, false);
    fs::create_dir_all(packages_dir.join("empty")).unwrap();
    fs::write(packages_dir.join("README.md"), "# packages").unwrap();

    let targets = Scanner::new(&packages_dir).target_names().unwrap();
    assert_eq!(targets, names(&["core"]));
}

#[test]
fn test_invalid_manifest_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let packages_dir = temp_dir.path().join("packages");
    fs::create_dir_all(packages_dir.join("broken")).unwrap();
    fs::write(packages_dir.join("broken").join("package.json"), "{ not json").unwrap();

    let result = Scanner::new(&packages_dir).all_packages();
    assert!(matches!(result, Err(Error::Json { .. })));
}

#[test]
fn test_fuzzy_match_first_match_only() {
    let targets = names(&["runtime-core", "runtime-dom", "shared"]);
    let matched = fuzzy_match(&targets, &names(&["runtime"]), false).unwrap();
    assert_eq!(matched, names(&["runtime-core"]));
}

#[test]
fn test_fuzzy_match_all_matching() {
    let targets = names(&["runtime-core", "runtime-dom", "shared"]);
    let matched = fuzzy_match(&targets, &names(&["runtime"]), true).unwrap();
    assert_eq!(matched, names(&["runtime-core", "runtime-dom"]));
}

#[test]
fn test_fuzzy_match_is_unanchored_regex() {
    let targets = names(&["compiler-core", "compiler-dom", "reactivity"]);
    let matched = fuzzy_match(&targets, &names(&["dom$", "^react"]), false).unwrap();
    assert_eq!(matched, names(&["compiler-dom", "reactivity"]));
}

#[test]
fn test_fuzzy_match_deduplicates() {
    let targets = names(&["core", "shared"]);
    let matched = fuzzy_match(&targets, &names(&["co", "ore"]), false).unwrap();
    assert_eq!(matched, names(&["core"]));
}

#[test]
fn test_fuzzy_match_not_found() {
    let targets = names(&["core", "shared"]);
    match fuzzy_match(&targets, &names(&["vue"]), false) {
        Err(Error::TargetNotFound { partials, available }) => {
            assert_eq!(partials, "vue");
            assert_eq!(available, "core, shared");
        }
        other => panic!("expected TargetNotFound, got {:?}", other),
    }
}

#[test]
fn test_fuzzy_match_invalid_pattern() {
    let targets = names(&["core"]);
    let result = fuzzy_match(&targets, &names(&["("]), false);
    assert!(matches!(result, Err(Error::InvalidPattern { .. })));
}

#[test]
fn test_scanner_fuzzy_match_uses_targets() {
    let temp_dir = TempDir::new().unwrap();
    let packages_dir = temp_dir.path().join("packages");
    create_test_package(&packages_dir, "core", false, false);
    create_test_package(&packages_dir, "core-private", true, false);

    let matched = Scanner::new(&packages_dir)
        .fuzzy_match(&names(&["core"]), true)
        .unwrap();
    assert_eq!(matched, names(&["core"]));
}

#[test]
fn test_target_names_with_uppercase_formats() {
    let temp_dir = TempDir::new().unwrap();
    let packages_dir = temp_dir.path().join("packages");

    create_test_package(&packages_dir, "core", false, true);
    let shared = packages_dir.join("shared");
    fs::create_dir_all(&shared).unwrap();
    fs::write(
        shared.join("package.json"),
        r#"{ "name": "@scope/shared", "version": "1.0.0", "buildOptions": { "formats": ["ESM", "cjs"] } }"#,
    )
    .unwrap();

    let targets = Scanner::new(&packages_dir).target_names().unwrap();
    assert_eq!(targets, names(&["core", "shared"]));
}
