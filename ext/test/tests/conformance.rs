//! Conformance tests that run YAML fixtures against logway
//!
//! Run with: cargo test -p logway-test --test conformance --features logway-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use logway_test::fixture::{EmitFixture, PolicyFixture};
use std::fs;
use std::path::{Path, PathBuf};

/// The fixtures directory next to this crate's manifest
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Every `.yaml`/`.yml` file in `dir`, sorted for stable output
fn yaml_files(dir: &Path) -> Vec<PathBuf> {
    assert!(dir.exists(), "Fixtures directory does not exist: {}", dir.display());

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    files.sort();
    assert!(!files.is_empty(), "No fixtures in {}", dir.display());
    files
}

fn run_policy_fixtures_in_dir(dir: &Path) {
    for path in yaml_files(dir) {
        println!("Running fixture: {}", path.display());
        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = PolicyFixture::from_yaml_multi(&yaml)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

fn run_emit_fixtures_in_dir(dir: &Path) {
    for path in yaml_files(dir) {
        println!("Running fixture: {}", path.display());
        let yaml = fs::read_to_string(&path).expect("read yaml");

        let fixtures = EmitFixture::from_yaml_multi(&yaml)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_matchers() {
    run_policy_fixtures_in_dir(&fixtures_dir().join("01_matchers"));
}

#[test]
fn test_policies() {
    run_policy_fixtures_in_dir(&fixtures_dir().join("02_policies"));
}

#[test]
fn test_invariants() {
    run_policy_fixtures_in_dir(&fixtures_dir().join("03_invariants"));
}

#[test]
fn test_emission() {
    run_emit_fixtures_in_dir(&fixtures_dir().join("04_emission"));
}
