//! Integration tests for Settings local config merging.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE
//! - Global → Local: editable_extensions UNION with negation, block_types by type
//! - Any → Env vars: REPLACE

use std::fs;

use tempfile::TempDir;

use blocktree::config::{local_config_path, Settings};
use blocktree::domain::PathResolver;

#[test]
fn given_no_local_config_when_merging_then_keeps_defaults() {
    let repo = TempDir::new().unwrap();

    let settings = Settings::default().with_local(repo.path()).expect("merge");

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_extensions_when_merging_then_unions_and_negates() {
    // Arrange
    let repo = TempDir::new().unwrap();
    fs::write(
        local_config_path(repo.path()),
        r#"editable_extensions = ["md", "!txt", "sql"]"#,
    )
    .unwrap();

    // Act
    let settings = Settings::default().with_local(repo.path()).expect("merge");

    // Assert
    assert_eq!(settings.editable_extensions, vec!["md".to_string(), "sql".to_string()]);
}

#[test]
fn given_local_block_types_when_merging_then_replaces_by_type_and_appends() {
    // Arrange
    let repo = TempDir::new().unwrap();
    let local = r#"
include_hidden = true

[pipeline]
file_name = "pipeline.yaml"

[[block_types]]
block_type = "data_loader"
folder = "data_loaders"
extensions = ["py", "sql"]

[[block_types]]
block_type = "chart"
folder = "charts"
"#;
    fs::write(local_config_path(repo.path()), local).unwrap();

    // Act
    let settings = Settings::default().with_local(repo.path()).expect("merge");
    let resolver = PathResolver::new(settings.convention());

    // Assert
    assert!(settings.include_hidden);
    assert_eq!(settings.block_types.len(), Settings::default().block_types.len() + 1);
    assert!(resolver.is_block_file_path(&["repo", "data_loaders", "q.sql"]));
    assert!(resolver.is_block_file_path(&["repo", "charts", "bar.py"]));
    assert!(resolver.is_block_file_path(&["repo", "transformers", "t.py"]));
    assert!(resolver.is_pipeline_file_path(&["repo", "pipelines", "etl", "pipeline.yaml"]));
    assert!(!resolver.is_pipeline_file_path(&["repo", "pipelines", "etl", "metadata.yaml"]));
}

#[test]
fn given_invalid_local_config_when_merging_then_errors() {
    let repo = TempDir::new().unwrap();
    fs::write(local_config_path(repo.path()), "editable_extensions = 3").unwrap();

    let result = Settings::default().with_local(repo.path());

    let err = result.expect_err("should fail");
    assert!(err.to_string().starts_with("config error: parse"));
}
