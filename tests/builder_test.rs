//! Tests for ForestBuilder and JSON forests

use std::path::PathBuf;
use tempfile::TempDir;

use rstest::rstest;

use blocktree::domain::{
    forest_from_json, forest_to_json, DomainError, FileNode, FlagOp, FlagValue, ForestBuilder, PathResolver,
    TreeStore,
};

fn create_file(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    std::fs::write(&path, "").expect("write file");
    path
}

fn child_names(node: &FileNode) -> Vec<&str> {
    node.children
        .iter()
        .flatten()
        .map(|c| c.name.as_str())
        .collect()
}

#[test]
fn given_repo_directory_when_building_then_root_is_directory_name() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_file(&temp, "data_loaders/load.py");

    // Act
    let forest = ForestBuilder::new().build_from_directory(temp.path()).unwrap();

    // Assert
    assert_eq!(forest.len(), 1);
    let expected = temp
        .path()
        .canonicalize()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert_eq!(forest[0].name, expected);
    assert!(forest[0].is_folder());
}

#[test]
fn given_mixed_entries_when_building_then_folders_come_first_sorted_by_name() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_file(&temp, "requirements.txt");
    create_file(&temp, "transformers/clean.py");
    create_file(&temp, "data_loaders/b.py");
    create_file(&temp, "data_loaders/a.py");
    std::fs::create_dir_all(temp.path().join("scratchpads")).unwrap();

    // Act
    let forest = ForestBuilder::new().build_from_directory(temp.path()).unwrap();

    // Assert
    let root = &forest[0];
    assert_eq!(
        child_names(root),
        vec!["data_loaders", "scratchpads", "transformers", "requirements.txt"]
    );
    let loaders = &root.children.as_ref().unwrap()[0];
    assert_eq!(child_names(loaders), vec!["a.py", "b.py"]);
    let scratchpads = &root.children.as_ref().unwrap()[1];
    assert_eq!(scratchpads.children, Some(Vec::new()), "empty dir is still a folder");
    assert!(!root.children.as_ref().unwrap()[3].is_folder());
}

#[test]
fn given_hidden_entries_when_building_then_skipped_unless_included() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_file(&temp, ".git/HEAD");
    create_file(&temp, ".env");
    create_file(&temp, "main.py");

    // Act
    let default = ForestBuilder::new().build_from_directory(temp.path()).unwrap();
    let with_hidden = ForestBuilder::new()
        .include_hidden(true)
        .build_from_directory(temp.path())
        .unwrap();

    // Assert
    assert_eq!(child_names(&default[0]), vec!["main.py"]);
    assert_eq!(child_names(&with_hidden[0]), vec![".git", ".env", "main.py"]);
}

#[test]
fn given_built_repo_when_resolving_then_block_paths_match() {
    // Arrange
    let temp = TempDir::new().unwrap();
    create_file(&temp, "data_loaders/load.py");
    create_file(&temp, "pipelines/etl/metadata.yaml");
    let forest = ForestBuilder::new().build_from_directory(temp.path()).unwrap();
    let store = TreeStore::new(&forest);
    let resolver = PathResolver::default();

    // Act
    let blocks: Vec<String> = store
        .arena()
        .iter()
        .filter_map(|(_, _, path)| resolver.block_uuid_of(&path))
        .collect();
    let pipelines: Vec<String> = store
        .arena()
        .iter()
        .filter_map(|(_, _, path)| resolver.pipeline_uuid_of(&path).map(str::to_string))
        .collect();

    // Assert
    assert_eq!(blocks, vec!["load"]);
    assert_eq!(pipelines, vec!["etl"]);
}

#[test]
fn given_nonexistent_directory_when_building_then_errors() {
    let result = ForestBuilder::new().build_from_directory(&PathBuf::from("/nonexistent/path"));

    assert!(matches!(result, Err(DomainError::FileNotFound(_))));
}

#[test]
fn given_file_instead_of_directory_when_building_then_errors() {
    let temp = TempDir::new().unwrap();
    let file = create_file(&temp, "a.txt");

    let result = ForestBuilder::new().build_from_directory(&file);

    assert!(matches!(result, Err(DomainError::NotADirectory(_))));
}

// ============================================================
// JSON
// ============================================================

#[test]
fn given_tree_json_when_parsing_then_reads_folders_files_and_flags() {
    let json = r#"[
        {"name": "repo", "collapsed": false, "children": [
            {"name": "data_loaders", "collapsed": true, "children": []},
            {"name": "requirements.txt"}
        ]}
    ]"#;

    let forest = forest_from_json(json).unwrap();

    let store = TreeStore::new(&forest);
    assert!(store.is_collapsed(&["repo", "data_loaders"]));
    assert!(!store.is_collapsed(&["repo"]));
    assert!(store.node(&["repo", "data_loaders"]).unwrap().is_folder());
    assert!(!store.node(&["repo", "requirements.txt"]).unwrap().is_folder());
    assert_eq!(forest_from_json(&forest_to_json(&forest).unwrap()).unwrap(), forest);
}

#[test]
fn given_invalid_json_when_parsing_then_errors() {
    let result = forest_from_json(r#"[{"children": []}]"#);

    assert!(matches!(result, Err(DomainError::InvalidTree(_))));
}

#[rstest]
#[case("name", FlagOp::SetValue(FlagValue::Text("x".into())))]
#[case("children", FlagOp::SetTrue)]
fn given_reserved_flag_key_when_setting_then_json_still_round_trips(#[case] key: &str, #[case] op: FlagOp) {
    // Arrange
    let forest = vec![FileNode::folder("repo", vec![FileNode::file("a.txt")])];
    let mut store = TreeStore::new(&forest);

    // Act
    let matched = store.set_flag(&["repo", "a.txt"], key, op);
    let json = forest_to_json(&store.snapshot()).unwrap();

    // Assert
    assert!(!matched);
    let parsed = forest_from_json(&json).unwrap();
    assert_eq!(parsed, forest);
    assert!(!store.node(&["repo", "a.txt"]).unwrap().is_folder());
}
