//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    forest_from_json, relative_path, FileNode, FlagOp, ForestBuilder, PathKind, PathResolver, TreeStore,
    COLLAPSED,
};
use crate::tree_traits::{default_label, TreeNodeConvert};
use crate::util::path::parse_tree_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let repo_dir = cli.repo_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    match &cli.command {
        Some(Commands::Tree { dir, json, collapse }) => {
            let dir = dir.clone().unwrap_or_else(|| repo_dir.clone());
            let settings = Settings::load(Some(&dir))?;
            cmd_tree(&settings, &dir, json.as_deref(), collapse)
        }
        Some(Commands::Classify { path }) => {
            let settings = Settings::load(Some(&repo_dir))?;
            cmd_classify(&settings, path)
        }
        Some(Commands::Blocks { dir }) => {
            let dir = dir.clone().unwrap_or_else(|| repo_dir.clone());
            let settings = Settings::load(Some(&dir))?;
            cmd_blocks(&settings, &dir)
        }
        Some(Commands::Config { command }) => cmd_config(command, &repo_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn load_forest(settings: &Settings, dir: &Path, json: Option<&Path>) -> CliResult<Vec<FileNode>> {
    match json {
        Some(file) => {
            let content = std::fs::read_to_string(file).with_path_context("read tree", file)?;
            Ok(forest_from_json(&content)?)
        }
        None => Ok(ForestBuilder::new()
            .include_hidden(settings.include_hidden)
            .build_from_directory(dir)?),
    }
}

#[instrument(skip(settings))]
fn cmd_tree(settings: &Settings, dir: &Path, json: Option<&Path>, collapse: &[String]) -> CliResult<()> {
    let forest = load_forest(settings, dir, json)?;
    let resolver = PathResolver::new(settings.convention());
    let mut store = TreeStore::new(&forest);

    for raw in collapse_folders(&mut store, collapse) {
        output::warning(&format!("no folder at {raw}"));
    }
    debug!(nodes = store.len(), "tree loaded");

    let trees = store.to_tree_string_with(|path, node| {
        let tag = output::kind_tag(&resolver.classify(path));
        if tag.is_empty() {
            default_label(node)
        } else {
            format!("{} {}", default_label(node), tag)
        }
    });
    for tree in trees {
        output::info(&tree);
    }
    Ok(())
}

/// Collapse each listed folder; repeats stay collapsed. Returns the inputs
/// that do not address a folder.
fn collapse_folders<'a>(store: &mut TreeStore, collapse: &'a [String]) -> Vec<&'a str> {
    let mut missing = Vec::new();
    for raw in collapse {
        let path = parse_tree_path(raw);
        if store.node(&path).is_some_and(|n| n.is_folder()) {
            store.set_flag(&path, COLLAPSED, FlagOp::SetTrue);
        } else {
            missing.push(raw.as_str());
        }
    }
    missing
}

fn cmd_classify(settings: &Settings, raw: &str) -> CliResult<()> {
    let path = parse_tree_path(raw);
    if path.is_empty() {
        return Err(CliError::InvalidArgs("empty path".to_string()));
    }
    let resolver = PathResolver::new(settings.convention());
    match resolver.classify(&path) {
        PathKind::Block(block_ref) => {
            output::action("block", &block_ref.block_type);
            output::detail(&format!("uuid: {}", block_ref.uuid));
        }
        PathKind::Pipeline { uuid } => output::action("pipeline", &uuid),
        PathKind::Editable => output::action("file", &relative_path(&path)),
        PathKind::Other => output::action("other", &relative_path(&path)),
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_blocks(settings: &Settings, dir: &Path) -> CliResult<()> {
    let forest = load_forest(settings, dir, None)?;
    let resolver = PathResolver::new(settings.convention());
    let store = TreeStore::new(&forest);

    for (_, _, path) in store.arena().iter() {
        if let Some(block_ref) = resolver.block_ref_of(&path) {
            output::info(&format!(
                "{}\t{}\t{}",
                block_ref.block_type,
                block_ref.uuid,
                relative_path(&path)
            ));
        }
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, repo_dir: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(repo_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(p) => output::detail(&format!("global: {}", p.display())),
                None => output::detail("global: <unavailable>"),
            }
            output::detail(&format!("local:  {}", local_config_path(repo_dir).display()));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_collapse_list_when_applying_then_only_folders_collapse_and_repeats_stay_collapsed() {
        let forest = vec![FileNode::folder(
            "repo",
            vec![
                FileNode::folder("data_loaders", vec![FileNode::file("load.py")]),
                FileNode::file("requirements.txt"),
            ],
        )];
        let mut store = TreeStore::new(&forest);
        let collapse = vec![
            "repo/data_loaders".to_string(),
            "repo/data_loaders".to_string(),
            "repo/requirements.txt".to_string(),
            "repo/missing".to_string(),
        ];

        let missing = collapse_folders(&mut store, &collapse);

        assert_eq!(missing, vec!["repo/requirements.txt", "repo/missing"]);
        assert!(store.is_collapsed(&["repo", "data_loaders"]));
        assert!(store.flag(&["repo", "requirements.txt"], COLLAPSED).is_none());
    }
}
