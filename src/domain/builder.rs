//! Forest builder: turns a directory or a JSON document into a forest.

use std::path::Path;

use tracing::{debug, instrument};
use walkdir::{DirEntry, WalkDir};

use crate::domain::error::DomainError;
use crate::domain::node::{FileNode, Forest};

/// Result type for forest loading.
pub type TreeResult<T> = Result<T, DomainError>;

/// Constructs forests from a directory on disk.
///
/// The directory itself becomes the single root node, so the first path
/// segment of every node is the repo name.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    include_hidden: bool,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include entries whose name starts with a dot.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    #[instrument(level = "debug", skip(self))]
    pub fn build_from_directory(&self, directory_path: &Path) -> TreeResult<Forest> {
        if !directory_path.exists() {
            return Err(DomainError::FileNotFound(directory_path.to_path_buf()));
        }
        if !directory_path.is_dir() {
            return Err(DomainError::NotADirectory(directory_path.to_path_buf()));
        }

        let root_name = directory_path
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| directory_path.to_string_lossy().into_owned());
        let mut root = FileNode::folder(root_name, Vec::new());

        let include_hidden = self.include_hidden;
        let walker = WalkDir::new(directory_path)
            .min_depth(1)
            .sort_by(|a, b| sort_key(a).cmp(&sort_key(b)))
            .into_iter()
            .filter_entry(move |e| include_hidden || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| DomainError::Walk {
                path: directory_path.to_path_buf(),
                message: e.to_string(),
            })?;
            let relative = entry
                .path()
                .strip_prefix(directory_path)
                .map_err(|e| DomainError::Walk {
                    path: entry.path().to_path_buf(),
                    message: e.to_string(),
                })?;
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            insert_path(&mut root, &segments, entry.file_type().is_dir());
        }

        debug!(root = %root.name, "forest built");
        Ok(vec![root])
    }
}

/// Parse a forest from its JSON form: an array of nodes.
pub fn forest_from_json(json: &str) -> TreeResult<Forest> {
    Ok(serde_json::from_str(json)?)
}

pub fn forest_to_json(forest: &[FileNode]) -> TreeResult<String> {
    Ok(serde_json::to_string_pretty(forest)?)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Folders first, then by name.
fn sort_key(entry: &DirEntry) -> (bool, String) {
    (
        !entry.file_type().is_dir(),
        entry.file_name().to_string_lossy().into_owned(),
    )
}

/// Entries arrive parent-first, so every prefix already exists.
fn insert_path(node: &mut FileNode, segments: &[String], is_dir: bool) {
    let Some((name, rest)) = segments.split_first() else {
        return;
    };
    let children = node.children.get_or_insert_with(Vec::new);
    let idx = match children.iter().position(|c| &c.name == name) {
        Some(idx) => idx,
        None => {
            let child = if rest.is_empty() && !is_dir {
                FileNode::file(name.clone())
            } else {
                FileNode::folder(name.clone(), Vec::new())
            };
            children.push(child);
            children.len() - 1
        }
    };
    insert_path(&mut children[idx], rest, is_dir);
}
