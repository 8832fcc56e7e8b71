use std::collections::{BTreeMap, HashMap};

use generational_arena::{Arena, Index};
use tracing::{instrument, warn};

use crate::domain::node::{FileNode, FlagValue};

/// Node stored in the arena.
#[derive(Debug)]
pub struct ArenaNode {
    pub name: String,
    /// Index of parent node in the arena, None for root-level nodes
    pub parent: Option<Index>,
    /// `None` for files, `Some` for folders
    pub children: Option<Vec<Index>>,
    pub flags: BTreeMap<String, FlagValue>,
}

impl ArenaNode {
    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    fn child_indices(&self) -> &[Index] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Arena-backed forest with a path index.
///
/// The path index maps the full name path of every node to its arena slot,
/// so path-addressed reads and writes are a single hash lookup.
#[derive(Debug, Default)]
pub struct TreeArena {
    arena: Arena<ArenaNode>,
    roots: Vec<Index>,
    paths: HashMap<Vec<String>, Index>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a forest, copying every node into the arena.
    #[instrument(level = "debug", skip(forest), fields(roots = forest.len()))]
    pub fn from_forest(forest: &[FileNode]) -> Self {
        let mut tree = Self::new();
        let mut path = Vec::new();
        for node in forest {
            tree.load_recursive(node, None, &mut path, true);
        }
        tree
    }

    /// Subtrees under a shadowed duplicate are stored but never indexed.
    fn load_recursive(&mut self, node: &FileNode, parent: Option<Index>, path: &mut Vec<String>, indexed: bool) {
        let idx = self.insert_node(&node.name, node.is_folder(), node.flags.clone(), parent);
        path.push(node.name.clone());
        let indexed = if !indexed {
            false
        } else if self.paths.contains_key(path.as_slice()) {
            warn!(path = ?path, "duplicate sibling name, keeping first");
            false
        } else {
            self.paths.insert(path.clone(), idx);
            true
        };
        if let Some(children) = &node.children {
            for child in children {
                self.load_recursive(child, Some(idx), path, indexed);
            }
        }
        path.pop();
    }

    #[instrument(level = "trace", skip(self, flags))]
    pub fn insert_node(
        &mut self,
        name: &str,
        is_folder: bool,
        flags: BTreeMap<String, FlagValue>,
        parent: Option<Index>,
    ) -> Index {
        let node = ArenaNode {
            name: name.to_string(),
            parent,
            children: is_folder.then(Vec::new),
            flags,
        };
        let node_idx = self.arena.insert(node);

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_node) => parent_node.children.get_or_insert_with(Vec::new).push(node_idx),
            None => self.roots.push(node_idx),
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut ArenaNode> {
        self.arena.get_mut(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    /// Look up a node by its name path. The empty path addresses nothing.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<Index> {
        if path.is_empty() {
            return None;
        }
        let key: Vec<String> = path.iter().map(|s| s.as_ref().to_string()).collect();
        self.paths.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        self.get_node(node_idx)
            .map(|node| {
                1 + node
                    .child_indices()
                    .iter()
                    .map(|&child| self.calculate_depth(child))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    /// Materialize an owned copy of the subtree at `idx`.
    pub fn to_file_node(&self, idx: Index) -> Option<FileNode> {
        let node = self.get_node(idx)?;
        let children = node.children.as_ref().map(|children| {
            children
                .iter()
                .filter_map(|&child| self.to_file_node(child))
                .collect()
        });
        Some(FileNode {
            name: node.name.clone(),
            children,
            flags: node.flags.clone(),
        })
    }

    /// Materialize the whole forest.
    #[instrument(level = "trace", skip(self))]
    pub fn to_forest(&self) -> Vec<FileNode> {
        self.roots
            .iter()
            .filter_map(|&root| self.to_file_node(root))
            .collect()
    }

    /// Pre-order traversal yielding each node with its name path.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }
}

pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, usize)>,
    path: Vec<String>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        // Push roots in reverse order for left-to-right traversal
        let stack = arena.roots.iter().rev().map(|&idx| (idx, 0)).collect();
        Self {
            arena,
            stack,
            path: Vec::new(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    /// (index, node, path from root to node)
    type Item = (Index, &'a ArenaNode, Vec<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let (current_idx, depth) = self.stack.pop()?;
        let node = self.arena.get_node(current_idx)?;
        self.path.truncate(depth);
        self.path.push(node.name.clone());
        for &child in node.child_indices().iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((current_idx, node, self.path.clone()))
    }
}
