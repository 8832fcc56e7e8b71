//! Tree state store: path-addressed flag mutation over an owned forest.

use std::fmt;

use tracing::{debug, instrument, trace, warn};

use crate::domain::arena::TreeArena;
use crate::domain::node::{is_flag_key, FileNode, FlagOp, FlagValue, COLLAPSED};

/// Receives a fresh forest snapshot after every store mutation.
pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: &[FileNode]);
}

impl<F> SnapshotObserver for F
where
    F: FnMut(&[FileNode]),
{
    fn on_snapshot(&mut self, snapshot: &[FileNode]) {
        self(snapshot)
    }
}

/// One visible line of the tree, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub path: Vec<String>,
    /// 1 for root-level nodes
    pub depth: usize,
    pub is_folder: bool,
    pub collapsed: bool,
    pub highlighted: bool,
}

impl VisibleRow {
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// Owns the forest and the selected path.
///
/// Callers only ever receive owned snapshots, never references into the
/// internal tree, so a published snapshot is never partially updated.
#[derive(Default)]
pub struct TreeStore {
    tree: TreeArena,
    selected: Vec<String>,
    observers: Vec<Box<dyn SnapshotObserver>>,
}

impl fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeStore")
            .field("tree", &self.tree)
            .field("selected", &self.selected)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TreeStore {
    pub fn new(forest: &[FileNode]) -> Self {
        Self {
            tree: TreeArena::from_forest(forest),
            selected: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl SnapshotObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Apply `op` to `key` at the node addressed exactly by `path`.
    ///
    /// Unknown paths and reserved keys (`name`, `children`) leave the forest
    /// untouched. Observers are notified either way. Returns whether a node matched.
    #[instrument(level = "debug", skip(self, path), fields(path = ?join(path)))]
    pub fn set_flag<S: AsRef<str>>(&mut self, path: &[S], key: &str, op: FlagOp) -> bool {
        if !is_flag_key(key) {
            warn!(key, "reserved flag key, forest unchanged");
            self.publish();
            return false;
        }
        let matched = match self.tree.find(path).and_then(|idx| self.tree.get_node_mut(idx)) {
            Some(node) => {
                let value = op.apply(node.flags.get(key));
                trace!(%value, "flag updated");
                node.flags.insert(key.to_string(), value);
                true
            }
            None => {
                debug!("no node at path, forest unchanged");
                false
            }
        };
        self.publish();
        matched
    }

    /// Toggle the `collapsed` flag and select the folder.
    #[instrument(level = "debug", skip(self, path), fields(path = ?join(path)))]
    pub fn toggle_folder<S: AsRef<str>>(&mut self, path: &[S]) -> bool {
        let matched = self.set_flag(path, COLLAPSED, FlagOp::Toggle);
        self.select(path);
        matched
    }

    /// Record `path` as the highlighted path.
    pub fn select<S: AsRef<str>>(&mut self, path: &[S]) {
        self.selected = to_owned_path(path);
    }

    /// Replace the whole forest, dropping every previously set flag.
    #[instrument(level = "debug", skip(self, forest), fields(roots = forest.len()))]
    pub fn replace(&mut self, forest: &[FileNode]) {
        self.tree = TreeArena::from_forest(forest);
        self.publish();
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.tree.to_forest();
        for observer in &mut self.observers {
            observer.on_snapshot(&snapshot);
        }
    }

    pub fn snapshot(&self) -> Vec<FileNode> {
        self.tree.to_forest()
    }

    pub fn node<S: AsRef<str>>(&self, path: &[S]) -> Option<FileNode> {
        self.tree.find(path).and_then(|idx| self.tree.to_file_node(idx))
    }

    pub fn contains<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.tree.find(path).is_some()
    }

    pub fn flag<S: AsRef<str>>(&self, path: &[S], key: &str) -> Option<FlagValue> {
        self.tree
            .find(path)
            .and_then(|idx| self.tree.get_node(idx))
            .and_then(|node| node.flags.get(key).cloned())
    }

    pub fn is_flag_set<S: AsRef<str>>(&self, path: &[S], key: &str) -> bool {
        self.flag(path, key).is_some_and(|v| v.is_truthy())
    }

    pub fn is_collapsed<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.is_flag_set(path, COLLAPSED)
    }

    pub fn selected_path(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.selected.len() == path.len()
            && self.selected.iter().zip(path).all(|(a, b)| a == b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn arena(&self) -> &TreeArena {
        &self.tree
    }

    /// Rows in display order; descendants of collapsed folders are skipped.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        let mut hidden_below: Option<usize> = None;
        for (_, node, path) in self.tree.iter() {
            let depth = path.len();
            match hidden_below {
                Some(limit) if depth > limit => continue,
                _ => hidden_below = None,
            }
            let collapsed = node.is_folder() && node.flags.get(COLLAPSED).is_some_and(FlagValue::is_truthy);
            if collapsed {
                hidden_below = Some(depth);
            }
            rows.push(VisibleRow {
                highlighted: path == self.selected,
                path,
                depth,
                is_folder: node.is_folder(),
                collapsed,
            });
        }
        rows
    }
}

fn to_owned_path<S: AsRef<str>>(path: &[S]) -> Vec<String> {
    path.iter().map(|s| s.as_ref().to_string()).collect()
}

fn join<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(|s| s.as_ref()).collect::<Vec<&str>>().join("/")
}
