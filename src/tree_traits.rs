/*
Conversion of the store's forest into termtree trees for terminal display.
Collapsed folders are rendered without their children, like the tree view does.
 */
use generational_arena::Index;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{ArenaNode, TreeArena};
use crate::domain::{TreeStore, COLLAPSED};

pub trait TreeNodeConvert {
    /// Render with plain labels: folders end in `/`, collapsed folders in `/ …`.
    fn to_tree_string(&self) -> Vec<Tree<String>> {
        self.to_tree_string_with(|_, node| default_label(node))
    }

    /// Render with a custom label for each visible node.
    fn to_tree_string_with<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&[String], &ArenaNode) -> String;
}

impl TreeNodeConvert for TreeStore {
    #[instrument(level = "debug", skip_all)]
    fn to_tree_string_with<F>(&self, label: F) -> Vec<Tree<String>>
    where
        F: Fn(&[String], &ArenaNode) -> String,
    {
        fn build_tree<F>(arena: &TreeArena, idx: Index, path: &mut Vec<String>, label: &F) -> Option<Tree<String>>
        where
            F: Fn(&[String], &ArenaNode) -> String,
        {
            let node = arena.get_node(idx)?;
            path.push(node.name.clone());
            let mut tree = Tree::new(label(path, node));
            if !is_collapsed(node) {
                for &child in node.children.iter().flatten() {
                    if let Some(child_tree) = build_tree(arena, child, path, label) {
                        tree.push(child_tree);
                    }
                }
            }
            path.pop();
            Some(tree)
        }

        let arena = self.arena();
        let mut path = Vec::new();
        arena
            .roots()
            .iter()
            .filter_map(|&root| build_tree(arena, root, &mut path, &label))
            .collect()
    }
}

fn is_collapsed(node: &ArenaNode) -> bool {
    node.is_folder() && node.flags.get(COLLAPSED).is_some_and(|v| v.is_truthy())
}

pub fn default_label(node: &ArenaNode) -> String {
    match (node.is_folder(), is_collapsed(node)) {
        (true, true) => format!("{}/ …", node.name),
        (true, false) => format!("{}/", node.name),
        _ => node.name.clone(),
    }
}
