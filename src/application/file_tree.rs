//! File tree controller: routes clicks to the store, the resolver and the workspace.

use tracing::{debug, info, instrument, warn};

use crate::domain::{relative_path, DomainBlock, FileNode, PathKind, PathResolver, TreeStore};

/// Side effects owned by the host application.
pub trait Workspace {
    /// Blocks of the currently open pipeline.
    fn blocks(&self) -> &[DomainBlock];

    /// Create a block at `index`; returns the created block, or `None` if the
    /// host declined.
    fn add_block_at_index(&mut self, block: DomainBlock, index: usize, name: &str) -> Option<DomainBlock>;

    /// Open a plain file; `relative_path` excludes the repo root.
    fn open_file(&mut self, relative_path: &str);

    fn open_pipeline(&mut self, pipeline_uuid: &str);

    /// `None` clears the selection when the file has no block.
    fn select_block(&mut self, block: Option<&DomainBlock>);

    fn scroll_into_view(&mut self, relative_path: &str);
}

/// A discrete user interaction on a tree row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    Click { path: Vec<String>, is_folder: bool },
    DoubleClick { path: Vec<String>, is_folder: bool },
}

/// What an action ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEffect {
    FolderToggled { path: Vec<String>, collapsed: bool },
    FileSelected { path: Vec<String>, block: Option<DomainBlock> },
    BlockCreated { block: DomainBlock },
    FileOpened { relative_path: String },
    PipelineOpened { uuid: String },
    Ignored,
}

pub struct FileTree<W: Workspace> {
    store: TreeStore,
    resolver: PathResolver,
    workspace: W,
}

impl<W: Workspace> FileTree<W> {
    pub fn new(forest: &[FileNode], resolver: PathResolver, workspace: W) -> Self {
        Self {
            store: TreeStore::new(forest),
            resolver,
            workspace,
        }
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TreeStore {
        &mut self.store
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut W {
        &mut self.workspace
    }

    pub fn into_workspace(self) -> W {
        self.workspace
    }

    /// The source tree changed: drop all local flag state.
    pub fn replace_tree(&mut self, forest: &[FileNode]) {
        self.store.replace(forest);
    }

    pub fn dispatch(&mut self, action: TreeAction) -> TreeEffect {
        match action {
            TreeAction::Click { path, is_folder } => self.click(&path, is_folder),
            TreeAction::DoubleClick { path, is_folder } => self.double_click(&path, is_folder),
        }
    }

    pub fn click<S: AsRef<str>>(&mut self, path: &[S], is_folder: bool) -> TreeEffect {
        if is_folder {
            self.toggle_folder(path)
        } else {
            self.select_file(path)
        }
    }

    #[instrument(level = "debug", skip(self, path), fields(path = %relative_path(path)))]
    pub fn double_click<S: AsRef<str>>(&mut self, path: &[S], is_folder: bool) -> TreeEffect {
        if let Some(uuid) = self.resolver.pipeline_uuid_of(path) {
            info!(uuid, "opening pipeline");
            self.workspace.open_pipeline(uuid);
            return TreeEffect::PipelineOpened {
                uuid: uuid.to_string(),
            };
        }
        if is_folder {
            return TreeEffect::Ignored;
        }
        self.open_file(path)
    }

    pub fn toggle_folder<S: AsRef<str>>(&mut self, path: &[S]) -> TreeEffect {
        self.store.toggle_folder(path);
        TreeEffect::FolderToggled {
            path: owned(path),
            collapsed: self.store.is_collapsed(path),
        }
    }

    /// Scroll to the file, select its block (if any) and highlight it.
    #[instrument(level = "debug", skip(self, path), fields(path = %relative_path(path)))]
    pub fn select_file<S: AsRef<str>>(&mut self, path: &[S]) -> TreeEffect {
        self.workspace.scroll_into_view(&relative_path(path));
        let block = self
            .resolver
            .find_block_by_path(self.workspace.blocks(), path)
            .cloned();
        debug!(found = block.is_some(), "block lookup");
        self.workspace.select_block(block.as_ref());
        self.store.select(path);
        TreeEffect::FileSelected {
            path: owned(path),
            block,
        }
    }

    /// Block files create their block on first open and select it; other
    /// files open in the editor when their extension is editable.
    #[instrument(level = "debug", skip(self, path), fields(path = %relative_path(path)))]
    pub fn open_file<S: AsRef<str>>(&mut self, path: &[S]) -> TreeEffect {
        match self.resolver.classify(path) {
            PathKind::Block(block_ref) => {
                if self.resolver.find_block_by_path(self.workspace.blocks(), path).is_some() {
                    return self.select_file(path);
                }
                let index = self.workspace.blocks().len();
                let requested = block_ref.to_block();
                match self.workspace.add_block_at_index(requested, index, &block_ref.uuid) {
                    Some(block) => {
                        info!(block_type = %block.block_type, uuid = %block.uuid, index, "block created");
                        self.select_file(path);
                        TreeEffect::BlockCreated { block }
                    }
                    None => {
                        warn!(uuid = %block_ref.uuid, "workspace declined block creation");
                        TreeEffect::Ignored
                    }
                }
            }
            PathKind::Editable => {
                let relative_path = relative_path(path);
                self.workspace.open_file(&relative_path);
                TreeEffect::FileOpened { relative_path }
            }
            PathKind::Pipeline { .. } | PathKind::Other => TreeEffect::Ignored,
        }
    }
}

fn owned<S: AsRef<str>>(path: &[S]) -> Vec<String> {
    path.iter().map(|s| s.as_ref().to_string()).collect()
}
