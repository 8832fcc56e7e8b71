//! Declarative naming convention for block and pipeline files.

use serde::{Deserialize, Serialize};

/// One recognized block type and the folder its files live in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockConvention {
    /// Block type name, e.g. `data_loader`
    pub block_type: String,
    /// Folder holding files of this type, e.g. `data_loaders`
    pub folder: String,
    /// Accepted file extensions without the dot
    #[serde(default = "default_block_extensions")]
    pub extensions: Vec<String>,
    /// Minimum number of path segments (repo root + folder + file)
    #[serde(default = "default_min_depth")]
    pub min_depth: usize,
}

impl BlockConvention {
    pub fn new(block_type: &str, folder: &str) -> Self {
        Self {
            block_type: block_type.to_string(),
            folder: folder.to_string(),
            extensions: default_block_extensions(),
            min_depth: default_min_depth(),
        }
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }
}

fn default_block_extensions() -> Vec<String> {
    vec!["py".into()]
}

fn default_min_depth() -> usize {
    3
}

/// Location of the pipeline definition file: `<repo>/<folder>/<uuid>/<file_name>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConvention {
    pub folder: String,
    pub file_name: String,
    /// Exact number of path segments of a pipeline definition path
    pub depth: usize,
}

impl Default for PipelineConvention {
    fn default() -> Self {
        Self {
            folder: "pipelines".into(),
            file_name: "metadata.yaml".into(),
            depth: 4,
        }
    }
}

/// The full path convention consumed by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Convention {
    pub block_types: Vec<BlockConvention>,
    pub pipeline: PipelineConvention,
    /// Extensions of plain files opened in the editor on double-click
    pub editable_extensions: Vec<String>,
}

impl Default for Convention {
    fn default() -> Self {
        Self {
            block_types: vec![
                BlockConvention::new("data_loader", "data_loaders"),
                BlockConvention::new("transformer", "transformers"),
                BlockConvention::new("data_exporter", "data_exporters"),
                BlockConvention::new("scratchpad", "scratchpads"),
                BlockConvention::new("sensor", "sensors"),
            ],
            pipeline: PipelineConvention::default(),
            editable_extensions: vec!["txt".into()],
        }
    }
}

impl Convention {
    pub fn block_by_folder(&self, folder: &str) -> Option<&BlockConvention> {
        self.block_types.iter().find(|b| b.folder == folder)
    }

    /// Reserved top-level folder names (block folders and the pipeline folder).
    pub fn reserved_folders(&self) -> impl Iterator<Item = &str> {
        self.block_types
            .iter()
            .map(|b| b.folder.as_str())
            .chain(std::iter::once(self.pipeline.folder.as_str()))
    }

    /// Overlay block types: entries replace same-typed base entries, new types are appended.
    pub fn merge_block_types(base: &[BlockConvention], overlay: &[BlockConvention]) -> Vec<BlockConvention> {
        let mut result = base.to_vec();
        for entry in overlay {
            match result.iter_mut().find(|b| b.block_type == entry.block_type) {
                Some(existing) => *existing = entry.clone(),
                None => result.push(entry.clone()),
            }
        }
        result
    }
}
