//! Path classification and block lookup.
//!
//! All operations are total: unrecognized or too-short paths resolve to
//! `None`/`false`, never to an error.

use std::fmt;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::convention::Convention;

/// `<uuid>.<ext>`: the uuid may itself contain dots, the extension may not.
static BLOCK_FILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<uuid>.+)\.(?P<ext>[^./]+)$").expect("valid block file regex"));

/// Block type name as configured in the convention table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockType(pub String);

impl BlockType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockType {
    fn from(value: &str) -> Self {
        BlockType(value.to_string())
    }
}

/// Anything identified by a block type and uuid.
pub trait BlockIdentity {
    fn block_type(&self) -> &str;
    fn uuid(&self) -> &str;
}

/// Minimal pipeline block as seen by the file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub uuid: String,
}

impl DomainBlock {
    pub fn new(block_type: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            block_type: BlockType(block_type.into()),
            uuid: uuid.into(),
        }
    }
}

impl BlockIdentity for DomainBlock {
    fn block_type(&self) -> &str {
        self.block_type.as_str()
    }

    fn uuid(&self) -> &str {
        &self.uuid
    }
}

/// Type and uuid derived from a block file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRef {
    pub block_type: BlockType,
    pub uuid: String,
}

impl BlockRef {
    pub fn matches<B: BlockIdentity + ?Sized>(&self, block: &B) -> bool {
        block.block_type() == self.block_type.as_str() && block.uuid() == self.uuid
    }

    pub fn to_block(&self) -> DomainBlock {
        DomainBlock {
            block_type: self.block_type.clone(),
            uuid: self.uuid.clone(),
        }
    }
}

/// What a path denotes under the convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKind {
    Block(BlockRef),
    Pipeline { uuid: String },
    /// Plain file opened in the editor
    Editable,
    Other,
}

/// Resolves tree paths against a [`Convention`].
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    convention: Convention,
}

impl PathResolver {
    pub fn new(convention: Convention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> &Convention {
        &self.convention
    }

    /// Type and uuid of a block file path, if the path is one.
    pub fn block_ref_of<S: AsRef<str>>(&self, path: &[S]) -> Option<BlockRef> {
        let [.., folder, file] = path else {
            return None;
        };
        let entry = self.convention.block_by_folder(folder.as_ref())?;
        if path.len() < entry.min_depth {
            return None;
        }
        let caps = BLOCK_FILE_NAME.captures(file.as_ref())?;
        if !entry.accepts_extension(&caps["ext"]) {
            return None;
        }
        Some(BlockRef {
            block_type: BlockType(entry.block_type.clone()),
            uuid: caps["uuid"].to_string(),
        })
    }

    pub fn is_block_file_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.block_ref_of(path).is_some()
    }

    pub fn block_type_of<S: AsRef<str>>(&self, path: &[S]) -> Option<BlockType> {
        self.block_ref_of(path).map(|r| r.block_type)
    }

    pub fn block_uuid_of<S: AsRef<str>>(&self, path: &[S]) -> Option<String> {
        self.block_ref_of(path).map(|r| r.uuid)
    }

    /// Linear scan for the block matching the path's type and uuid.
    pub fn find_block_by_path<'a, B, S>(&self, blocks: &'a [B], path: &[S]) -> Option<&'a B>
    where
        B: BlockIdentity,
        S: AsRef<str>,
    {
        let block_ref = self.block_ref_of(path)?;
        blocks.iter().find(|b| block_ref.matches(*b))
    }

    pub fn is_pipeline_file_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let pipeline = &self.convention.pipeline;
        path.len() == pipeline.depth
            && path.len() >= 3
            && path[1].as_ref() == pipeline.folder
            && path[path.len() - 1].as_ref() == pipeline.file_name
    }

    /// Uuid of the pipeline owning a pipeline definition path.
    pub fn pipeline_uuid_of<'a, S: AsRef<str>>(&self, path: &'a [S]) -> Option<&'a str> {
        if self.is_pipeline_file_path(path) {
            Some(path[2].as_ref())
        } else {
            None
        }
    }

    pub fn is_editable_file_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        path.last()
            .and_then(|name| file_extension(name.as_ref()))
            .is_some_and(|ext| self.convention.editable_extensions.iter().any(|e| e == ext))
    }

    /// Pipeline files take precedence over block files.
    pub fn classify<S: AsRef<str>>(&self, path: &[S]) -> PathKind {
        if let Some(uuid) = self.pipeline_uuid_of(path) {
            return PathKind::Pipeline {
                uuid: uuid.to_string(),
            };
        }
        if let Some(block_ref) = self.block_ref_of(path) {
            return PathKind::Block(block_ref);
        }
        if self.is_editable_file_path(path) {
            return PathKind::Editable;
        }
        PathKind::Other
    }
}

/// Path below the repo root, joined with `/`. Keys scroll targets and file opens.
pub fn relative_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().skip(1).map(|s| s.as_ref()).join("/")
}

/// Extension after the last dot, if any.
pub fn file_extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
