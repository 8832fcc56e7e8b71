//! Domain layer: tree state and path resolution
//!
//! This layer is independent of external concerns (no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod convention;
pub mod error;
pub mod node;
pub mod resolver;
pub mod store;

pub use arena::TreeArena;
pub use builder::{forest_from_json, forest_to_json, ForestBuilder};
pub use convention::{BlockConvention, Convention, PipelineConvention};
pub use error::DomainError;
pub use node::{is_flag_key, FileNode, FlagOp, FlagValue, Forest, COLLAPSED, RESERVED_KEYS};
pub use resolver::{
    file_extension, relative_path, BlockIdentity, BlockRef, BlockType, DomainBlock, PathKind,
    PathResolver,
};
pub use store::{SnapshotObserver, TreeStore, VisibleRow};
