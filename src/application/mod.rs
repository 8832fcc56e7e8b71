//! Application layer: user action dispatch
//!
//! This layer drives the domain store and resolver and depends on the
//! `Workspace` boundary trait for side effects.

pub mod error;
pub mod error_ext;
pub mod file_tree;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use file_tree::{FileTree, TreeAction, TreeEffect, Workspace};
