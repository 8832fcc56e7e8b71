//! Path-addressed file tree state and block path resolution.
//!
//! - [`domain::TreeStore`] owns a forest of files and folders and mutates
//!   per-node flags by path.
//! - [`domain::PathResolver`] classifies paths against a [`domain::Convention`]
//!   and finds the pipeline block a file belongs to.
//! - [`application::FileTree`] turns clicks into store updates and
//!   [`application::Workspace`] side effects.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;
