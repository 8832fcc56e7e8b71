//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Browse a pipeline repo as a file tree and resolve block files
#[derive(Parser, Debug)]
#[command(name = "blocktree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Repo directory for the local config layer (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub repo_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the repo as a tree with block and pipeline annotations
    Tree {
        /// Repo directory (default: repo dir or cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Read the tree from a JSON file instead of scanning a directory
        #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "dir")]
        json: Option<PathBuf>,
        /// Collapse a folder, given as slash path from the tree root (repeatable)
        #[arg(long)]
        collapse: Vec<String>,
    },

    /// Classify a slash-separated tree path
    Classify {
        /// Path including the repo root, e.g. repo/data_loaders/load.py
        path: String,
    },

    /// List block files in a repo
    Blocks {
        /// Repo directory (default: repo dir or cwd)
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Print config file locations
    Path,
    /// Print a commented config template
    Template,
}
