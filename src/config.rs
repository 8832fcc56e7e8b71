//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/blocktree/blocktree.toml`
//! 3. Local config: `<repo_dir>/.blocktree.toml`
//! 4. Environment variables: `BLOCKTREE_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::domain::{BlockConvention, Convention, PipelineConvention};

/// Raw pipeline convention (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPipelineConvention {
    pub folder: Option<String>,
    pub file_name: Option<String>,
    pub depth: Option<usize>,
}

/// Raw settings for intermediate parsing.
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub include_hidden: Option<bool>,
    pub editable_extensions: Option<Vec<String>>,
    pub pipeline: RawPipelineConvention,
    pub block_types: Option<Vec<BlockConvention>>,
}

/// Unified configuration for blocktree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Show dot-files when scanning a directory
    pub include_hidden: bool,
    /// Extensions opened in the editor on double-click
    pub editable_extensions: Vec<String>,
    /// Pipeline definition file location
    pub pipeline: PipelineConvention,
    /// Recognized block folders
    pub block_types: Vec<BlockConvention>,
}

impl Default for Settings {
    fn default() -> Self {
        let convention = Convention::default();
        Self {
            include_hidden: false,
            editable_extensions: convention.editable_extensions,
            pipeline: convention.pipeline,
            block_types: convention.block_types,
        }
    }
}

/// Get the XDG config directory for blocktree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "blocktree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("blocktree.toml"))
}

/// Get the path to the local config file in a repo directory.
pub fn local_config_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join(".blocktree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// The path convention the resolver runs on.
    pub fn convention(&self) -> Convention {
        Convention {
            block_types: self.block_types.clone(),
            pipeline: self.pipeline.clone(),
            editable_extensions: self.editable_extensions.clone(),
        }
    }

    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    fn merge_pipeline(base: &PipelineConvention, overlay: &RawPipelineConvention) -> PipelineConvention {
        PipelineConvention {
            folder: overlay.folder.clone().unwrap_or_else(|| base.folder.clone()),
            file_name: overlay
                .file_name
                .clone()
                .unwrap_or_else(|| base.file_name.clone()),
            depth: overlay.depth.unwrap_or(base.depth),
        }
    }

    /// Merge a local overlay onto self (base).
    ///
    /// - Scalars: overlay wins if Some
    /// - `editable_extensions`: union with `!` negation
    /// - `block_types`: entries replace same-typed base entries, new types append
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            include_hidden: overlay.include_hidden.unwrap_or(self.include_hidden),
            editable_extensions: overlay
                .editable_extensions
                .as_ref()
                .map(|o| Self::merge_array(&self.editable_extensions, o))
                .unwrap_or_else(|| self.editable_extensions.clone()),
            pipeline: Self::merge_pipeline(&self.pipeline, &overlay.pipeline),
            block_types: overlay
                .block_types
                .as_ref()
                .map(|o| Convention::merge_block_types(&self.block_types, o))
                .unwrap_or_else(|| self.block_types.clone()),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            include_hidden: global.include_hidden.unwrap_or(self.include_hidden),
            editable_extensions: global
                .editable_extensions
                .clone()
                .unwrap_or_else(|| self.editable_extensions.clone()),
            pipeline: Self::merge_pipeline(&self.pipeline, &global.pipeline),
            block_types: global
                .block_types
                .clone()
                .unwrap_or_else(|| self.block_types.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `repo_dir` - Optional repo directory for local config
    #[instrument(level = "debug")]
    pub fn load(repo_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "applying global config");
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(repo) = repo_dir {
            current = current.with_local(repo)?;
        }

        Self::apply_env_overrides(current)
    }

    /// Merge `<repo_dir>/.blocktree.toml` onto self if it exists.
    pub fn with_local(self, repo_dir: &Path) -> Result<Self, ApplicationError> {
        let local_path = local_config_path(repo_dir);
        if !local_path.exists() {
            return Ok(self);
        }
        debug!(path = %local_path.display(), "merging local config");
        let raw = load_raw_settings(&local_path)?;
        Ok(self.merge_with(&raw))
    }

    /// Apply BLOCKTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("BLOCKTREE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("editable_extensions"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_bool("include_hidden") {
            settings.include_hidden = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("editable_extensions") {
            settings.editable_extensions = val;
        }
        if let Ok(val) = config.get_string("pipeline.folder") {
            settings.pipeline.folder = val;
        }
        if let Ok(val) = config.get_string("pipeline.file_name") {
            settings.pipeline.file_name = val;
        }
        if let Ok(val) = config.get_int("pipeline.depth") {
            settings.pipeline.depth = usize::try_from(val).map_err(|e| ApplicationError::Config {
                message: format!("pipeline.depth: {e}"),
            })?;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# blocktree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/blocktree/blocktree.toml  (defines your baseline)
#   Local:  <repo_dir>/.blocktree.toml          (repo-specific additions)
#   Env:    BLOCKTREE_* environment variables   (explicit overrides)
#
# Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local editable_extensions UNION with global; "!ext" removes an inherited item.
#   Local block_types replace entries with the same block_type and append new ones.

# Show dot-files when scanning a directory
# include_hidden = false

# Extensions opened in the editor on double-click
# editable_extensions = ["txt"]

# Pipeline definition file: <repo>/<folder>/<uuid>/<file_name>
# [pipeline]
# folder = "pipelines"
# file_name = "metadata.yaml"
# depth = 4

# Block folders
# [[block_types]]
# block_type = "data_loader"
# folder = "data_loaders"
# extensions = ["py"]
# min_depth = 3
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_array_negation() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["!a".to_string(), "c".to_string()];
        let result = Settings::merge_array(&base, &overlay);

        assert_eq!(result, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_merge_array_negation_nonexistent() {
        let base = vec!["a".to_string(), "b".to_string()];
        let overlay = vec!["!x".to_string()];
        let result = Settings::merge_array(&base, &overlay);

        assert_eq!(result, base);
    }

    #[test]
    fn test_apply_global_replaces_arrays() {
        let global = RawSettings {
            editable_extensions: Some(vec!["md".to_string()]),
            block_types: Some(vec![BlockConvention::new("chart", "charts")]),
            ..RawSettings::default()
        };

        let result = Settings::default().apply_global(&global);

        assert_eq!(result.editable_extensions, vec!["md".to_string()]);
        assert_eq!(result.block_types.len(), 1);
        assert_eq!(result.pipeline, PipelineConvention::default());
    }

    #[test]
    fn test_merge_with_unions_extensions_and_overrides_pipeline_fields() {
        let overlay = RawSettings {
            include_hidden: Some(true),
            editable_extensions: Some(vec!["md".to_string()]),
            pipeline: RawPipelineConvention {
                file_name: Some("pipeline.yaml".to_string()),
                ..RawPipelineConvention::default()
            },
            block_types: None,
        };

        let result = Settings::default().merge_with(&overlay);

        assert!(result.include_hidden);
        assert_eq!(result.editable_extensions, vec!["md".to_string(), "txt".to_string()]);
        assert_eq!(result.pipeline.file_name, "pipeline.yaml");
        assert_eq!(result.pipeline.folder, "pipelines");
        assert_eq!(result.block_types, Settings::default().block_types);
    }

    #[test]
    fn given_default_settings_when_serializing_then_round_trips_through_toml() {
        let settings = Settings::default();
        let toml = settings.to_toml().expect("serialize");
        let parsed: Settings = toml::from_str(&toml).expect("parse");
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsing_then_yields_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).expect("parse template");
        assert_eq!(parsed, Settings::default());
    }
}
