//! File tree nodes and per-node flags

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flag key used for folder expand/collapse state.
pub const COLLAPSED: &str = "collapsed";

/// Node fields that share the JSON object with flattened flags.
pub const RESERVED_KEYS: [&str; 2] = ["name", "children"];

/// Whether `key` can be stored as a flag without clobbering a node field.
pub fn is_flag_key(key: &str) -> bool {
    !RESERVED_KEYS.contains(&key)
}

/// Scalar value stored under a node flag.
///
/// Serialized untagged so a node reads like `{"name": "x", "collapsed": true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FlagValue {
    /// Truthiness used by toggling: false, 0, NaN and "" are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Int(i) => *i != 0,
            FlagValue::Float(f) => *f != 0.0 && !f.is_nan(),
            FlagValue::Text(s) => !s.is_empty(),
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        FlagValue::Int(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Text(value.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Text(value)
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Int(i) => write!(f, "{i}"),
            FlagValue::Float(v) => write!(f, "{v}"),
            FlagValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Path-addressed flag mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagOp {
    SetTrue,
    SetFalse,
    /// Negates the current truthiness; an absent flag counts as false.
    Toggle,
    SetValue(FlagValue),
}

impl FlagOp {
    /// Compute the new flag value from the current one.
    pub fn apply(&self, current: Option<&FlagValue>) -> FlagValue {
        match self {
            FlagOp::SetTrue => FlagValue::Bool(true),
            FlagOp::SetFalse => FlagValue::Bool(false),
            FlagOp::Toggle => FlagValue::Bool(!current.is_some_and(FlagValue::is_truthy)),
            FlagOp::SetValue(v) => v.clone(),
        }
    }
}

/// A file or folder in the forest.
///
/// `children: None` marks a file; `Some` marks a folder, even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
    #[serde(flatten)]
    pub flags: BTreeMap<String, FlagValue>,
}

impl FileNode {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
            flags: BTreeMap::new(),
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
            flags: BTreeMap::new(),
        }
    }

    /// Builder-style flag setter, mostly for constructing fixtures.
    /// Reserved keys are ignored.
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        let key = key.into();
        if is_flag_key(&key) {
            self.flags.insert(key, value.into());
        }
        self
    }

    pub fn is_folder(&self) -> bool {
        self.children.is_some()
    }

    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    pub fn is_collapsed(&self) -> bool {
        self.flag(COLLAPSED).is_some_and(FlagValue::is_truthy)
    }
}

/// Ordered root-level nodes.
pub type Forest = Vec<FileNode>;
