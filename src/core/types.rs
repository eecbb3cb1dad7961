use derive_deref::Deref;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::FilterTreeError;

/// How the children of a group combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ConditionType {
    And,
    Or,
}

impl ConditionType {
    /// The other condition type
    pub fn flipped(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }
}

/// Positional address of a node: child indices from the root, printed as `0.2.1`.
///
/// The empty path names the root group. Paths are only valid for the tree they
/// were computed from; any mutation may shift them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deref)]
pub struct FilterPath(Vec<usize>);

impl FilterPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments; top-level nodes have depth 1
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the enclosing group, `None` for the root
    pub fn parent(&self) -> Option<FilterPath> {
        self.0.split_last().map(|(_, parent)| Self(parent.to_vec()))
    }

    /// Index within the enclosing group, `None` for the root
    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the `index`-th child of this node
    pub fn child(&self, index: usize) -> FilterPath {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// True when `self` is `other` or lies inside it
    pub fn is_within(&self, other: &FilterPath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// True when both paths share the same enclosing group
    pub fn is_sibling_of(&self, other: &FilterPath) -> bool {
        !self.is_root() && !other.is_root() && self.parent() == other.parent()
    }

    /// Where this path points after the node at `removed` was taken out.
    ///
    /// Later siblings of `removed` (or of an ancestor) shift left by one. When the
    /// removal collapsed the enclosing group, its surviving child now sits at the
    /// group's own path.
    pub fn after_removal_of(&self, removed: &FilterPath, collapsed: bool) -> FilterPath {
        let (Some(parent), Some(removed_index)) = (removed.parent(), removed.index()) else {
            return self.clone();
        };
        let level = parent.depth();
        if !self.is_within(&parent) || self.depth() <= level {
            return self.clone();
        }
        let mut segments = self.0.clone();
        if collapsed {
            segments.remove(level);
        } else if segments[level] > removed_index {
            segments[level] -= 1;
        }
        Self(segments)
    }
}

impl From<Vec<usize>> for FilterPath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl From<&[usize]> for FilterPath {
    fn from(segments: &[usize]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for FilterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.0.iter().map(usize::to_string).collect::<Vec<_>>().join(".");
        f.write_str(&joined)
    }
}

impl FromStr for FilterPath {
    type Err = FilterTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        trimmed
            .split('.')
            .map(|segment| segment.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| FilterTreeError::InvalidPath { raw: s.to_string() })
    }
}

impl Serialize for FilterPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FilterPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
