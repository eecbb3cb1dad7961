//! Which editor actions are enabled for a given row.
//!
//! Nesting depth is bounded by disabling the actions that would exceed it, never by
//! failing the mutation itself.
use serde::{Deserialize, Serialize};
use strum::Display;

use super::types::{ConditionType, FilterPath};

pub const DEFAULT_MAX_DEPTH: usize = 2;

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Editor-wide settings that drive capability gating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorParams {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Hide OR entirely, leaving a flat AND editor
    #[serde(default)]
    pub hide_or: bool,
}

impl Default for EditorParams {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, hide_or: false }
    }
}

/// An action that can be switched off for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Capability {
    #[strum(serialize = "OR insertion")]
    InsertOr,
    #[strum(serialize = "AND insertion")]
    InsertAnd,
    #[strum(serialize = "removal")]
    Remove,
}

impl Capability {
    pub fn insert(condition_type: ConditionType) -> Self {
        match condition_type {
            ConditionType::And => Self::InsertAnd,
            ConditionType::Or => Self::InsertOr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCapabilities {
    pub or_disabled: bool,
    pub and_disabled: bool,
    pub remove_disabled: bool,
}

impl FilterCapabilities {
    /// Gate the row at `path`, which sits in a group combined by `enclosing`
    /// alongside `sibling_count - 1` other nodes.
    pub fn compute(
        path: &FilterPath,
        enclosing: ConditionType,
        sibling_count: usize,
        params: &EditorParams,
    ) -> Self {
        let depth = path.depth();
        let is_depth_reached = params.max_depth <= depth;
        Self {
            or_disabled: params.hide_or || (is_depth_reached && enclosing == ConditionType::And),
            and_disabled: is_depth_reached && enclosing == ConditionType::Or,
            remove_disabled: depth <= 1 && sibling_count == 1,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::InsertOr => !self.or_disabled,
            Capability::InsertAnd => !self.and_disabled,
            Capability::Remove => !self.remove_disabled,
        }
    }
}
