use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::core::{Capability, ConditionType, FieldRef, FilterNode, FilterPath, FilterTree, OperatorRef};
use crate::error::Result;

/// Edits a renderer can request on the filter tree.
///
/// Serialized as `{ "type": "addFilter", "payload": { .. } }` so edit scripts can be
/// written by hand.
#[derive(Debug, Clone, PartialEq, Display, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum FilterAction {
    /// Insert `filter` next to the node at `path`
    #[serde(rename_all = "camelCase")]
    AddFilter {
        path: FilterPath,
        filter: FilterNode,
        condition_type: ConditionType,
    },
    /// Remove the node at `path`
    RemoveFilter { path: FilterPath },
    /// Drag the node at `path_from` next to the node at `path_to`
    #[serde(rename_all = "camelCase")]
    MoveFilter {
        path_from: FilterPath,
        path_to: FilterPath,
        condition_type: ConditionType,
    },
    /// Change the field, operator or value of the leaf at `path`
    UpdateFilter {
        path: FilterPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<FieldRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<OperatorRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Value>,
    },
}

impl FilterAction {
    /// Row and button that must be enabled for this action to go through.
    ///
    /// Appending to the root and leaf updates are never gated.
    pub fn required_capability(&self) -> Option<(&FilterPath, Capability)> {
        match self {
            Self::AddFilter { path, condition_type, .. } if !path.is_root() => {
                Some((path, Capability::insert(*condition_type)))
            }
            Self::MoveFilter { path_to, condition_type, .. } => Some((path_to, Capability::insert(*condition_type))),
            Self::RemoveFilter { path } => Some((path, Capability::Remove)),
            _ => None,
        }
    }
}

/// Apply one action to `tree`, producing the next tree
pub fn reduce(tree: &FilterTree, action: &FilterAction) -> Result<FilterTree> {
    match action {
        FilterAction::AddFilter { path, filter, condition_type } => {
            tree.add_filter(path, filter.clone(), *condition_type)
        }
        FilterAction::RemoveFilter { path } => tree.remove_filter(path),
        FilterAction::MoveFilter { path_from, path_to, condition_type } => {
            tree.move_filter(path_from, path_to, *condition_type)
        }
        FilterAction::UpdateFilter { path, field, operator, params } => {
            tree.update_filter(path, field.clone(), operator.clone(), params.clone())
        }
    }
}
