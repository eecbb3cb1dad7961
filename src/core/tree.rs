//! FilterTree: the boolean filter tree edited by path.
//!
//! Every mutation takes `&self` and returns a fresh tree; callers swap the result in
//! wholesale and recompute paths from it.
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::capabilities::{EditorParams, FilterCapabilities};
use super::models::{FieldRef, FilterNode, GroupFilter, OperatorRef};
use super::types::{ConditionType, FilterPath};
use crate::error::{FilterTreeError, Result};
use serde_json::Value;

/// Top-level filters, combined by an implicit AND
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterTree {
    filters: Vec<FilterNode>,
}

impl FilterTree {
    pub fn new(filters: Vec<FilterNode>) -> Self {
        Self { filters }
    }

    /// Condition type of the root group
    pub const ROOT_CONDITION: ConditionType = ConditionType::And;

    pub fn filters(&self) -> &[FilterNode] {
        &self.filters
    }

    pub fn into_filters(self) -> Vec<FilterNode> {
        self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Node at `path`. The root has no node of its own, so the empty path fails.
    pub fn resolve(&self, path: &FilterPath) -> Result<&FilterNode> {
        let (&index, parent) = path.split_last().ok_or_else(|| FilterTreeError::path_not_found(path))?;
        let (siblings, _) = container(&self.filters, parent, path)?;
        siblings.get(index).ok_or_else(|| FilterTreeError::path_not_found(path))
    }

    /// Condition type of the group enclosing `path`
    pub fn enclosing_condition(&self, path: &FilterPath) -> Result<ConditionType> {
        let (_, parent) = path.split_last().ok_or_else(|| FilterTreeError::path_not_found(path))?;
        container(&self.filters, parent, path).map(|(_, condition_type)| condition_type)
    }

    /// Which row actions are enabled for the node at `path`
    pub fn capabilities(&self, path: &FilterPath, params: &EditorParams) -> Result<FilterCapabilities> {
        let (&index, parent) = path.split_last().ok_or_else(|| FilterTreeError::path_not_found(path))?;
        let (siblings, enclosing) = container(&self.filters, parent, path)?;
        if index >= siblings.len() {
            return Err(FilterTreeError::path_not_found(path));
        }
        Ok(FilterCapabilities::compute(path, enclosing, siblings.len(), params))
    }

    /// Insert `node` right after the node at `path`.
    ///
    /// When `condition_type` differs from the enclosing group's, the anchor and the
    /// new node are wrapped in a new group of that type, which takes the anchor's
    /// place. The empty path appends to the root, which only combines with AND.
    pub fn add_filter(&self, path: &FilterPath, node: FilterNode, condition_type: ConditionType) -> Result<FilterTree> {
        let mut filters = self.filters.clone();
        let Some((&index, parent)) = path.split_last() else {
            if condition_type != Self::ROOT_CONDITION {
                return Err(FilterTreeError::invalid_mutation("the root group only combines with AND"));
            }
            filters.push(node);
            debug!("Appended filter to root");
            return Ok(Self { filters });
        };

        let (siblings, enclosing) = container_mut(&mut filters, parent, path)?;
        if index >= siblings.len() {
            return Err(FilterTreeError::path_not_found(path));
        }
        if enclosing == condition_type {
            siblings.insert(index + 1, node);
            debug!("Inserted filter after {path} ({condition_type})");
        } else {
            let anchor = siblings.remove(index);
            siblings.insert(index, FilterNode::group(condition_type, vec![anchor, node]));
            debug!("Wrapped {path} in a new {condition_type} group");
        }
        Ok(Self { filters })
    }

    /// Remove the node at `path`, collapsing its group if one child is left.
    pub fn remove_filter(&self, path: &FilterPath) -> Result<FilterTree> {
        let mut filters = self.filters.clone();
        remove_node(&mut filters, path)?;
        Ok(Self { filters })
    }

    /// Take the node at `from` and add it next to the node at `to`.
    pub fn move_filter(&self, from: &FilterPath, to: &FilterPath, condition_type: ConditionType) -> Result<FilterTree> {
        self.resolve(from)?;
        self.resolve(to)?;
        if from == to {
            return Ok(self.clone());
        }
        if to.is_within(from) {
            return Err(FilterTreeError::invalid_mutation(format!(
                "cannot move {from} into its own subtree at {to}"
            )));
        }
        // dropping onto the previous sibling with the group's own condition lands where it already is
        if from.is_sibling_of(to)
            && to.index().map(|i| i + 1) == from.index()
            && self.enclosing_condition(from)? == condition_type
        {
            return Ok(self.clone());
        }

        let mut filters = self.filters.clone();
        let (node, collapsed) = remove_node(&mut filters, from)?;
        let target = to.after_removal_of(from, collapsed);
        debug!("Moving {from} to {target} (requested {to})");
        Self { filters }.add_filter(&target, node, condition_type)
    }

    /// Apply a partial edit to the leaf at `path`. Groups are left untouched.
    pub fn update_filter(
        &self,
        path: &FilterPath,
        field: Option<FieldRef>,
        operator: Option<OperatorRef>,
        params: Option<Value>,
    ) -> Result<FilterTree> {
        let Some((&index, parent)) = path.split_last() else {
            debug!("Ignoring update on the root group");
            return Ok(self.clone());
        };
        let mut filters = self.filters.clone();
        let (siblings, _) = container_mut(&mut filters, parent, path)?;
        match siblings.get_mut(index) {
            None => Err(FilterTreeError::path_not_found(path)),
            Some(FilterNode::Group(_)) => {
                debug!("Ignoring update on group at {path}");
                Ok(self.clone())
            }
            Some(FilterNode::Leaf(leaf)) => {
                leaf.apply_update(field, operator, params);
                Ok(Self { filters })
            }
        }
    }

    /// Collapse groups with fewer than two children, bottom-up.
    ///
    /// Mutations keep this invariant on their own; this is for trees built from
    /// outside input.
    pub fn normalized(self) -> FilterTree {
        Self { filters: normalize_children(self.filters) }
    }
}

fn normalize_children(children: Vec<FilterNode>) -> Vec<FilterNode> {
    children
        .into_iter()
        .filter_map(|child| match child {
            FilterNode::Leaf(_) => Some(child),
            FilterNode::Group(group) => {
                let mut inner = normalize_children(group.children);
                match inner.len() {
                    0 => None,
                    1 => inner.pop(),
                    _ => Some(FilterNode::Group(GroupFilter::new(group.condition_type, inner))),
                }
            }
        })
        .collect()
}

/// Children list of the group at `parent`, with that group's condition type
fn container<'a>(
    root: &'a [FilterNode],
    parent: &[usize],
    path: &FilterPath,
) -> Result<(&'a [FilterNode], ConditionType)> {
    let mut children = root;
    let mut condition_type = FilterTree::ROOT_CONDITION;
    for &i in parent {
        match children.get(i) {
            Some(FilterNode::Group(group)) => {
                condition_type = group.condition_type;
                children = group.children.as_slice();
            }
            _ => return Err(FilterTreeError::path_not_found(path)),
        }
    }
    Ok((children, condition_type))
}

fn container_mut<'a>(
    root: &'a mut Vec<FilterNode>,
    parent: &[usize],
    path: &FilterPath,
) -> Result<(&'a mut Vec<FilterNode>, ConditionType)> {
    let mut children = root;
    let mut condition_type = FilterTree::ROOT_CONDITION;
    for &i in parent {
        match children.get_mut(i) {
            Some(FilterNode::Group(group)) => {
                condition_type = group.condition_type;
                children = &mut group.children;
            }
            _ => return Err(FilterTreeError::path_not_found(path)),
        }
    }
    Ok((children, condition_type))
}

// Remove node at path; returns it and whether its group collapsed
fn remove_node(filters: &mut Vec<FilterNode>, path: &FilterPath) -> Result<(FilterNode, bool)> {
    let (&index, parent) = path
        .split_last()
        .ok_or_else(|| FilterTreeError::invalid_mutation("the root group cannot be removed"))?;

    let (siblings, _) = container_mut(filters, parent, path)?;
    if index >= siblings.len() {
        return Err(FilterTreeError::path_not_found(path));
    }
    if parent.is_empty() && siblings.len() == 1 {
        return Err(FilterTreeError::invalid_mutation("the last top-level filter cannot be removed"));
    }
    let removed = siblings.remove(index);

    let collapsed = !parent.is_empty() && collapse_group(filters, parent);
    if collapsed {
        debug!("Removed {path}; its group collapsed");
    } else {
        debug!("Removed {path}");
    }
    Ok((removed, collapsed))
}

// Replace the group at `group_path` by its sole child (or drop it when empty)
fn collapse_group(filters: &mut Vec<FilterNode>, group_path: &[usize]) -> bool {
    let Some((&index, parent)) = group_path.split_last() else {
        return false;
    };
    let Ok((siblings, _)) = container_mut(filters, parent, &FilterPath::from(group_path)) else {
        return false;
    };
    let sole = match siblings.get_mut(index) {
        Some(FilterNode::Group(group)) if group.children.len() <= 1 => group.children.pop(),
        _ => return false,
    };
    match sole {
        Some(child) => siblings[index] = child,
        None => {
            siblings.remove(index);
        }
    }
    true
}
