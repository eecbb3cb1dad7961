//! Human-readable labels for filter trees and a flat row listing for renderers
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::capabilities::{EditorParams, FilterCapabilities};
use super::models::{FilterNode, GroupFilter, LeafFilter, OperatorType};
use super::tree::FilterTree;
use super::types::{ConditionType, FilterPath};

fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(values) => values.iter().map(value_label).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

fn range_label(params: Option<&Value>) -> String {
    let bound = |key: &str, open: &str| {
        params
            .and_then(|p| p.get(key))
            .filter(|v| !v.is_null())
            .map(value_label)
            .unwrap_or_else(|| open.to_string())
    };
    format!("{} to {}", bound("from", "-∞"), bound("to", "+∞"))
}

impl fmt::Display for LeafFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = self.alias.as_deref().filter(|a| !a.is_empty()) {
            return f.write_str(alias);
        }
        let (Some(field), Some(operator)) = (&self.field, &self.operator) else {
            return f.write_str("<empty>");
        };
        let value = match operator.op_type {
            OperatorType::Exists => "exists".to_string(),
            OperatorType::Range => range_label(self.params.as_ref()),
            OperatorType::Phrase | OperatorType::Phrases => {
                self.params.as_ref().map(value_label).unwrap_or_else(|| "...".to_string())
            }
        };
        if self.negate {
            write!(f, "NOT {}: {}", field.name, value)
        } else {
            write!(f, "{}: {}", field.name, value)
        }
    }
}

fn write_children(
    f: &mut fmt::Formatter<'_>,
    children: &[FilterNode],
    condition_type: ConditionType,
    bracket: bool,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {condition_type} ")?;
        }
        write_node(f, child, bracket)?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &FilterNode, bracket: bool) -> fmt::Result {
    match node {
        FilterNode::Leaf(leaf) => write!(f, "{leaf}"),
        FilterNode::Group(group) if bracket => {
            f.write_str("(")?;
            write_children(f, &group.children, group.condition_type, true)?;
            f.write_str(")")
        }
        FilterNode::Group(group) => write_children(f, &group.children, group.condition_type, true),
    }
}

impl fmt::Display for GroupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_children(f, &self.children, self.condition_type, true)
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, false)
    }
}

/// Whole expression; a lone top-level group is shown without brackets
impl fmt::Display for FilterTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_children(f, self.filters(), FilterTree::ROOT_CONDITION, self.len() > 1)
    }
}

/// One editable leaf row, with what its buttons may do
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRow {
    pub path: FilterPath,
    pub depth: usize,
    pub label: String,
    /// Condition type of the group the row sits in
    pub condition_type: ConditionType,
    pub capabilities: FilterCapabilities,
}

impl FilterTree {
    /// Leaves in depth-first order, with paths computed from this tree
    pub fn rows(&self, params: &EditorParams) -> Vec<FilterRow> {
        let mut rows = Vec::new();
        collect_rows(self.filters(), FilterTree::ROOT_CONDITION, &FilterPath::root(), params, &mut rows);
        rows
    }
}

fn collect_rows(
    children: &[FilterNode],
    condition_type: ConditionType,
    parent: &FilterPath,
    params: &EditorParams,
    rows: &mut Vec<FilterRow>,
) {
    for (i, child) in children.iter().enumerate() {
        let path = parent.child(i);
        match child {
            FilterNode::Leaf(leaf) => rows.push(FilterRow {
                depth: path.depth(),
                label: leaf.to_string(),
                condition_type,
                capabilities: FilterCapabilities::compute(&path, condition_type, children.len(), params),
                path,
            }),
            FilterNode::Group(group) => collect_rows(&group.children, group.condition_type, &path, params, rows),
        }
    }
}
