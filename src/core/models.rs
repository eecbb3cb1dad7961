use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::types::ConditionType;
use crate::wire::{FilterStore, WireFilter};

/// Value type of a field, as reported by the data view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Ip,
    Boolean,
    #[serde(other)]
    Unknown,
}

/// A field a filter can target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub name: String,
    #[serde(rename = "type", default = "unknown_field_type")]
    pub field_type: FieldType,
}

fn unknown_field_type() -> FieldType {
    FieldType::Unknown
}

impl FieldRef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type }
    }

    /// A field referenced by a filter but missing from the data view
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Unknown)
    }
}

/// Shape of the value an operator takes.
///
/// Changing a leaf's operator to one with a different type discards its params.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OperatorType {
    /// Single value: `is`
    Phrase,
    /// List of values: `is one of`
    Phrases,
    /// `{ "from": .., "to": .. }`: `is between`
    Range,
    /// No value
    Exists,
}

impl OperatorType {
    pub fn takes_params(self) -> bool {
        !matches!(self, Self::Exists)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorRef {
    pub message: String,
    #[serde(rename = "type")]
    pub op_type: OperatorType,
    #[serde(default)]
    pub negate: bool,
}

impl OperatorRef {
    pub fn new(message: impl Into<String>, op_type: OperatorType, negate: bool) -> Self {
        Self { message: message.into(), op_type, negate }
    }
}

lazy_static! {
    /// Operator catalogue offered by the editor, in menu order
    pub static ref OPERATORS: Vec<OperatorRef> = vec![
        OperatorRef::new("is", OperatorType::Phrase, false),
        OperatorRef::new("is not", OperatorType::Phrase, true),
        OperatorRef::new("is one of", OperatorType::Phrases, false),
        OperatorRef::new("is not one of", OperatorType::Phrases, true),
        OperatorRef::new("is between", OperatorType::Range, false),
        OperatorRef::new("is not between", OperatorType::Range, true),
        OperatorRef::new("exists", OperatorType::Exists, false),
        OperatorRef::new("does not exist", OperatorType::Exists, true),
    ];
}

/// Find a catalogue operator by its menu label
pub fn operator_by_message(message: &str) -> Option<&'static OperatorRef> {
    OPERATORS.iter().find(|op| op.message == message)
}

/// One atomic predicate: field, operator, value. Any of the three may be unset
/// while the user is still filling the row in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<OperatorRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub disabled: bool,
    pub negate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Pinned (`globalState`) or app-local (`appState`) store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<FilterStore>,
    /// Wire filter this leaf was loaded from; committed verbatim until the leaf is edited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<WireFilter>,
}

impl LeafFilter {
    pub fn new(field: FieldRef, operator: OperatorRef, params: Option<Value>) -> Self {
        Self {
            field: Some(field),
            negate: operator.negate,
            operator: Some(operator),
            params,
            ..Self::default()
        }
    }

    /// Field and operator are both chosen
    pub fn is_complete(&self) -> bool {
        self.field.is_some() && self.operator.is_some()
    }

    /// Apply a partial edit in place.
    ///
    /// A new operator of a different type clears params before any supplied
    /// params are applied, so the value never keeps a stale shape. Any edit
    /// detaches the leaf from the wire filter it was loaded from.
    pub fn apply_update(
        &mut self,
        field: Option<FieldRef>,
        operator: Option<OperatorRef>,
        params: Option<Value>,
    ) {
        if field.is_some() || operator.is_some() || params.is_some() {
            self.source = None;
        }
        if let Some(field) = field {
            self.field = Some(field);
        }
        if let Some(operator) = operator {
            let previous_type = self.operator.as_ref().map(|op| op.op_type);
            if previous_type != Some(operator.op_type) {
                self.params = None;
            }
            self.negate = operator.negate;
            self.operator = Some(operator);
        }
        if let Some(params) = params {
            self.params = Some(params);
        }
    }
}

/// Boolean combination of child nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFilter {
    pub condition_type: ConditionType,
    pub children: Vec<FilterNode>,
}

impl GroupFilter {
    pub fn new(condition_type: ConditionType, children: Vec<FilterNode>) -> Self {
        Self { condition_type, children }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterNode {
    Leaf(LeafFilter),
    Group(GroupFilter),
}

impl FilterNode {
    /// A fresh row with nothing selected
    pub fn empty_leaf() -> Self {
        Self::Leaf(LeafFilter::default())
    }

    pub fn leaf(field: FieldRef, operator: OperatorRef, params: Option<Value>) -> Self {
        Self::Leaf(LeafFilter::new(field, operator, params))
    }

    pub fn group(condition_type: ConditionType, children: Vec<FilterNode>) -> Self {
        Self::Group(GroupFilter::new(condition_type, children))
    }

    pub fn as_leaf(&self) -> Option<&LeafFilter> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupFilter> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }

    /// Number of leaves below (and including) this node
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Group(group) => group.children.iter().map(FilterNode::leaf_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(message: &str) -> OperatorRef {
        operator_by_message(message).unwrap().clone()
    }

    fn status_leaf() -> LeafFilter {
        LeafFilter::new(FieldRef::new("status", FieldType::String), op("is"), Some(json!("ok")))
    }

    #[test]
    fn operator_type_change_clears_params() {
        let mut leaf = status_leaf();
        leaf.apply_update(None, Some(op("is between")), None);
        assert_eq!(leaf.params, None);
        assert_eq!(leaf.operator, Some(op("is between")));
    }

    #[test]
    fn same_operator_type_keeps_params_and_tracks_negate() {
        let mut leaf = status_leaf();
        leaf.apply_update(None, Some(op("is not")), None);
        assert_eq!(leaf.params, Some(json!("ok")));
        assert!(leaf.negate);
    }

    #[test]
    fn supplied_params_survive_a_type_change() {
        let mut leaf = status_leaf();
        leaf.apply_update(None, Some(op("is one of")), Some(json!(["a", "b"])));
        assert_eq!(leaf.params, Some(json!(["a", "b"])));
    }

    #[test]
    fn field_only_update_keeps_operator() {
        let mut leaf = status_leaf();
        leaf.apply_update(Some(FieldRef::new("host", FieldType::String)), None, None);
        assert_eq!(leaf.field.as_ref().map(|f| f.name.as_str()), Some("host"));
        assert_eq!(leaf.operator, Some(op("is")));
        assert_eq!(leaf.params, Some(json!("ok")));
    }

    #[test]
    fn edits_detach_loaded_source_but_keep_store() {
        let mut leaf = status_leaf();
        leaf.store = Some(FilterStore::GlobalState);
        leaf.source = Some(WireFilter::default());
        leaf.apply_update(None, None, None);
        assert!(leaf.source.is_some());
        leaf.apply_update(None, None, Some(json!("degraded")));
        assert_eq!(leaf.source, None);
        assert_eq!(leaf.store, Some(FilterStore::GlobalState));
    }

    #[test]
    fn unknown_field_type_deserializes() {
        let field: FieldRef = serde_json::from_value(json!({ "name": "geo", "type": "geo_point" })).unwrap();
        assert_eq!(field.field_type, FieldType::Unknown);
    }

    #[test]
    fn leaf_count_walks_groups() {
        let node = FilterNode::group(
            ConditionType::Or,
            vec![FilterNode::Leaf(status_leaf()), FilterNode::empty_leaf()],
        );
        assert_eq!(node.leaf_count(), 2);
        assert!(node.as_leaf().is_none());
    }
}
