//! Query-filter wire format: what the editor is opened with and commits back.
//!
//! A leaf carries its predicate in `meta` (plus a backend `query`); a group carries
//! `meta.params = { conditionalType, filters }`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ConditionType, FieldRef};

pub mod convert;
pub mod provider;

pub use provider::{DataViewMetadata, FilterMetadataProvider};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WireFilter {
    #[serde(default)]
    pub meta: WireMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(rename = "$state", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FilterState>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMeta {
    /// Data view id the filter belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// Field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Operator type (`phrase`, `phrases`, `range`, `exists`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<WireParams>,
}

/// `meta.params`: either a nested group or the leaf's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireParams {
    Group(GroupParams),
    Value(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupParams {
    pub conditional_type: ConditionType,
    pub filters: Vec<WireFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterStore {
    AppState,
    GlobalState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub store: FilterStore,
}

impl WireFilter {
    /// Nested group carried by this filter, if it is one
    pub fn group_params(&self) -> Option<&GroupParams> {
        match &self.meta.params {
            Some(WireParams::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn group(conditional_type: ConditionType, filters: Vec<WireFilter>) -> Self {
        Self {
            meta: WireMeta {
                params: Some(WireParams::Group(GroupParams { conditional_type, filters })),
                ..WireMeta::default()
            },
            ..Self::default()
        }
    }
}

/// The context filters apply to: an id, a title and its fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataView {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldRef>,
}

impl DataView {
    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.fields.iter().find(|f| f.name == name)
    }
}
