use std::fs;
use std::path::PathBuf;

use filtree::core::{ConditionType, FieldType, OperatorType};
use filtree::{DataView, DataViewMetadata, FilterTree, WireFilter};
use pretty_assertions::assert_eq;

fn sample_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sample-data").join(name)
}

fn read_sample<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let path = sample_path(name);
    let json = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn sample_tree() -> (DataView, FilterTree) {
    let data_view: DataView = read_sample("data_view.json");
    let filters: Vec<WireFilter> = read_sample("filters.json");
    let tree = FilterTree::from_wire(&filters, &data_view, &DataViewMetadata);
    (data_view, tree)
}

#[test]
fn deserialize_sample_filters() {
    let (data_view, tree) = sample_tree();
    assert_eq!(data_view.fields.len(), 6);
    assert_eq!(data_view.field("location").map(|f| f.field_type), Some(FieldType::Unknown));
    assert_eq!(tree.len(), 3);
    assert_eq!(
        tree.to_string(),
        "host: web-1 AND (status: 500, 503 OR (bytes: 1024 to +∞ AND NOT client.ip: exists)) AND Last week"
    );

    let nested = tree.resolve(&"1.1".parse().unwrap()).unwrap().as_group().unwrap();
    assert_eq!(nested.condition_type, ConditionType::And);

    let missing_ip = tree.resolve(&"1.1.1".parse().unwrap()).unwrap().as_leaf().unwrap();
    let operator = missing_ip.operator.as_ref().unwrap();
    assert_eq!(operator.op_type, OperatorType::Exists);
    assert_eq!(operator.message, "does not exist");

    let last_week = tree.resolve(&"2".parse().unwrap()).unwrap().as_leaf().unwrap();
    assert!(last_week.disabled);
    assert_eq!(last_week.alias.as_deref(), Some("Last week"));
}

#[test]
fn serialize_roundtrip_preserves_tree() {
    let (data_view, tree) = sample_tree();
    let wire = tree.to_wire(&data_view, &DataViewMetadata);
    let json = serde_json::to_string_pretty(&wire).expect("serialize wire filters");
    let decoded: Vec<WireFilter> = serde_json::from_str(&json).expect("deserialize wire filters");
    let rebuilt = FilterTree::from_wire(&decoded, &data_view, &DataViewMetadata);
    assert_eq!(rebuilt, tree);
}

#[test]
fn untouched_filters_commit_verbatim() {
    let (data_view, tree) = sample_tree();
    let filters: Vec<WireFilter> = read_sample("filters.json");
    assert_eq!(tree.to_wire(&data_view, &DataViewMetadata), filters);
}

#[test]
fn edited_leaves_carry_backend_queries() {
    let (data_view, tree) = sample_tree();
    let tree = tree
        .update_filter(&"1.0".parse().unwrap(), None, None, Some(serde_json::json!([500, 502])))
        .and_then(|t| {
            t.update_filter(&"2".parse().unwrap(), None, None, Some(serde_json::json!({ "from": "now-1d" })))
        })
        .expect("edit sample leaves");
    let wire = tree.to_wire(&data_view, &DataViewMetadata);
    assert_eq!(
        wire[0].query,
        Some(serde_json::json!({ "match_phrase": { "host": "web-1" } }))
    );
    let group = wire[1].group_params().expect("second filter is a group");
    assert_eq!(group.conditional_type, ConditionType::Or);
    assert_eq!(
        group.filters[0].query,
        Some(serde_json::json!({ "bool": {
            "should": [
                { "match_phrase": { "status": 500 } },
                { "match_phrase": { "status": 502 } }
            ],
            "minimum_should_match": 1
        } }))
    );
    assert_eq!(
        wire[2].query,
        Some(serde_json::json!({ "range": { "@timestamp": { "gte": "now-1d" } } }))
    );
    assert!(wire[2].meta.disabled);
    assert_eq!(wire[2].meta.alias.as_deref(), Some("Last week"));
}
