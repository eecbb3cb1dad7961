use std::fs;
use std::path::PathBuf;

use filtree::{
    ConditionType, DataView, DataViewMetadata, EditorParams, FilterAction, FilterEditorSession, FilterPath,
    FilterTreeError, WireFilter,
};
use pretty_assertions::assert_eq;

fn read_sample<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("sample-data").join(name);
    let json = fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn open_sample(params: EditorParams) -> FilterEditorSession {
    let data_view: DataView = read_sample("data_view.json");
    let filters: Vec<WireFilter> = read_sample("filters.json");
    FilterEditorSession::open(&filters, data_view, DataViewMetadata, params)
}

fn path(raw: &str) -> FilterPath {
    raw.parse().unwrap()
}

#[test]
fn scripted_actions_reshape_the_tree() {
    let mut session = open_sample(EditorParams::default());
    let actions: Vec<FilterAction> = read_sample("actions.json");
    let applied: Vec<bool> = actions.into_iter().map(|a| session.dispatch(a)).collect();
    assert_eq!(applied, vec![true, true, true, true, false]);
    assert_eq!(
        session.tree().to_string(),
        "(host: web-1 OR host: web-2) AND (status: 500, 503 OR NOT client.ip: exists OR bytes: 1024 to +∞)"
    );
}

#[test]
fn rows_report_gated_buttons() {
    let session = open_sample(EditorParams::default());
    let rows = session.rows();
    let paths: Vec<String> = rows.iter().map(|r| r.path.to_string()).collect();
    assert_eq!(paths, vec!["0", "1.0", "1.1.0", "1.1.1", "2"]);

    // status sits in an OR group at the depth limit
    let status = &rows[1];
    assert_eq!(status.condition_type, ConditionType::Or);
    assert!(!status.capabilities.or_disabled);
    assert!(status.capabilities.and_disabled);

    // bytes sits in an AND group past the depth limit
    let bytes = &rows[2];
    assert_eq!(bytes.condition_type, ConditionType::And);
    assert!(bytes.capabilities.or_disabled);
    assert!(!bytes.capabilities.and_disabled);
}

#[test]
fn hide_or_blocks_every_or_insert() {
    let mut session = open_sample(EditorParams { max_depth: 2, hide_or: true });
    let before = session.tree().clone();
    let err = session
        .try_dispatch(&FilterAction::AddFilter {
            path: path("0"),
            filter: filtree::FilterNode::empty_leaf(),
            condition_type: ConditionType::Or,
        })
        .unwrap_err();
    assert!(matches!(err, FilterTreeError::InvalidMutation { .. }));
    assert_eq!(session.tree(), &before);
}

#[test]
fn save_and_load_through_a_file() {
    let mut session = open_sample(EditorParams::default());
    session.dispatch(FilterAction::RemoveFilter { path: path("2") });
    let saved = session.tree().clone();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("filters.json");
    session.save_to_file(&file).unwrap();

    let mut reopened = open_sample(EditorParams::default());
    assert_ne!(reopened.tree(), &saved);
    reopened.load_from_file(&file).unwrap();
    assert_eq!(reopened.tree(), &saved);
}

#[test]
fn commit_matches_saved_wire_filters() {
    let session = open_sample(EditorParams::default());
    let expected = session.tree().to_wire(session.data_view(), session.provider());
    let committed = session.commit();
    assert_eq!(committed, expected);
    assert_eq!(committed.len(), 3);
    assert!(committed[2].meta.disabled);
}

#[test]
fn empty_rows_commit_as_placeholders() {
    let mut session = open_sample(EditorParams::default());
    assert!(session.add_empty_filter(&path("2"), ConditionType::And));
    let committed = session.commit();
    assert_eq!(committed.len(), 4);
    let placeholder = &committed[3];
    assert_eq!(placeholder.meta.key, None);
    assert_eq!(placeholder.query, None);
    assert_eq!(placeholder.meta.index.as_deref(), Some("logs-*"));
}
