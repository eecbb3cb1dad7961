use serde_json::{Map, Value, json};

use super::{DataView, FilterState, FilterStore, WireFilter, WireMeta, WireParams};
use crate::core::{FieldRef, FieldType, OPERATORS, OperatorRef, OperatorType};

/// Field and operator metadata, plus construction of wire filters.
///
/// The editor never builds backend queries itself; it goes through this trait.
pub trait FilterMetadataProvider {
    /// Fields the user may filter on in `context`
    fn filterable_fields(&self, context: &DataView) -> Vec<FieldRef>;

    /// Operators offered for `field`, in menu order
    fn operator_options(&self, field: &FieldRef) -> Vec<OperatorRef>;

    #[allow(clippy::too_many_arguments)]
    fn build_filter(
        &self,
        context: &DataView,
        field: &FieldRef,
        operator_type: OperatorType,
        negate: bool,
        disabled: bool,
        value: Option<&Value>,
        alias: Option<&str>,
        store: Option<FilterStore>,
    ) -> WireFilter;

    fn build_empty_filter(&self, is_pinned: bool, context_id: Option<&str>) -> WireFilter;
}

/// Provider backed by the data view's own field list
#[derive(Debug, Clone, Copy, Default)]
pub struct DataViewMetadata;

fn supports(field_type: FieldType, operator_type: OperatorType) -> bool {
    match operator_type {
        OperatorType::Exists => true,
        OperatorType::Phrase | OperatorType::Phrases => field_type != FieldType::Unknown,
        OperatorType::Range => matches!(field_type, FieldType::Number | FieldType::Date | FieldType::Ip),
    }
}

fn match_phrase(field: &str, value: &Value) -> Value {
    json!({ "match_phrase": { field: value } })
}

fn build_query(field: &str, operator_type: OperatorType, value: Option<&Value>) -> Value {
    match operator_type {
        OperatorType::Exists => json!({ "exists": { "field": field } }),
        OperatorType::Phrase => match_phrase(field, value.unwrap_or(&Value::Null)),
        OperatorType::Phrases => {
            let should: Vec<Value> = match value {
                Some(Value::Array(values)) => values.iter().map(|v| match_phrase(field, v)).collect(),
                Some(single) => vec![match_phrase(field, single)],
                None => Vec::new(),
            };
            json!({ "bool": { "should": should, "minimum_should_match": 1 } })
        }
        OperatorType::Range => {
            let mut bounds = Map::new();
            for (key, op) in [("from", "gte"), ("to", "lt")] {
                if let Some(bound) = value.and_then(|v| v.get(key)).filter(|b| !b.is_null()) {
                    bounds.insert(op.to_string(), bound.clone());
                }
            }
            json!({ "range": { field: bounds } })
        }
    }
}

impl FilterMetadataProvider for DataViewMetadata {
    fn filterable_fields(&self, context: &DataView) -> Vec<FieldRef> {
        context
            .fields
            .iter()
            .filter(|f| f.field_type != FieldType::Unknown)
            .cloned()
            .collect()
    }

    fn operator_options(&self, field: &FieldRef) -> Vec<OperatorRef> {
        OPERATORS
            .iter()
            .filter(|op| supports(field.field_type, op.op_type))
            .cloned()
            .collect()
    }

    fn build_filter(
        &self,
        context: &DataView,
        field: &FieldRef,
        operator_type: OperatorType,
        negate: bool,
        disabled: bool,
        value: Option<&Value>,
        alias: Option<&str>,
        store: Option<FilterStore>,
    ) -> WireFilter {
        let params = value
            .filter(|_| operator_type.takes_params())
            .map(|v| WireParams::Value(v.clone()));
        WireFilter {
            meta: WireMeta {
                index: Some(context.id.clone()),
                key: Some(field.name.clone()),
                filter_type: Some(operator_type.to_string()),
                negate,
                disabled,
                alias: alias.map(str::to_string),
                params,
            },
            query: Some(build_query(&field.name, operator_type, value)),
            state: store.map(|store| FilterState { store }),
        }
    }

    fn build_empty_filter(&self, is_pinned: bool, context_id: Option<&str>) -> WireFilter {
        let store = if is_pinned { FilterStore::GlobalState } else { FilterStore::AppState };
        WireFilter {
            meta: WireMeta {
                index: context_id.map(str::to_string),
                ..WireMeta::default()
            },
            query: None,
            state: Some(FilterState { store }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_view() -> DataView {
        DataView {
            id: "logs-*".to_string(),
            title: "Logs".to_string(),
            fields: vec![
                FieldRef::new("host", FieldType::String),
                FieldRef::new("bytes", FieldType::Number),
                FieldRef::unknown("geo"),
            ],
        }
    }

    #[test]
    fn unknown_fields_are_not_filterable() {
        let names: Vec<String> = DataViewMetadata
            .filterable_fields(&data_view())
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["host", "bytes"]);
    }

    #[test]
    fn range_only_for_ordered_fields() {
        let provider = DataViewMetadata;
        let string_ops = provider.operator_options(&FieldRef::new("host", FieldType::String));
        assert!(string_ops.iter().all(|op| op.op_type != OperatorType::Range));
        let number_ops = provider.operator_options(&FieldRef::new("bytes", FieldType::Number));
        assert_eq!(number_ops.len(), OPERATORS.len());
        let unknown_ops = provider.operator_options(&FieldRef::unknown("geo"));
        assert!(unknown_ops.iter().all(|op| op.op_type == OperatorType::Exists));
    }

    #[test]
    fn builds_backend_queries() {
        let dv = data_view();
        let bytes = dv.field("bytes").unwrap();
        let range = DataViewMetadata.build_filter(
            &dv,
            bytes,
            OperatorType::Range,
            false,
            false,
            Some(&json!({ "from": 10, "to": null })),
            None,
            None,
        );
        assert_eq!(range.query, Some(json!({ "range": { "bytes": { "gte": 10 } } })));
        assert_eq!(range.meta.index.as_deref(), Some("logs-*"));
        assert_eq!(range.meta.filter_type.as_deref(), Some("range"));

        let host = dv.field("host").unwrap();
        let phrases = DataViewMetadata.build_filter(
            &dv,
            host,
            OperatorType::Phrases,
            true,
            false,
            Some(&json!(["a", "b"])),
            Some("hosts"),
            Some(FilterStore::GlobalState),
        );
        assert_eq!(
            phrases.query,
            Some(json!({ "bool": {
                "should": [{ "match_phrase": { "host": "a" } }, { "match_phrase": { "host": "b" } }],
                "minimum_should_match": 1
            } }))
        );
        assert!(phrases.meta.negate);
        assert_eq!(phrases.meta.alias.as_deref(), Some("hosts"));
        assert_eq!(phrases.state, Some(FilterState { store: FilterStore::GlobalState }));
        assert_eq!(range.state, None);

        let exists =
            DataViewMetadata.build_filter(&dv, host, OperatorType::Exists, false, true, Some(&json!("x")), None, None);
        assert_eq!(exists.meta.params, None);
        assert!(exists.meta.disabled);
    }

    #[test]
    fn empty_filter_records_store() {
        let pinned = DataViewMetadata.build_empty_filter(true, Some("logs-*"));
        assert_eq!(pinned.state, Some(FilterState { store: FilterStore::GlobalState }));
        assert_eq!(pinned.meta.key, None);
        let unpinned = DataViewMetadata.build_empty_filter(false, None);
        assert_eq!(unpinned.state, Some(FilterState { store: FilterStore::AppState }));
    }
}
