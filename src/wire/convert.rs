//! Conversion between wire filters and the in-memory tree
use tracing::{debug, warn};

use super::{DataView, FilterMetadataProvider, FilterStore, WireFilter, WireParams};
use crate::core::{FieldRef, FilterNode, FilterTree, LeafFilter, OPERATORS, OperatorRef, OperatorType};

impl FilterTree {
    /// Build a tree from wire filters.
    ///
    /// Fields are looked up among the provider's filterable fields; unknown names are
    /// kept with type `unknown`. Every leaf remembers the filter it came from. Degenerate
    /// groups are collapsed.
    pub fn from_wire<P>(filters: &[WireFilter], context: &DataView, provider: &P) -> FilterTree
    where
        P: FilterMetadataProvider + ?Sized,
    {
        let fields = provider.filterable_fields(context);
        let nodes = filters.iter().map(|f| node_from_wire(f, &fields, provider)).collect();
        FilterTree::new(nodes).normalized()
    }

    /// Regenerate wire filters.
    ///
    /// Leaves still holding the filter they were loaded from are written back as is;
    /// edited leaves are rebuilt through the provider and blank rows become placeholders.
    pub fn to_wire<P>(&self, context: &DataView, provider: &P) -> Vec<WireFilter>
    where
        P: FilterMetadataProvider + ?Sized,
    {
        self.filters().iter().map(|node| node_to_wire(node, context, provider)).collect()
    }
}

fn node_from_wire<P>(filter: &WireFilter, fields: &[FieldRef], provider: &P) -> FilterNode
where
    P: FilterMetadataProvider + ?Sized,
{
    if let Some(group) = filter.group_params() {
        let children = group.filters.iter().map(|f| node_from_wire(f, fields, provider)).collect();
        return FilterNode::group(group.conditional_type, children);
    }

    let meta = &filter.meta;
    let field = meta.key.as_ref().map(|name| {
        fields
            .iter()
            .find(|f| &f.name == name)
            .cloned()
            .unwrap_or_else(|| {
                debug!("Field {name} is not in the data view");
                FieldRef::unknown(name.clone())
            })
    });
    let operator = match (&field, meta.filter_type.as_deref()) {
        (Some(field), Some(raw_type)) => resolve_operator(provider, field, raw_type, meta.negate),
        _ => None,
    };
    let params = match &meta.params {
        Some(WireParams::Value(value)) => Some(value.clone()),
        _ => None,
    };

    FilterNode::Leaf(LeafFilter {
        field,
        operator,
        params,
        disabled: meta.disabled,
        negate: meta.negate,
        alias: meta.alias.clone(),
        store: filter.state.map(|state| state.store),
        source: Some(filter.clone()),
    })
}

// Operators the provider offers for the field, then the full catalogue for fields it does not know
fn resolve_operator<P>(provider: &P, field: &FieldRef, raw_type: &str, negate: bool) -> Option<OperatorRef>
where
    P: FilterMetadataProvider + ?Sized,
{
    let Ok(op_type) = raw_type.parse::<OperatorType>() else {
        warn!("Unsupported filter type {raw_type} on {}", field.name);
        return None;
    };
    let wanted = |op: &OperatorRef| op.op_type == op_type && op.negate == negate;
    provider.operator_options(field).into_iter().find(|op| wanted(op)).or_else(|| {
        debug!("Operator {raw_type} not offered for {}; using the catalogue", field.name);
        OPERATORS.iter().find(|&op| wanted(op)).cloned()
    })
}

fn node_to_wire<P>(node: &FilterNode, context: &DataView, provider: &P) -> WireFilter
where
    P: FilterMetadataProvider + ?Sized,
{
    let leaf = match node {
        FilterNode::Group(group) => {
            return WireFilter::group(
                group.condition_type,
                group.children.iter().map(|child| node_to_wire(child, context, provider)).collect(),
            );
        }
        FilterNode::Leaf(leaf) => leaf,
    };
    if let Some(source) = &leaf.source {
        return source.clone();
    }
    match (&leaf.field, &leaf.operator) {
        (Some(field), Some(operator)) => provider.build_filter(
            context,
            field,
            operator.op_type,
            leaf.negate,
            leaf.disabled,
            leaf.params.as_ref(),
            leaf.alias.as_deref(),
            leaf.store,
        ),
        _ => provider.build_empty_filter(leaf.store == Some(FilterStore::GlobalState), Some(&context.id)),
    }
}
