//! Translation between the multigraph and property graph representations
//!
//! Both directions are pure functions: they borrow the input graph and return
//! a freshly built output graph.
//!
//! Multigraph → property graph:
//! - node IDs are assigned in ascending key order and returned as a [`NodeIdMap`]
//! - each node's edges keep the multigraph's insertion order, multi-edges included
//! - the value attribute becomes the edge property at schema position 0,
//!   other edge attributes follow in name order
//!
//! Property graph → multigraph:
//! - node keys are the integer node IDs, or the original keys from a [`NodeIdMap`]
//! - nodes with no incident edge are dropped or kept per [`IsolatedNodes`]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::multigraph::{AttributedMultigraph, Attributes, NodeKey};
use crate::property::{PropertyColumn, PropertyType};
use crate::property_graph::{Axis, GraphError, NodeId, PropertyGraph, PropertyGraphBuilder};

/// Default name of the weight attribute on multigraph edges
pub const DEFAULT_VALUE_ATTRIBUTE: &str = "value";

/// Default name of the translated weight property on property graph edges
pub const DEFAULT_EDGE_PROPERTY: &str = "value_from_translator";

/// Errors raised while translating between representations
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{axis} attribute '{name}' is missing on {missing} of {total} {axis}s")]
    InconsistentAttribute {
        axis: Axis,
        name: String,
        missing: usize,
        total: usize,
    },

    #[error("{axis} attribute '{name}' mixes {first} and {other} values")]
    MixedTypes {
        axis: Axis,
        name: String,
        first: PropertyType,
        other: PropertyType,
    },

    #[error("edge property '{0}' collides with an existing edge attribute")]
    NameCollision(String),

    #[error("graph has {0} nodes, more than a property graph can address")]
    TooManyNodes(usize),

    #[error("node ID map covers {map} nodes but the graph has {graph}")]
    IdMapMismatch { map: usize, graph: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// How the reverse translation treats nodes without incident edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolatedNodes {
    /// Build nodes from the edge enumeration only
    #[default]
    Drop,
    /// Add every node, connected or not
    Keep,
}

/// Options shared by both translation directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Weight attribute name on multigraph edges
    pub value_attribute: String,
    /// Name the weight attribute takes on property graph edges
    pub edge_property: String,
    /// Isolated-node policy of the reverse direction
    pub isolated_nodes: IsolatedNodes,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            value_attribute: DEFAULT_VALUE_ATTRIBUTE.to_string(),
            edge_property: DEFAULT_EDGE_PROPERTY.to_string(),
            isolated_nodes: IsolatedNodes::default(),
        }
    }
}

impl TranslateOptions {
    pub fn with_isolated_nodes(mut self, policy: IsolatedNodes) -> Self {
        self.isolated_nodes = policy;
        self
    }
}

// ============================================================================
// Node ID Map
// ============================================================================

/// Bijection between multigraph node keys and dense property graph node IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeIdMap {
    keys: Vec<NodeKey>,
    ids: HashMap<NodeKey, NodeId>,
}

impl NodeIdMap {
    /// Assign IDs `0..n` to `keys` in the given order. Duplicate keys keep their first ID.
    pub fn from_keys(keys: impl IntoIterator<Item = NodeKey>) -> Self {
        let mut map = Self::default();
        for key in keys {
            if map.ids.contains_key(&key) {
                continue;
            }
            map.ids.insert(key.clone(), map.keys.len() as NodeId);
            map.keys.push(key);
        }
        map
    }

    /// Dense ID of a key
    pub fn id(&self, key: &NodeKey) -> Option<NodeId> {
        self.ids.get(key).copied()
    }

    /// Key of a dense ID
    pub fn key(&self, id: NodeId) -> Option<&NodeKey> {
        self.keys.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in ID order
    pub fn keys(&self) -> &[NodeKey] {
        &self.keys
    }
}

/// Result of translating a multigraph into a property graph
#[derive(Debug, Clone)]
pub struct Translation {
    pub graph: PropertyGraph,
    pub node_ids: NodeIdMap,
}

// ============================================================================
// Multigraph → Property Graph
// ============================================================================

/// Collect the attribute names and types shared by every item.
///
/// Fails if an attribute is missing on some items or mixes value types.
fn uniform_attributes<'a>(
    axis: Axis,
    items: impl Iterator<Item = &'a Attributes>,
) -> Result<BTreeMap<String, PropertyType>, TranslateError> {
    let mut types: BTreeMap<String, PropertyType> = BTreeMap::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;

    for attrs in items {
        total += 1;
        for (name, value) in attrs {
            let ty = value.data_type();
            match types.get(name) {
                Some(&first) if first != ty => {
                    return Err(TranslateError::MixedTypes {
                        axis,
                        name: name.clone(),
                        first,
                        other: ty,
                    });
                }
                Some(_) => {}
                None => {
                    types.insert(name.clone(), ty);
                }
            }
            *counts.entry(name.clone()).or_insert(0) += 1;
        }
    }

    if let Some((name, &count)) = counts.iter().find(|(_, &count)| count != total) {
        return Err(TranslateError::InconsistentAttribute {
            axis,
            name: name.clone(),
            missing: total - count,
            total,
        });
    }

    Ok(types)
}

/// Translate a multigraph into a property graph.
pub fn to_property_graph(
    source: &AttributedMultigraph,
    options: &TranslateOptions,
) -> Result<Translation, TranslateError> {
    let num_nodes = source.node_count();
    if num_nodes > NodeId::MAX as usize {
        return Err(TranslateError::TooManyNodes(num_nodes));
    }

    let mut keys: Vec<NodeKey> = source.node_keys().cloned().collect();
    keys.sort();
    let node_ids = NodeIdMap::from_keys(keys);

    let edges = source.edges();

    // Edge schema: value attribute first (renamed), the rest in name order
    let edge_types = uniform_attributes(Axis::Edge, edges.iter().map(|(_, _, attrs)| *attrs))?;
    let mut edge_layout: Vec<(String, String, PropertyType)> = Vec::new();
    if let Some(&ty) = edge_types.get(&options.value_attribute) {
        edge_layout.push((
            options.value_attribute.clone(),
            options.edge_property.clone(),
            ty,
        ));
    }
    for (name, &ty) in &edge_types {
        if *name == options.value_attribute {
            continue;
        }
        // The reverse direction renames this property back to the value attribute
        if *name == options.edge_property {
            return Err(TranslateError::NameCollision(name.clone()));
        }
        edge_layout.push((name.clone(), name.clone(), ty));
    }

    let mut builder = PropertyGraphBuilder::new(num_nodes);
    for (_, property, ty) in &edge_layout {
        builder = builder.edge_property(property.clone(), *ty)?;
    }
    builder.reserve_edges(edges.len());

    // Node properties, one column per attribute, rows in ID order
    let node_types = uniform_attributes(
        Axis::Node,
        source.nodes().map(|entry| &entry.attributes),
    )?;
    for (name, &ty) in &node_types {
        let values = node_ids.keys().iter().filter_map(|key| {
            source
                .node_attributes(key)
                .and_then(|attrs| attrs.get(name))
                .cloned()
        });
        let column = PropertyColumn::from_values(ty, values).map_err(|value| {
            TranslateError::MixedTypes {
                axis: Axis::Node,
                name: name.clone(),
                first: ty,
                other: value.data_type(),
            }
        })?;
        builder = builder.node_property(name.clone(), column)?;
    }

    for key in node_ids.keys() {
        // Keys come from the source graph, so the lookup always succeeds
        let Some(source_id) = node_ids.id(key) else {
            continue;
        };
        for (target, attrs) in source.out_edges(key) {
            let Some(target_id) = node_ids.id(target) else {
                continue;
            };
            let values = edge_layout
                .iter()
                .filter_map(|(attribute, _, _)| attrs.get(attribute).cloned())
                .collect();
            builder.add_edge(source_id, target_id, values)?;
        }
    }

    let graph = builder.build()?;
    debug!(
        "Translated multigraph to property graph: {} nodes, {} edges, {} edge properties",
        graph.num_nodes(),
        graph.num_edges(),
        graph.edge_schema().len()
    );

    Ok(Translation { graph, node_ids })
}

// ============================================================================
// Property Graph → Multigraph
// ============================================================================

/// Translate a property graph into a multigraph keyed by integer node IDs.
pub fn to_multigraph(
    graph: &PropertyGraph,
    options: &TranslateOptions,
) -> Result<AttributedMultigraph, TranslateError> {
    reverse(graph, options, |id| NodeKey::Int(id as i64))
}

/// Translate a property graph into a multigraph, restoring the original node keys.
pub fn to_multigraph_with_ids(
    graph: &PropertyGraph,
    node_ids: &NodeIdMap,
    options: &TranslateOptions,
) -> Result<AttributedMultigraph, TranslateError> {
    if node_ids.len() != graph.num_nodes() {
        return Err(TranslateError::IdMapMismatch {
            map: node_ids.len(),
            graph: graph.num_nodes(),
        });
    }
    reverse(graph, options, |id| {
        node_ids
            .key(id)
            .cloned()
            .unwrap_or(NodeKey::Int(id as i64))
    })
}

fn reverse(
    graph: &PropertyGraph,
    options: &TranslateOptions,
    key_of: impl Fn(NodeId) -> NodeKey,
) -> Result<AttributedMultigraph, TranslateError> {
    let node_attributes = |id: NodeId| -> Attributes {
        graph
            .properties(Axis::Node)
            .filter_map(|(field, column)| {
                column
                    .get(id as usize)
                    .map(|value| (field.name.clone(), value))
            })
            .collect()
    };

    let edge_names: Vec<String> = graph
        .edge_schema()
        .iter()
        .map(|field| {
            if field.name == options.edge_property {
                options.value_attribute.clone()
            } else {
                field.name.clone()
            }
        })
        .collect();
    let unique: BTreeSet<&String> = edge_names.iter().collect();
    if unique.len() != edge_names.len() {
        return Err(TranslateError::NameCollision(options.value_attribute.clone()));
    }

    let mut result = AttributedMultigraph::new();
    if options.isolated_nodes == IsolatedNodes::Keep {
        for id in graph.nodes() {
            result.add_node(key_of(id), node_attributes(id));
        }
    }

    let mut seen = vec![false; graph.num_nodes()];
    for source in graph.nodes() {
        for (edge, dest) in graph.out_edges(source)? {
            if options.isolated_nodes == IsolatedNodes::Drop {
                for node in [source, dest] {
                    if !seen[node as usize] {
                        seen[node as usize] = true;
                        result.add_node(key_of(node), node_attributes(node));
                    }
                }
            }
            let attrs: Attributes = edge_names
                .iter()
                .zip(graph.properties(Axis::Edge))
                .filter_map(|(name, (_, column))| {
                    column.get(edge as usize).map(|value| (name.clone(), value))
                })
                .collect();
            result.add_edge(key_of(source), key_of(dest), attrs);
        }
    }

    debug!(
        "Translated property graph to multigraph: {} of {} nodes, {} edges",
        result.node_count(),
        graph.num_nodes(),
        result.edge_count()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyValue;
    use pretty_assertions::assert_eq;

    fn key(v: i64) -> NodeKey {
        NodeKey::Int(v)
    }

    fn triangle() -> AttributedMultigraph {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(2i64, 0i64, 5i64), (0, 1, 1), (0, 2, 3), (0, 1, 2)], "value");
        g
    }

    #[test]
    fn test_forward_assigns_ids_in_key_order() {
        let t = to_property_graph(&triangle(), &TranslateOptions::default()).unwrap();
        assert_eq!(t.node_ids.keys(), &[key(0), key(1), key(2)]);
        assert_eq!(t.node_ids.id(&key(2)), Some(2));
        assert_eq!(t.graph.edges(0).unwrap(), 0..3);
        assert_eq!(t.graph.edges(2).unwrap(), 3..4);
    }

    #[test]
    fn test_forward_keeps_multi_edge_order_and_values() {
        let t = to_property_graph(&triangle(), &TranslateOptions::default()).unwrap();
        assert_eq!(t.graph.edge_destinations(), &[1, 2, 1, 0]);
        assert_eq!(
            t.graph.edge_property(DEFAULT_EDGE_PROPERTY).unwrap(),
            &PropertyColumn::Int64(vec![1, 3, 2, 5])
        );
        assert_eq!(t.graph.edge_schema().len(), 1);
        assert_eq!(t.graph.node_schema().len(), 0);
    }

    #[test]
    fn test_forward_string_keys_sorted() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([("b", "a", 1i64), ("c", "b", 2)], "value");
        let t = to_property_graph(&g, &TranslateOptions::default()).unwrap();
        assert_eq!(t.node_ids.id(&NodeKey::from("a")), Some(0));
        assert_eq!(t.node_ids.id(&NodeKey::from("c")), Some(2));
        assert_eq!(t.graph.edge_destinations(), &[0, 1]);
    }

    #[test]
    fn test_forward_carries_extra_edge_attributes_after_value() {
        let mut g = AttributedMultigraph::new();
        let mut attrs = Attributes::new();
        attrs.insert("value".into(), PropertyValue::Int(9));
        attrs.insert("label".into(), "x".into());
        g.add_edge(key(0), key(1), attrs);

        let t = to_property_graph(&g, &TranslateOptions::default()).unwrap();
        assert_eq!(
            t.graph.edge_schema().names(),
            vec![DEFAULT_EDGE_PROPERTY, "label"]
        );
    }

    #[test]
    fn test_forward_rejects_partial_attributes() {
        let mut g = triangle();
        g.add_edge(key(1), key(2), Attributes::new());
        let err = to_property_graph(&g, &TranslateOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::InconsistentAttribute { missing: 1, total: 5, .. }
        ));
    }

    #[test]
    fn test_forward_rejects_mixed_types() {
        let mut g = triangle();
        let mut attrs = Attributes::new();
        attrs.insert("value".into(), PropertyValue::Float(1.5));
        g.add_edge(key(1), key(2), attrs);
        let err = to_property_graph(&g, &TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, TranslateError::MixedTypes { .. }));
    }

    #[test]
    fn test_forward_node_attributes_become_node_properties() {
        let mut g = triangle();
        for (k, label) in [(0i64, "zero"), (1, "one"), (2, "two")] {
            let mut attrs = Attributes::new();
            attrs.insert("label".into(), label.into());
            g.add_node(k, attrs);
        }
        let t = to_property_graph(&g, &TranslateOptions::default()).unwrap();
        assert_eq!(
            t.graph.node_property("label").unwrap(),
            &PropertyColumn::String(vec!["zero".into(), "one".into(), "two".into()])
        );
    }

    #[test]
    fn test_forward_rejects_attribute_named_like_edge_property() {
        let mut g = AttributedMultigraph::new();
        let mut attrs = Attributes::new();
        attrs.insert(DEFAULT_EDGE_PROPERTY.into(), PropertyValue::Int(3));
        g.add_edge(key(0), key(1), attrs);

        let err = to_property_graph(&g, &TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, TranslateError::NameCollision(ref name) if name == DEFAULT_EDGE_PROPERTY));
    }

    #[test]
    fn test_same_value_and_property_name_round_trips() {
        let options = TranslateOptions {
            value_attribute: "w".into(),
            edge_property: "w".into(),
            ..Default::default()
        };
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(0i64, 1i64, 3i64)], "w");

        let t = to_property_graph(&g, &options).unwrap();
        assert_eq!(t.graph.edge_schema().names(), vec!["w"]);
        let back = to_multigraph_with_ids(&t.graph, &t.node_ids, &options).unwrap();
        assert_eq!(back.out_edges(&key(0))[0].1["w"], PropertyValue::Int(3));
    }

    #[test]
    fn test_forward_edge_order_after_node_removal() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(9i64, 8i64, 1i64), (0, 1, 2)], "value");
        g.remove_node(&key(9));
        g.add_weighted_edges([(0i64, 2i64, 3i64)], "value");

        let t = to_property_graph(&g, &TranslateOptions::default()).unwrap();
        let source = t.node_ids.id(&key(0)).unwrap();
        let dests: Vec<_> = t
            .graph
            .out_edges(source)
            .unwrap()
            .map(|(_, dest)| t.node_ids.key(dest).cloned())
            .collect();
        assert_eq!(dests, vec![Some(key(1)), Some(key(2))]);
    }

    #[test]
    fn test_unweighted_graph_has_empty_edge_schema() {
        let mut g = AttributedMultigraph::new();
        g.add_edge(key(0), key(1), Attributes::new());
        let t = to_property_graph(&g, &TranslateOptions::default()).unwrap();
        assert!(t.graph.edge_schema().is_empty());
    }

    #[test]
    fn test_reverse_drops_isolated_nodes_by_default() {
        let mut builder = PropertyGraphBuilder::new(4)
            .edge_property(DEFAULT_EDGE_PROPERTY, PropertyType::Int64)
            .unwrap();
        builder.add_edge(0, 1, vec![PropertyValue::Int(7)]).unwrap();
        builder.add_edge(1, 0, vec![PropertyValue::Int(8)]).unwrap();
        let pg = builder.build().unwrap();

        let dropped = to_multigraph(&pg, &TranslateOptions::default()).unwrap();
        assert_eq!(dropped.node_count(), 2);
        assert!(!dropped.contains_node(&key(3)));

        let kept = to_multigraph(
            &pg,
            &TranslateOptions::default().with_isolated_nodes(IsolatedNodes::Keep),
        )
        .unwrap();
        assert_eq!(kept.node_count(), 4);
        assert_eq!(kept.edge_count(), 2);
    }

    #[test]
    fn test_reverse_renames_edge_property_back() {
        let t = to_property_graph(&triangle(), &TranslateOptions::default()).unwrap();
        let back = to_multigraph(&t.graph, &TranslateOptions::default()).unwrap();
        let values: Vec<_> = back
            .out_edges(&key(0))
            .into_iter()
            .map(|(_, attrs)| attrs["value"].clone())
            .collect();
        assert_eq!(
            values,
            vec![PropertyValue::Int(1), PropertyValue::Int(3), PropertyValue::Int(2)]
        );
    }

    #[test]
    fn test_reverse_with_ids_restores_keys() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([("x", "y", 1i64), ("y", "z", 2)], "value");
        let t = to_property_graph(&g, &TranslateOptions::default()).unwrap();
        let back = to_multigraph_with_ids(&t.graph, &t.node_ids, &TranslateOptions::default())
            .unwrap();
        assert_eq!(back.edge_multiplicity(&"x".into(), &"y".into()), 1);
        assert_eq!(back.edge_multiplicity(&"y".into(), &"z".into()), 1);
    }

    #[test]
    fn test_reverse_with_ids_rejects_mismatched_map() {
        let pg = PropertyGraph::empty(3);
        let map = NodeIdMap::from_keys([key(0)]);
        let err = to_multigraph_with_ids(&pg, &map, &TranslateOptions::default()).unwrap_err();
        assert!(matches!(err, TranslateError::IdMapMismatch { map: 1, graph: 3 }));
    }

    #[test]
    fn test_node_id_map_ignores_duplicates() {
        let map = NodeIdMap::from_keys([key(5), key(5), key(1)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.id(&key(1)), Some(1));
        assert_eq!(map.key(0), Some(&key(5)));
        assert_eq!(map.key(2), None);
    }
}
