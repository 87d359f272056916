//! Attributed Directed Multigraph
//!
//! The source-side graph model: nodes carry arbitrary hashable keys, edges are
//! directed and may repeat between the same pair of nodes, and both carry an
//! open set of named attributes.
//!
//! The implementation uses `petgraph::StableGraph` plus a key → index map, so
//! node lookups by key are O(1) and removals do not invalidate other indices.
//! `StableGraph` reuses vacated slots, so insertion order is tracked with a
//! sequence number on every node and edge rather than read off the indices.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::property::PropertyValue;

/// Named attributes of a node or edge, ordered by name.
pub type Attributes = BTreeMap<String, PropertyValue>;

// ============================================================================
// Node Keys
// ============================================================================

/// Identifier of a node in the source model.
///
/// Keys order integers before strings, and each variant by its natural order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Int(v) => write!(f, "{}", v),
            NodeKey::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(v: i64) -> Self {
        NodeKey::Int(v)
    }
}

impl From<&str> for NodeKey {
    fn from(v: &str) -> Self {
        NodeKey::Str(v.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(v: String) -> Self {
        NodeKey::Str(v)
    }
}

/// Node payload stored in the petgraph instance
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEntry {
    pub key: NodeKey,
    pub attributes: Attributes,
    seq: u64,
}

/// Edge payload stored in the petgraph instance
#[derive(Debug, Clone, PartialEq)]
struct EdgeEntry {
    attributes: Attributes,
    seq: u64,
}

// ============================================================================
// Multigraph
// ============================================================================

/// A directed, attributed multigraph keyed by [`NodeKey`].
#[derive(Debug, Clone, Default)]
pub struct AttributedMultigraph {
    /// The underlying petgraph instance
    graph: StableGraph<NodeEntry, EdgeEntry, petgraph::Directed>,

    /// Map from node key to petgraph NodeIndex for O(1) lookup
    node_index_map: HashMap<NodeKey, NodeIndex>,

    /// Next insertion sequence number, shared by nodes and edges
    next_seq: u64,
}

impl AttributedMultigraph {
    /// Create a new empty multigraph
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Node Operations
    // ------------------------------------------------------------------------

    /// Add a node, or merge `attributes` into an existing node with the same key.
    pub fn add_node(&mut self, key: impl Into<NodeKey>, attributes: Attributes) -> NodeIndex {
        let key = key.into();
        if let Some(&idx) = self.node_index_map.get(&key) {
            if let Some(entry) = self.graph.node_weight_mut(idx) {
                entry.attributes.extend(attributes);
            }
            return idx;
        }

        let seq = self.bump_seq();
        let idx = self.graph.add_node(NodeEntry {
            key: key.clone(),
            attributes,
            seq,
        });
        self.node_index_map.insert(key, idx);
        idx
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn ensure_node(&mut self, key: NodeKey) -> NodeIndex {
        match self.node_index_map.get(&key) {
            Some(&idx) => idx,
            None => self.add_node(key, Attributes::new()),
        }
    }

    /// Check if the graph contains a node with the given key
    pub fn contains_node(&self, key: &NodeKey) -> bool {
        self.node_index_map.contains_key(key)
    }

    /// Attributes of a node
    pub fn node_attributes(&self, key: &NodeKey) -> Option<&Attributes> {
        self.node_index_map
            .get(key)
            .and_then(|&idx| self.graph.node_weight(idx))
            .map(|entry| &entry.attributes)
    }

    /// Remove a node and all its incident edges
    pub fn remove_node(&mut self, key: &NodeKey) -> Option<Attributes> {
        let idx = self.node_index_map.remove(key)?;
        self.graph.remove_node(idx).map(|entry| entry.attributes)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Iterate over nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeEntry> {
        let mut entries: Vec<&NodeEntry> = self.graph.node_weights().collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter()
    }

    /// Node keys in insertion order
    pub fn node_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.nodes().map(|entry| &entry.key)
    }

    // ------------------------------------------------------------------------
    // Edge Operations
    // ------------------------------------------------------------------------

    /// Add a directed edge, creating missing endpoints.
    ///
    /// Parallel edges are kept as separate entries.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeKey>,
        target: impl Into<NodeKey>,
        attributes: Attributes,
    ) -> EdgeIndex {
        let source_idx = self.ensure_node(source.into());
        let target_idx = self.ensure_node(target.into());
        let seq = self.bump_seq();
        self.graph
            .add_edge(source_idx, target_idx, EdgeEntry { attributes, seq })
    }

    /// Add `(source, target, weight)` triples, storing the weight under `attribute`.
    pub fn add_weighted_edges<K, V>(
        &mut self,
        edges: impl IntoIterator<Item = (K, K, V)>,
        attribute: &str,
    ) where
        K: Into<NodeKey>,
        V: Into<PropertyValue>,
    {
        for (source, target, weight) in edges {
            let mut attributes = Attributes::new();
            attributes.insert(attribute.to_string(), weight.into());
            self.add_edge(source, target, attributes);
        }
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Outgoing edges of a node in insertion order, as `(target, attributes)`.
    ///
    /// Returns an empty list for unknown keys.
    pub fn out_edges(&self, key: &NodeKey) -> Vec<(&NodeKey, &Attributes)> {
        let Some(&idx) = self.node_index_map.get(key) else {
            return Vec::new();
        };

        let mut edges: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .collect();
        edges.sort_by_key(|edge_ref| edge_ref.weight().seq);

        edges
            .into_iter()
            .filter_map(|edge_ref| {
                let target = self.graph.node_weight(edge_ref.target())?;
                Some((&target.key, &edge_ref.weight().attributes))
            })
            .collect()
    }

    /// Number of outgoing edges of a node
    pub fn out_degree(&self, key: &NodeKey) -> usize {
        self.node_index_map
            .get(key)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// All edges, grouped by source node in node insertion order.
    pub fn edges(&self) -> Vec<(&NodeKey, &NodeKey, &Attributes)> {
        self.node_keys()
            .flat_map(|source| {
                self.out_edges(source)
                    .into_iter()
                    .map(move |(target, attrs)| (source, target, attrs))
            })
            .collect()
    }

    /// Number of parallel edges from `source` to `target`
    pub fn edge_multiplicity(&self, source: &NodeKey, target: &NodeKey) -> usize {
        match (
            self.node_index_map.get(source),
            self.node_index_map.get(target),
        ) {
            (Some(&s), Some(&t)) => self.graph.edges_connecting(s, t).count(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: i64) -> NodeKey {
        NodeKey::Int(v)
    }

    #[test]
    fn test_add_edge_creates_endpoints() {
        let mut g = AttributedMultigraph::new();
        g.add_edge(key(1), key(2), Attributes::new());
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(g.contains_node(&key(1)));
        assert!(g.contains_node(&key(2)));
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(0i64, 1i64, 3i64), (0, 1, 9), (0, 2, 1)], "value");
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_multiplicity(&key(0), &key(1)), 2);
        assert_eq!(g.out_degree(&key(0)), 3);
    }

    #[test]
    fn test_out_edges_keep_insertion_order() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(0i64, 5i64, 1i64), (0, 2, 2), (0, 5, 3), (0, 1, 4)], "w");

        let targets: Vec<_> = g.out_edges(&key(0)).into_iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(targets, vec![key(5), key(2), key(5), key(1)]);

        let weights: Vec<_> = g
            .out_edges(&key(0))
            .into_iter()
            .map(|(_, attrs)| attrs["w"].clone())
            .collect();
        assert_eq!(
            weights,
            vec![
                PropertyValue::Int(1),
                PropertyValue::Int(2),
                PropertyValue::Int(3),
                PropertyValue::Int(4)
            ]
        );
    }

    #[test]
    fn test_add_node_merges_attributes() {
        let mut g = AttributedMultigraph::new();
        let mut first = Attributes::new();
        first.insert("color".into(), "red".into());
        g.add_node("a", first);

        let mut second = Attributes::new();
        second.insert("size".into(), PropertyValue::Int(3));
        g.add_node("a", second);

        let attrs = g.node_attributes(&NodeKey::from("a")).unwrap();
        assert_eq!(g.node_count(), 1);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(0i64, 1i64, 1i64), (1, 2, 1), (2, 0, 1)], "value");
        g.remove_node(&key(1));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.out_edges(&key(1)), Vec::new());
    }

    #[test]
    fn test_order_survives_slot_reuse_after_removal() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(9i64, 8i64, 1i64), (0, 1, 2)], "w");
        g.remove_node(&key(9));
        // Vacated node and edge slots are reused by these insertions
        g.add_weighted_edges([(0i64, 2i64, 3i64), (7, 0, 4)], "w");

        let targets: Vec<_> = g.out_edges(&key(0)).into_iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(targets, vec![key(1), key(2)]);

        let order: Vec<_> = g.node_keys().cloned().collect();
        assert_eq!(order, vec![key(8), key(0), key(1), key(2), key(7)]);
    }

    #[test]
    fn test_edges_grouped_by_source() {
        let mut g = AttributedMultigraph::new();
        g.add_weighted_edges([(1i64, 0i64, 1i64), (0, 1, 2), (1, 2, 3)], "value");
        let pairs: Vec<_> = g
            .edges()
            .into_iter()
            .map(|(s, t, _)| (s.clone(), t.clone()))
            .collect();
        assert_eq!(
            pairs,
            vec![(key(1), key(0)), (key(1), key(2)), (key(0), key(1))]
        );
    }

    #[test]
    fn test_node_key_ordering_puts_integers_first() {
        let mut keys = vec![NodeKey::from("b"), key(10), NodeKey::from("a"), key(2)];
        keys.sort();
        assert_eq!(
            keys,
            vec![key(2), key(10), NodeKey::from("a"), NodeKey::from("b")]
        );
    }
}
