//! Translation Verification Harness
//!
//! Checks that a translator's output is structurally and attribute-equivalent
//! to its input. Every check is a hard assertion: it returns the first
//! mismatch as a [`VerificationError`] and never retries or reports partial
//! success.
//!
//! Multi-edges are reconciled with counting maps keyed by `(source, destination)`
//! rather than set membership, so duplicate edges are neither lost nor
//! double-counted.

use std::collections::HashMap;
use std::ops::Range;

use thiserror::Error;
use tracing::debug;

use crate::multigraph::{AttributedMultigraph, NodeKey};
use crate::property::PropertyValue;
use crate::property_graph::{Axis, EdgeId, GraphError, NodeId, PropertyGraph};
use crate::translate::Translation;

/// A failed verification check
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("node count mismatch ({context}): expected {expected}, found {actual}")]
    NodeCount {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("edge count mismatch ({context}): expected {expected}, found {actual}")]
    EdgeCount {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("node {node} edge range mismatch: expected {expected:?}, found {actual:?}")]
    EdgeRange {
        node: NodeId,
        expected: Range<EdgeId>,
        actual: Range<EdgeId>,
    },

    #[error("node {node} destinations mismatch: expected {expected:?}, found {actual:?}")]
    Destinations {
        node: NodeId,
        expected: Vec<NodeId>,
        actual: Vec<NodeId>,
    },

    #[error("{axis} schema has {actual} properties, expected {expected}")]
    SchemaSize {
        axis: Axis,
        expected: usize,
        actual: usize,
    },

    #[error("edge schema position {position} holds '{actual}', expected '{expected}'")]
    PropertyName {
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("edge property '{name}' differs between name lookup and index {index} lookup")]
    LookupDisagreement { name: String, index: usize },

    #[error("edge property '{name}' values mismatch: expected {expected:?}, found {actual:?}")]
    PropertyValues {
        name: String,
        expected: Vec<PropertyValue>,
        actual: Vec<PropertyValue>,
    },

    #[error("node {node} is absent from the reverse translation but has {edges} outgoing edges")]
    AbsentNodeHasEdges { node: NodeId, edges: usize },

    #[error("node '{node}' out-degree mismatch: expected {expected}, found {actual}")]
    Degree {
        node: NodeKey,
        expected: usize,
        actual: usize,
    },

    #[error("{count} edge(s) {from} -> {to} with attributes {attributes} not matched")]
    UnmatchedEdges {
        from: NodeKey,
        to: NodeKey,
        attributes: String,
        count: i64,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type for verification checks
pub type VerifyResult<T> = Result<T, VerificationError>;

// ============================================================================
// Property Graph Checks
// ============================================================================

/// Count nodes by iteration and compare with `num_nodes()` and, if given, a literal.
pub fn check_node_count(graph: &PropertyGraph, expected: Option<usize>) -> VerifyResult<usize> {
    let counted = graph.nodes().count();
    if counted != graph.num_nodes() {
        return Err(VerificationError::NodeCount {
            context: "iterated vs num_nodes()",
            expected: graph.num_nodes(),
            actual: counted,
        });
    }
    if let Some(expected) = expected {
        if counted != expected {
            return Err(VerificationError::NodeCount {
                context: "num_nodes() vs expected",
                expected,
                actual: counted,
            });
        }
    }
    Ok(counted)
}

/// Sum per-node edge-range sizes and compare with `num_edges()` and, if given, a literal.
pub fn check_edge_count(graph: &PropertyGraph, expected: Option<usize>) -> VerifyResult<usize> {
    let mut total = 0usize;
    for node in graph.nodes() {
        let range = graph.edges(node)?;
        total += (range.end - range.start) as usize;
    }
    if total != graph.num_edges() {
        return Err(VerificationError::EdgeCount {
            context: "range sizes vs num_edges()",
            expected: graph.num_edges(),
            actual: total,
        });
    }
    if let Some(expected) = expected {
        if total != expected {
            return Err(VerificationError::EdgeCount {
                context: "num_edges() vs expected",
                expected,
                actual: total,
            });
        }
    }
    Ok(total)
}

/// Expected edge range, and optionally destinations, of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedNode {
    pub node: NodeId,
    pub edges: Range<EdgeId>,
    pub destinations: Option<Vec<NodeId>>,
}

impl ExpectedNode {
    pub fn new(node: NodeId, edges: Range<EdgeId>) -> Self {
        Self {
            node,
            edges,
            destinations: None,
        }
    }

    pub fn with_destinations(mut self, destinations: Vec<NodeId>) -> Self {
        self.destinations = Some(destinations);
        self
    }
}

/// Assert exact edge ranges and destination sequences.
pub fn check_topology(graph: &PropertyGraph, expected: &[ExpectedNode]) -> VerifyResult<()> {
    for spec in expected {
        let actual = graph.edges(spec.node)?;
        if actual != spec.edges {
            return Err(VerificationError::EdgeRange {
                node: spec.node,
                expected: spec.edges.clone(),
                actual,
            });
        }
        if let Some(ref destinations) = spec.destinations {
            let found = actual
                .map(|edge| graph.edge_dest(edge))
                .collect::<Result<Vec<_>, _>>()?;
            if &found != destinations {
                return Err(VerificationError::Destinations {
                    node: spec.node,
                    expected: destinations.clone(),
                    actual: found,
                });
            }
        }
    }
    Ok(())
}

/// Assert the number of node and edge properties.
pub fn check_schema(
    graph: &PropertyGraph,
    node_properties: usize,
    edge_properties: usize,
) -> VerifyResult<()> {
    for (axis, expected, actual) in [
        (Axis::Node, node_properties, graph.node_schema().len()),
        (Axis::Edge, edge_properties, graph.edge_schema().len()),
    ] {
        if expected != actual {
            return Err(VerificationError::SchemaSize {
                axis,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Assert an edge property sits at `position`, that name and index lookups agree,
/// and that its values equal `expected`.
pub fn check_edge_property(
    graph: &PropertyGraph,
    name: &str,
    position: usize,
    expected: &[PropertyValue],
) -> VerifyResult<()> {
    let at_position = graph
        .edge_schema()
        .field(position)
        .map(|f| f.name.clone())
        .unwrap_or_default();
    if at_position != name {
        return Err(VerificationError::PropertyName {
            position,
            expected: name.to_string(),
            actual: at_position,
        });
    }

    let by_name = graph.edge_property(name)?;
    let by_index = graph.edge_property_at(position)?;
    if by_name != by_index {
        return Err(VerificationError::LookupDisagreement {
            name: name.to_string(),
            index: position,
        });
    }

    let actual = by_name.values();
    if actual.as_slice() != expected {
        return Err(VerificationError::PropertyValues {
            name: name.to_string(),
            expected: expected.to_vec(),
            actual,
        });
    }
    Ok(())
}

// ============================================================================
// Reverse-Direction Checks
// ============================================================================

fn id_key(id: NodeId) -> NodeKey {
    NodeKey::Int(id as i64)
}

/// Node accounting between an original property graph and its reverse translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeAccounting {
    pub present: usize,
    pub absent: usize,
}

/// Every node missing from `reversed` must have an empty edge range in `original`,
/// and present plus absent must equal the original node count.
///
/// `reversed` is expected to be keyed by integer node IDs.
pub fn check_absent_nodes(
    original: &PropertyGraph,
    reversed: &AttributedMultigraph,
) -> VerifyResult<NodeAccounting> {
    let mut absent = 0usize;
    for node in original.nodes() {
        if reversed.contains_node(&id_key(node)) {
            continue;
        }
        let edges = original.out_degree(node)?;
        if edges != 0 {
            return Err(VerificationError::AbsentNodeHasEdges { node, edges });
        }
        absent += 1;
    }

    let present = reversed.node_count();
    if present + absent != original.num_nodes() {
        return Err(VerificationError::NodeCount {
            context: "present + absent vs num_nodes()",
            expected: original.num_nodes(),
            actual: present + absent,
        });
    }
    Ok(NodeAccounting { present, absent })
}

/// Reconcile edges with a counting map keyed by `(source, destination)`.
///
/// Keys are the pairs observed in `reversed`; walking `original`'s adjacency
/// increments the count of every matching pair. The total must equal the
/// original edge count. Returns that total.
pub fn check_edge_reconciliation(
    original: &PropertyGraph,
    reversed: &AttributedMultigraph,
) -> VerifyResult<usize> {
    let mut counts: HashMap<(NodeKey, NodeKey), usize> = reversed
        .edges()
        .into_iter()
        .map(|(source, target, _)| ((source.clone(), target.clone()), 0))
        .collect();

    for source in original.nodes() {
        for (_, dest) in original.out_edges(source)? {
            if let Some(count) = counts.get_mut(&(id_key(source), id_key(dest))) {
                *count += 1;
            }
        }
    }

    let total: usize = counts.values().sum();
    if total != original.num_edges() {
        return Err(VerificationError::EdgeCount {
            context: "reconciled (source, destination) pairs vs num_edges()",
            expected: original.num_edges(),
            actual: total,
        });
    }
    Ok(total)
}

/// Summary of a successful reverse-direction verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReverseReport {
    pub nodes: NodeAccounting,
    pub reconciled_edges: usize,
}

/// Run every reverse-direction check on a property graph and its reverse translation.
pub fn verify_reverse(
    original: &PropertyGraph,
    reversed: &AttributedMultigraph,
) -> VerifyResult<ReverseReport> {
    check_node_count(original, None)?;
    check_edge_count(original, None)?;
    let nodes = check_absent_nodes(original, reversed)?;
    let reconciled_edges = check_edge_reconciliation(original, reversed)?;
    debug!(
        "Reverse verification passed: {} present, {} absent, {} edges reconciled",
        nodes.present, nodes.absent, reconciled_edges
    );
    Ok(ReverseReport {
        nodes,
        reconciled_edges,
    })
}

// ============================================================================
// Round-Trip Checks
// ============================================================================

/// Compare a multigraph with its A→B→A round trip.
///
/// Checks node count, edge count, per-node out-degree and the multiset of
/// `(source, target, attributes)` triples. Edge numbering is not compared.
pub fn check_round_trip(
    original: &AttributedMultigraph,
    round_tripped: &AttributedMultigraph,
) -> VerifyResult<()> {
    if original.node_count() != round_tripped.node_count() {
        return Err(VerificationError::NodeCount {
            context: "round trip",
            expected: original.node_count(),
            actual: round_tripped.node_count(),
        });
    }
    if original.edge_count() != round_tripped.edge_count() {
        return Err(VerificationError::EdgeCount {
            context: "round trip",
            expected: original.edge_count(),
            actual: round_tripped.edge_count(),
        });
    }

    for key in original.node_keys() {
        let expected = original.out_degree(key);
        let actual = round_tripped.out_degree(key);
        if expected != actual {
            return Err(VerificationError::Degree {
                node: key.clone(),
                expected,
                actual,
            });
        }
    }

    // Attributes hold floats, so triples are keyed by their canonical JSON form
    let mut balance: HashMap<(NodeKey, NodeKey, String), i64> = HashMap::new();
    for (graph, delta) in [(original, 1i64), (round_tripped, -1i64)] {
        for (source, target, attrs) in graph.edges() {
            let attributes = serde_json::to_string(attrs).unwrap_or_default();
            *balance
                .entry((source.clone(), target.clone(), attributes))
                .or_insert(0) += delta;
        }
    }
    if let Some(((from, to, attributes), count)) =
        balance.into_iter().find(|(_, count)| *count != 0)
    {
        return Err(VerificationError::UnmatchedEdges {
            from,
            to,
            attributes,
            count,
        });
    }
    Ok(())
}

// ============================================================================
// Forward Composite
// ============================================================================

/// Literal expectations for a forward translation
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardExpectations {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub topology: Vec<ExpectedNode>,
    pub node_properties: usize,
    pub edge_properties: usize,
    /// `(name, schema position, values)` of an edge property to check
    pub edge_values: Option<(String, usize, Vec<PropertyValue>)>,
}

/// Run every forward check against literal expectations.
pub fn verify_forward(
    translation: &Translation,
    expected: &ForwardExpectations,
) -> VerifyResult<()> {
    let graph = &translation.graph;
    graph.validate()?;
    check_node_count(graph, Some(expected.num_nodes))?;
    check_edge_count(graph, Some(expected.num_edges))?;
    check_topology(graph, &expected.topology)?;
    check_schema(graph, expected.node_properties, expected.edge_properties)?;
    if let Some((ref name, position, ref values)) = expected.edge_values {
        check_edge_property(graph, name, position, values)?;
    }
    if translation.node_ids.len() != graph.num_nodes() {
        return Err(VerificationError::NodeCount {
            context: "node ID map vs num_nodes()",
            expected: graph.num_nodes(),
            actual: translation.node_ids.len(),
        });
    }
    debug!(
        "Forward verification passed: {} nodes, {} edges",
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(())
}
