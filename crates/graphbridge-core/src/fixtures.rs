//! Fixture Graphs
//!
//! - [`weighted_directed_8_12`]: a hand-specified 8-node, 12-edge weighted
//!   digraph with its literal forward-translation expectations
//! - [`generate_rmat`]: seeded R-MAT generator for large power-law graphs
//! - [`clean`]: removes self-loops, parallel edges and optionally isolated
//!   nodes from a property graph

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::multigraph::AttributedMultigraph;
use crate::property::{PropertyType, PropertyValue};
use crate::property_graph::{
    Axis, EdgeId, GraphError, NodeId, PropertyGraph, PropertyGraphBuilder,
};
use crate::translate::{DEFAULT_EDGE_PROPERTY, DEFAULT_VALUE_ATTRIBUTE};
use crate::verify::{ExpectedNode, ForwardExpectations};

// ============================================================================
// Fixed Small Graph
// ============================================================================

/// `(source, target, value)` edges of the 8/12 fixture, in insertion order
pub const WEIGHTED_DIRECTED_8_12_EDGES: [(i64, i64, i64); 12] = [
    (0, 1, 4),
    (0, 3, 2),
    (0, 4, 7),
    (1, 3, 3),
    (1, 4, 5),
    (2, 4, 5),
    (2, 5, 2),
    (2, 6, 8),
    (3, 4, 1),
    (4, 7, 4),
    (5, 6, 4),
    (5, 7, 6),
];

/// The 8-node, 12-edge directed graph weighted by the `value` attribute.
pub fn weighted_directed_8_12() -> AttributedMultigraph {
    let mut graph = AttributedMultigraph::new();
    graph.add_weighted_edges(WEIGHTED_DIRECTED_8_12_EDGES, DEFAULT_VALUE_ATTRIBUTE);
    graph
}

/// Literal expectations for the default forward translation of [`weighted_directed_8_12`].
pub fn weighted_directed_8_12_expectations() -> ForwardExpectations {
    ForwardExpectations {
        num_nodes: 8,
        num_edges: 12,
        topology: vec![
            ExpectedNode::new(0, 0..3).with_destinations(vec![1, 3, 4]),
            ExpectedNode::new(1, 3..5).with_destinations(vec![3, 4]),
            ExpectedNode::new(2, 5..8).with_destinations(vec![4, 5, 6]),
            ExpectedNode::new(3, 8..9).with_destinations(vec![4]),
            ExpectedNode::new(4, 9..10).with_destinations(vec![7]),
            ExpectedNode::new(5, 10..12).with_destinations(vec![6, 7]),
            ExpectedNode::new(6, 12..12),
            ExpectedNode::new(7, 12..12),
        ],
        node_properties: 0,
        edge_properties: 1,
        edge_values: Some((
            DEFAULT_EDGE_PROPERTY.to_string(),
            0,
            [4, 2, 7, 3, 5, 5, 2, 8, 1, 4, 4, 6]
                .into_iter()
                .map(PropertyValue::Int)
                .collect(),
        )),
    }
}

// ============================================================================
// R-MAT Generator
// ============================================================================

/// R-MAT generator parameters.
///
/// Each edge picks one of four adjacency-matrix quadrants `scale` times with
/// probabilities `a`, `b`, `c` and `1 - a - b - c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmatConfig {
    /// log2 of the node count
    pub scale: u32,
    /// Edges generated per node
    pub edge_factor: u32,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub seed: u64,
    /// Name of the integer weight property, if any
    pub weight_property: Option<String>,
    /// Weights are drawn uniformly from `1..=max_weight`
    pub max_weight: i64,
}

impl Default for RmatConfig {
    fn default() -> Self {
        Self {
            scale: 15,
            edge_factor: 16,
            a: 0.57,
            b: 0.19,
            c: 0.19,
            seed: 0x5eed,
            weight_property: Some(DEFAULT_VALUE_ATTRIBUTE.to_string()),
            max_weight: 100,
        }
    }
}

impl RmatConfig {
    pub fn num_nodes(&self) -> usize {
        1usize << self.scale
    }

    pub fn num_edges(&self) -> usize {
        self.num_nodes() * self.edge_factor as usize
    }

    /// Check the parameters describe a valid distribution and an addressable graph.
    pub fn validate(&self) -> Result<(), String> {
        if self.scale == 0 || self.scale > 31 {
            return Err(format!("scale must be in 1..=31, got {}", self.scale));
        }
        let d = 1.0 - self.a - self.b - self.c;
        if [self.a, self.b, self.c].iter().any(|p| *p < 0.0) || d < 0.0 {
            return Err(format!(
                "quadrant probabilities must be non-negative and sum to at most 1 (a={}, b={}, c={})",
                self.a, self.b, self.c
            ));
        }
        if self.max_weight < 1 {
            return Err(format!("max_weight must be positive, got {}", self.max_weight));
        }
        Ok(())
    }
}

/// Generate an R-MAT graph.
pub fn generate_rmat(config: &RmatConfig) -> Result<PropertyGraph, GraphError> {
    generate_rmat_with_progress(config, |_| {})
}

/// Generate an R-MAT graph, calling `progress` with the number of edges produced so far.
pub fn generate_rmat_with_progress(
    config: &RmatConfig,
    mut progress: impl FnMut(usize),
) -> Result<PropertyGraph, GraphError> {
    config.validate().map_err(GraphError::InvalidTopology)?;

    let num_nodes = config.num_nodes();
    let num_edges = config.num_edges();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut builder = PropertyGraphBuilder::new(num_nodes);
    if let Some(ref name) = config.weight_property {
        builder = builder.edge_property(name.clone(), PropertyType::Int64)?;
    }
    builder.reserve_edges(num_edges);

    let ab = config.a + config.b;
    let abc = ab + config.c;
    let report_every = (num_edges / 100).max(1);

    for i in 0..num_edges {
        let (mut src, mut dst) = (0usize, 0usize);
        for level in (0..config.scale).rev() {
            let r: f64 = rng.gen();
            let bit = 1usize << level;
            if r < config.a {
                // top-left
            } else if r < ab {
                dst |= bit;
            } else if r < abc {
                src |= bit;
            } else {
                src |= bit;
                dst |= bit;
            }
        }

        let values = match config.weight_property {
            Some(_) => vec![PropertyValue::Int(rng.gen_range(1..=config.max_weight))],
            None => Vec::new(),
        };
        builder.add_edge(src as NodeId, dst as NodeId, values)?;

        if (i + 1) % report_every == 0 {
            progress(i + 1);
        }
    }
    progress(num_edges);

    let graph = builder.build()?;
    info!(
        "Generated R-MAT graph (scale {}, edge factor {}): {} nodes, {} edges",
        config.scale,
        config.edge_factor,
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(graph)
}

// ============================================================================
// Cleaning
// ============================================================================

/// What [`clean`] removes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanOptions {
    pub remove_self_loops: bool,
    /// Keep only the first edge of each `(source, destination)` pair
    pub remove_parallel_edges: bool,
    /// Drop nodes with no incident edge after edge cleaning and renumber the rest
    pub remove_isolated_nodes: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            remove_self_loops: true,
            remove_parallel_edges: true,
            remove_isolated_nodes: false,
        }
    }
}

/// Counts of what [`clean`] removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub self_loops: usize,
    pub parallel_edges: usize,
    pub isolated_nodes: usize,
}

/// Clean a property graph. Surviving edges keep their relative order within
/// each node, and surviving properties follow their nodes and edges.
pub fn clean(
    graph: &PropertyGraph,
    options: &CleanOptions,
) -> Result<(PropertyGraph, CleanReport), GraphError> {
    let mut report = CleanReport::default();
    let mut kept_edges: Vec<usize> = Vec::with_capacity(graph.num_edges());
    let mut kept_sources: Vec<NodeId> = Vec::with_capacity(graph.num_edges());
    let mut seen: HashSet<NodeId> = HashSet::new();

    for source in graph.nodes() {
        seen.clear();
        for (edge, dest) in graph.out_edges(source)? {
            if options.remove_self_loops && source == dest {
                report.self_loops += 1;
                continue;
            }
            if options.remove_parallel_edges && !seen.insert(dest) {
                report.parallel_edges += 1;
                continue;
            }
            kept_edges.push(edge as usize);
            kept_sources.push(source);
        }
    }

    // Old node ID -> new node ID
    let mut remap: Vec<Option<NodeId>> = graph.nodes().map(Some).collect();
    let mut kept_nodes: Vec<usize> = (0..graph.num_nodes()).collect();
    if options.remove_isolated_nodes {
        let mut connected = vec![false; graph.num_nodes()];
        for (&edge, &source) in kept_edges.iter().zip(&kept_sources) {
            connected[source as usize] = true;
            connected[graph.edge_dest(edge as EdgeId)? as usize] = true;
        }
        kept_nodes.clear();
        let mut next: NodeId = 0;
        for (old, slot) in remap.iter_mut().enumerate() {
            if connected[old] {
                *slot = Some(next);
                kept_nodes.push(old);
                next += 1;
            } else {
                *slot = None;
                report.isolated_nodes += 1;
            }
        }
    }

    let mut row_ptr: Vec<EdgeId> = vec![0; kept_nodes.len() + 1];
    let mut edge_dest: Vec<NodeId> = Vec::with_capacity(kept_edges.len());
    for (&edge, &source) in kept_edges.iter().zip(&kept_sources) {
        // Endpoints of a kept edge are connected, so both map to new IDs
        let (Some(new_source), Some(new_dest)) = (
            remap[source as usize],
            remap[graph.edge_dest(edge as EdgeId)? as usize],
        ) else {
            continue;
        };
        row_ptr[new_source as usize + 1] += 1;
        edge_dest.push(new_dest);
    }
    for i in 0..kept_nodes.len() {
        row_ptr[i + 1] += row_ptr[i];
    }

    let node_properties = graph
        .properties(Axis::Node)
        .map(|(field, column)| (field.clone(), column.gather(&kept_nodes)))
        .collect();
    let edge_properties = graph
        .properties(Axis::Edge)
        .map(|(field, column)| (field.clone(), column.gather(&kept_edges)))
        .collect();

    let cleaned = PropertyGraph::from_parts(row_ptr, edge_dest, node_properties, edge_properties)?;
    debug!(
        "Cleaned graph: removed {} self-loops, {} parallel edges, {} isolated nodes",
        report.self_loops, report.parallel_edges, report.isolated_nodes
    );
    Ok((cleaned, report))
}
