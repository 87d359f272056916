//! CSR Property Graph
//!
//! The target-side graph model. Nodes are dense integer IDs `0..N`, edges are
//! dense integer IDs `0..M`, and all edges leaving a node occupy a contiguous,
//! ascending edge-ID range.
//!
//! Memory layout:
//! - `row_ptr[n]..row_ptr[n + 1]` = edge-ID range of node `n`
//! - `edge_dest[e]` = destination node of edge `e`
//! - node and edge properties are columns indexed by node ID / edge ID

use std::ops::Range;

use thiserror::Error;

use crate::property::{PropertyColumn, PropertyField, PropertyType, PropertyValue, Schema};

/// Dense node identifier
pub type NodeId = u32;

/// Dense edge identifier
pub type EdgeId = u64;

/// Which ID axis a property belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Node,
    Edge,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Node => "node",
            Axis::Edge => "edge",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by property graph construction and lookups
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {node} out of range (graph has {num_nodes} nodes)")]
    NodeOutOfRange { node: u64, num_nodes: usize },

    #[error("edge {edge} out of range (graph has {num_edges} edges)")]
    EdgeOutOfRange { edge: EdgeId, num_edges: usize },

    #[error("{axis} property '{name}' not found")]
    PropertyNotFound { axis: Axis, name: String },

    #[error("{axis} property index {index} out of range (schema has {len} fields)")]
    PropertyIndexOutOfRange { axis: Axis, index: usize, len: usize },

    #[error("{axis} property '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        axis: Axis,
        name: String,
        expected: PropertyType,
        found: PropertyType,
    },

    #[error("{axis} property '{name}' has {found} values, expected {expected}")]
    ColumnLength {
        axis: Axis,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("{axis} property '{name}' declared twice")]
    DuplicateProperty { axis: Axis, name: String },

    #[error("edge carries {found} property values, schema has {expected}")]
    Arity { expected: usize, found: usize },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

// ============================================================================
// Property Graph
// ============================================================================

/// A directed graph in compressed-sparse-row form with columnar properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGraph {
    /// Row pointers (length = num_nodes + 1)
    row_ptr: Vec<EdgeId>,
    /// Destination of every edge (length = num_edges)
    edge_dest: Vec<NodeId>,

    node_schema: Schema,
    node_columns: Vec<PropertyColumn>,

    edge_schema: Schema,
    edge_columns: Vec<PropertyColumn>,
}

impl PropertyGraph {
    /// Create a graph with `num_nodes` nodes, no edges and no properties
    pub fn empty(num_nodes: usize) -> Self {
        Self {
            row_ptr: vec![0; num_nodes + 1],
            edge_dest: Vec::new(),
            node_schema: Schema::new(),
            node_columns: Vec::new(),
            edge_schema: Schema::new(),
            edge_columns: Vec::new(),
        }
    }

    /// Assemble a graph from raw parts, validating every structural invariant.
    pub fn from_parts(
        row_ptr: Vec<EdgeId>,
        edge_dest: Vec<NodeId>,
        node_properties: Vec<(PropertyField, PropertyColumn)>,
        edge_properties: Vec<(PropertyField, PropertyColumn)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self {
            row_ptr,
            edge_dest,
            node_schema: Schema::new(),
            node_columns: Vec::new(),
            edge_schema: Schema::new(),
            edge_columns: Vec::new(),
        };
        for (field, column) in node_properties {
            graph.attach(Axis::Node, field, column)?;
        }
        for (field, column) in edge_properties {
            graph.attach(Axis::Edge, field, column)?;
        }
        graph.validate()?;
        Ok(graph)
    }

    fn attach(
        &mut self,
        axis: Axis,
        field: PropertyField,
        column: PropertyColumn,
    ) -> Result<(), GraphError> {
        if field.data_type != column.data_type() {
            return Err(GraphError::TypeMismatch {
                axis,
                name: field.name,
                expected: field.data_type,
                found: column.data_type(),
            });
        }
        let (schema, columns) = match axis {
            Axis::Node => (&mut self.node_schema, &mut self.node_columns),
            Axis::Edge => (&mut self.edge_schema, &mut self.edge_columns),
        };
        let name = field.name.clone();
        if !schema.push(field) {
            return Err(GraphError::DuplicateProperty { axis, name });
        }
        columns.push(column);
        Ok(())
    }

    /// Add a node property column (one value per node)
    pub fn add_node_property(
        &mut self,
        name: impl Into<String>,
        column: PropertyColumn,
    ) -> Result<(), GraphError> {
        let field = PropertyField::new(name, column.data_type());
        if column.len() != self.num_nodes() {
            return Err(GraphError::ColumnLength {
                axis: Axis::Node,
                name: field.name,
                expected: self.num_nodes(),
                found: column.len(),
            });
        }
        self.attach(Axis::Node, field, column)
    }

    /// Check every structural invariant of the CSR layout and its columns.
    pub fn validate(&self) -> Result<(), GraphError> {
        let Some(&first) = self.row_ptr.first() else {
            return Err(GraphError::InvalidTopology(
                "row_ptr must have num_nodes + 1 entries".to_string(),
            ));
        };
        if first != 0 {
            return Err(GraphError::InvalidTopology(format!(
                "row_ptr[0] = {} (expected 0)",
                first
            )));
        }

        // Ranges must be contiguous and non-overlapping
        for (node, window) in self.row_ptr.windows(2).enumerate() {
            if window[0] > window[1] {
                return Err(GraphError::InvalidTopology(format!(
                    "row_ptr not monotonic at node {}",
                    node
                )));
            }
        }

        let end = *self.row_ptr.last().unwrap_or(&0);
        if end as usize != self.edge_dest.len() {
            return Err(GraphError::InvalidTopology(format!(
                "row_ptr ends at {} but there are {} edges",
                end,
                self.edge_dest.len()
            )));
        }

        let num_nodes = self.num_nodes();
        if let Some((edge, &dest)) = self
            .edge_dest
            .iter()
            .enumerate()
            .find(|(_, dest)| **dest as usize >= num_nodes)
        {
            return Err(GraphError::InvalidTopology(format!(
                "edge {} points to node {} (graph has {} nodes)",
                edge, dest, num_nodes
            )));
        }

        for (axis, schema, columns, expected) in [
            (Axis::Node, &self.node_schema, &self.node_columns, num_nodes),
            (
                Axis::Edge,
                &self.edge_schema,
                &self.edge_columns,
                self.num_edges(),
            ),
        ] {
            for (field, column) in schema.iter().zip(columns.iter()) {
                if column.len() != expected {
                    return Err(GraphError::ColumnLength {
                        axis,
                        name: field.name.clone(),
                        expected,
                        found: column.len(),
                    });
                }
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Topology
    // ------------------------------------------------------------------------

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.row_ptr.len().saturating_sub(1)
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.edge_dest.len()
    }

    /// All node IDs in ascending order
    pub fn nodes(&self) -> Range<NodeId> {
        0..self.num_nodes() as NodeId
    }

    fn check_node(&self, node: NodeId) -> Result<usize, GraphError> {
        let idx = node as usize;
        if idx >= self.num_nodes() {
            return Err(GraphError::NodeOutOfRange {
                node: node as u64,
                num_nodes: self.num_nodes(),
            });
        }
        Ok(idx)
    }

    /// Edge-ID range of a node's outgoing edges
    pub fn edges(&self, node: NodeId) -> Result<Range<EdgeId>, GraphError> {
        let idx = self.check_node(node)?;
        Ok(self.row_ptr[idx]..self.row_ptr[idx + 1])
    }

    /// Destination node of an edge
    pub fn edge_dest(&self, edge: EdgeId) -> Result<NodeId, GraphError> {
        self.edge_dest
            .get(edge as usize)
            .copied()
            .ok_or(GraphError::EdgeOutOfRange {
                edge,
                num_edges: self.num_edges(),
            })
    }

    /// Outgoing edges of a node as `(edge, destination)` pairs
    pub fn out_edges(
        &self,
        node: NodeId,
    ) -> Result<impl Iterator<Item = (EdgeId, NodeId)> + '_, GraphError> {
        let range = self.edges(node)?;
        let start = range.start;
        let dests = &self.edge_dest[range.start as usize..range.end as usize];
        Ok(dests
            .iter()
            .enumerate()
            .map(move |(offset, &dest)| (start + offset as EdgeId, dest)))
    }

    /// Number of outgoing edges of a node
    pub fn out_degree(&self, node: NodeId) -> Result<usize, GraphError> {
        let range = self.edges(node)?;
        Ok((range.end - range.start) as usize)
    }

    /// Raw row pointers (length = num_nodes + 1)
    pub fn row_ptr(&self) -> &[EdgeId] {
        &self.row_ptr
    }

    /// Destination of every edge, indexed by edge ID
    pub fn edge_destinations(&self) -> &[NodeId] {
        &self.edge_dest
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    pub fn node_schema(&self) -> &Schema {
        &self.node_schema
    }

    pub fn edge_schema(&self) -> &Schema {
        &self.edge_schema
    }

    /// Edge property column by name
    pub fn edge_property(&self, name: &str) -> Result<&PropertyColumn, GraphError> {
        self.edge_schema
            .index_of(name)
            .map(|i| &self.edge_columns[i])
            .ok_or_else(|| GraphError::PropertyNotFound {
                axis: Axis::Edge,
                name: name.to_string(),
            })
    }

    /// Edge property column by schema position
    pub fn edge_property_at(&self, index: usize) -> Result<&PropertyColumn, GraphError> {
        self.edge_columns
            .get(index)
            .ok_or(GraphError::PropertyIndexOutOfRange {
                axis: Axis::Edge,
                index,
                len: self.edge_schema.len(),
            })
    }

    /// Node property column by name
    pub fn node_property(&self, name: &str) -> Result<&PropertyColumn, GraphError> {
        self.node_schema
            .index_of(name)
            .map(|i| &self.node_columns[i])
            .ok_or_else(|| GraphError::PropertyNotFound {
                axis: Axis::Node,
                name: name.to_string(),
            })
    }

    /// Node property column by schema position
    pub fn node_property_at(&self, index: usize) -> Result<&PropertyColumn, GraphError> {
        self.node_columns
            .get(index)
            .ok_or(GraphError::PropertyIndexOutOfRange {
                axis: Axis::Node,
                index,
                len: self.node_schema.len(),
            })
    }

    /// Schema fields paired with their columns
    pub fn properties(&self, axis: Axis) -> impl Iterator<Item = (&PropertyField, &PropertyColumn)> {
        let (schema, columns) = match axis {
            Axis::Node => (&self.node_schema, &self.node_columns),
            Axis::Edge => (&self.edge_schema, &self.edge_columns),
        };
        schema.iter().zip(columns.iter())
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Incremental builder for [`PropertyGraph`].
///
/// Edges may be added in any order; `build` groups them by source node with a
/// stable counting sort, so edges of one node keep the order they were added in.
#[derive(Debug, Clone)]
pub struct PropertyGraphBuilder {
    num_nodes: usize,
    sources: Vec<NodeId>,
    dests: Vec<NodeId>,
    edge_fields: Vec<PropertyField>,
    edge_columns: Vec<PropertyColumn>,
    node_properties: Vec<(PropertyField, PropertyColumn)>,
}

impl PropertyGraphBuilder {
    /// Create a builder for a graph with `num_nodes` nodes
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            sources: Vec::new(),
            dests: Vec::new(),
            edge_fields: Vec::new(),
            edge_columns: Vec::new(),
            node_properties: Vec::new(),
        }
    }

    /// Reserve space for `additional` edges
    pub fn reserve_edges(&mut self, additional: usize) {
        self.sources.reserve(additional);
        self.dests.reserve(additional);
        for column in &mut self.edge_columns {
            column.reserve(additional);
        }
    }

    /// Declare an edge property. Must be called before any edge is added.
    pub fn edge_property(
        mut self,
        name: impl Into<String>,
        data_type: PropertyType,
    ) -> Result<Self, GraphError> {
        let name = name.into();
        if self.edge_fields.iter().any(|f| f.name == name) {
            return Err(GraphError::DuplicateProperty {
                axis: Axis::Edge,
                name,
            });
        }
        if !self.dests.is_empty() {
            return Err(GraphError::InvalidTopology(format!(
                "edge property '{}' declared after edges were added",
                name
            )));
        }
        self.edge_fields.push(PropertyField::new(name, data_type));
        self.edge_columns.push(PropertyColumn::empty(data_type));
        Ok(self)
    }

    /// Attach a complete node property column
    pub fn node_property(
        mut self,
        name: impl Into<String>,
        column: PropertyColumn,
    ) -> Result<Self, GraphError> {
        let field = PropertyField::new(name, column.data_type());
        if column.len() != self.num_nodes {
            return Err(GraphError::ColumnLength {
                axis: Axis::Node,
                name: field.name,
                expected: self.num_nodes,
                found: column.len(),
            });
        }
        self.node_properties.push((field, column));
        Ok(self)
    }

    /// Add an edge with one value per declared edge property, in schema order.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        dest: NodeId,
        values: Vec<PropertyValue>,
    ) -> Result<(), GraphError> {
        for node in [source, dest] {
            if node as usize >= self.num_nodes {
                return Err(GraphError::NodeOutOfRange {
                    node: node as u64,
                    num_nodes: self.num_nodes,
                });
            }
        }
        if values.len() != self.edge_fields.len() {
            return Err(GraphError::Arity {
                expected: self.edge_fields.len(),
                found: values.len(),
            });
        }
        // Type-check everything before mutating so a failed edge leaves no trace
        for (field, value) in self.edge_fields.iter().zip(values.iter()) {
            if field.data_type != value.data_type() {
                return Err(GraphError::TypeMismatch {
                    axis: Axis::Edge,
                    name: field.name.clone(),
                    expected: field.data_type,
                    found: value.data_type(),
                });
            }
        }
        for (column, value) in self.edge_columns.iter_mut().zip(values) {
            // Types were checked above
            let _ = column.push(value);
        }
        self.sources.push(source);
        self.dests.push(dest);
        Ok(())
    }

    /// Number of edges added so far
    pub fn edge_count(&self) -> usize {
        self.dests.len()
    }

    /// Group edges by source and produce the final graph
    pub fn build(self) -> Result<PropertyGraph, GraphError> {
        let mut row_ptr = vec![0 as EdgeId; self.num_nodes + 1];
        for &source in &self.sources {
            row_ptr[source as usize + 1] += 1;
        }
        for i in 0..self.num_nodes {
            row_ptr[i + 1] += row_ptr[i];
        }

        // order[new_position] = insertion index
        let mut cursor: Vec<EdgeId> = row_ptr[..self.num_nodes].to_vec();
        let mut order = vec![0usize; self.sources.len()];
        for (insertion, &source) in self.sources.iter().enumerate() {
            let slot = &mut cursor[source as usize];
            order[*slot as usize] = insertion;
            *slot += 1;
        }

        let edge_dest = order.iter().map(|&i| self.dests[i]).collect();
        let edge_properties = self
            .edge_fields
            .into_iter()
            .zip(self.edge_columns.iter().map(|c| c.gather(&order)))
            .collect();

        PropertyGraph::from_parts(row_ptr, edge_dest, self.node_properties, edge_properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn diamond() -> PropertyGraph {
        // Edges deliberately added out of source order
        let mut builder = PropertyGraphBuilder::new(4)
            .edge_property("w", PropertyType::Int64)
            .unwrap();
        builder.add_edge(2, 3, vec![PropertyValue::Int(30)]).unwrap();
        builder.add_edge(0, 1, vec![PropertyValue::Int(10)]).unwrap();
        builder.add_edge(1, 3, vec![PropertyValue::Int(20)]).unwrap();
        builder.add_edge(0, 2, vec![PropertyValue::Int(11)]).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_build_groups_edges_by_source() {
        let g = diamond();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.edges(0).unwrap(), 0..2);
        assert_eq!(g.edges(1).unwrap(), 2..3);
        assert_eq!(g.edges(2).unwrap(), 3..4);
        assert_eq!(g.edges(3).unwrap(), 4..4);
        assert_eq!(g.edge_destinations(), &[1, 2, 3, 3]);
    }

    #[test]
    fn test_build_permutes_edge_columns_with_topology() {
        let g = diamond();
        assert_eq!(
            g.edge_property("w").unwrap(),
            &PropertyColumn::Int64(vec![10, 11, 20, 30])
        );
        assert_eq!(g.edge_property("w").unwrap(), g.edge_property_at(0).unwrap());
    }

    #[test]
    fn test_out_edges_yield_ids_and_destinations() {
        let g = diamond();
        let out: Vec<_> = g.out_edges(0).unwrap().collect();
        assert_eq!(out, vec![(0, 1), (1, 2)]);
        assert_eq!(g.out_degree(3).unwrap(), 0);
    }

    #[test]
    fn test_lookups_out_of_range() {
        let g = diamond();
        assert!(matches!(g.edges(4), Err(GraphError::NodeOutOfRange { node: 4, .. })));
        assert!(matches!(g.edge_dest(4), Err(GraphError::EdgeOutOfRange { edge: 4, .. })));
        assert!(matches!(
            g.edge_property("missing"),
            Err(GraphError::PropertyNotFound { .. })
        ));
        assert!(matches!(
            g.edge_property_at(1),
            Err(GraphError::PropertyIndexOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_add_edge_rejects_bad_values() {
        let mut builder = PropertyGraphBuilder::new(2)
            .edge_property("w", PropertyType::Int64)
            .unwrap();
        assert!(matches!(
            builder.add_edge(0, 1, vec![]),
            Err(GraphError::Arity { expected: 1, found: 0 })
        ));
        assert!(matches!(
            builder.add_edge(0, 1, vec![PropertyValue::Bool(true)]),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            builder.add_edge(0, 2, vec![PropertyValue::Int(1)]),
            Err(GraphError::NodeOutOfRange { node: 2, .. })
        ));
        assert_eq!(builder.edge_count(), 0);
    }

    #[test]
    fn test_edge_property_after_edges_is_rejected() {
        let mut builder = PropertyGraphBuilder::new(2);
        builder.add_edge(0, 1, vec![]).unwrap();
        assert!(builder.edge_property("late", PropertyType::Int64).is_err());
    }

    #[test]
    fn test_from_parts_rejects_broken_topology() {
        let overlapping = PropertyGraph::from_parts(vec![0, 2, 1], vec![1, 0], vec![], vec![]);
        assert!(matches!(overlapping, Err(GraphError::InvalidTopology(_))));

        let dangling = PropertyGraph::from_parts(vec![0, 1, 1], vec![5], vec![], vec![]);
        assert!(matches!(dangling, Err(GraphError::InvalidTopology(_))));

        let short_column = PropertyGraph::from_parts(
            vec![0, 1, 1],
            vec![1],
            vec![],
            vec![(
                PropertyField::new("w", PropertyType::Int64),
                PropertyColumn::Int64(vec![]),
            )],
        );
        assert!(matches!(short_column, Err(GraphError::ColumnLength { .. })));
    }

    #[test]
    fn test_node_properties_must_cover_every_node() {
        let mut g = PropertyGraph::empty(3);
        let err = g
            .add_node_property("label", PropertyColumn::Int64(vec![1, 2]))
            .unwrap_err();
        assert!(matches!(err, GraphError::ColumnLength { expected: 3, found: 2, .. }));

        g.add_node_property("label", PropertyColumn::Int64(vec![1, 2, 3]))
            .unwrap();
        assert_eq!(g.node_schema().len(), 1);
        assert_eq!(g.node_property("label").unwrap(), g.node_property_at(0).unwrap());
    }

    #[test]
    fn test_empty_graph_has_no_edges() {
        let g = PropertyGraph::empty(0);
        assert_eq!(g.num_nodes(), 0);
        assert_eq!(g.num_edges(), 0);
        assert!(g.validate().is_ok());
        assert_eq!(g.nodes().count(), 0);
    }
}
