//! GraphBridge Core - Graph model translation and verification
//!
//! This crate provides:
//! - An attributed directed multigraph (the source model)
//! - A CSR property graph with typed node and edge properties (the target model)
//! - Translators between the two models
//! - A verification harness that checks translations structurally
//! - Fixture graphs, an R-MAT generator and a cleaning pass
//! - SQLite-backed RDG datasets and the test-dataset manifest checker

pub mod datasets;
pub mod fixtures;
pub mod multigraph;
pub mod property;
pub mod property_graph;
pub mod rdg;
pub mod translate;
pub mod verify;

// Model re-exports
pub use multigraph::{Attributes, AttributedMultigraph, NodeEntry, NodeKey};
pub use property::{PropertyColumn, PropertyField, PropertyType, PropertyValue, Schema};
pub use property_graph::{Axis, EdgeId, GraphError, NodeId, PropertyGraph, PropertyGraphBuilder};

// Translator re-exports
pub use translate::{
    to_multigraph, to_multigraph_with_ids, to_property_graph, IsolatedNodes, NodeIdMap,
    TranslateError, TranslateOptions, Translation, DEFAULT_EDGE_PROPERTY, DEFAULT_VALUE_ATTRIBUTE,
};

// Verification re-exports
pub use verify::{
    check_absent_nodes, check_edge_count, check_edge_property, check_edge_reconciliation,
    check_node_count, check_round_trip, check_schema, check_topology, verify_forward,
    verify_reverse, ExpectedNode, ForwardExpectations, NodeAccounting, ReverseReport,
    VerificationError, VerifyResult,
};

// Fixture re-exports
pub use fixtures::{
    clean, generate_rmat, generate_rmat_with_progress, weighted_directed_8_12,
    weighted_directed_8_12_expectations, CleanOptions, CleanReport, RmatConfig,
};

// Storage re-exports
pub use datasets::{
    discover_datasets, find_repo_root, render_manifest, DatasetDir, DatasetError,
    ManifestChecker,
};
pub use rdg::{RdgError, RdgStats, RdgStore};
