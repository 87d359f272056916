//! Translator integration tests
//!
//! Forward translation of the 8/12 fixture against its literal
//! expectations, reverse translation of generated R-MAT graphs, and round
//! trips through both directions.

mod common;

use graphbridge_core::{
    check_round_trip, clean, generate_rmat, to_multigraph, to_multigraph_with_ids, to_property_graph, verify_forward,
    verify_reverse, weighted_directed_8_12, weighted_directed_8_12_expectations, IsolatedNodes,
    CleanOptions, NodeKey, PropertyColumn, RmatConfig, TranslateOptions, VerificationError,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Forward
// ============================================================================

#[test]
fn test_fixture_forward_translation() {
    let translation =
        to_property_graph(&weighted_directed_8_12(), &TranslateOptions::default()).unwrap();
    verify_forward(&translation, &weighted_directed_8_12_expectations()).unwrap();

    let graph = &translation.graph;
    assert_eq!(graph.row_ptr(), &[0, 3, 5, 8, 9, 10, 12, 12, 12]);
    assert_eq!(graph.edge_schema().names(), vec!["value_from_translator"]);
    assert!(graph.node_schema().is_empty());
}

#[test]
fn test_forward_expectations_catch_wrong_values() {
    let translation =
        to_property_graph(&weighted_directed_8_12(), &TranslateOptions::default()).unwrap();
    let mut expected = weighted_directed_8_12_expectations();
    if let Some((_, _, ref mut values)) = expected.edge_values {
        values.swap(0, 1);
    }
    assert!(matches!(
        verify_forward(&translation, &expected),
        Err(VerificationError::PropertyValues { .. })
    ));
}

#[test]
fn test_fixture_round_trip() {
    let original = weighted_directed_8_12();
    let options = TranslateOptions::default();
    let translation = to_property_graph(&original, &options).unwrap();
    let back = to_multigraph_with_ids(&translation.graph, &translation.node_ids, &options).unwrap();

    check_round_trip(&original, &back).unwrap();
}

#[test]
fn test_string_keys_round_trip() {
    let mut original = graphbridge_core::AttributedMultigraph::new();
    original.add_weighted_edges(
        [("b", "a", 1.5f64), ("a", "c", 2.0), ("a", "c", 2.0), ("c", "b", 0.25)],
        "value",
    );
    let options = TranslateOptions::default();
    let translation = to_property_graph(&original, &options).unwrap();

    assert_eq!(translation.node_ids.id(&NodeKey::from("a")), Some(0));
    assert_eq!(
        translation.graph.edge_property_at(0).unwrap(),
        &PropertyColumn::Float64(vec![2.0, 2.0, 1.5, 0.25])
    );

    let back = to_multigraph_with_ids(&translation.graph, &translation.node_ids, &options).unwrap();
    check_round_trip(&original, &back).unwrap();
    assert_eq!(back.edge_multiplicity(&"a".into(), &"c".into()), 2);
}

// ============================================================================
// Reverse
// ============================================================================

#[test]
fn test_rmat_reverse_translation() {
    let graph = common::small_rmat(8, 42);
    let reversed = to_multigraph(&graph, &TranslateOptions::default()).unwrap();

    let report = verify_reverse(&graph, &reversed).unwrap();
    assert_eq!(report.nodes.present + report.nodes.absent, graph.num_nodes());
    assert_eq!(report.reconciled_edges, graph.num_edges());
    assert_eq!(reversed.edge_count(), graph.num_edges());
}

/// The full-size cleaned R-MAT graph (scale 15, edge factor 16).
#[test]
#[cfg_attr(debug_assertions, ignore = "full-size R-MAT graph; run with --release")]
fn test_full_rmat_reverse_translation() {
    let config = RmatConfig::default();
    assert_eq!((config.scale, config.edge_factor), (15, 16));

    let raw = generate_rmat(&config).unwrap();
    let (graph, report) = clean(&raw, &CleanOptions::default()).unwrap();
    assert!(report.self_loops + report.parallel_edges > 0);
    assert_eq!(graph.num_nodes(), 32768);

    let reversed = to_multigraph(&graph, &TranslateOptions::default()).unwrap();
    let report = verify_reverse(&graph, &reversed).unwrap();
    assert_eq!(report.nodes.present + report.nodes.absent, 32768);
    assert_eq!(report.reconciled_edges, graph.num_edges());
    assert_eq!(reversed.edge_count(), graph.num_edges());
}

#[test]
fn test_rmat_reverse_keeping_isolated_nodes() {
    let graph = common::small_rmat(7, 3);
    let options = TranslateOptions::default().with_isolated_nodes(IsolatedNodes::Keep);
    let reversed = to_multigraph(&graph, &options).unwrap();

    let report = verify_reverse(&graph, &reversed).unwrap();
    assert_eq!(report.nodes.present, graph.num_nodes());
    assert_eq!(report.nodes.absent, 0);
}

#[test]
fn test_reverse_with_isolated_nodes_accounted() {
    // Nodes 3 and 5 have no edges at all
    let graph = common::weighted(6, &[(0, 1, 1), (1, 2, 2), (2, 0, 3), (4, 0, 4)]);
    let reversed = to_multigraph(&graph, &TranslateOptions::default()).unwrap();

    let report = verify_reverse(&graph, &reversed).unwrap();
    assert_eq!(report.nodes.present, 4);
    assert_eq!(report.nodes.absent, 2);
    assert!(!reversed.contains_node(&NodeKey::Int(3)));
}

#[test]
fn test_reverse_detects_extra_node() {
    let graph = common::weighted(3, &[(0, 1, 1), (1, 2, 2)]);
    let mut reversed = to_multigraph(&graph, &TranslateOptions::default()).unwrap();
    reversed.add_node(9i64, Default::default());

    assert!(verify_reverse(&graph, &reversed).is_err());
}

#[test]
fn test_rmat_forward_after_reverse() {
    let graph = common::small_rmat(6, 11);
    let options = TranslateOptions::default().with_isolated_nodes(IsolatedNodes::Keep);
    let reversed = to_multigraph(&graph, &options).unwrap();
    let forward = to_property_graph(&reversed, &options).unwrap();

    // Integer keys sort numerically, so IDs are preserved
    assert_eq!(forward.graph.row_ptr(), graph.row_ptr());
    assert_eq!(forward.graph.edge_destinations(), graph.edge_destinations());
    assert_eq!(
        forward.graph.edge_property("value_from_translator").unwrap(),
        graph.edge_property("value").unwrap()
    );
}
