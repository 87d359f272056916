//! Common test utilities for integration tests.

#![allow(dead_code)]

use graphbridge_core::{
    clean, generate_rmat, CleanOptions, PropertyGraph, PropertyType, PropertyValue,
    PropertyGraphBuilder, RmatConfig,
};

/// A small cleaned R-MAT graph; `scale` keeps tests fast
pub fn small_rmat(scale: u32, seed: u64) -> PropertyGraph {
    let config = RmatConfig {
        scale,
        edge_factor: 8,
        seed,
        ..Default::default()
    };
    let raw = generate_rmat(&config).expect("R-MAT generation failed");
    let (cleaned, _) = clean(&raw, &CleanOptions::default()).expect("cleaning failed");
    cleaned
}

/// Build a property graph with a single int64 edge property `w`
pub fn weighted(num_nodes: usize, edges: &[(u32, u32, i64)]) -> PropertyGraph {
    let mut builder = PropertyGraphBuilder::new(num_nodes)
        .edge_property("w", PropertyType::Int64)
        .expect("schema");
    for &(src, dst, w) in edges {
        builder
            .add_edge(src, dst, vec![PropertyValue::Int(w)])
            .expect("edge");
    }
    builder.build().expect("build")
}
