//! SQLite Schema Definitions for RDG Storage
//!
//! An RDG dataset is a directory holding a single `graph.db` database with
//! the CSR topology and the columnar properties of one property graph.

/// Schema version for RDG databases
pub const RDG_SCHEMA_VERSION: &str = "1.0";

/// File name of the database inside a dataset directory
pub const RDG_DB_FILE: &str = "graph.db";

/// SQL to create the metadata table
pub const SCHEMA_CREATE_METADATA: &str = r#"
CREATE TABLE IF NOT EXISTS rdg_metadata (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
"#;

/// SQL to create the topology table
///
/// One row per node. `edge_end` is the exclusive end of the node's edge
/// range; the range starts at the previous node's `edge_end` (or 0).
pub const SCHEMA_CREATE_TOPOLOGY: &str = r#"
CREATE TABLE IF NOT EXISTS topology (
    node INTEGER PRIMARY KEY NOT NULL,
    edge_end INTEGER NOT NULL
)
"#;

/// SQL to create the edges table
///
/// Edge IDs are dense and grouped by source node.
pub const SCHEMA_CREATE_EDGES: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY NOT NULL,
    dest INTEGER NOT NULL
)
"#;

/// SQL to create the properties table
///
/// One row per property column; `values_json` holds the whole column.
pub const SCHEMA_CREATE_PROPERTIES: &str = r#"
CREATE TABLE IF NOT EXISTS properties (
    axis TEXT NOT NULL,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    data_type TEXT NOT NULL,
    values_json TEXT NOT NULL,

    PRIMARY KEY (axis, position),
    UNIQUE (axis, name)
)
"#;

/// Metadata keys
pub const META_SCHEMA_VERSION: &str = "schema_version";
pub const META_NAME: &str = "name";
pub const META_NUM_NODES: &str = "num_nodes";
pub const META_NUM_EDGES: &str = "num_edges";

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();

        conn.execute(SCHEMA_CREATE_METADATA, []).unwrap();
        conn.execute(SCHEMA_CREATE_TOPOLOGY, []).unwrap();
        conn.execute(SCHEMA_CREATE_EDGES, []).unwrap();
        conn.execute(SCHEMA_CREATE_PROPERTIES, []).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(tables, vec!["edges", "properties", "rdg_metadata", "topology"]);
    }

    #[test]
    fn test_property_names_unique_per_axis() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(SCHEMA_CREATE_PROPERTIES, []).unwrap();

        let insert = "INSERT INTO properties (axis, position, name, data_type, values_json) VALUES (?1, ?2, ?3, 'int64', '[]')";
        conn.execute(insert, rusqlite::params!["edge", 0, "w"]).unwrap();
        conn.execute(insert, rusqlite::params!["node", 0, "w"]).unwrap();
        assert!(conn.execute(insert, rusqlite::params!["edge", 1, "w"]).is_err());
    }
}
