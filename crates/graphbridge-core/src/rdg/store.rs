//! SQLite RDG Connection and Graph I/O
//!
//! Writes a [`PropertyGraph`] into a dataset directory and reads it back.
//! Writes replace the stored graph as a whole inside one transaction.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::schema::{
    META_NAME, META_NUM_EDGES, META_NUM_NODES, META_SCHEMA_VERSION, RDG_DB_FILE,
    RDG_SCHEMA_VERSION, SCHEMA_CREATE_EDGES, SCHEMA_CREATE_METADATA, SCHEMA_CREATE_PROPERTIES,
    SCHEMA_CREATE_TOPOLOGY,
};
use crate::property::{PropertyColumn, PropertyField, PropertyType};
use crate::property_graph::{Axis, EdgeId, GraphError, NodeId, PropertyGraph};

/// Errors that can occur during RDG operations
#[derive(Debug, Error)]
pub enum RdgError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: String, found: String },

    #[error("RDG not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Corrupt RDG: {0}")]
    Corrupt(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// A connection to an RDG dataset directory
pub struct RdgStore {
    conn: Connection,
    dir: PathBuf,
}

impl RdgStore {
    /// Open an existing RDG dataset
    pub fn open(dir: &Path) -> Result<Self, RdgError> {
        let db_path = dir.join(RDG_DB_FILE);
        if !db_path.is_file() {
            return Err(RdgError::NotFound(dir.to_path_buf()));
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;
        let store = Self {
            conn,
            dir: dir.to_path_buf(),
        };

        match store.get_metadata(META_SCHEMA_VERSION)? {
            Some(version) if version == RDG_SCHEMA_VERSION => {}
            Some(version) => {
                return Err(RdgError::SchemaVersionMismatch {
                    expected: RDG_SCHEMA_VERSION.to_string(),
                    found: version,
                });
            }
            None => {
                return Err(RdgError::Corrupt(format!(
                    "{} has no schema version",
                    db_path.display()
                )));
            }
        }

        Ok(store)
    }

    /// Create a dataset directory and its schema. An existing dataset is reused.
    pub fn create(dir: &Path) -> Result<Self, RdgError> {
        std::fs::create_dir_all(dir)?;

        let conn = Connection::open(dir.join(RDG_DB_FILE))?;
        Self::configure_connection(&conn)?;

        conn.execute(SCHEMA_CREATE_METADATA, [])?;
        conn.execute(SCHEMA_CREATE_TOPOLOGY, [])?;
        conn.execute(SCHEMA_CREATE_EDGES, [])?;
        conn.execute(SCHEMA_CREATE_PROPERTIES, [])?;

        let store = Self {
            conn,
            dir: dir.to_path_buf(),
        };
        store.set_metadata(META_SCHEMA_VERSION, RDG_SCHEMA_VERSION)?;
        if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
            store.set_metadata(META_NAME, name)?;
        }

        Ok(store)
    }

    fn configure_connection(conn: &Connection) -> SqliteResult<()> {
        // Rollback journal keeps the dataset a single file at rest
        conn.pragma_update(None, "journal_mode", "DELETE")?;
        conn.pragma_update(None, "cache_size", -64000)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        Ok(())
    }

    /// Dataset directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Metadata Operations
    // =========================================================================

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>, RdgError> {
        let result = self
            .conn
            .query_row(
                "SELECT value FROM rdg_metadata WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<(), RdgError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO rdg_metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn count_metadata(&self, key: &str) -> Result<usize, RdgError> {
        let value = self
            .get_metadata(key)?
            .ok_or_else(|| RdgError::Corrupt(format!("missing metadata '{}'", key)))?;
        value
            .parse()
            .map_err(|_| RdgError::Corrupt(format!("metadata '{}' is not a count: {}", key, value)))
    }

    // =========================================================================
    // Graph I/O
    // =========================================================================

    /// Replace the stored graph with `graph`
    pub fn write_graph(&self, graph: &PropertyGraph) -> Result<(), RdgError> {
        graph.validate()?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM topology", [])?;
        tx.execute("DELETE FROM edges", [])?;
        tx.execute("DELETE FROM properties", [])?;

        {
            let mut stmt = tx.prepare("INSERT INTO topology (node, edge_end) VALUES (?1, ?2)")?;
            for (node, edge_end) in graph.row_ptr().iter().skip(1).enumerate() {
                stmt.execute(params![node as i64, *edge_end as i64])?;
            }
        }

        {
            let mut stmt = tx.prepare("INSERT INTO edges (id, dest) VALUES (?1, ?2)")?;
            for (id, dest) in graph.edge_destinations().iter().enumerate() {
                stmt.execute(params![id as i64, *dest as i64])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO properties (axis, position, name, data_type, values_json)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for axis in [Axis::Node, Axis::Edge] {
                for (position, (field, column)) in graph.properties(axis).enumerate() {
                    stmt.execute(params![
                        axis.as_str(),
                        position as i64,
                        field.name,
                        field.data_type.as_str(),
                        column_to_json(column)?,
                    ])?;
                }
            }
        }

        tx.execute(
            "INSERT OR REPLACE INTO rdg_metadata (key, value) VALUES (?1, ?2)",
            params![META_NUM_NODES, graph.num_nodes().to_string()],
        )?;
        tx.execute(
            "INSERT OR REPLACE INTO rdg_metadata (key, value) VALUES (?1, ?2)",
            params![META_NUM_EDGES, graph.num_edges().to_string()],
        )?;

        tx.commit()?;
        info!(
            "Wrote RDG {}: {} nodes, {} edges",
            self.dir.display(),
            graph.num_nodes(),
            graph.num_edges()
        );
        Ok(())
    }

    /// Load the stored graph
    pub fn read_graph(&self) -> Result<PropertyGraph, RdgError> {
        let num_nodes = self.count_metadata(META_NUM_NODES)?;
        let num_edges = self.count_metadata(META_NUM_EDGES)?;

        // Counts come from the file, so vectors grow from the rows actually read
        let mut row_ptr: Vec<EdgeId> = vec![0];
        {
            let mut stmt = self
                .conn
                .prepare("SELECT node, edge_end FROM topology ORDER BY node")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
            for (expected, row) in rows.enumerate() {
                let (node, edge_end) = row?;
                if node != expected as i64 || edge_end < 0 {
                    return Err(RdgError::Corrupt(format!(
                        "topology row {} has node {} and edge_end {}",
                        expected, node, edge_end
                    )));
                }
                row_ptr.push(edge_end as EdgeId);
            }
        }
        if row_ptr.len() - 1 != num_nodes {
            return Err(RdgError::Corrupt(format!(
                "expected {} topology rows, found {}",
                num_nodes,
                row_ptr.len() - 1
            )));
        }

        let mut edge_dest: Vec<NodeId> = Vec::new();
        {
            let mut stmt = self.conn.prepare("SELECT id, dest FROM edges ORDER BY id")?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?;
            for (expected, row) in rows.enumerate() {
                let (id, dest) = row?;
                let dest = NodeId::try_from(dest).ok().filter(|_| id == expected as i64);
                match dest {
                    Some(dest) => edge_dest.push(dest),
                    None => {
                        return Err(RdgError::Corrupt(format!("edge row {} is malformed", expected)))
                    }
                }
            }
        }
        if edge_dest.len() != num_edges {
            return Err(RdgError::Corrupt(format!(
                "expected {} edges, found {}",
                num_edges,
                edge_dest.len()
            )));
        }

        let node_properties = self.read_properties(Axis::Node)?;
        let edge_properties = self.read_properties(Axis::Edge)?;

        let graph = PropertyGraph::from_parts(row_ptr, edge_dest, node_properties, edge_properties)?;
        debug!(
            "Read RDG {}: {} nodes, {} edges",
            self.dir.display(),
            graph.num_nodes(),
            graph.num_edges()
        );
        Ok(graph)
    }

    fn read_properties(&self, axis: Axis) -> Result<Vec<(PropertyField, PropertyColumn)>, RdgError> {
        let mut stmt = self.conn.prepare(
            "SELECT position, name, data_type, values_json FROM properties WHERE axis = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map([axis.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut properties = Vec::new();
        for (expected, row) in rows.enumerate() {
            let (position, name, data_type, values_json) = row?;
            if position != expected as i64 {
                return Err(RdgError::Corrupt(format!(
                    "{} property '{}' at position {}, expected {}",
                    axis, name, position, expected
                )));
            }
            let data_type = PropertyType::parse(&data_type).ok_or_else(|| {
                RdgError::Corrupt(format!("{} property '{}' has unknown type '{}'", axis, name, data_type))
            })?;
            let column = column_from_json(data_type, &values_json)?;
            properties.push((PropertyField::new(name, data_type), column));
        }
        Ok(properties)
    }

    /// Summary of the stored graph without loading it
    pub fn stats(&self) -> Result<RdgStats, RdgError> {
        let mut stmt = self.conn.prepare(
            "SELECT axis, name, data_type FROM properties ORDER BY axis DESC, position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut node_properties = Vec::new();
        let mut edge_properties = Vec::new();
        for row in rows {
            let (axis, name, data_type) = row?;
            let summary = PropertySummary { name, data_type };
            match axis.as_str() {
                "node" => node_properties.push(summary),
                "edge" => edge_properties.push(summary),
                other => return Err(RdgError::Corrupt(format!("unknown property axis '{}'", other))),
            }
        }

        Ok(RdgStats {
            name: self.get_metadata(META_NAME)?.unwrap_or_default(),
            schema_version: self.get_metadata(META_SCHEMA_VERSION)?.unwrap_or_default(),
            num_nodes: self.count_metadata(META_NUM_NODES)?,
            num_edges: self.count_metadata(META_NUM_EDGES)?,
            node_properties,
            edge_properties,
        })
    }
}

/// A property as listed by [`RdgStore::stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySummary {
    pub name: String,
    pub data_type: String,
}

/// Statistics about a stored RDG
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RdgStats {
    pub name: String,
    pub schema_version: String,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub node_properties: Vec<PropertySummary>,
    pub edge_properties: Vec<PropertySummary>,
}

fn column_to_json(column: &PropertyColumn) -> serde_json::Result<String> {
    match column {
        PropertyColumn::Int64(v) => serde_json::to_string(v),
        PropertyColumn::Float64(v) => serde_json::to_string(v),
        PropertyColumn::Boolean(v) => serde_json::to_string(v),
        PropertyColumn::String(v) => serde_json::to_string(v),
    }
}

fn column_from_json(data_type: PropertyType, json: &str) -> serde_json::Result<PropertyColumn> {
    Ok(match data_type {
        PropertyType::Int64 => PropertyColumn::Int64(serde_json::from_str(json)?),
        PropertyType::Float64 => PropertyColumn::Float64(serde_json::from_str(json)?),
        PropertyType::Boolean => PropertyColumn::Boolean(serde_json::from_str(json)?),
        PropertyType::String => PropertyColumn::String(serde_json::from_str(json)?),
    })
}

// ============================================================================
// Directory Helpers
// ============================================================================

/// Write `graph` as an RDG in `dir`, creating it if needed
pub fn save(dir: &Path, graph: &PropertyGraph) -> Result<(), RdgError> {
    RdgStore::create(dir)?.write_graph(graph)
}

/// Load the RDG stored in `dir`
pub fn load(dir: &Path) -> Result<PropertyGraph, RdgError> {
    RdgStore::open(dir)?.read_graph()
}

/// Load the dataset called `name` under the dataset root
pub fn load_named(root: &Path, name: &str) -> Result<PropertyGraph, RdgError> {
    load(&root.join(name))
}
