//! On-disk RDG datasets
//!
//! Each dataset is a directory under the dataset root containing a SQLite
//! database with one property graph. Dataset directory names double as the
//! names registered in the test-dataset manifest (see [`crate::datasets`]).

pub mod schema;
pub mod store;

pub use schema::{RDG_DB_FILE, RDG_SCHEMA_VERSION};
pub use store::{load, load_named, save, PropertySummary, RdgError, RdgStats, RdgStore};
