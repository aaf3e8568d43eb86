//! Record Collection Migration Tools
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod collection_store;
pub mod migrate;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use migrate::{
    add_source_id_column, album_id, migrate_album_ids, MigrationError, MigrationSummary,
    SourceIdSummary,
};
