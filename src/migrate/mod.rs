mod album_id;
mod album_ids;
mod backup;
mod remap;
mod source_id;

pub use album_id::album_id;
pub use album_ids::{migrate_album_ids, MigrationSummary};
pub use backup::{backup_path, create_backup, restore_backup, BACKUP_SUFFIX};
pub use remap::{CollisionGroup, RemapPlan};
pub use source_id::{add_source_id_column, source_id_from_uri, SourceIdSummary};

use std::path::PathBuf;
use thiserror::Error;

/// Failures detected before any database mutation takes place. Everything
/// else surfaces as a mid-migration error, after which the database file is
/// restored from the backup copy.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database not found: {0}")]
    DatabaseNotFound(PathBuf),

    #[error("Table {table} does not match the expected schema: {detail}")]
    SchemaMismatch { table: &'static str, detail: String },
}
