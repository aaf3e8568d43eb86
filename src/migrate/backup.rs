//! Whole-file backup and restore around the id migration.
//!
//! The table swap includes drops and renames that SQLite does not reliably
//! roll back as part of a transaction, so the fallback is a physical copy of
//! the database file taken before anything is mutated.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const BACKUP_SUFFIX: &str = ".backup";

/// Sibling path the pre-migration copy is written to.
pub fn backup_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Copies the database file byte-for-byte next to the original.
pub fn create_backup(db_path: &Path) -> Result<PathBuf> {
    let backup = backup_path(db_path);
    fs::copy(db_path, &backup)
        .with_context(|| format!("Failed to back up database to {:?}", backup))?;
    Ok(backup)
}

/// Overwrites the database file with the pre-migration copy.
pub fn restore_backup(db_path: &Path, backup: &Path) -> Result<()> {
    fs::copy(backup, db_path)
        .with_context(|| format!("Failed to restore database from {:?}", backup))?;
    Ok(())
}
