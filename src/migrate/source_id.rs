//! Companion source-id column migration for the albums table.
//!
//! Adds a nullable `source_id` column backfilled from `source_uri`, or, when
//! the column is already present, rebuilds the table so the column sits in
//! its canonical position.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{info, warn};

use super::MigrationError;
use crate::collection_store::{count_rows, ALBUMS_TABLE_WITH_SOURCE_ID};
use crate::sqlite_persistence::table_column_names;

/// Outcome of a completed column migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIdSummary {
    pub total_albums: usize,
    pub with_source_id: usize,
    /// True when the column already existed and the table was rebuilt into
    /// canonical column order instead.
    pub rebuilt: bool,
}

/// The identifier is the last `:`-separated segment of the URI
/// (`spotify:album:<id>`).
pub fn source_id_from_uri(uri: &str) -> Option<&str> {
    let (_, id) = uri.rsplit_once(':')?;
    (!id.is_empty()).then_some(id)
}

pub fn add_source_id_column(db_path: &Path) -> Result<SourceIdSummary> {
    if !db_path.exists() {
        return Err(MigrationError::DatabaseNotFound(db_path.to_path_buf()).into());
    }

    let mut conn =
        Connection::open(db_path).context("Failed to open collection database")?;

    let columns = table_column_names(&conn, "albums")?;
    if columns.is_empty() {
        return Err(MigrationError::SchemaMismatch {
            table: "albums",
            detail: "table does not exist".to_string(),
        }
        .into());
    }

    let rebuilt = if columns.iter().any(|column| column == "source_id") {
        info!("Column source_id already exists, rebuilding table with canonical column order...");
        rebuild_with_canonical_order(&mut conn)?;
        info!("Table rebuilt with canonical column order");
        true
    } else {
        info!("Adding source_id column to albums...");
        add_and_backfill(&mut conn)?;
        false
    };

    let total_albums = count_rows(&conn, "SELECT COUNT(*) FROM albums")?;
    let with_source_id = count_rows(
        &conn,
        "SELECT COUNT(*) FROM albums WHERE source_id IS NOT NULL",
    )?;

    info!("Migration completed successfully");
    info!("Total albums: {}", total_albums);
    info!("Albums with source id: {}", with_source_id);
    if with_source_id < total_albums {
        warn!(
            "{} albums have no source id (possibly added manually)",
            total_albums - with_source_id
        );
    }

    Ok(SourceIdSummary {
        total_albums,
        with_source_id,
        rebuilt,
    })
}

fn add_and_backfill(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("ALTER TABLE albums ADD COLUMN source_id TEXT", [])?;

    let uris: Vec<(String, String)> = {
        let mut stmt = tx.prepare("SELECT id, source_uri FROM albums")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows
    };

    {
        let mut update = tx.prepare("UPDATE albums SET source_id = ?1 WHERE id = ?2")?;
        for (album_id, uri) in &uris {
            if let Some(source_id) = source_id_from_uri(uri) {
                update.execute(params![source_id, album_id])?;
            }
        }
    }

    tx.commit()?;
    Ok(())
}

fn rebuild_with_canonical_order(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    ALBUMS_TABLE_WITH_SOURCE_ID.create_as(&tx, "albums_new")?;
    tx.execute(
        "INSERT INTO albums_new
         SELECT id, source_id, name, primary_artist, artists, release_date,
                total_tracks, source_uri, added_at, album_type, images,
                updated_at, external_ids, release_group_id, in_library
         FROM albums",
        [],
    )?;
    tx.execute("DROP TABLE albums", [])?;
    tx.execute("ALTER TABLE albums_new RENAME TO albums", [])?;
    tx.commit()?;
    Ok(())
}
