//! Album id migration: recompute canonical ids and merge duplicates.
//!
//! Reads the full snapshot, builds a [`RemapPlan`], writes the transformed
//! rows into staging tables, and swaps them over the originals inside one
//! transaction. A physical backup taken before the first mutation is the
//! fallback for anything the transaction cannot undo.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use super::{backup, MigrationError, RemapPlan};
use crate::collection_store::{self, AlbumRow, REWRITTEN_TABLES};

/// Row counts written by a completed migration run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationSummary {
    pub albums: usize,
    pub merged_duplicates: usize,
    pub ratings: usize,
    pub tags: usize,
    pub memberships: usize,
}

const STAGING_SUFFIX: &str = "_new";

fn staging_name(table_name: &str) -> String {
    format!("{}{}", table_name, STAGING_SUFFIX)
}

/// Runs the migration against the database file at `db_path`.
///
/// The file is left either fully migrated or byte-identical to its
/// pre-migration state: on any failure after the backup exists, the open
/// transaction is rolled back and the file is overwritten from the backup.
pub fn migrate_album_ids(db_path: &Path) -> Result<MigrationSummary> {
    if !db_path.exists() {
        return Err(MigrationError::DatabaseNotFound(db_path.to_path_buf()).into());
    }

    let backup = backup::create_backup(db_path)?;
    info!("Created backup: {:?}", backup);

    let mut conn =
        Connection::open(db_path).context("Failed to open collection database")?;
    // The swap drops and recreates parent tables while children still
    // reference them.
    conn.execute("PRAGMA foreign_keys = OFF;", [])?;

    match run(&mut conn) {
        Ok(summary) => {
            info!("Migration completed successfully");
            info!(
                "Summary: {} albums ({} duplicates merged), {} ratings, {} tag links, {} collection entries",
                summary.albums,
                summary.merged_duplicates,
                summary.ratings,
                summary.tags,
                summary.memberships
            );
            info!("Backup saved to: {:?}", backup);
            Ok(summary)
        }
        Err(e) => {
            drop(conn);
            match backup::restore_backup(db_path, &backup) {
                Ok(()) => warn!("Migration failed, database restored from {:?}", backup),
                Err(restore_err) => error!(
                    "Migration failed AND the backup could not be restored: {:#}",
                    restore_err
                ),
            }
            Err(e)
        }
    }
}

fn run(conn: &mut Connection) -> Result<MigrationSummary> {
    collection_store::ALBUMS_TABLE
        .validate_columns(conn)
        .map_err(|e| MigrationError::SchemaMismatch {
            table: "albums",
            detail: format!("{:#}", e),
        })?;

    let tx = conn.transaction()?;

    let albums = collection_store::load_albums(&tx)?;
    let ratings = collection_store::load_ratings(&tx)?;
    let tags = collection_store::load_tags(&tx)?;
    let memberships = collection_store::load_memberships(&tx)?;
    info!(
        "Loaded {} albums, {} ratings, {} tag links, {} collection entries",
        albums.len(),
        ratings.len(),
        tags.len(),
        memberships.len()
    );

    let plan = RemapPlan::build(&albums);
    for album in &albums {
        info!(
            "  {} by {}: {} -> {}",
            album.name,
            album.primary_artist,
            album.id,
            plan.new_id_for(&album.id).unwrap_or("?")
        );
    }
    report_collisions(&plan, &albums);

    // The whole transformed snapshot is computed before any table changes.
    let new_albums = plan.merge_albums(&albums);
    let new_ratings = plan.merge_ratings(&ratings);
    let new_tags = plan.merge_tags(&tags);
    let new_memberships = plan.merge_memberships(&memberships);

    info!("Creating staging tables...");
    for table in REWRITTEN_TABLES {
        table.create_as(&tx, &staging_name(table.name))?;
    }

    info!("Migrating albums table...");
    for album in &new_albums {
        collection_store::insert_album(&tx, &staging_name("albums"), album)?;
    }
    info!("Migrating album_ratings table...");
    for rating in &new_ratings {
        collection_store::insert_rating(&tx, &staging_name("album_ratings"), rating)?;
    }
    info!("Migrating album_tags table...");
    for tag in &new_tags {
        collection_store::insert_tag(&tx, &staging_name("album_tags"), tag)?;
    }
    info!("Migrating collection_albums table...");
    for membership in &new_memberships {
        collection_store::insert_membership(
            &tx,
            &staging_name("collection_albums"),
            membership,
        )?;
    }

    info!("Replacing old tables...");
    // Children before parents for the drops; rename order does not matter.
    for table in REWRITTEN_TABLES.iter().rev() {
        tx.execute(&format!("DROP TABLE {}", table.name), [])?;
    }
    for table in REWRITTEN_TABLES {
        tx.execute(
            &format!(
                "ALTER TABLE {} RENAME TO {}",
                staging_name(table.name),
                table.name
            ),
            [],
        )?;
    }

    tx.commit()?;

    Ok(MigrationSummary {
        albums: new_albums.len(),
        merged_duplicates: plan.merged_count(),
        ratings: new_ratings.len(),
        tags: new_tags.len(),
        memberships: new_memberships.len(),
    })
}

fn report_collisions(plan: &RemapPlan, albums: &[AlbumRow]) {
    let by_id: HashMap<&str, &AlbumRow> =
        albums.iter().map(|album| (album.id.as_str(), album)).collect();
    let mut found = 0;
    for group in plan.collisions() {
        let Some(survivor) = by_id.get(group.survivor()) else {
            continue;
        };
        if found == 0 {
            info!("Found albums with duplicate entries:");
        }
        found += 1;
        info!(
            "  {} by {}: merging {} entries into {}, keeping entry from {}",
            survivor.name,
            survivor.primary_artist,
            group.old_ids.len(),
            group.new_id,
            survivor.added_at
        );
    }
    if found == 0 {
        info!("No duplicate albums found");
    }
}
