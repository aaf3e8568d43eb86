//! Snapshot loading and row insertion against an explicit connection.
//!
//! The migrations read whole tables into memory, compute the transformed
//! rows, and write them into freshly created staging tables; every function
//! here takes the session handle it operates on.

use super::models::{AlbumRow, AlbumTagRow, CollectionAlbumRow, RatingRow};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// Loads all albums ordered by ascending added_at, with the rowid as a
/// tie-break so equal timestamps keep their original insertion order.
pub fn load_albums(conn: &Connection) -> Result<Vec<AlbumRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, primary_artist, artists, release_date, total_tracks,
                    source_uri, added_at, album_type, images, updated_at,
                    external_ids, release_group_id, in_library
             FROM albums ORDER BY added_at ASC, rowid ASC",
        )
        .context("Failed to read albums table")?;
    let rows = stmt
        .query_map(params![], row_to_album)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn load_ratings(conn: &Connection) -> Result<Vec<RatingRow>> {
    let mut stmt = conn
        .prepare("SELECT album_id, rating FROM album_ratings")
        .context("Failed to read album_ratings table")?;
    let rows = stmt
        .query_map(params![], |row| {
            Ok(RatingRow {
                album_id: row.get(0)?,
                rating: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn load_tags(conn: &Connection) -> Result<Vec<AlbumTagRow>> {
    let mut stmt = conn
        .prepare("SELECT album_id, tag_id FROM album_tags")
        .context("Failed to read album_tags table")?;
    let rows = stmt
        .query_map(params![], |row| {
            Ok(AlbumTagRow {
                album_id: row.get(0)?,
                tag_id: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn load_memberships(conn: &Connection) -> Result<Vec<CollectionAlbumRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT collection_name, album_id, position, added_at
             FROM collection_albums",
        )
        .context("Failed to read collection_albums table")?;
    let rows = stmt
        .query_map(params![], |row| {
            Ok(CollectionAlbumRow {
                collection_name: row.get(0)?,
                album_id: row.get(1)?,
                position: row.get(2)?,
                added_at: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn row_to_album(row: &rusqlite::Row) -> rusqlite::Result<AlbumRow> {
    Ok(AlbumRow {
        id: row.get(0)?,
        name: row.get(1)?,
        primary_artist: row.get(2)?,
        artists: row.get(3)?,
        release_date: row.get(4)?,
        total_tracks: row.get(5)?,
        source_uri: row.get(6)?,
        added_at: row.get(7)?,
        album_type: row.get(8)?,
        images: row.get(9)?,
        updated_at: row.get(10)?,
        external_ids: row.get(11)?,
        release_group_id: row.get(12)?,
        in_library: row.get(13)?,
    })
}

pub fn insert_album(conn: &Connection, table: &str, album: &AlbumRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (id, name, primary_artist, artists, release_date, total_tracks,
                             source_uri, added_at, album_type, images, updated_at,
                             external_ids, release_group_id, in_library)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            table
        ),
        params![
            album.id,
            album.name,
            album.primary_artist,
            album.artists,
            album.release_date,
            album.total_tracks,
            album.source_uri,
            album.added_at,
            album.album_type,
            album.images,
            album.updated_at,
            album.external_ids,
            album.release_group_id,
            album.in_library,
        ],
    )
    .with_context(|| format!("Failed to insert album {} into {}", album.id, table))?;
    Ok(())
}

pub fn insert_rating(conn: &Connection, table: &str, rating: &RatingRow) -> Result<()> {
    conn.execute(
        &format!("INSERT INTO {} (album_id, rating) VALUES (?1, ?2)", table),
        params![rating.album_id, rating.rating],
    )
    .with_context(|| format!("Failed to insert rating for album {}", rating.album_id))?;
    Ok(())
}

pub fn insert_tag(conn: &Connection, table: &str, tag: &AlbumTagRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} (album_id, tag_id) VALUES (?1, ?2)",
            table
        ),
        params![tag.album_id, tag.tag_id],
    )
    .with_context(|| format!("Failed to insert tag link for album {}", tag.album_id))?;
    Ok(())
}

pub fn insert_membership(conn: &Connection, table: &str, row: &CollectionAlbumRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR IGNORE INTO {} (collection_name, album_id, position, added_at)
             VALUES (?1, ?2, ?3, ?4)",
            table
        ),
        params![row.collection_name, row.album_id, row.position, row.added_at],
    )
    .with_context(|| {
        format!(
            "Failed to insert membership of album {} in collection {}",
            row.album_id, row.collection_name
        )
    })?;
    Ok(())
}

pub fn count_rows(conn: &Connection, sql: &str) -> Result<usize> {
    let count: i64 = conn.query_row(sql, [], |r| r.get(0))?;
    Ok(count as usize)
}
