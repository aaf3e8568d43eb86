//! Fixture database creation for the migration tests.
//!
//! Builds an on-disk collection database with the pre-migration schema,
//! including the auxiliary tables (tags, album_collections) the rewritten
//! tables reference.

use record_collection_migrate::collection_store::REWRITTEN_TABLES;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// A collection database file inside a temporary directory. The directory is
/// removed when the fixture is dropped.
pub struct FixtureDb {
    // Held for its Drop
    _dir: TempDir,
    pub path: PathBuf,
}

impl FixtureDb {
    /// Creates an empty database with the full pre-migration schema.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recordcollection.db");

        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE tags (id TEXT NOT NULL PRIMARY KEY)", [])
            .unwrap();
        conn.execute(
            "CREATE TABLE album_collections (name TEXT NOT NULL PRIMARY KEY)",
            [],
        )
        .unwrap();
        for table in REWRITTEN_TABLES {
            table.create(&conn).unwrap();
        }

        Self { _dir: dir, path }
    }

    pub fn connect(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }

    pub fn read_bytes(&self) -> Vec<u8> {
        std::fs::read(&self.path).unwrap()
    }
}

/// Inserts an album with fixed filler metadata.
pub fn insert_album(conn: &Connection, id: &str, name: &str, artist: &str, added_at: &str) {
    conn.execute(
        "INSERT INTO albums (id, name, primary_artist, artists, release_date, total_tracks,
                             source_uri, added_at, album_type, images, updated_at,
                             external_ids, release_group_id, in_library)
         VALUES (?1, ?2, ?3, ?4, NULL, 10, ?5, ?6, 'album', '[]', 1700000000, NULL, NULL, 1)",
        params![
            id,
            name,
            artist,
            format!("[\"{}\"]", artist),
            format!("spotify:album:{}", id),
            added_at
        ],
    )
    .unwrap();
}

pub fn insert_rating(conn: &Connection, album_id: &str, rating: i64) {
    conn.execute(
        "INSERT INTO album_ratings (album_id, rating) VALUES (?1, ?2)",
        params![album_id, rating],
    )
    .unwrap();
}

pub fn insert_tag(conn: &Connection, album_id: &str, tag_id: &str) {
    conn.execute(
        "INSERT OR IGNORE INTO tags (id) VALUES (?1)",
        params![tag_id],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO album_tags (album_id, tag_id) VALUES (?1, ?2)",
        params![album_id, tag_id],
    )
    .unwrap();
}

pub fn insert_membership(
    conn: &Connection,
    collection_name: &str,
    album_id: &str,
    position: i64,
    added_at: i64,
) {
    conn.execute(
        "INSERT OR IGNORE INTO album_collections (name) VALUES (?1)",
        params![collection_name],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO collection_albums (collection_name, album_id, position, added_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![collection_name, album_id, position, added_at],
    )
    .unwrap();
}
