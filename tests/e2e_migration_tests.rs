//! End-to-end tests for the two migration binaries' library entry points,
//! run against real database files in temporary directories.

mod common;

use common::{insert_album, insert_membership, insert_rating, insert_tag, FixtureDb};
use record_collection_migrate::migrate::{backup_path, MigrationError};
use record_collection_migrate::{add_source_id_column, album_id, migrate_album_ids};
use std::collections::HashSet;

/// Two entries of the same album under different ids, plus one unrelated
/// album. "a1" is the earliest and must survive.
fn fixture_with_duplicates() -> FixtureDb {
    let db = FixtureDb::new();
    let conn = db.connect();
    insert_album(
        &conn,
        "a1",
        "Kind of Blue",
        "Miles Davis",
        "2023-01-01T00:00:00Z",
    );
    insert_album(
        &conn,
        "a2",
        " kind of blue",
        "MILES DAVIS",
        "2024-06-01T00:00:00Z",
    );
    insert_album(
        &conn,
        "b1",
        "Blue Train",
        "John Coltrane",
        "2023-05-01T00:00:00Z",
    );
    db
}

#[test]
fn test_migration_merges_duplicate_albums() {
    let db = fixture_with_duplicates();

    let summary = migrate_album_ids(&db.path).unwrap();
    assert_eq!(summary.albums, 2);
    assert_eq!(summary.merged_duplicates, 1);

    let conn = db.connect();
    let merged_id = album_id("Kind of Blue", "Miles Davis");
    let (name, added_at, source_uri): (String, String, String) = conn
        .query_row(
            "SELECT name, added_at, source_uri FROM albums WHERE id = ?1",
            [&merged_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    // Survivor attributes are the earliest entry's.
    assert_eq!(name, "Kind of Blue");
    assert_eq!(added_at, "2023-01-01T00:00:00Z");
    assert_eq!(source_uri, "spotify:album:a1");
}

#[test]
fn test_migrated_ids_match_canonical_function() {
    let db = fixture_with_duplicates();
    migrate_album_ids(&db.path).unwrap();

    let conn = db.connect();
    let mut stmt = conn
        .prepare("SELECT id, name, primary_artist FROM albums")
        .unwrap();
    let rows: Vec<(String, String, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert!(!rows.is_empty());
    for (id, name, artist) in rows {
        assert_eq!(id, album_id(&name, &artist));
    }
}

#[test]
fn test_rating_merge_keeps_maximum() {
    let db = fixture_with_duplicates();
    {
        let conn = db.connect();
        insert_rating(&conn, "a1", 3);
        insert_rating(&conn, "a2", 5);
    }

    let summary = migrate_album_ids(&db.path).unwrap();
    assert_eq!(summary.ratings, 1);

    let conn = db.connect();
    let rating: i64 = conn
        .query_row(
            "SELECT rating FROM album_ratings WHERE album_id = ?1",
            [&album_id("Kind of Blue", "Miles Davis")],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(rating, 5);
}

#[test]
fn test_tag_merge_unions_without_duplicates() {
    let db = fixture_with_duplicates();
    {
        let conn = db.connect();
        insert_tag(&conn, "a1", "rock");
        insert_tag(&conn, "a2", "rock");
        insert_tag(&conn, "a2", "live");
    }

    let summary = migrate_album_ids(&db.path).unwrap();
    assert_eq!(summary.tags, 2);

    let conn = db.connect();
    let mut stmt = conn
        .prepare("SELECT tag_id FROM album_tags WHERE album_id = ?1 ORDER BY tag_id")
        .unwrap();
    let tags: Vec<String> = stmt
        .query_map([&album_id("Kind of Blue", "Miles Davis")], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(tags, vec!["live", "rock"]);
}

#[test]
fn test_collection_membership_deduplicates() {
    let db = fixture_with_duplicates();
    {
        let conn = db.connect();
        insert_membership(&conn, "Favorites", "a1", 4, 200);
        insert_membership(&conn, "Favorites", "a2", 2, 300);
    }

    let summary = migrate_album_ids(&db.path).unwrap();
    assert_eq!(summary.memberships, 1);

    let conn = db.connect();
    let (position, added_at): (i64, i64) = conn
        .query_row(
            "SELECT position, added_at FROM collection_albums
             WHERE collection_name = 'Favorites' AND album_id = ?1",
            [&album_id("Kind of Blue", "Miles Davis")],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(position, 2);
    assert_eq!(added_at, 200);
}

#[test]
fn test_referential_integrity_after_migration() {
    let db = fixture_with_duplicates();
    {
        let conn = db.connect();
        insert_rating(&conn, "a2", 4);
        insert_tag(&conn, "a1", "jazz");
        insert_tag(&conn, "b1", "jazz");
        insert_membership(&conn, "Favorites", "a1", 0, 100);
        insert_membership(&conn, "Jazz", "b1", 1, 150);
    }

    migrate_album_ids(&db.path).unwrap();

    let conn = db.connect();
    let album_ids: HashSet<String> = conn
        .prepare("SELECT id FROM albums")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();

    for table in ["album_ratings", "album_tags", "collection_albums"] {
        let referenced: Vec<String> = conn
            .prepare(&format!("SELECT album_id FROM {}", table))
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        for referenced_id in referenced {
            assert!(
                album_ids.contains(&referenced_id),
                "{} references missing album {}",
                table,
                referenced_id
            );
        }
    }
}

#[test]
fn test_rerun_is_idempotent() {
    let db = fixture_with_duplicates();
    {
        let conn = db.connect();
        insert_rating(&conn, "a1", 3);
        insert_tag(&conn, "a2", "live");
        insert_membership(&conn, "Favorites", "a1", 0, 100);
    }

    migrate_album_ids(&db.path).unwrap();
    let ids_after_first: HashSet<String> = {
        let conn = db.connect();
        let ids = conn
            .prepare("SELECT id FROM albums")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        ids
    };

    let second = migrate_album_ids(&db.path).unwrap();
    assert_eq!(second.merged_duplicates, 0);

    let ids_after_second: HashSet<String> = {
        let conn = db.connect();
        let ids = conn
            .prepare("SELECT id FROM albums")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        ids
    };
    assert_eq!(ids_after_first, ids_after_second);
}

#[test]
fn test_failed_migration_restores_original_file() {
    let db = fixture_with_duplicates();
    {
        // Break the schema so the migration fails partway through loading.
        let conn = db.connect();
        conn.execute("DROP TABLE album_tags", []).unwrap();
    }
    let bytes_before = db.read_bytes();

    let result = migrate_album_ids(&db.path);
    assert!(result.is_err());

    assert_eq!(db.read_bytes(), bytes_before);
    // The backup copy sticks around for inspection.
    assert!(backup_path(&db.path).exists());
}

#[test]
fn test_missing_database_reported_without_backup() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.db");

    let result = migrate_album_ids(&missing);
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::DatabaseNotFound(_))
    ));
    assert!(!backup_path(&missing).exists());
}

#[test]
fn test_add_source_id_column_backfills_from_uri() {
    let db = FixtureDb::new();
    {
        let conn = db.connect();
        insert_album(&conn, "abc123", "Aja", "Steely Dan", "2024-01-01T00:00:00Z");
    }

    let summary = add_source_id_column(&db.path).unwrap();
    assert!(!summary.rebuilt);
    assert_eq!(summary.total_albums, 1);
    assert_eq!(summary.with_source_id, 1);

    let conn = db.connect();
    let source_id: Option<String> = conn
        .query_row(
            "SELECT source_id FROM albums WHERE id = 'abc123'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(source_id.as_deref(), Some("abc123"));
}

#[test]
fn test_add_source_id_column_rebuilds_existing() {
    let db = FixtureDb::new();
    {
        let conn = db.connect();
        insert_album(&conn, "abc123", "Aja", "Steely Dan", "2024-01-01T00:00:00Z");
        // Column already present, appended at the end of the table.
        conn.execute("ALTER TABLE albums ADD COLUMN source_id TEXT", [])
            .unwrap();
        conn.execute("UPDATE albums SET source_id = 'abc123'", [])
            .unwrap();
    }

    let summary = add_source_id_column(&db.path).unwrap();
    assert!(summary.rebuilt);
    assert_eq!(summary.with_source_id, 1);

    let conn = db.connect();
    let second_column: String = conn
        .query_row(
            "SELECT name FROM pragma_table_info('albums') WHERE cid = 1",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(second_column, "source_id");
}

#[test]
fn test_migration_after_column_addition() {
    // The id migration must accept a database that already ran the column
    // migration; its rewritten albums table drops the companion column.
    let db = fixture_with_duplicates();
    add_source_id_column(&db.path).unwrap();

    let summary = migrate_album_ids(&db.path).unwrap();
    assert_eq!(summary.albums, 2);
}
