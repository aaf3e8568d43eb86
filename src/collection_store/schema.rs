//! SQLite schema definitions for the record-collection database.
//!
//! These describe the tables the migrations rewrite; the collection app
//! itself owns the live schema.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, DEFAULT_TIMESTAMP,
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const TAG_FK: ForeignKey = ForeignKey {
    foreign_table: "tags",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const COLLECTION_FK: ForeignKey = ForeignKey {
    foreign_table: "album_collections",
    foreign_column: "name",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Albums table in canonical column order, as written by the id migration.
pub const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("primary_artist", &SqlType::Text, non_null = true),
        sqlite_column!("artists", &SqlType::Text, non_null = true), // serialized list
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("total_tracks", &SqlType::Integer, non_null = true),
        sqlite_column!("source_uri", &SqlType::Text, non_null = true),
        sqlite_column!("added_at", &SqlType::Text, non_null = true),
        sqlite_column!("album_type", &SqlType::Text, non_null = true),
        sqlite_column!("images", &SqlType::Text, non_null = true), // serialized
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
        sqlite_column!("external_ids", &SqlType::Text),
        sqlite_column!("release_group_id", &SqlType::Text),
        sqlite_column!("in_library", &SqlType::Integer, non_null = true),
    ],
    composite_primary_key: &[],
    unique_constraints: &[],
};

/// Albums table with the companion source_id column in its canonical
/// position, as written by the column migration's rebuild path.
pub const ALBUMS_TABLE_WITH_SOURCE_ID: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("source_id", &SqlType::Text),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("primary_artist", &SqlType::Text, non_null = true),
        sqlite_column!("artists", &SqlType::Text, non_null = true),
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("total_tracks", &SqlType::Integer, non_null = true),
        sqlite_column!("source_uri", &SqlType::Text, non_null = true),
        sqlite_column!("added_at", &SqlType::Text, non_null = true),
        sqlite_column!("album_type", &SqlType::Text, non_null = true),
        sqlite_column!("images", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
        sqlite_column!("external_ids", &SqlType::Text),
        sqlite_column!("release_group_id", &SqlType::Text),
        sqlite_column!("in_library", &SqlType::Integer, non_null = true),
    ],
    composite_primary_key: &[],
    unique_constraints: &[],
};

pub const ALBUM_RATINGS_TABLE: Table = Table {
    name: "album_ratings",
    columns: &[
        sqlite_column!(
            "album_id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            foreign_key = Some(&ALBUM_FK)
        ),
        sqlite_column!("rating", &SqlType::Integer, non_null = true),
    ],
    composite_primary_key: &[],
    unique_constraints: &[],
};

pub const ALBUM_TAGS_TABLE: Table = Table {
    name: "album_tags",
    columns: &[
        sqlite_column!(
            "album_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ALBUM_FK)
        ),
        sqlite_column!(
            "tag_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&TAG_FK)
        ),
    ],
    composite_primary_key: &["album_id", "tag_id"],
    unique_constraints: &[],
};

pub const COLLECTION_ALBUMS_TABLE: Table = Table {
    name: "collection_albums",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true), // AUTOINCREMENT
        sqlite_column!(
            "collection_name",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&COLLECTION_FK)
        ),
        sqlite_column!(
            "album_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ALBUM_FK)
        ),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "added_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    composite_primary_key: &[],
    unique_constraints: &[&["collection_name", "album_id"]],
};

/// Tables replaced by the album id migration, parents before children.
pub const REWRITTEN_TABLES: &[&Table] = &[
    &ALBUMS_TABLE,
    &ALBUM_RATINGS_TABLE,
    &ALBUM_TAGS_TABLE,
    &COLLECTION_ALBUMS_TABLE,
];
