mod models;
mod schema;
mod store;

pub use models::{AlbumRow, AlbumTagRow, CollectionAlbumRow, RatingRow};
pub use schema::{
    ALBUMS_TABLE, ALBUMS_TABLE_WITH_SOURCE_ID, ALBUM_RATINGS_TABLE, ALBUM_TAGS_TABLE,
    COLLECTION_ALBUMS_TABLE, REWRITTEN_TABLES,
};
pub use store::{
    count_rows, insert_album, insert_membership, insert_rating, insert_tag, load_albums,
    load_memberships, load_ratings, load_tags,
};

use std::path::PathBuf;

/// Database location used when no path argument is given: the collection
/// app's file in the platform application support directory.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("RecordCollection").join("recordcollection.db"))
}
