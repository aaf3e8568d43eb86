/// One row of the albums table. The artists and images fields hold
/// serialized lists that the migration copies through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRow {
    pub id: String,
    pub name: String,
    pub primary_artist: String,
    pub artists: String,
    pub release_date: Option<String>,
    pub total_tracks: i64,
    pub source_uri: String,
    pub added_at: String,
    pub album_type: String,
    pub images: String,
    pub updated_at: i64,
    pub external_ids: Option<String>,
    pub release_group_id: Option<String>,
    pub in_library: bool,
}

/// One row of the album_ratings table; at most one per album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRow {
    pub album_id: String,
    pub rating: i64,
}

/// One row of the album_tags association table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTagRow {
    pub album_id: String,
    pub tag_id: String,
}

/// One row of the collection_albums table, without the rowid key the
/// database assigns on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionAlbumRow {
    pub collection_name: String,
    pub album_id: String,
    pub position: i64,
    pub added_at: i64,
}
