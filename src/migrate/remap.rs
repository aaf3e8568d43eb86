//! Collision grouping and merge planning for the album id migration.
//!
//! The plan is computed over the full in-memory snapshot before any table is
//! touched: albums are grouped by canonical id, one survivor is chosen per
//! group, and the dependent rows are merged per-table. Everything here is
//! pure so the policies can be tested without a database.

use super::album_id::album_id;
use crate::collection_store::{AlbumRow, AlbumTagRow, CollectionAlbumRow, RatingRow};
use std::collections::{HashMap, HashSet};

/// A set of old album ids that map onto the same canonical id.
#[derive(Debug, Clone)]
pub struct CollisionGroup {
    pub new_id: String,
    /// Old ids in ascending added_at order; the first one is the survivor.
    pub old_ids: Vec<String>,
}

impl CollisionGroup {
    pub fn survivor(&self) -> &str {
        &self.old_ids[0]
    }

    pub fn is_merge(&self) -> bool {
        self.old_ids.len() > 1
    }
}

/// The full old-id to canonical-id remapping for one database snapshot.
pub struct RemapPlan {
    groups: Vec<CollisionGroup>,
    mapping: HashMap<String, String>,
}

impl RemapPlan {
    /// Builds the plan. `albums` must be sorted by ascending added_at with
    /// ties in original row order; the earliest row of every group survives.
    pub fn build(albums: &[AlbumRow]) -> Self {
        let mut groups: Vec<CollisionGroup> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();
        let mut mapping = HashMap::new();

        for album in albums {
            let new_id = album_id(&album.name, &album.primary_artist);
            mapping.insert(album.id.clone(), new_id.clone());
            match group_index.get(&new_id) {
                Some(&index) => groups[index].old_ids.push(album.id.clone()),
                None => {
                    group_index.insert(new_id.clone(), groups.len());
                    groups.push(CollisionGroup {
                        new_id,
                        old_ids: vec![album.id.clone()],
                    });
                }
            }
        }

        Self { groups, mapping }
    }

    /// All groups in first-seen order, pass-throughs included.
    pub fn groups(&self) -> &[CollisionGroup] {
        &self.groups
    }

    pub fn new_id_for(&self, old_id: &str) -> Option<&str> {
        self.mapping.get(old_id).map(String::as_str)
    }

    /// Groups of two or more old ids, which require a merge.
    pub fn collisions(&self) -> impl Iterator<Item = &CollisionGroup> {
        self.groups.iter().filter(|group| group.is_merge())
    }

    /// Number of duplicate rows absorbed into their group's survivor.
    pub fn merged_count(&self) -> usize {
        self.groups.iter().map(|group| group.old_ids.len() - 1).sum()
    }

    /// One output row per group: the survivor's attributes under the
    /// canonical id.
    pub fn merge_albums(&self, albums: &[AlbumRow]) -> Vec<AlbumRow> {
        let by_id: HashMap<&str, &AlbumRow> =
            albums.iter().map(|album| (album.id.as_str(), album)).collect();
        self.groups
            .iter()
            .filter_map(|group| {
                by_id.get(group.survivor()).map(|survivor| {
                    let mut row = (*survivor).clone();
                    row.id = group.new_id.clone();
                    row
                })
            })
            .collect()
    }

    /// The highest rating found across each group; groups where no member
    /// was rated emit nothing.
    pub fn merge_ratings(&self, ratings: &[RatingRow]) -> Vec<RatingRow> {
        let by_old: HashMap<&str, i64> = ratings
            .iter()
            .map(|rating| (rating.album_id.as_str(), rating.rating))
            .collect();
        self.groups
            .iter()
            .filter_map(|group| {
                group
                    .old_ids
                    .iter()
                    .filter_map(|old_id| by_old.get(old_id.as_str()).copied())
                    .max()
                    .map(|rating| RatingRow {
                        album_id: group.new_id.clone(),
                        rating,
                    })
            })
            .collect()
    }

    /// The deduplicated union of tag associations across each group.
    pub fn merge_tags(&self, tags: &[AlbumTagRow]) -> Vec<AlbumTagRow> {
        let mut by_old: HashMap<&str, Vec<&str>> = HashMap::new();
        for tag in tags {
            by_old
                .entry(tag.album_id.as_str())
                .or_default()
                .push(tag.tag_id.as_str());
        }

        let mut out = Vec::new();
        for group in &self.groups {
            let mut seen: HashSet<&str> = HashSet::new();
            for old_id in &group.old_ids {
                let Some(tag_ids) = by_old.get(old_id.as_str()) else {
                    continue;
                };
                for tag_id in tag_ids {
                    if seen.insert(tag_id) {
                        out.push(AlbumTagRow {
                            album_id: group.new_id.clone(),
                            tag_id: (*tag_id).to_string(),
                        });
                    }
                }
            }
        }
        out
    }

    /// One membership per (collection, canonical id), keeping the minimum
    /// position and minimum added_at observed across the group.
    pub fn merge_memberships(&self, memberships: &[CollectionAlbumRow]) -> Vec<CollectionAlbumRow> {
        let mut by_old: HashMap<&str, Vec<&CollectionAlbumRow>> = HashMap::new();
        for membership in memberships {
            by_old
                .entry(membership.album_id.as_str())
                .or_default()
                .push(membership);
        }

        let mut out = Vec::new();
        for group in &self.groups {
            let mut collection_order: Vec<&str> = Vec::new();
            let mut merged: HashMap<&str, (i64, i64)> = HashMap::new();
            for old_id in &group.old_ids {
                for membership in by_old.get(old_id.as_str()).into_iter().flatten() {
                    match merged.get_mut(membership.collection_name.as_str()) {
                        Some((position, added_at)) => {
                            *position = (*position).min(membership.position);
                            *added_at = (*added_at).min(membership.added_at);
                        }
                        None => {
                            collection_order.push(membership.collection_name.as_str());
                            merged.insert(
                                membership.collection_name.as_str(),
                                (membership.position, membership.added_at),
                            );
                        }
                    }
                }
            }
            for collection_name in collection_order {
                let (position, added_at) = merged[collection_name];
                out.push(CollectionAlbumRow {
                    collection_name: collection_name.to_string(),
                    album_id: group.new_id.clone(),
                    position,
                    added_at,
                });
            }
        }
        out
    }
}
