use std::collections::{BTreeMap, HashMap};

use super::prelude::*;
use crate::{gateways::images::ImageStorage, usecases::authorize};

/// Level at which `00` fragments stop being structural bridges: from
/// geography down they can be part of a real id and are never collapsed.
const GEOGRAPHIC_LEVEL: u8 = 7;

/// The permission-filtered set of active worlds a (possibly anonymous)
/// reader may browse: the input of the index collapse below.
pub fn visible_worlds<R>(repo: &R, user: Option<&User>) -> Result<Vec<World>>
where
    R: WorldRepo + UserRepo,
{
    let mut visible = Vec::new();
    for world in repo.all_active_worlds()? {
        if authorize::is_world_visible_to(repo, user, &world)? {
            visible.push(world);
        }
    }
    Ok(visible)
}

fn trunk_key(world: &World) -> String {
    if world.id.contains_ghost() && world.id.level() < GEOGRAPHIC_LEVEL {
        world.id.trunk().to_owned()
    } else {
        world.id.as_str().to_owned()
    }
}

/// Builds the ordered list of representatives for the public index.
///
/// Input is the permission-filtered set of active worlds. Two passes:
///
/// 1. Trunk collapse: ghost/bridge fragments of the cosmology levels fold
///    into their trunk; the winner per trunk is the candidate with
///    (no `00`, shortest id, lexicographically smallest id). Structural
///    ghosts that survive as winners without being their own trunk are
///    dropped, as are pure bridges.
/// 2. Aggressive indexing: one representative per (parent, level) group,
///    preferring the firstborn (lexicographically smallest id). A pinned
///    public root always wins its group.
pub fn home_index(all_entities: Vec<World>, pinned_roots: &[PublicId]) -> Vec<World> {
    // 1. Group by trunk to detect hierarchical duplicates.
    let mut winners_by_trunk: BTreeMap<String, Vec<World>> = BTreeMap::new();
    for world in all_entities {
        winners_by_trunk
            .entry(trunk_key(&world))
            .or_default()
            .push(world);
    }

    let mut pre_list = Vec::new();
    for (trunk, mut candidates) in winners_by_trunk {
        candidates.sort_by_key(|w| {
            (
                w.id.contains_ghost(),
                w.id.as_str().len(),
                w.id.as_str().to_owned(),
            )
        });
        let winner = candidates.swap_remove(0);
        let is_ghost_structure =
            winner.id.contains_ghost() && winner.id.level() < GEOGRAPHIC_LEVEL;
        if is_ghost_structure && winner.id.as_str() != trunk {
            continue;
        }
        pre_list.push(winner);
    }

    // 2. One representative per branch, preferring the firstborn.
    let mut indexed_groups: BTreeMap<(String, usize), Vec<World>> = BTreeMap::new();
    for world in pre_list {
        if world.id.is_pure_bridge() {
            continue;
        }
        let parent_id = world
            .id
            .parent()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_default();
        let key = (parent_id, world.id.as_str().len());
        indexed_groups.entry(key).or_default().push(world);
    }

    let mut final_list = Vec::new();
    for (_, mut candidates) in indexed_groups {
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        let representative = candidates
            .iter()
            .position(|w| pinned_roots.contains(&w.public_id))
            .unwrap_or(0);
        final_list.push(candidates.swap_remove(representative));
    }

    // Pinned roots first, then J-ID order for visual coherence.
    final_list.sort_by_key(|w| {
        (
            !pinned_roots.contains(&w.public_id),
            w.id.as_str().to_owned(),
        )
    });
    final_list
}

/// Thumbnail of a world: the explicit cover image, else the first file of
/// the gallery journal, else the first file found in the image folder.
pub fn get_thumbnail(world: &World, storage: &dyn ImageStorage) -> Option<String> {
    if let Some(cover) = world.metadata.cover_image() {
        return Some(cover.to_owned());
    }
    if let Some((filename, _)) = world.metadata.gallery_log().into_iter().next() {
        return Some(filename);
    }
    storage
        .list_images(&world.id)
        .ok()
        .and_then(|files| files.into_iter().next())
}

/// Request-scoped memoization of world covers for profile and ranking
/// views, where the same worlds repeat across sections.
#[derive(Default)]
pub struct CoverCache {
    covers: HashMap<JId, Option<String>>,
}

impl CoverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thumbnail(&mut self, world: &World, storage: &dyn ImageStorage) -> Option<String> {
        self.covers
            .entry(world.id.clone())
            .or_insert_with(|| get_thumbnail(world, storage))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::MockStorage;
    use super::*;
    use caos_entities::builders::*;

    fn world(id: &str) -> World {
        World::build().id(id).name(id).finish()
    }

    #[test]
    fn ghost_fragments_collapse_into_their_trunk() {
        // 01010001 is a ghost of trunk 0101; the clean sibling wins.
        let list = home_index(vec![world("01010001"), world("0101")], &[]);
        let ids: Vec<&str> = list.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["0101"]);
    }

    #[test]
    fn geographic_ids_with_00_survive() {
        // Level 7: the 00 pair is part of the real id and must not collapse.
        let deep = format!("{}0071", "01".repeat(5));
        let list = home_index(vec![world(&deep)], &[]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn pure_bridges_are_hidden() {
        let list = home_index(vec![world("010100")], &[]);
        assert!(list.is_empty());
    }

    #[test]
    fn one_representative_per_branch_prefers_firstborn() {
        let list = home_index(vec![world("010102"), world("010101")], &[]);
        let ids: Vec<&str> = list.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["010101"]);
    }

    #[test]
    fn pinned_root_wins_its_group_and_sorts_first() {
        let mut caos = world("02");
        caos.public_id = "JhZCO1vxI7".into();
        let list = home_index(vec![world("01"), caos], &["JhZCO1vxI7".into()]);
        let ids: Vec<&str> = list.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["02"]);
    }

    #[test]
    fn cover_cache_memoizes_per_request() {
        let storage = MockStorage::default();
        let jid: JId = "0101".parse().unwrap();
        storage.seed(&jid, "primera.png");
        let bare = world("0101");

        let mut cache = CoverCache::new();
        assert_eq!(
            cache.thumbnail(&bare, &storage).as_deref(),
            Some("primera.png")
        );
        // The same id resolves from the cache even if the record changed.
        let mut updated = bare.clone();
        updated.metadata.set_cover_image("portada.png");
        assert_eq!(
            cache.thumbnail(&updated, &storage).as_deref(),
            Some("primera.png")
        );
    }

    #[test]
    fn thumbnail_fallback_chain() {
        let storage = MockStorage::default();
        let jid: JId = "0101".parse().unwrap();
        storage.seed(&jid, "primera.png");

        let mut with_cover = world("0101");
        with_cover.metadata.set_cover_image("portada.png");
        assert_eq!(
            get_thumbnail(&with_cover, &storage).as_deref(),
            Some("portada.png")
        );

        let bare = world("0101");
        assert_eq!(
            get_thumbnail(&bare, &storage).as_deref(),
            Some("primera.png")
        );
    }
}
