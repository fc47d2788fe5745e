//! # Tags and Groups
//!
//! Name -> entity indices.
//!
//! - A **tag** names exactly one entity, and an entity holds at most one
//!   tag. Re-tagging an entity drops its previous tag; giving a tag to a new
//!   entity takes it from the old holder.
//! - A **group** names any number of entities, and an entity can belong to
//!   many groups. Membership is a dense set, so lookups and removal are O(1).
//!
//! Names are hashed with 64-bit FNV-1a; the strings themselves are not kept.

use std::collections::HashMap;
use std::mem;

use super::entity::EntityId;
use crate::memory::EntitySet;

/// Hash of a tag or group name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct NameHash(u64);

impl NameHash {
    const fn of(name: &str) -> Self {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0100_0000_01b3;

        let bytes = name.as_bytes();
        let mut hash = OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }
}

/// Tag and group indices, keyed by entity slot.
#[derive(Default)]
pub(crate) struct NameIndex {
    /// Slot -> tag held by the entity in that slot.
    entity_tags: Vec<Option<NameHash>>,
    /// Tag -> holder.
    tag_owners: HashMap<NameHash, EntityId>,
    /// Group -> members.
    groups: HashMap<NameHash, EntitySet>,
    /// Slot -> groups the entity belongs to.
    entity_groups: Vec<Vec<NameHash>>,
}

impl NameIndex {
    pub(crate) fn tag(&mut self, id: EntityId, name: &str) {
        let hash = NameHash::of(name);
        self.remove_tag(id);

        if let Some(previous) = self.tag_owners.insert(hash, id) {
            if let Some(slot) = self.entity_tags.get_mut(previous.index() as usize) {
                *slot = None;
            }
        }

        let slot = id.index() as usize;
        if slot >= self.entity_tags.len() {
            self.entity_tags.resize(slot + 1, None);
        }
        self.entity_tags[slot] = Some(hash);
    }

    pub(crate) fn has_tag(&self, id: EntityId, name: &str) -> bool {
        let hash = NameHash::of(name);
        self.tag_owners.get(&hash) == Some(&id)
    }

    pub(crate) fn entity_by_tag(&self, name: &str) -> Option<EntityId> {
        self.tag_owners.get(&NameHash::of(name)).copied()
    }

    pub(crate) fn remove_tag(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.entity_tags.get_mut(id.index() as usize) else {
            return false;
        };
        let Some(hash) = slot.take() else {
            return false;
        };
        self.tag_owners.remove(&hash);
        true
    }

    pub(crate) fn group(&mut self, id: EntityId, name: &str) -> bool {
        let hash = NameHash::of(name);
        if !self.groups.entry(hash).or_default().insert(id) {
            return false;
        }

        let slot = id.index() as usize;
        if slot >= self.entity_groups.len() {
            self.entity_groups.resize_with(slot + 1, Vec::new);
        }
        self.entity_groups[slot].push(hash);
        true
    }

    pub(crate) fn ungroup(&mut self, id: EntityId, name: &str) -> bool {
        let hash = NameHash::of(name);
        let removed = self.leave_group(hash, id);
        if removed {
            if let Some(groups) = self.entity_groups.get_mut(id.index() as usize) {
                groups.retain(|&group| group != hash);
            }
        }
        removed
    }

    pub(crate) fn belongs_to_group(&self, id: EntityId, name: &str) -> bool {
        self.groups
            .get(&NameHash::of(name))
            .is_some_and(|members| members.contains(id))
    }

    pub(crate) fn group_members(&self, name: &str) -> &[EntityId] {
        match self.groups.get(&NameHash::of(name)) {
            Some(members) => members.as_slice(),
            None => &[],
        }
    }

    /// Removes `id` from every group it belongs to.
    pub(crate) fn remove_from_groups(&mut self, id: EntityId) {
        let Some(groups) = self.entity_groups.get_mut(id.index() as usize) else {
            return;
        };
        for hash in mem::take(groups) {
            self.leave_group(hash, id);
        }
    }

    /// Removes `id` from one group, dropping the group once it is empty.
    fn leave_group(&mut self, hash: NameHash, id: EntityId) -> bool {
        let Some(members) = self.groups.get_mut(&hash) else {
            return false;
        };
        let removed = members.remove(id);
        if members.is_empty() {
            self.groups.remove(&hash);
        }
        removed
    }

    /// Number of groups with at least one member.
    #[cfg(test)]
    fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(index: u32) -> EntityId {
        EntityId::new(index, 0)
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(NameHash::of("").0, 0xcbf2_9ce4_8422_2325);
        assert_eq!(NameHash::of("a").0, 0xaf63_dc4c_8601_ec8c);
        assert_ne!(NameHash::of("player"), NameHash::of("enemy"));
    }

    #[test]
    fn test_tag_lookup() {
        let mut names = NameIndex::default();
        names.tag(id(3), "player");
        assert!(names.has_tag(id(3), "player"));
        assert_eq!(names.entity_by_tag("player"), Some(id(3)));
        assert_eq!(names.entity_by_tag("camera"), None);
    }

    #[test]
    fn test_retag_overwrites() {
        let mut names = NameIndex::default();
        names.tag(id(1), "player");
        names.tag(id(1), "boss");

        assert!(!names.has_tag(id(1), "player"));
        assert!(names.has_tag(id(1), "boss"));
        assert_eq!(names.entity_by_tag("player"), None);
    }

    #[test]
    fn test_tag_moves_between_entities() {
        let mut names = NameIndex::default();
        names.tag(id(1), "player");
        names.tag(id(2), "player");

        assert!(!names.has_tag(id(1), "player"));
        assert!(names.has_tag(id(2), "player"));

        // The old holder has no tag left to remove.
        assert!(!names.remove_tag(id(1)));
        assert_eq!(names.entity_by_tag("player"), Some(id(2)));
    }

    #[test]
    fn test_groups_no_duplicates() {
        let mut names = NameIndex::default();
        assert!(names.group(id(1), "enemies"));
        assert!(!names.group(id(1), "enemies"));
        names.group(id(2), "enemies");

        assert_eq!(names.group_members("enemies"), &[id(1), id(2)]);
        assert!(names.group_members("allies").is_empty());
    }

    #[test]
    fn test_remove_from_all_groups() {
        let mut names = NameIndex::default();
        names.group(id(1), "enemies");
        names.group(id(1), "flying");
        names.group(id(2), "enemies");

        names.remove_from_groups(id(1));
        assert!(!names.belongs_to_group(id(1), "enemies"));
        assert!(!names.belongs_to_group(id(1), "flying"));
        assert_eq!(names.group_members("enemies"), &[id(2)]);
    }

    #[test]
    fn test_ungroup_single() {
        let mut names = NameIndex::default();
        names.group(id(4), "a");
        names.group(id(4), "b");

        assert!(names.ungroup(id(4), "a"));
        assert!(!names.ungroup(id(4), "a"));
        assert!(names.belongs_to_group(id(4), "b"));

        // Ungrouped membership must not be revisited on purge.
        names.remove_from_groups(id(4));
        assert!(names.group_members("b").is_empty());
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let mut names = NameIndex::default();
        for i in 0..8 {
            names.group(id(i), &format!("squad-{i}"));
        }
        names.group(id(0), "shared");
        names.group(id(1), "shared");
        assert_eq!(names.group_count(), 9);

        for i in 0..8 {
            names.remove_from_groups(id(i));
        }
        assert_eq!(names.group_count(), 0);

        names.group(id(2), "solo");
        assert!(names.ungroup(id(2), "solo"));
        assert_eq!(names.group_count(), 0);
        assert!(names.group_members("solo").is_empty());
    }
}
