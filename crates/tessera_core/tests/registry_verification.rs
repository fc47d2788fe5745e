//! # Registry Verification Tests
//!
//! End-to-end checks of the registry contract:
//!
//! 1. **Recycling**: freed slots are reused, ids never repeat
//! 2. **Components**: add/has/get/remove round-trip through the registry
//! 3. **Views**: exact matches, independent of type order
//! 4. **Names**: tag exclusivity and duplicate-free groups
//! 5. **Systems**: membership computed at synchronization points
//!
//! Run with: cargo test --test registry_verification

use std::collections::HashSet;

use tessera_core::{
    EcsError, EntityId, EntityState, Registry, RegistryConfig, SyncReport, System, SystemBase,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Counter(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Other(i32);

// ============================================================================
// 1. RECYCLING
// ============================================================================

#[test]
fn verify_thousand_entity_recycling() {
    let mut registry = Registry::new();

    let originals: Vec<EntityId> = (0..1000)
        .map(|i| {
            let id = registry.create_entity();
            registry.add_component(id, Counter(i)).unwrap();
            id
        })
        .collect();
    registry.synchronize();

    for &id in &originals {
        registry.kill_entity(id);
    }
    let report = registry.synchronize();
    assert_eq!(report.destroyed, 1000);
    assert_eq!(registry.alive_count(), 0);

    let recycled: Vec<EntityId> = (0..1000).map(|_| registry.create_entity()).collect();

    let old_slots: HashSet<u32> = originals.iter().map(|id| id.index()).collect();
    let old_ids: HashSet<EntityId> = originals.iter().copied().collect();

    let slot_overlap = recycled
        .iter()
        .filter(|id| old_slots.contains(&id.index()))
        .count();
    let id_overlap = recycled.iter().filter(|id| old_ids.contains(id)).count();

    assert_eq!(slot_overlap, 1000, "every new slot must be a recycled slot");
    assert_eq!(id_overlap, 0, "no full id may be reissued");

    for id in &originals {
        assert!(!registry.is_valid(*id));
    }
    for id in &recycled {
        assert!(registry.is_valid(*id));
        assert!(!registry.has_component::<Counter>(*id));
    }
}

#[test]
fn verify_generation_strictly_increases() {
    let mut registry = Registry::new();
    let mut previous = registry.create_entity();

    for _ in 0..16 {
        registry.kill_entity(previous);
        registry.synchronize();

        let next = registry.create_entity();
        assert_eq!(next.index(), previous.index());
        assert!(next.generation() > previous.generation());
        assert!(!registry.is_valid(previous));
        previous = next;
    }
}

#[test]
fn verify_slot_limit_is_reported() {
    let mut registry = Registry::with_config(RegistryConfig {
        max_entities: 2,
        initial_capacity: 2,
    })
    .unwrap();

    let a = registry.create_entity();
    registry.create_entity();
    assert_eq!(
        registry.try_create_entity(),
        Err(EcsError::EntitiesExhausted { max: 2 })
    );

    // Freed slots become available again after synchronization.
    registry.kill_entity(a);
    assert!(registry.try_create_entity().is_err());
    registry.synchronize();
    assert_eq!(registry.try_create_entity().map(|id| id.index()), Ok(a.index()));
}

#[test]
fn verify_config_from_toml() {
    let config = RegistryConfig::from_toml_str(
        r#"
        max_entities = 128
        initial_capacity = 16
        "#,
    )
    .unwrap();
    let registry = Registry::with_config(config).unwrap();
    assert_eq!(registry.config().max_entities, 128);
}

// ============================================================================
// 2. COMPONENTS
// ============================================================================

#[test]
fn verify_component_roundtrip() {
    let mut registry = Registry::new();
    let id = registry.create_entity();
    let position = Position { x: 1.5, y: -2.0 };

    registry.add_component(id, position).unwrap();
    assert!(registry.has_component::<Position>(id));
    assert_eq!(*registry.get_component::<Position>(id), position);

    registry.remove_component::<Position>(id);
    assert!(!registry.has_component::<Position>(id));
    assert!(registry.try_get_component::<Position>(id).is_none());
}

#[test]
fn verify_components_available_before_synchronize() {
    let mut registry = Registry::new();
    let id = registry.create_entity();
    assert_eq!(registry.entity_state(id), Some(EntityState::PendingCreate));

    registry.add_component(id, Counter(7)).unwrap();
    assert_eq!(registry.get_component::<Counter>(id), &Counter(7));

    // Components added while pending destruction are purged with the entity.
    registry.kill_entity(id);
    registry.add_component(id, Other(1)).unwrap();
    registry.synchronize();
    assert!(registry.pool::<Other>().unwrap().is_empty());
}

#[test]
fn verify_stale_handle_cannot_touch_new_occupant() {
    let mut registry = Registry::new();
    let old = registry.create_entity();
    registry.kill_entity(old);
    registry.synchronize();

    let new = registry.create_entity();
    registry.add_component(new, Counter(1)).unwrap();

    assert!(!registry.has_component::<Counter>(old));
    assert_eq!(registry.remove_component::<Counter>(old), None);
    assert_eq!(
        registry.add_component(old, Counter(2)),
        Err(EcsError::StaleEntity(old))
    );
    assert_eq!(registry.get_component::<Counter>(new), &Counter(1));
}

#[test]
fn verify_destroy_purges_direct_pool_entries() {
    let mut registry = Registry::new();
    let survivor = registry.create_entity();
    registry.add_component(survivor, Other(0)).unwrap();

    let dead = registry.create_entity();
    registry
        .pool_mut::<Other>()
        .unwrap()
        .add(dead, Other(7))
        .unwrap();
    registry.synchronize();

    registry.kill_entity(dead);
    registry.synchronize();

    assert!(!registry.has_component::<Other>(dead));
    let mut seen = Vec::new();
    registry.view1::<Other, _>(|id, other| seen.push((id, other.0)));
    assert_eq!(seen, vec![(survivor, 0)]);

    // The recycled slot starts with no components either.
    let recycled = registry.create_entity();
    assert_eq!(recycled.index(), dead.index());
    assert!(registry.try_get_component::<Other>(recycled).is_none());
}

// ============================================================================
// 3. VIEWS
// ============================================================================

#[test]
fn verify_view_even_entities() {
    let mut registry = Registry::new();
    for i in 0..5 {
        let id = registry.create_entity();
        registry.add_component(id, Counter(i)).unwrap();
        if i % 2 == 0 {
            registry.add_component(id, Other(i as i32 * 10)).unwrap();
        }
    }
    registry.synchronize();

    let mut values = Vec::new();
    let matched = registry.view2::<Counter, Other, _>(|_, counter, other| {
        assert_eq!(other.0, counter.0 as i32 * 10);
        values.push(counter.0);
    });

    values.sort_unstable();
    assert_eq!(matched, 3);
    assert_eq!(values, vec![0, 2, 4]);
}

#[test]
fn verify_view_stops_matching_after_removal() {
    let mut registry = Registry::new();
    let id = registry.create_entity();
    registry.add_component(id, Position { x: 0.0, y: 0.0 }).unwrap();
    registry.add_component(id, Velocity { x: 1.0, y: 2.0 }).unwrap();

    let matched = registry.view2::<Position, Velocity, _>(|seen, position, velocity| {
        assert_eq!(seen, id);
        position.x += velocity.x;
        position.y += velocity.y;
    });
    assert_eq!(matched, 1);
    assert_eq!(
        registry.get_component::<Position>(id),
        &Position { x: 1.0, y: 2.0 }
    );

    registry.remove_component::<Velocity>(id);
    assert_eq!(registry.view2::<Position, Velocity, _>(|_, _, _| {}), 0);
}

#[test]
fn verify_view_order_independence() {
    let mut registry = Registry::new();
    for i in 0..50 {
        let id = registry.create_entity();
        registry.add_component(id, Counter(i)).unwrap();
        if i % 5 == 0 {
            registry.add_component(id, Velocity { x: 0.0, y: 0.0 }).unwrap();
        }
    }

    let mut rare_first = Vec::new();
    registry.view2::<Velocity, Counter, _>(|id, _, _| rare_first.push(id));
    let mut common_first = Vec::new();
    registry.view2::<Counter, Velocity, _>(|id, _, _| common_first.push(id));

    rare_first.sort();
    common_first.sort();
    assert_eq!(rare_first.len(), 10);
    assert_eq!(rare_first, common_first);
}

// ============================================================================
// 4. TAGS AND GROUPS
// ============================================================================

#[test]
fn verify_tag_exclusivity() {
    let mut registry = Registry::new();
    let a = registry.create_entity();
    let b = registry.create_entity();

    registry.tag_entity(a, "leader");
    registry.tag_entity(a, "scout");
    assert!(!registry.has_tag(a, "leader"));
    assert_eq!(registry.entity_by_tag("leader"), None);
    assert_eq!(registry.entity_by_tag("scout"), Some(a));

    registry.tag_entity(b, "scout");
    assert_eq!(registry.entity_by_tag("scout"), Some(b));
    assert!(!registry.has_tag(a, "scout"));

    assert!(registry.remove_tag(b));
    assert_eq!(registry.entity_by_tag("scout"), None);
}

#[test]
fn verify_group_membership_is_exact() {
    let mut registry = Registry::new();
    let ids: Vec<EntityId> = (0..6).map(|_| registry.create_entity()).collect();
    for &id in &ids {
        registry.group_entity(id, "wave");
        registry.group_entity(id, "wave");
    }
    registry.ungroup_entity(ids[1], "wave");
    registry.kill_entity(ids[4]);
    registry.synchronize();

    let members: HashSet<EntityId> = registry.entities_by_group("wave").iter().copied().collect();
    assert_eq!(registry.entities_by_group("wave").len(), members.len());
    let expected: HashSet<EntityId> = [ids[0], ids[2], ids[3], ids[5]].into_iter().collect();
    assert_eq!(members, expected);

    registry.remove_from_groups(ids[0]);
    assert!(!registry.belongs_to_group(ids[0], "wave"));
    assert_eq!(registry.entities_by_group("wave").len(), 3);
}

// ============================================================================
// 5. SYSTEMS
// ============================================================================

struct Physics {
    base: SystemBase,
}

impl Physics {
    fn new() -> Self {
        let mut base = SystemBase::new();
        base.require::<Position>();
        base.require::<Velocity>();
        Self { base }
    }
}

impl System for Physics {
    fn base(&self) -> &SystemBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut SystemBase {
        &mut self.base
    }
}

#[test]
fn verify_system_membership_at_synchronize() {
    let mut registry = Registry::new();
    registry.add_system(Physics::new());

    let moving = registry.create_entity();
    registry.add_component(moving, Position { x: 0.0, y: 0.0 }).unwrap();
    registry.add_component(moving, Velocity { x: 1.0, y: 0.0 }).unwrap();
    let still = registry.create_entity();
    registry.add_component(still, Position { x: 0.0, y: 0.0 }).unwrap();

    assert!(registry.get_system::<Physics>().base().entities().is_empty());
    assert_eq!(
        registry.synchronize(),
        SyncReport {
            created: 2,
            destroyed: 0
        }
    );
    assert_eq!(registry.get_system::<Physics>().base().entities(), &[moving]);

    registry.kill_entity(moving);
    registry.synchronize();
    assert!(registry.get_system::<Physics>().base().entities().is_empty());
}

#[test]
fn verify_membership_not_reevaluated_for_visible_entities() {
    let mut registry = Registry::new();
    registry.add_system(Physics::new());

    let id = registry.create_entity();
    registry.add_component(id, Position { x: 0.0, y: 0.0 }).unwrap();
    registry.synchronize();

    // Completing the signature later does not join the system.
    registry.add_component(id, Velocity { x: 0.0, y: 0.0 }).unwrap();
    registry.synchronize();
    assert!(!registry.get_system::<Physics>().base().contains(id));

    // Removing a required component does not leave it either.
    let joined = registry.create_entity();
    registry.add_component(joined, Position { x: 0.0, y: 0.0 }).unwrap();
    registry.add_component(joined, Velocity { x: 0.0, y: 0.0 }).unwrap();
    registry.synchronize();
    registry.remove_component::<Velocity>(joined);
    assert!(registry.get_system::<Physics>().base().contains(joined));
}

#[test]
fn verify_late_system_is_not_backfilled() {
    let mut registry = Registry::new();
    let early = registry.create_entity();
    registry.add_component(early, Position { x: 0.0, y: 0.0 }).unwrap();
    registry.add_component(early, Velocity { x: 0.0, y: 0.0 }).unwrap();
    registry.synchronize();

    registry.add_system(Physics::new());
    let late = registry.create_entity();
    registry.add_component(late, Position { x: 0.0, y: 0.0 }).unwrap();
    registry.add_component(late, Velocity { x: 0.0, y: 0.0 }).unwrap();
    registry.synchronize();

    assert_eq!(registry.get_system::<Physics>().base().entities(), &[late]);
    assert!(registry.remove_system::<Physics>().is_some());
    assert!(!registry.has_system::<Physics>());
}
