use glam::Vec3;

use crate::entity::{Entity, EntityKind, PeerId, World};

use super::protocol::{EntitySnapshot, Message};

/// Snapshots go out every Nth simulation tick, trading positional staleness
/// for bandwidth.
pub const BROADCAST_INTERVAL_TICKS: u32 = 3;

pub fn should_broadcast(tick: u32) -> bool {
    tick % BROADCAST_INTERVAL_TICKS == 0
}

/// One snapshot per entity this participant is authoritative for.
pub fn outbound_snapshots(world: &World, local: &PeerId) -> Vec<Message> {
    world
        .iter()
        .filter(|e| !e.is_remote && e.owner == *local && !e.marked_for_removal)
        .map(|e| Message::StateUpdate {
            data: EntitySnapshot::capture(e),
        })
        .collect()
}

/// Integrate a snapshot for an entity someone else owns. Discrete fields
/// snap; position becomes the easing target the remote copy chases. Unknown
/// entities are created on first sight (lazy join). Applying the same
/// snapshot twice is a no-op beyond the first application, and no ordering
/// is enforced: the latest received snapshot simply wins.
pub fn apply_snapshot(world: &mut World, local: &PeerId, snap: EntitySnapshot) {
    if snap.id == *local {
        // Our own state reflected back; we are the authority, ignore it.
        return;
    }

    if !world.contains(&snap.id) {
        let entity = match snap.kind {
            EntityKind::Player => Entity::player(snap.id.clone(), snap.x as f32, snap.z as f32),
            EntityKind::Enemy => Entity::enemy(
                snap.id.clone(),
                snap.owner_id.clone(),
                snap.x as f32,
                snap.z as f32,
            ),
        };
        log::debug!("creating remote copy of {} on first snapshot", snap.id);
        world.insert(entity.into_remote());
    }

    let Some(e) = world.get_mut(&snap.id) else {
        return;
    };
    if !e.is_remote {
        return;
    }
    e.target = Vec3::new(snap.x as f32, snap.y as f32, snap.z as f32);
    e.state = snap.state;
    e.facing = snap.facing();
    e.hp = snap.hp;
    e.weapon = snap.weapon;
    e.owner = snap.owner_id;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorState, Facing, WeaponKind};

    fn local() -> PeerId {
        "user_1".to_string()
    }

    fn snapshot_for(id: &str, kind: EntityKind, x: i32, z: i32) -> EntitySnapshot {
        EntitySnapshot {
            id: id.into(),
            kind,
            owner_id: "user_2".into(),
            x,
            z,
            y: 0,
            state: ActorState::Walk,
            facing: -1,
            hp: 80,
            weapon: Some(WeaponKind::Bat),
        }
    }

    #[test]
    fn cadence_is_every_third_tick() {
        let sent: Vec<u32> = (1..=12).filter(|&t| should_broadcast(t)).collect();
        assert_eq!(sent, vec![3, 6, 9, 12]);
    }

    #[test]
    fn outbound_covers_only_owned_entities() {
        let mut world = World::new();
        world.insert(Entity::player(local(), 10.0, 20.0));
        world.insert(Entity::enemy("enemy_1".into(), local(), 30.0, 40.0));
        world.insert(Entity::player("user_2".into(), 50.0, 60.0).into_remote());

        let out = outbound_snapshots(&world, &local());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|m| match m {
            Message::StateUpdate { data } => data.id != "user_2",
            _ => false,
        }));
    }

    #[test]
    fn unknown_entity_is_created_as_remote_copy() {
        let mut world = World::new();
        apply_snapshot(
            &mut world,
            &local(),
            snapshot_for("user_2", EntityKind::Player, 200, 100),
        );

        let copy = world.get("user_2").unwrap();
        assert!(copy.is_remote);
        assert_eq!(copy.owner, "user_2");
        assert_eq!(copy.target, Vec3::new(200.0, 0.0, 100.0));
        assert_eq!(copy.state, ActorState::Walk);
        assert_eq!(copy.facing, Facing::Left);
        assert_eq!(copy.hp, 80);
        assert_eq!(copy.weapon, Some(WeaponKind::Bat));
    }

    #[test]
    fn own_echo_is_ignored() {
        let mut world = World::new();
        apply_snapshot(
            &mut world,
            &local(),
            snapshot_for("user_1", EntityKind::Player, 500, 100),
        );
        assert!(world.is_empty());
    }

    #[test]
    fn duplicate_snapshot_is_idempotent() {
        let mut world = World::new();
        let snap = snapshot_for("user_2", EntityKind::Player, 200, 100);
        apply_snapshot(&mut world, &local(), snap.clone());
        world.get_mut("user_2").unwrap().step_remote();
        let after_first = world.get("user_2").unwrap().clone();

        apply_snapshot(&mut world, &local(), snap);
        let after_second = world.get("user_2").unwrap();
        assert_eq!(after_second.target, after_first.target);
        assert_eq!(after_second.pos, after_first.pos);
        assert_eq!(after_second.hp, after_first.hp);
    }

    #[test]
    fn locally_owned_entities_are_never_overwritten() {
        let mut world = World::new();
        world.insert(Entity::player(local(), 10.0, 20.0));

        // A hostile or confused peer claiming our entity changes nothing.
        let mut snap = snapshot_for("user_1", EntityKind::Player, 999, 999);
        snap.id = "user_1".into();
        apply_snapshot(&mut world, &local(), snap);

        let e = world.get("user_1").unwrap();
        assert_eq!(e.pos.x, 10.0);
        assert!(!e.is_remote);
    }
}
