use rand::Rng;

use crate::combat::Move;
use crate::entity::{ActorState, EntityId, EntityKind, Facing, PeerId, World};

const REACH_X: f32 = 60.0;
const REACH_Z: f32 = 10.0;
const CHASE_ACCEL: f32 = 0.5;
const ATTACK_CHANCE: f64 = 0.05;

/// Steer every enemy this participant owns toward the nearest player and
/// collect the swings they decide to take. Steering mutates in place;
/// attacks come back for the session to resolve through the combat path,
/// since a swing needs the whole world.
pub fn step_enemies(world: &mut World, local: &PeerId, rng: &mut impl Rng) -> Vec<(EntityId, Move)> {
    let players: Vec<(f32, f32)> = world
        .iter()
        .filter(|e| e.kind == EntityKind::Player && !e.marked_for_removal)
        .map(|e| (e.pos.x, e.pos.z))
        .collect();
    if players.is_empty() {
        return Vec::new();
    }

    let mut attacks = Vec::new();
    for enemy in world.iter_mut().filter(|e| {
        e.kind == EntityKind::Enemy && !e.is_remote && e.owner == *local && !e.marked_for_removal
    }) {
        if matches!(
            enemy.state,
            ActorState::Fallen | ActorState::Hurt | ActorState::Rise | ActorState::Whirlwind
        ) {
            continue;
        }

        // Nearest player by manhattan distance.
        let (tx, tz) = players
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (a.0 - enemy.pos.x).abs() + (a.1 - enemy.pos.z).abs();
                let db = (b.0 - enemy.pos.x).abs() + (b.1 - enemy.pos.z).abs();
                da.total_cmp(&db)
            })
            .unwrap();

        let dx = (enemy.pos.x - tx).abs();
        let dz = (enemy.pos.z - tz).abs();
        enemy.facing = Facing::toward(enemy.pos.x, tx);

        if dx > REACH_X || dz > REACH_Z {
            if dx > REACH_X {
                enemy.vel.x += enemy.facing.sign() * CHASE_ACCEL;
            }
            if dz > REACH_Z {
                enemy.pos.z += if enemy.pos.z > tz { -1.0 } else { 1.0 };
            }
            enemy.state = ActorState::Walk;
        } else if rng.gen_bool(ATTACK_CHANCE) {
            let mv = if enemy.weapon.is_some() {
                Move::WeaponSwing
            } else {
                Move::Punch
            };
            attacks.push((enemy.id.clone(), mv));
        } else {
            enemy.state = ActorState::Idle;
        }
    }
    attacks
}
