use crate::entity::{ActorState, EntityId, Facing, PeerId, WeaponKind, World};

/// Discrete combat moves. `Blast` and `Heal` have no hit box of their own
/// (a projectile and a self-effect); everything else resolves through
/// [`perform_strike`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Punch,
    WeaponSwing,
    JumpKick,
    Uppercut,
    Whirlwind,
    RunAttack,
    Blast,
    Heal,
}

impl Move {
    /// Resource cost, deducted at state entry. Callers must check
    /// affordability before performing; the resolver never re-checks.
    pub fn mp_cost(self) -> i32 {
        match self {
            Self::Uppercut => 15,
            Self::Whirlwind => 30,
            Self::Blast => 30,
            Self::Heal => 50,
            _ => 0,
        }
    }

    /// Omni-directional moves ignore the facing gate.
    pub fn is_omni(self) -> bool {
        self == Self::Whirlwind
    }

    /// Hit-box strike parameters; `None` for the non-strike moves.
    pub fn strike_spec(self, weapon: Option<WeaponKind>) -> Option<MoveSpec> {
        let mut spec = MoveSpec {
            state: ActorState::Attack,
            damage: 10,
            force_x: 2.0,
            force_y: 0.0,
            reach: Reach {
                x: 60.0,
                y: 50.0,
                z: 20.0,
            },
            self_vx: 0.0,
            self_vy: 0.0,
        };
        match self {
            Self::Punch => {}
            Self::Uppercut => {
                spec.state = ActorState::Uppercut;
                spec.damage = 25;
                spec.force_x = 5.0;
                spec.force_y = 15.0;
                spec.reach.y = 80.0;
                spec.self_vx = 2.0;
                spec.self_vy = 10.0;
            }
            Self::JumpKick => {
                spec.state = ActorState::JumpKick;
                spec.damage = 15;
                spec.force_x = 10.0;
                spec.reach = Reach {
                    x: 100.0,
                    y: 80.0,
                    z: 45.0,
                };
                spec.self_vx = 6.0;
            }
            Self::Whirlwind => {
                spec.state = ActorState::Whirlwind;
                spec.damage = 15;
                spec.force_x = 8.0;
                spec.reach = Reach {
                    x: 80.0,
                    y: 60.0,
                    z: 40.0,
                };
                spec.self_vx = 3.0;
            }
            Self::RunAttack => {
                spec.state = ActorState::RunAttack;
                spec.damage = 20;
                spec.force_x = 12.0;
                spec.reach.x = 70.0;
                spec.reach.y = 60.0;
                spec.self_vx = 8.0;
            }
            Self::WeaponSwing => {
                spec.state = ActorState::WeaponAttack;
                match weapon {
                    Some(WeaponKind::Bat) => {
                        spec.damage = 30;
                        spec.force_x = 8.0;
                        spec.reach.x = 90.0;
                        spec.reach.z = 30.0;
                    }
                    Some(WeaponKind::Sword) => {
                        spec.damage = 25;
                        spec.force_x = 4.0;
                        spec.reach.x = 80.0;
                        spec.reach.z = 30.0;
                    }
                    Some(WeaponKind::Spear) => {
                        spec.damage = 35;
                        spec.force_x = 6.0;
                        spec.reach.x = 120.0;
                        spec.reach.z = 15.0;
                    }
                    // Swinging bare-handed degrades to punch numbers.
                    None => {}
                }
            }
            Self::Blast | Self::Heal => return None,
        }
        Some(spec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reach {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveSpec {
    pub state: ActorState,
    pub damage: i32,
    pub force_x: f32,
    pub force_y: f32,
    pub reach: Reach,
    /// Impulse the attacker gives itself, signed by facing.
    pub self_vx: f32,
    pub self_vy: f32,
}

/// What a strike did, for the session to act on. Damage to locally-owned
/// targets is already applied when these come back; damage to foreign targets
/// is only requested.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Damaged {
        target: EntityId,
        amount: i32,
        died: bool,
        blocked: bool,
    },
    WeaponDropped {
        kind: WeaponKind,
        x: f32,
        z: f32,
        facing: Facing,
    },
    /// Cross-ownership damage request; the target's owner applies it.
    HitIntent {
        target: EntityId,
        damage: i32,
        force_x: f32,
        force_y: f32,
    },
}

/// Resolve a strike move for an authoritative attacker: enter the move state,
/// spend resources, apply the self-impulse, then test every other live entity
/// against the move's reach box and the facing gate.
///
/// Ownership decides how damage lands. Locally-owned targets go through the
/// damage pipeline immediately; remotely-owned targets get an optimistic
/// hurt-pose hint and a `HitIntent` for their owner. There is no ack and no
/// dedup: simultaneous intents from two attackers are both honored by the
/// owner in receipt order.
pub fn perform_strike(
    world: &mut World,
    attacker_id: &str,
    mv: Move,
    local: &PeerId,
) -> Vec<CombatEvent> {
    let Some(spec) = mv.strike_spec(world.get(attacker_id).and_then(|a| a.weapon)) else {
        return Vec::new();
    };

    let (ax, ay, az, facing) = {
        let Some(attacker) = world.get_mut(attacker_id) else {
            return Vec::new();
        };
        attacker.mp -= mv.mp_cost();
        attacker.set_state(spec.state);
        if mv == Move::Punch {
            attacker.combo_count += 1;
            attacker.combo_timer = 50;
        }
        if spec.self_vx != 0.0 {
            attacker.vel.x = attacker.facing.sign() * spec.self_vx;
        }
        if spec.self_vy != 0.0 {
            attacker.vel.y = spec.self_vy;
        }
        (
            attacker.pos.x,
            attacker.pos.y,
            attacker.pos.z,
            attacker.facing,
        )
    };

    let mut events = Vec::new();
    let attacker_id = attacker_id.to_string();
    for target in world.iter_mut() {
        if target.id == attacker_id || target.state == ActorState::Fallen {
            continue;
        }
        let in_reach = (target.pos.x - ax).abs() < spec.reach.x
            && (target.pos.z - az).abs() < spec.reach.z
            && (target.pos.y - ay).abs() < spec.reach.y;
        if !in_reach {
            continue;
        }
        let on_facing_side = match facing {
            Facing::Right => target.pos.x > ax,
            Facing::Left => target.pos.x < ax,
        };
        if !mv.is_omni() && !on_facing_side {
            continue;
        }

        let signed_fx = if target.pos.x > ax {
            spec.force_x
        } else {
            -spec.force_x
        };

        if target.is_remote || target.owner != *local {
            // Not ours to damage: render a hint, ask the owner.
            target.set_state(ActorState::Hurt);
            target.vel.x = facing.sign() * 5.0;
            events.push(CombatEvent::HitIntent {
                target: target.id.clone(),
                damage: spec.damage,
                force_x: signed_fx,
                force_y: spec.force_y,
            });
        } else if let Some(outcome) = target.take_damage(spec.damage, signed_fx, spec.force_y) {
            events.push(CombatEvent::Damaged {
                target: target.id.clone(),
                amount: outcome.applied,
                died: outcome.died,
                blocked: outcome.blocked,
            });
            if let Some(kind) = outcome.dropped {
                events.push(CombatEvent::WeaponDropped {
                    kind,
                    x: target.pos.x,
                    z: target.pos.z,
                    facing: target.facing,
                });
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    fn local() -> PeerId {
        "user_1".to_string()
    }

    fn arena_with_target(target_x: f32, target_z: f32) -> World {
        let mut world = World::new();
        let mut attacker = Entity::player(local(), 100.0, 100.0);
        attacker.facing = Facing::Right;
        world.insert(attacker);
        world.insert(Entity::enemy(
            "enemy_1".into(),
            local(),
            target_x,
            target_z,
        ));
        world
    }

    #[test]
    fn punch_hits_target_in_reach() {
        let mut world = arena_with_target(140.0, 100.0);
        let events = perform_strike(&mut world, "user_1", Move::Punch, &local());

        assert_eq!(
            events,
            vec![CombatEvent::Damaged {
                target: "enemy_1".into(),
                amount: 10,
                died: false,
                blocked: false,
            }]
        );
        let target = world.get("enemy_1").unwrap();
        assert_eq!(target.hp, 90);
        assert_eq!(target.state, ActorState::Hurt);
        assert_eq!(target.vel.x, 2.0);
    }

    #[test]
    fn punch_misses_behind_the_attacker() {
        let mut world = arena_with_target(60.0, 100.0);
        let events = perform_strike(&mut world, "user_1", Move::Punch, &local());
        assert!(events.is_empty());
        assert_eq!(world.get("enemy_1").unwrap().hp, 100);
    }

    #[test]
    fn punch_misses_outside_reach() {
        let mut world = arena_with_target(170.0, 100.0);
        let events = perform_strike(&mut world, "user_1", Move::Punch, &local());
        assert!(events.is_empty());

        let mut world = arena_with_target(140.0, 125.0);
        let events = perform_strike(&mut world, "user_1", Move::Punch, &local());
        assert!(events.is_empty());
    }

    #[test]
    fn whirlwind_hits_both_sides() {
        let mut world = arena_with_target(60.0, 100.0);
        world.get_mut("user_1").unwrap().mp = 100;
        let events = perform_strike(&mut world, "user_1", Move::Whirlwind, &local());
        assert_eq!(events.len(), 1);
        assert_eq!(world.get("user_1").unwrap().mp, 70);
        // Knockback pushes away from the attacker.
        assert_eq!(world.get("enemy_1").unwrap().vel.x, -8.0);
    }

    #[test]
    fn foreign_target_gets_intent_not_damage() {
        let mut world = World::new();
        world.insert(Entity::player(local(), 100.0, 100.0));
        world.insert(
            Entity::player("user_2".into(), 140.0, 100.0).into_remote(),
        );

        let events = perform_strike(&mut world, "user_1", Move::Punch, &local());
        assert_eq!(
            events,
            vec![CombatEvent::HitIntent {
                target: "user_2".into(),
                damage: 10,
                force_x: 2.0,
                force_y: 0.0,
            }]
        );
        let copy = world.get("user_2").unwrap();
        // The optimistic hint staggers the copy without touching hp.
        assert_eq!(copy.hp, 100);
        assert_eq!(copy.state, ActorState::Hurt);
        assert_eq!(copy.vel.x, 5.0);
    }

    #[test]
    fn fallen_targets_are_skipped() {
        let mut world = arena_with_target(140.0, 100.0);
        world.get_mut("enemy_1").unwrap().state = ActorState::Fallen;
        let events = perform_strike(&mut world, "user_1", Move::Punch, &local());
        assert!(events.is_empty());
    }

    #[test]
    fn weapon_swing_uses_weapon_numbers() {
        let mut world = arena_with_target(200.0, 100.0);
        world.get_mut("user_1").unwrap().weapon = Some(WeaponKind::Spear);

        let events = perform_strike(&mut world, "user_1", Move::WeaponSwing, &local());
        assert_eq!(
            events,
            vec![CombatEvent::Damaged {
                target: "enemy_1".into(),
                amount: 35,
                died: false,
                blocked: false,
            }]
        );
        assert_eq!(
            world.get("user_1").unwrap().state,
            ActorState::WeaponAttack
        );
    }

    #[test]
    fn uppercut_launches_the_attacker() {
        let mut world = arena_with_target(140.0, 100.0);
        perform_strike(&mut world, "user_1", Move::Uppercut, &local());
        let attacker = world.get("user_1").unwrap();
        assert_eq!(attacker.vel.y, 10.0);
        assert_eq!(attacker.vel.x, 2.0);
        assert_eq!(attacker.mp, 85);
    }

    #[test]
    fn heavy_hit_drop_is_reported_with_position() {
        let mut world = arena_with_target(140.0, 100.0);
        world.get_mut("enemy_1").unwrap().weapon = Some(WeaponKind::Bat);

        let events = perform_strike(&mut world, "user_1", Move::RunAttack, &local());
        assert!(events.contains(&CombatEvent::WeaponDropped {
            kind: WeaponKind::Bat,
            x: 140.0,
            z: 100.0,
            facing: Facing::Right,
        }));
    }

    #[test]
    fn punch_builds_combo() {
        let mut world = arena_with_target(140.0, 100.0);
        perform_strike(&mut world, "user_1", Move::Punch, &local());
        let attacker = world.get("user_1").unwrap();
        assert_eq!(attacker.combo_count, 1);
        assert_eq!(attacker.combo_timer, 50);
    }
}
