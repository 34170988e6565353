//! Transient, locally-simulated objects: restorative pickups, dropped
//! weapons, and projectiles. None of these are synchronized; each peer
//! spawns them from its own combat outcomes, which can diverge visually
//! across peers and is accepted.

use glam::Vec3;

use crate::entity::{ActorState, Entity, EntityId, EntityKind, Facing, GRAVITY, WeaponKind};

pub const ITEM_LIFETIME: i32 = 600;
pub const PROJECTILE_LIFETIME: i32 = 40;
pub const PROJECTILE_SPEED: f32 = 12.0;
pub const PROJECTILE_DAMAGE: i32 = 20;
pub const PROJECTILE_FORCE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Hp,
    Mp,
}

/// A restorative drop. Falls to the ground, expires if nobody grabs it.
#[derive(Debug, Clone)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Vec3,
    pub vy: f32,
    pub life: i32,
    pub marked_for_removal: bool,
}

impl Item {
    pub fn new(x: f32, z: f32, kind: ItemKind) -> Self {
        Self {
            kind,
            pos: Vec3::new(x, 60.0, z),
            vy: 3.0,
            life: ITEM_LIFETIME,
            marked_for_removal: false,
        }
    }

    pub fn step(&mut self) {
        if self.pos.y > 0.0 {
            self.vy -= GRAVITY;
            self.pos.y += self.vy;
        } else {
            self.pos.y = 0.0;
            self.vy = 0.0;
        }
        self.life -= 1;
        if self.life <= 0 {
            self.marked_for_removal = true;
        }
    }

    pub fn in_pickup_range(&self, e: &Entity) -> bool {
        (e.pos.x - self.pos.x).abs() < 30.0
            && (e.pos.z - self.pos.z).abs() < 20.0
            && (e.pos.y - self.pos.y).abs() < 40.0
    }

    /// Apply the restore to a living player and consume the item.
    pub fn collect(&mut self, player: &mut Entity) {
        match self.kind {
            ItemKind::Hp => player.heal(30),
            ItemKind::Mp => player.restore_mp(30),
        }
        self.marked_for_removal = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponPhase {
    Falling,
    Ground,
}

/// A weapon lying in (or tumbling toward) the playfield.
#[derive(Debug, Clone)]
pub struct GroundWeapon {
    pub kind: WeaponKind,
    pub pos: Vec3,
    pub vel: Vec3,
    pub phase: WeaponPhase,
    pub marked_for_removal: bool,
}

impl GroundWeapon {
    /// Dropped by a staggered or fallen actor: a short arc away from them.
    pub fn dropped(x: f32, z: f32, kind: WeaponKind, facing: Facing) -> Self {
        Self {
            kind,
            pos: Vec3::new(x, 40.0, z),
            vel: Vec3::new(facing.sign() * 5.0, 8.0, 0.0),
            phase: WeaponPhase::Falling,
            marked_for_removal: false,
        }
    }

    /// Host-rolled pickup event: falls in from high above the field.
    pub fn from_sky(x: f32, z: f32, kind: WeaponKind) -> Self {
        Self {
            kind,
            pos: Vec3::new(x, 800.0, z),
            vel: Vec3::new(0.0, -15.0, 0.0),
            phase: WeaponPhase::Falling,
            marked_for_removal: false,
        }
    }

    pub fn step(&mut self, tick: u32) {
        match self.phase {
            WeaponPhase::Falling => {
                self.vel.y -= GRAVITY;
                self.pos += self.vel;
                if self.pos.y <= 0.0 {
                    self.pos.y = 0.0;
                    if self.vel.y.abs() > 2.0 {
                        // Bounce, losing half the energy.
                        self.vel.y = -self.vel.y * 0.5;
                        self.vel.x *= 0.5;
                    } else {
                        self.vel = Vec3::ZERO;
                        self.phase = WeaponPhase::Ground;
                    }
                }
            }
            WeaponPhase::Ground => {
                self.pos.y = (tick as f32 * 0.1).sin().abs() * 3.0;
            }
        }
    }

    pub fn in_pickup_range(&self, e: &Entity) -> bool {
        self.phase == WeaponPhase::Ground
            && !self.marked_for_removal
            && (e.pos.x - self.pos.x).abs() < 30.0
            && (e.pos.z - self.pos.z).abs() < 20.0
    }
}

/// An energy blast. Simulated only on the machine that fired it; damage to
/// foreign entities still travels as hit intents.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec3,
    pub vx: f32,
    pub owner_id: EntityId,
    pub owner_kind: EntityKind,
    pub life: i32,
}

impl Projectile {
    pub fn fired_by(owner: &Entity) -> Self {
        Self {
            pos: Vec3::new(owner.pos.x, owner.pos.y + 30.0, owner.pos.z),
            vx: owner.facing.sign() * PROJECTILE_SPEED,
            owner_id: owner.id.clone(),
            owner_kind: owner.kind,
            life: PROJECTILE_LIFETIME,
        }
    }

    pub fn step(&mut self) {
        self.pos.x += self.vx;
        self.life -= 1;
    }

    pub fn expired(&self) -> bool {
        self.life <= 0
    }

    /// Blasts only hit the opposing kind, and never downed actors.
    pub fn collides(&self, e: &Entity) -> bool {
        e.id != self.owner_id
            && e.kind != self.owner_kind
            && !matches!(e.state, ActorState::Fallen | ActorState::Rise)
            && (self.pos.x - e.pos.x).abs() < 30.0
            && (self.pos.z - e.pos.z).abs() < 15.0
            && (self.pos.y - e.pos.y).abs() < 40.0
    }

    pub fn force_x(&self) -> f32 {
        if self.vx > 0.0 {
            PROJECTILE_FORCE
        } else {
            -PROJECTILE_FORCE
        }
    }
}
