mod state;
mod world;

pub use state::ActorState;
pub use world::World;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Participant identifier, e.g. `user_48213`. Player entities reuse their
/// owner's id; enemies get `enemy_<n>` handles from the host.
pub type PeerId = String;
pub type EntityId = String;

pub const GRAVITY: f32 = 0.6;
pub const DRAG: f32 = 0.85;

/// Fraction of the remaining distance a remote copy covers per tick.
pub const REMOTE_SMOOTHING: f32 = 0.2;

const MP_REGEN_INTERVAL: u32 = 10;
const RISE_INVULN_TICKS: i32 = 60;
const WALK_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Bat,
    Sword,
    Spear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    pub fn sign_i8(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    pub fn from_sign(sign: i8) -> Self {
        if sign < 0 { Self::Left } else { Self::Right }
    }

    /// Facing toward a target x coordinate.
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x > from_x { Self::Right } else { Self::Left }
    }
}

/// Lifecycle outcomes an entity reports back instead of mutating the session
/// itself. The session decides what to broadcast and what to spawn.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    /// An owned enemy finished its fallen countdown and tombstoned itself.
    EnemyExpired { id: EntityId, x: f32, z: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub applied: i32,
    pub blocked: bool,
    pub died: bool,
    pub dropped: Option<WeaponKind>,
}

/// One simulated actor. Position is `x` lateral, `y` height above ground,
/// `z` depth into the playfield. Exactly one participant owns an entity;
/// everyone else holds a remote copy driven by snapshots.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub owner: PeerId,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub vel: Vec3,
    pub facing: Facing,
    pub hp: i32,
    pub mp: i32,
    pub state: ActorState,
    pub state_timer: i32,
    pub invulnerable: i32,
    pub combo_count: i32,
    pub combo_timer: i32,
    pub weapon: Option<WeaponKind>,
    pub is_remote: bool,
    pub is_host: bool,
    pub marked_for_removal: bool,
    /// Interpolation target, only meaningful while `is_remote`.
    pub target: Vec3,
}

impl Entity {
    pub fn new(id: EntityId, owner: PeerId, kind: EntityKind, x: f32, z: f32) -> Self {
        Self {
            id,
            owner,
            kind,
            pos: Vec3::new(x, 0.0, z),
            vel: Vec3::ZERO,
            facing: Facing::Right,
            hp: 100,
            mp: 100,
            state: ActorState::Idle,
            state_timer: 0,
            invulnerable: 0,
            combo_count: 0,
            combo_timer: 0,
            weapon: None,
            is_remote: false,
            is_host: false,
            marked_for_removal: false,
            target: Vec3::new(x, 0.0, z),
        }
    }

    pub fn player(owner: PeerId, x: f32, z: f32) -> Self {
        Self::new(owner.clone(), owner, EntityKind::Player, x, z)
    }

    pub fn enemy(id: EntityId, owner: PeerId, x: f32, z: f32) -> Self {
        Self::new(id, owner, EntityKind::Enemy, x, z)
    }

    pub fn into_remote(mut self) -> Self {
        self.is_remote = true;
        self
    }

    pub fn grounded(&self) -> bool {
        self.pos.y <= 0.0
    }

    /// Guarded state transition for moves and external effects. `Fallen` and
    /// `Rise` refuse every caller until their timers advance the lifecycle;
    /// `Hurt` only yields to `Fallen` or `Idle`. Returns whether the
    /// transition happened.
    pub fn set_state(&mut self, new: ActorState) -> bool {
        if matches!(self.state, ActorState::Fallen | ActorState::Rise) {
            return false;
        }
        if self.state == ActorState::Hurt
            && !matches!(new, ActorState::Fallen | ActorState::Idle)
        {
            return false;
        }
        self.state = new;
        self.state_timer = new.duration();
        true
    }

    /// One authoritative simulation step: integration, timers, lifecycle.
    /// Only the owning participant may call this.
    pub fn step_local(&mut self, tick: u32) -> Vec<EntityEvent> {
        let mut events = Vec::new();

        self.pos += self.vel;

        if self.pos.y > 0.0 {
            self.vel.y -= GRAVITY;
        } else {
            self.pos.y = 0.0;
            self.vel.y = 0.0;
            if self.state.ends_on_landing() {
                self.set_state(ActorState::Idle);
            }
        }

        if self.pos.y == 0.0 {
            self.vel.x *= DRAG;
            self.vel.z *= DRAG;
        }
        if self.pos.z < 0.0 {
            self.pos.z = 0.0;
        }

        self.state_timer -= 1;
        if self.invulnerable > 0 {
            self.invulnerable -= 1;
        }
        if self.combo_timer > 0 {
            self.combo_timer -= 1;
            if self.combo_timer == 0 {
                self.combo_count = 0;
            }
        }

        // Movement states derive from velocity, no input needed.
        if self.vel.x.abs() > WALK_THRESHOLD || self.vel.z.abs() > WALK_THRESHOLD {
            if self.state == ActorState::Idle && self.grounded() {
                self.state = ActorState::Walk;
            }
        } else if self.state == ActorState::Walk && self.grounded() {
            self.state = ActorState::Idle;
        }

        if self.state.auto_reverts() && self.state_timer <= 0 {
            self.set_state(ActorState::Idle);
        }

        if self.state == ActorState::Fallen && self.state_timer <= 0 {
            match self.kind {
                EntityKind::Enemy => {
                    self.marked_for_removal = true;
                    events.push(EntityEvent::EnemyExpired {
                        id: self.id.clone(),
                        x: self.pos.x,
                        z: self.pos.z,
                    });
                }
                EntityKind::Player => {
                    // Lifecycle advances directly, bypassing the external guard.
                    self.state = ActorState::Rise;
                    self.state_timer = ActorState::Rise.duration();
                }
            }
        } else if self.state == ActorState::Rise && self.state_timer <= 0 {
            self.state = ActorState::Idle;
            self.state_timer = 0;
            self.invulnerable = RISE_INVULN_TICKS;
        }

        if self.mp < 100 && tick % MP_REGEN_INTERVAL == 0 {
            self.mp += 1;
        }

        events
    }

    /// One non-authoritative step: ease toward the last snapshot instead of
    /// simulating. Attack poses that arrive without a timer get a nominal one
    /// so the pose reads for a visible beat.
    pub fn step_remote(&mut self) {
        self.pos.x += (self.target.x - self.pos.x) * REMOTE_SMOOTHING;
        self.pos.z += (self.target.z - self.pos.z) * REMOTE_SMOOTHING;
        self.pos.y = self.target.y;

        if matches!(self.state, ActorState::Attack | ActorState::Uppercut)
            && self.state_timer == 0
        {
            self.state_timer = 20;
        }
        self.state_timer -= 1;
    }

    /// Owner-side damage pipeline. Returns `None` when the hit is ignored
    /// outright (invulnerable, already down or rising).
    pub fn take_damage(&mut self, amount: i32, force_x: f32, force_y: f32) -> Option<DamageOutcome> {
        if self.invulnerable > 0 || matches!(self.state, ActorState::Fallen | ActorState::Rise) {
            return None;
        }

        let mut dropped = None;
        let (applied, blocked) = if self.state == ActorState::Defend {
            self.vel.x = force_x * 0.5;
            ((amount as f32 * 0.2).floor() as i32, true)
        } else {
            self.vel.x = force_x;
            self.vel.y = force_y;
            self.set_state(ActorState::Hurt);
            if (force_y > 0.0 || amount > 15) && self.weapon.is_some() {
                dropped = self.weapon.take();
            }
            (amount, false)
        };

        self.hp -= applied;
        let died = self.hp <= 0;
        if died {
            self.hp = 0;
            self.set_state(ActorState::Fallen);
            if self.weapon.is_some() {
                dropped = self.weapon.take();
            }
        }

        Some(DamageOutcome {
            applied,
            blocked,
            died,
            dropped,
        })
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(100);
    }

    pub fn restore_mp(&mut self, amount: i32) {
        self.mp = (self.mp + amount).min(100);
    }
}
