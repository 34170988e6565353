pub mod ai;
pub mod combat;
pub mod entity;
pub mod input;
pub mod items;
pub mod net;
pub mod session;
pub mod simulation;

pub use combat::{CombatEvent, Move, MoveSpec, Reach, perform_strike};
pub use entity::{
    ActorState, DamageOutcome, Entity, EntityEvent, EntityId, EntityKind, Facing, PeerId,
    WeaponKind, World,
};
pub use input::{DOUBLE_TAP_WINDOW, DoubleTapTracker, InputFrame, Intents};
pub use items::{GroundWeapon, Item, ItemKind, Projectile, WeaponPhase};
pub use net::{
    BROADCAST_INTERVAL_TICKS, ChannelTransport, EntitySnapshot, LocalRelay, Message,
    ProtocolError, RosterEntry, TICK_RATE, Transport,
};
pub use session::{
    Session, SessionConfig, SessionContext, SessionEvent, SessionPhase, random_peer_id,
};
pub use simulation::FixedTimestep;
