use serde::{Deserialize, Serialize};

use crate::entity::{ActorState, Entity, EntityId, EntityKind, Facing, PeerId, WeaponKind};

/// Simulation tick rate. Snapshots go out at a third of this.
pub const TICK_RATE: u32 = 30;

/// Every message is a tagged JSON record over a bidirectional text channel.
/// The relay forwards them verbatim; only peers interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Announce presence. The host answers with a full roster resync.
    #[serde(rename_all = "camelCase")]
    Join { id: PeerId, is_host: bool },
    /// Full roster, sent by the host so late joiners converge without
    /// replaying history.
    LobbyUpdate { players: Vec<RosterEntry> },
    /// Flips every participant from lobby to active simulation, no ack.
    StartGame,
    /// Periodic authoritative snapshot of one entity.
    StateUpdate { data: EntitySnapshot },
    /// Host-authoritative enemy creation.
    #[serde(rename_all = "camelCase")]
    SpawnEnemy {
        id: EntityId,
        owner_id: PeerId,
        x: f32,
        z: f32,
    },
    /// Cross-ownership damage request. The receiver honors it
    /// unconditionally if it owns the target.
    #[serde(rename_all = "camelCase")]
    Hit {
        target_id: EntityId,
        damage: i32,
        force_x: f32,
        force_y: f32,
    },
    /// The authoritative owner signals definitive removal.
    Remove { id: EntityId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: PeerId,
    pub is_host: bool,
}

/// The compact observable state of one entity. Positions are rounded to
/// whole units to keep snapshots small; the receiver smooths over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub owner_id: PeerId,
    pub x: i32,
    pub z: i32,
    pub y: i32,
    pub state: ActorState,
    pub facing: i8,
    pub hp: i32,
    pub weapon: Option<WeaponKind>,
}

impl EntitySnapshot {
    pub fn capture(e: &Entity) -> Self {
        Self {
            id: e.id.clone(),
            kind: e.kind,
            owner_id: e.owner.clone(),
            x: e.pos.x.round() as i32,
            z: e.pos.z.round() as i32,
            y: e.pos.y.round() as i32,
            state: e.state,
            facing: e.facing.sign_i8(),
            hp: e.hp,
            weapon: e.weapon,
        }
    }

    pub fn facing(&self) -> Facing {
        Facing::from_sign(self.facing)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("encoding failed: {0}")]
    Encode(serde_json::Error),
    #[error("malformed message: {0}")]
    Decode(serde_json::Error),
}

impl Message {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Decode)
    }
}
