use serde::{Deserialize, Serialize};

/// Flat actor state machine. Every actor is in exactly one of these at any
/// tick; gravity and drag run regardless of state, the state only gates which
/// moves and transitions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorState {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    RunAttack,
    WeaponAttack,
    Jump,
    JumpKick,
    Uppercut,
    Whirlwind,
    Heal,
    Defend,
    Hurt,
    Fallen,
    Rise,
}

impl ActorState {
    /// Ticks the state lasts when entered through `Entity::set_state`.
    /// Zero means untimed (movement states, jump until landing).
    pub fn duration(self) -> i32 {
        match self {
            Self::Attack => 30,
            Self::WeaponAttack => 30,
            Self::JumpKick => 60,
            Self::Uppercut => 60,
            Self::Whirlwind => 80,
            Self::Heal => 70,
            Self::RunAttack => 50,
            Self::Hurt => 20,
            Self::Fallen => 60,
            Self::Defend => 10,
            Self::Rise => 30,
            _ => 0,
        }
    }

    /// States that revert to `Idle` on their own once the timer runs out.
    pub fn auto_reverts(self) -> bool {
        matches!(
            self,
            Self::Attack
                | Self::Hurt
                | Self::Heal
                | Self::Whirlwind
                | Self::RunAttack
                | Self::WeaponAttack
                | Self::Defend
        )
    }

    /// States that end when the actor touches the ground.
    pub fn ends_on_landing(self) -> bool {
        matches!(self, Self::Jump | Self::JumpKick | Self::Uppercut)
    }

    /// Action states that block movement input and cannot be re-entered
    /// until they finish.
    pub fn is_action(self) -> bool {
        matches!(
            self,
            Self::Attack
                | Self::WeaponAttack
                | Self::Uppercut
                | Self::Whirlwind
                | Self::Heal
        )
    }

    /// While in one of these the owning participant ignores input entirely.
    pub fn blocks_input(self) -> bool {
        matches!(self, Self::Fallen | Self::Hurt | Self::Rise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_states_have_durations() {
        assert_eq!(ActorState::Attack.duration(), 30);
        assert_eq!(ActorState::Whirlwind.duration(), 80);
        assert_eq!(ActorState::Fallen.duration(), 60);
        assert_eq!(ActorState::Idle.duration(), 0);
        assert_eq!(ActorState::Jump.duration(), 0);
    }

    #[test]
    fn jump_family_ends_on_landing() {
        assert!(ActorState::Jump.ends_on_landing());
        assert!(ActorState::JumpKick.ends_on_landing());
        assert!(ActorState::Uppercut.ends_on_landing());
        assert!(!ActorState::Attack.ends_on_landing());
    }

    #[test]
    fn wire_names_are_snake_case() {
        let json = serde_json::to_string(&ActorState::RunAttack).unwrap();
        assert_eq!(json, "\"run_attack\"");
        let back: ActorState = serde_json::from_str("\"jump_kick\"").unwrap();
        assert_eq!(back, ActorState::JumpKick);
    }
}
