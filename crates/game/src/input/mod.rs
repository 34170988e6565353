use bitflags::bitflags;

use crate::entity::Facing;

/// Double-tap window in ticks (~250 ms at 30 Hz).
pub const DOUBLE_TAP_WINDOW: u32 = 8;

bitflags! {
    /// The fixed intent map the input collaborator fills in once per tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Intents: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const ATTACK = 1 << 4;
        const JUMP = 1 << 5;
        const DEFEND = 1 << 6;
    }
}

/// One tick of input. `held` is level-triggered, `pressed` carries only the
/// edges that happened this tick, `double_tap` fires once when a direction is
/// tapped twice inside the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputFrame {
    pub held: Intents,
    pub pressed: Intents,
    pub double_tap: Option<Facing>,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn held(intents: Intents) -> Self {
        Self {
            held: intents,
            ..Default::default()
        }
    }

    pub fn press(intents: Intents) -> Self {
        Self {
            held: intents,
            pressed: intents,
            ..Default::default()
        }
    }
}

/// Edge detector for the run trigger. The collaborator reports raw direction
/// presses; two presses of the same direction inside the window produce one
/// double-tap event.
#[derive(Debug, Default)]
pub struct DoubleTapTracker {
    last: Option<(Intents, u32)>,
}

impl DoubleTapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, direction: Intents, tick: u32) -> Option<Facing> {
        let tapped = match self.last {
            Some((prev, at)) => prev == direction && tick.wrapping_sub(at) < DOUBLE_TAP_WINDOW,
            None => false,
        };
        self.last = Some((direction, tick));

        if !tapped {
            return None;
        }
        self.last = None;
        if direction == Intents::LEFT {
            Some(Facing::Left)
        } else if direction == Intents::RIGHT {
            Some(Facing::Right)
        } else {
            None
        }
    }
}
