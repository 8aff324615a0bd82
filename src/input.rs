//! Per-frame input snapshots
//!
//! The platform layer samples buttons once per frame; the simulation only
//! ever sees the resulting snapshot.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;

bitflags! {
    /// Button bitmask for one player slot
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Buttons: u8 {
        const LEFT  = 1 << 0;
        const RIGHT = 1 << 1;
        const UP    = 1 << 2;
        const DOWN  = 1 << 3;
        /// Jump
        const A     = 1 << 4;
        /// Turbo
        const B     = 1 << 5;
    }
}

/// Held and newly pressed buttons for every player slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub held: [Buttons; MAX_PLAYERS],
    pub pressed: [Buttons; MAX_PLAYERS],
}

impl InputSnapshot {
    /// Build the snapshot that follows `self` given the buttons held now
    pub fn next(&self, held: [Buttons; MAX_PLAYERS]) -> Self {
        let mut pressed = [Buttons::empty(); MAX_PLAYERS];
        for (slot, p) in pressed.iter_mut().enumerate() {
            *p = held[slot] & !self.held[slot];
        }
        Self { held, pressed }
    }

    /// Buttons held by a slot (empty for unknown slots)
    pub fn held(&self, slot: usize) -> Buttons {
        self.held.get(slot).copied().unwrap_or_default()
    }

    /// Buttons that went down this frame
    pub fn pressed(&self, slot: usize) -> Buttons {
        self.pressed.get(slot).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_is_rising_edge() {
        let first = InputSnapshot::default().next([Buttons::A | Buttons::LEFT, Buttons::empty()]);
        assert_eq!(first.pressed(0), Buttons::A | Buttons::LEFT);

        let second = first.next([Buttons::A, Buttons::RIGHT]);
        assert!(second.pressed(0).is_empty());
        assert_eq!(second.held(0), Buttons::A);
        assert_eq!(second.pressed(1), Buttons::RIGHT);
    }

    #[test]
    fn test_unknown_slot_is_empty() {
        let snap = InputSnapshot::default().next([Buttons::all(); MAX_PLAYERS]);
        assert!(snap.held(MAX_PLAYERS).is_empty());
        assert!(snap.pressed(99).is_empty());
    }
}
