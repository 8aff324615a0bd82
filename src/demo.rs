//! Attract-mode pilot
//!
//! Drives player one with seeded pseudo-random button presses so the game
//! can play itself on the title screen or in headless runs. The same seed
//! always produces the same button sequence, which keeps replays exact.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::MAX_PLAYERS;
use crate::input::{Buttons, InputSnapshot};

/// Shortest and longest time one stick direction is held, in frames
const MIN_HOLD: u16 = 8;
const MAX_HOLD: u16 = 50;

/// Seeded button generator for player one
#[derive(Debug, Clone)]
pub struct AttractPilot {
    rng: Pcg32,
    stick: Buttons,
    hold_frames: u16,
    snapshot: InputSnapshot,
}

impl AttractPilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            stick: Buttons::empty(),
            hold_frames: 0,
            snapshot: InputSnapshot::default(),
        }
    }

    fn pick_stick(&mut self) -> Buttons {
        match self.rng.random_range(0..10) {
            0..=3 => Buttons::RIGHT,
            4..=6 => Buttons::LEFT,
            7 => Buttons::UP,
            8 => Buttons::DOWN,
            _ => Buttons::empty(),
        }
    }

    /// Buttons for the next frame
    pub fn next_snapshot(&mut self) -> InputSnapshot {
        if self.hold_frames == 0 {
            self.stick = self.pick_stick();
            self.hold_frames = self.rng.random_range(MIN_HOLD..=MAX_HOLD);
        }
        self.hold_frames -= 1;

        let mut held = self.stick;
        // Jump is held for a few frames at a time so jumps reach full height
        if self.snapshot.held(0).contains(Buttons::A) {
            if self.rng.random_bool(0.8) {
                held |= Buttons::A;
            }
        } else if self.rng.random_bool(0.04) {
            held |= Buttons::A;
        }
        if held.intersects(Buttons::LEFT | Buttons::RIGHT) && self.rng.random_bool(0.3) {
            held |= Buttons::B;
        }

        let mut all = [Buttons::empty(); MAX_PLAYERS];
        all[0] = held;
        self.snapshot = self.snapshot.next(all);
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seed: u64, frames: usize) -> Vec<InputSnapshot> {
        let mut pilot = AttractPilot::new(seed);
        (0..frames).map(|_| pilot.next_snapshot()).collect()
    }

    #[test]
    fn test_same_seed_same_buttons() {
        assert_eq!(record(7, 500), record(7, 500));
    }

    #[test]
    fn test_different_seeds_diverge() {
        assert_ne!(record(1, 500), record(2, 500));
    }

    #[test]
    fn test_only_player_one_is_driven() {
        for snapshot in record(3, 300) {
            assert!(snapshot.held(1).is_empty());
            assert!(snapshot.pressed(1).is_empty());
        }
    }

    #[test]
    fn test_pilot_moves_and_jumps() {
        let frames = record(11, 1000);
        assert!(frames.iter().any(|s| s.pressed(0).contains(Buttons::A)));
        assert!(frames.iter().any(|s| s.held(0).intersects(Buttons::LEFT | Buttons::RIGHT)));
    }

    #[test]
    fn test_never_holds_opposite_directions() {
        for snapshot in record(5, 1000) {
            assert!(!snapshot.held(0).contains(Buttons::LEFT | Buttons::RIGHT));
            assert!(!snapshot.held(0).contains(Buttons::UP | Buttons::DOWN));
        }
    }
}
