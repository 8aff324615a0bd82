//! Behaviour catalogs
//!
//! Every entity carries three independently swappable capability slots:
//! an input driver (who decides the intents), an integrator (how the body
//! moves) and a renderer (what it looks like). Level data selects each
//! by a small integer id; ids outside a catalog resolve to the no-op
//! variant.
//!
//! The raw 16-bit impulse field of a spawn record means different things
//! to different drivers. It is decoded once, here, into the driver's own
//! parameters so nothing downstream reinterprets it.

use serde::{Deserialize, Serialize};

use super::fixed::{Fp, to_fp};

/// Input driver ids as stored in level data
pub mod input_id {
    pub const NONE: u8 = 0;
    pub const PLAYER: u8 = 1;
    pub const WALK: u8 = 2;
    pub const HOP: u8 = 3;
    pub const WALK_LEDGE: u8 = 4;
    pub const HOP_LEDGE: u8 = 5;
    pub const FLY_VERTICAL: u8 = 6;
    pub const FLY_HORIZONTAL: u8 = 7;
    pub const UNDULATE: u8 = 8;
    pub const ERRATIC: u8 = 9;
    pub const CIRCLE: u8 = 10;
}

/// Integrator ids as stored in level data
pub mod update_id {
    pub const NONE: u8 = 0;
    pub const PHYSICS: u8 = 1;
    pub const FLYING: u8 = 2;
    pub const LADDER: u8 = 3;
}

/// Renderer ids as stored in level data
pub mod render_id {
    pub const NONE: u8 = 0;
    pub const PLAYER: u8 = 1;
    pub const WALKER: u8 = 2;
    pub const HOPPER: u8 = 3;
    pub const FLYER: u8 = 4;
}

/// Who sets an entity's intents each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputDriver {
    #[default]
    None,
    /// Buttons of the matching player slot
    Player,
    /// Patrol until blocked; `hop` jumps periodically, `ledge` also turns
    /// back at drops
    Walk { hop: bool, ledge: bool, timer: u16 },
    /// Bounce between two tile rows
    FlyVertical { top: u8, bottom: u8 },
    /// Bounce between two tile columns
    FlyHorizontal { left: u8, right: u8 },
    /// Fly horizontally while bobbing on a sine wave (amplitude in pixels)
    Undulate { amplitude: u8, rate: u8, phase: u8 },
    /// Wander around the spawn point inside a box (amplitude in pixels)
    Erratic { amplitude: u8, phase: u8, seed: u16 },
    /// Orbit the spawn point
    Circle { radius: Fp, speed: u8, phase: u8 },
}

/// Per-entity pseudo-random phase so identical monsters drift apart
pub fn desync_phase(tag: u8, x: u8, y: u8) -> u8 {
    (tag.wrapping_mul(37) ^ x.wrapping_mul(11) ^ y.wrapping_mul(5)) & 63
}

impl InputDriver {
    /// Resolve a driver id and decode its impulse parameters
    pub fn from_catalog(id: u8, impulse: u16, tag: u8, x: u8, y: u8) -> Self {
        let [lo, hi] = impulse.to_le_bytes();
        let phase = desync_phase(tag, x, y);
        match id {
            input_id::NONE => Self::None,
            input_id::PLAYER => Self::Player,
            input_id::WALK | input_id::HOP | input_id::WALK_LEDGE | input_id::HOP_LEDGE => Self::Walk {
                hop: matches!(id, input_id::HOP | input_id::HOP_LEDGE),
                ledge: matches!(id, input_id::WALK_LEDGE | input_id::HOP_LEDGE),
                timer: phase as u16,
            },
            input_id::FLY_VERTICAL => Self::FlyVertical {
                top: lo.min(hi),
                bottom: lo.max(hi),
            },
            input_id::FLY_HORIZONTAL => Self::FlyHorizontal {
                left: lo.min(hi),
                right: lo.max(hi),
            },
            input_id::UNDULATE => Self::Undulate {
                amplitude: lo,
                rate: (hi & 7).max(1),
                phase,
            },
            input_id::ERRATIC => Self::Erratic {
                amplitude: lo,
                phase,
                seed: impulse ^ ((tag as u16) << 8 | phase as u16),
            },
            input_id::CIRCLE => Self::Circle {
                radius: to_fp((impulse & 0xf) as i32 * 4),
                speed: (((impulse >> 4) & 0xf) as u8).max(1),
                phase: ((impulse >> 8) & 63) as u8 ^ phase,
            },
            other => {
                log::warn!("Unknown input driver id {} on entity {}", other, tag);
                Self::None
            }
        }
    }

    /// Whether the raw impulse is a jump impulse for this driver
    pub fn uses_jump_impulse(&self) -> bool {
        matches!(self, Self::Player | Self::Walk { .. })
    }
}

/// How an entity's body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Integrator {
    #[default]
    None,
    /// Gravity, friction and tile collision
    Physics,
    /// Free velocity integration clamped to the screen
    Flying,
    /// Climbing; entered and left by the physics integrator
    Ladder,
    /// Death arc, gravity only; never selected by level data
    Dying,
}

impl Integrator {
    pub fn from_id(id: u8) -> Self {
        match id {
            update_id::NONE => Self::None,
            update_id::PHYSICS => Self::Physics,
            update_id::FLYING => Self::Flying,
            update_id::LADDER => Self::Ladder,
            other => {
                log::warn!("Unknown update id {}", other);
                Self::None
            }
        }
    }
}

/// Which sprite set and animation an entity uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Renderer {
    #[default]
    None,
    Player,
    Walker,
    Hopper,
    Flyer,
    /// Death animation; decays to `None` when it runs out
    Dying { frames_left: u16 },
}

impl Renderer {
    pub fn from_id(id: u8) -> Self {
        match id {
            render_id::NONE => Self::None,
            render_id::PLAYER => Self::Player,
            render_id::WALKER => Self::Walker,
            render_id::HOPPER => Self::Hopper,
            render_id::FLYER => Self::Flyer,
            other => {
                log::warn!("Unknown render id {}", other);
                Self::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ids_are_no_ops() {
        assert_eq!(InputDriver::from_catalog(200, 0, 2, 0, 0), InputDriver::None);
        assert_eq!(Integrator::from_id(9), Integrator::None);
        assert_eq!(Renderer::from_id(77), Renderer::None);
    }

    #[test]
    fn test_walk_variants() {
        let hop_ledge = InputDriver::from_catalog(input_id::HOP_LEDGE, 0, 2, 1, 1);
        assert!(matches!(
            hop_ledge,
            InputDriver::Walk {
                hop: true,
                ledge: true,
                ..
            }
        ));
        let walk = InputDriver::from_catalog(input_id::WALK, 500, 2, 1, 1);
        assert!(matches!(
            walk,
            InputDriver::Walk {
                hop: false,
                ledge: false,
                ..
            }
        ));
        assert!(walk.uses_jump_impulse());
    }

    #[test]
    fn test_fly_bounds_from_impulse_bytes() {
        // Reversed bounds are normalised
        let fly = InputDriver::from_catalog(input_id::FLY_VERTICAL, 0x0412, 3, 0, 0);
        assert_eq!(fly, InputDriver::FlyVertical { top: 0x04, bottom: 0x12 });
        assert!(!fly.uses_jump_impulse());

        let fly = InputDriver::from_catalog(input_id::FLY_HORIZONTAL, 0x1402, 3, 0, 0);
        assert_eq!(fly, InputDriver::FlyHorizontal { left: 2, right: 20 });
    }

    #[test]
    fn test_circle_nibbles() {
        match InputDriver::from_catalog(input_id::CIRCLE, 0x0035, 0, 0, 0) {
            InputDriver::Circle { radius, speed, phase } => {
                assert_eq!(radius, to_fp(20));
                assert_eq!(speed, 3);
                assert_eq!(phase, desync_phase(0, 0, 0));
            }
            other => panic!("unexpected driver {:?}", other),
        }
    }

    #[test]
    fn test_undulate_rate_is_at_least_one() {
        match InputDriver::from_catalog(input_id::UNDULATE, 0x0810, 4, 2, 2) {
            InputDriver::Undulate { amplitude, rate, .. } => {
                assert_eq!(amplitude, 0x10);
                assert_eq!(rate, 1);
            }
            other => panic!("unexpected driver {:?}", other),
        }
    }

    #[test]
    fn test_desync_phase_differs_per_entity() {
        let a = desync_phase(2, 5, 5);
        let b = desync_phase(3, 5, 5);
        assert_ne!(a, b);
        assert!(a < 64 && b < 64);
    }
}
