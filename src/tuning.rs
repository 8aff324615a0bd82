//! Data-driven physics and game balance
//!
//! All rates are integers in fixed-point units so that a tuning file can
//! never introduce floating point into the simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Physics and scoring parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration (fp units/s²)
    pub gravity: i32,
    /// Terminal fall speed (fp units/s); must stay below one tile per frame
    pub max_fall: i32,
    /// Horizontal acceleration as a multiple of the entity's `maxdx`
    pub accel_factor: i32,
    /// Deceleration on release as a multiple of `maxdx`
    pub friction_factor: i32,
    /// Extra speed cap while turbo is held (fp units/s)
    pub turbo_bonus: i32,
    /// Rising speed a jump is cut to once the button is released
    pub jump_cut: i32,
    /// Frames after walking off a ledge during which a jump is honored
    pub grace_frames: u8,
    /// Ladder climbing speed (fp units/s)
    pub climb_speed: i32,
    /// Level speed byte to `maxdx` multiplier
    pub speed_scale: i32,
    /// Upward kick given to a dying entity
    pub death_hop: i32,
    /// Length of the death animation
    pub death_frames: u16,
    /// Pause on the level-complete screen before loading the next level
    pub level_complete_frames: u16,
    /// Frames between fire animation steps
    pub fire_frame_period: u16,
    /// Frames between jumps for hopping monsters
    pub hop_period: u16,
    pub treasure_points: u32,
    pub stomp_points: u32,
    /// Player respawns available before the game is over
    pub lives: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1920,
            max_fall: 840,
            accel_factor: 2,
            friction_factor: 6,
            turbo_bonus: 120,
            jump_cut: 240,
            grace_frames: 4,
            climb_speed: 180,
            speed_scale: 4,
            death_hop: 480,
            death_frames: 45,
            level_complete_frames: 60,
            fire_frame_period: 6,
            hop_period: 40,
            treasure_points: 10,
            stomp_points: 50,
            lives: 3,
        }
    }
}

impl Tuning {
    /// Parse a tuning document; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load tuning from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Cannot read tuning {}: {}, using defaults", path.display(), err);
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Invalid tuning {}: {}, using defaults", path.display(), err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 1000, "grace_frames": 8 }"#).unwrap();
        assert_eq!(tuning.gravity, 1000);
        assert_eq!(tuning.grace_frames, 8);
        assert_eq!(tuning.max_fall, Tuning::default().max_fall);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Tuning::from_json("{ gravity: ").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let tuning = Tuning::load(Path::new("/nonexistent/ladderfall-tuning.json"));
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_max_fall_below_one_tile_per_frame() {
        use crate::consts::{TILE_FP, WORLD_FPS};
        let tuning = Tuning::default();
        assert!(tuning.max_fall / WORLD_FPS < TILE_FP);
    }
}
