//! Ladderfall - a fixed-point single-screen platformer engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, tile collisions, AI, game loop)
//! - `level`: Packed level table decoding (and the matching encoder)
//! - `input`: Per-frame button snapshots
//! - `audio`: Sound effect trigger interface
//! - `tuning`: Data-driven physics balance
//! - `demo`: Seeded attract-mode pilot

pub mod audio;
pub mod demo;
pub mod input;
pub mod level;
pub mod sim;
pub mod tuning;

pub use audio::{AudioSink, SoundEffect};
pub use input::{Buttons, InputSnapshot};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed-point shift: positions are stored in quarter pixels
    pub const FP_SHIFT: u32 = 2;
    /// One pixel in fixed-point units
    pub const FP_ONE: i32 = 1 << FP_SHIFT;

    /// Tile edge length in pixels (entities are one tile)
    pub const TILE_SIZE: i32 = 8;
    /// Tile edge length in fixed-point units
    pub const TILE_FP: i32 = TILE_SIZE << FP_SHIFT;

    /// Screen tile grid
    pub const GRID_WIDTH: usize = 30;
    pub const GRID_HEIGHT: usize = 28;

    /// Screen size in pixels
    pub const SCREEN_WIDTH: i32 = GRID_WIDTH as i32 * TILE_SIZE;
    pub const SCREEN_HEIGHT: i32 = GRID_HEIGHT as i32 * TILE_SIZE;
    /// Screen size in fixed-point units
    pub const SCREEN_WIDTH_FP: i32 = SCREEN_WIDTH << FP_SHIFT;
    pub const SCREEN_HEIGHT_FP: i32 = SCREEN_HEIGHT << FP_SHIFT;

    /// Solidity bitmap size (one bit per tile, row-major)
    pub const BITMAP_BYTES: usize = (GRID_WIDTH * GRID_HEIGHT).div_ceil(8);

    /// Fixed simulation rate; velocities are fixed-point units per second
    pub const WORLD_FPS: i32 = 30;

    /// Entity slots
    pub const MAX_PLAYERS: usize = 2;
    pub const MAX_MONSTERS: usize = 6;
    pub const MAX_ENTITIES: usize = MAX_PLAYERS + MAX_MONSTERS;

    /// Number of known tile themes
    pub const THEME_COUNT: usize = 4;
}
