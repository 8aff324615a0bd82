//! Packed level format
//!
//! A level table is a single byte blob: a level count, a little-endian
//! offset per level, then the level records. Each record carries a fixed
//! header (theme, time bonus, spawn parameters), a one-bit-per-tile
//! solidity bitmap, four overlay counts, and a 5-bit packed coordinate
//! stream. See [`decode`] for the exact layout.

pub mod bits;
pub mod builtin;
pub mod decode;
pub mod encode;
pub mod sketch;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BITMAP_BYTES, GRID_HEIGHT, GRID_WIDTH, MAX_MONSTERS, MAX_PLAYERS};

pub use decode::{LevelHeader, LevelTable};
pub use encode::encode_table;

/// Why a level could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level {index} out of range (table holds {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("level {index} uses unknown theme {theme}")]
    UnknownTheme { index: usize, theme: u8 },
    #[error("level {index} truncated: needs {needed} bytes at offset {offset}, table has {len}")]
    Truncated {
        index: usize,
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("level table is empty or its offset table is truncated")]
    BadTable,
    #[error("level {index} has no player spawn on the grid")]
    NoPlayers { index: usize },
    #[error("{field} = {value} does not fit the level format (max {max})")]
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

bitflags! {
    /// Per-entity spawn flags byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SpawnFlags: u8 {
        const INTERACTS   = 1 << 0;
        const AUTORESPAWN = 1 << 1;
        const INVINCIBLE  = 1 << 2;
        const VISIBLE     = 1 << 3;
        const FACE_LEFT   = 1 << 4;
    }
}

/// Spawn parameters for one entity slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpawnParams {
    pub flags: SpawnFlags,
    /// Speed byte, scaled into `maxdx` by `Tuning::speed_scale`
    pub speed: u8,
    /// Raw impulse field; its meaning depends on the input driver
    pub impulse: u16,
    pub input: u8,
    pub update: u8,
    pub render: u8,
    /// Spawn tile; anything off the grid disables the slot
    pub x: u8,
    pub y: u8,
}

impl SpawnParams {
    /// Coordinates used for an unused slot
    pub const ABSENT: u8 = 31;

    /// A slot with nothing in it
    pub fn absent() -> Self {
        Self {
            x: Self::ABSENT,
            y: Self::ABSENT,
            ..Default::default()
        }
    }

    /// Whether the spawn tile lies on the grid
    pub fn on_grid(&self) -> bool {
        (self.x as usize) < GRID_WIDTH && (self.y as usize) < GRID_HEIGHT
    }
}

/// A horizontal run of tiles on one row (one-way strips, fire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub row: u8,
    pub x1: u8,
    pub x2: u8,
}

/// A vertical ladder in one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderSpan {
    pub column: u8,
    pub y1: u8,
    pub y2: u8,
}

/// One bit per tile, row-major, most significant bit first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityBitmap(Vec<u8>);

impl SolidityBitmap {
    pub fn empty() -> Self {
        Self(vec![0; BITMAP_BYTES])
    }

    /// Wrap exactly `BITMAP_BYTES` bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        (bytes.len() == BITMAP_BYTES).then(|| Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Solidity of a cell; off-grid cells are not solid
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= GRID_WIDTH || y as usize >= GRID_HEIGHT {
            return false;
        }
        let bit = y as usize * GRID_WIDTH + x as usize;
        self.0[bit / 8] & (0x80 >> (bit % 8)) != 0
    }

    /// Set or clear a cell; off-grid cells are ignored
    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        if x >= GRID_WIDTH || y >= GRID_HEIGHT {
            return;
        }
        let bit = y * GRID_WIDTH + x;
        if solid {
            self.0[bit / 8] |= 0x80 >> (bit % 8);
        } else {
            self.0[bit / 8] &= !(0x80 >> (bit % 8));
        }
    }
}

/// Decoded, immutable level descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub index: usize,
    pub theme: u8,
    /// Seconds of bonus available when the level starts
    pub time_bonus: u16,
    pub players: [SpawnParams; MAX_PLAYERS],
    pub monsters: [SpawnParams; MAX_MONSTERS],
    pub bitmap: SolidityBitmap,
    /// Treasure tiles `(x, y)`
    pub treasures: Vec<(u8, u8)>,
    pub one_ways: Vec<Span>,
    pub ladders: Vec<LadderSpan>,
    pub fires: Vec<Span>,
}

impl Level {
    /// An empty level: no solid tiles, no entities, no overlays
    pub fn blank(theme: u8) -> Self {
        Self {
            index: 0,
            theme,
            time_bonus: 0,
            players: [SpawnParams::absent(); MAX_PLAYERS],
            monsters: [SpawnParams::absent(); MAX_MONSTERS],
            bitmap: SolidityBitmap::empty(),
            treasures: Vec::new(),
            one_ways: Vec::new(),
            ladders: Vec::new(),
            fires: Vec::new(),
        }
    }

    /// Spawn parameters of an entity slot (players first, then monsters)
    pub fn spawn(&self, slot: usize) -> Option<&SpawnParams> {
        if slot < MAX_PLAYERS {
            self.players.get(slot)
        } else {
            self.monsters.get(slot - MAX_PLAYERS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_is_msb_first_row_major() {
        let mut bitmap = SolidityBitmap::empty();
        bitmap.set(0, 0, true);
        bitmap.set(9, 0, true);
        bitmap.set(0, 1, true);
        let bytes = bitmap.as_bytes();
        assert_eq!(bytes[0], 0x80);
        assert_eq!(bytes[1], 0x40);
        // Row 1 starts at bit 30: byte 3, bit 6
        assert_eq!(bytes[3], 0x02);
        assert!(bitmap.is_solid(9, 0));
        assert!(!bitmap.is_solid(8, 0));
        assert!(!bitmap.is_solid(-1, 0));
        assert!(!bitmap.is_solid(0, GRID_HEIGHT as i32));
    }

    #[test]
    fn test_absent_spawn_is_off_grid() {
        assert!(!SpawnParams::absent().on_grid());
        let p = SpawnParams {
            x: 29,
            y: 27,
            ..Default::default()
        };
        assert!(p.on_grid());
    }

    #[test]
    fn test_bitmap_size() {
        assert_eq!(BITMAP_BYTES, 105);
        assert!(SolidityBitmap::from_bytes(&[0; 104]).is_none());
        assert!(SolidityBitmap::from_bytes(&[0; 105]).is_some());
    }
}
