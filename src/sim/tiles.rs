//! Tile themes and table-driven classification
//!
//! Every theme owns a block of `THEME_STRIDE` raw tile indices starting at
//! its `base`. Semantics come from the theme-local index, so the same raw
//! index means different things under different themes; a raw index that
//! falls outside the active theme's block is plain scenery.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::THEME_COUNT;

/// Raw tile index as stored in the tile grid
pub type TileIndex = u8;

/// Raw indices reserved per theme
pub const THEME_STRIDE: u8 = 32;

bitflags! {
    /// Collision semantics of a tile
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TileAttrs: u8 {
        const SOLID    = 1 << 0;
        const ONE_WAY  = 1 << 1;
        const LADDER   = 1 << 2;
        const FIRE     = 1 << 3;
        const TREASURE = 1 << 4;
    }
}

/// Theme-local tile indices
pub mod local {
    pub const UNDERGROUND: u8 = 0;
    pub const ABOVEGROUND: u8 = 1;
    /// First of the six sky variants, see [`super::Sky`]
    pub const SKY: u8 = 2;
    /// First of the six treasure-over-sky variants
    pub const TREASURE: u8 = 8;
    pub const ONE_WAY: u8 = 14;
    pub const ONE_WAY_LADDER: u8 = 15;
    pub const LADDER_TOP: u8 = 16;
    pub const LADDER: u8 = 17;
    pub const LADDER_UNDERGROUND: u8 = 18;
    pub const LADDER_ABOVEGROUND: u8 = 19;
    pub const FIRE: u8 = 20;
    pub const FIRE_FRAMES: u8 = 3;
}

/// Background variant of a non-solid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sky {
    /// Bottom row, nothing below
    Full,
    /// Nothing solid directly below
    Open,
    /// Solid below, both lower diagonals clear
    Island,
    /// Solid below and below-right, below-left clear
    ClearLeft,
    /// Solid below and below-left, below-right clear
    ClearRight,
    /// Solid below and on both lower diagonals
    Interior,
}

impl Sky {
    pub const ALL: [Sky; 6] = [
        Sky::Full,
        Sky::Open,
        Sky::Island,
        Sky::ClearLeft,
        Sky::ClearRight,
        Sky::Interior,
    ];

    pub fn local(self) -> u8 {
        local::SKY + self as u8
    }

    /// Pick the variant for a cell from the solidity of its neighbours
    pub fn pick(below: bool, below_left: bool, below_right: bool) -> Self {
        match (below, below_left, below_right) {
            (false, _, _) => Sky::Open,
            (true, false, false) => Sky::Island,
            (true, false, true) => Sky::ClearLeft,
            (true, true, false) => Sky::ClearRight,
            (true, true, true) => Sky::Interior,
        }
    }
}

/// Coarse tile category used by the overlay mapping tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileCategory {
    Sky,
    Underground,
    Aboveground,
    Treasure,
    OneWay,
    LadderTop,
    Ladder,
    Fire,
}

const ATTRS: [TileAttrs; THEME_STRIDE as usize] = {
    let mut table = [TileAttrs::empty(); THEME_STRIDE as usize];
    table[local::UNDERGROUND as usize] = TileAttrs::SOLID;
    table[local::ABOVEGROUND as usize] = TileAttrs::SOLID;
    let mut i = 0;
    while i < 6 {
        table[(local::TREASURE + i) as usize] = TileAttrs::TREASURE;
        i += 1;
    }
    table[local::ONE_WAY as usize] = TileAttrs::ONE_WAY;
    table[local::ONE_WAY_LADDER as usize] = TileAttrs::ONE_WAY.union(TileAttrs::LADDER);
    table[local::LADDER_TOP as usize] = TileAttrs::ONE_WAY.union(TileAttrs::LADDER);
    table[local::LADDER as usize] = TileAttrs::LADDER;
    table[local::LADDER_UNDERGROUND as usize] = TileAttrs::LADDER;
    table[local::LADDER_ABOVEGROUND as usize] = TileAttrs::ONE_WAY.union(TileAttrs::LADDER);
    let mut f = 0;
    while f < local::FIRE_FRAMES {
        table[(local::FIRE + f) as usize] = TileAttrs::FIRE;
        f += 1;
    }
    table
};

fn category_of_local(l: u8) -> TileCategory {
    match l {
        local::UNDERGROUND => TileCategory::Underground,
        local::ABOVEGROUND => TileCategory::Aboveground,
        8..=13 => TileCategory::Treasure,
        local::ONE_WAY => TileCategory::OneWay,
        local::LADDER_TOP => TileCategory::LadderTop,
        local::ONE_WAY_LADDER | local::LADDER | local::LADDER_UNDERGROUND | local::LADDER_ABOVEGROUND => {
            TileCategory::Ladder
        }
        20..=22 => TileCategory::Fire,
        _ => TileCategory::Sky,
    }
}

/// Overlay result per category, indexed by `TileCategory as usize`;
/// `None` leaves the cell untouched
pub type OverlayMap = [Option<u8>; 8];

/// Top cell of a ladder
pub const LADDER_TOP_MAP: OverlayMap = [
    Some(local::LADDER_TOP),         // Sky
    Some(local::LADDER_UNDERGROUND), // Underground
    Some(local::LADDER_ABOVEGROUND), // Aboveground
    None,                            // Treasure
    Some(local::ONE_WAY_LADDER),     // OneWay
    None,                            // LadderTop
    None,                            // Ladder
    None,                            // Fire
];

/// Every other ladder cell
pub const LADDER_MIDDLE_MAP: OverlayMap = [
    Some(local::LADDER),
    Some(local::LADDER_UNDERGROUND),
    Some(local::LADDER_ABOVEGROUND),
    None,
    Some(local::ONE_WAY_LADDER),
    Some(local::LADDER),
    None,
    None,
];

pub const ONE_WAY_MAP: OverlayMap = [
    Some(local::ONE_WAY),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

pub const FIRE_MAP: OverlayMap = [
    Some(local::FIRE),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

/// A tileset: a named block of raw tile indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: u8,
    pub name: &'static str,
    pub base: TileIndex,
}

pub const THEMES: [Theme; THEME_COUNT] = [
    Theme {
        id: 0,
        name: "meadow",
        base: 0,
    },
    Theme {
        id: 1,
        name: "cavern",
        base: THEME_STRIDE,
    },
    Theme {
        id: 2,
        name: "castle",
        base: 2 * THEME_STRIDE,
    },
    Theme {
        id: 3,
        name: "night",
        base: 3 * THEME_STRIDE,
    },
];

impl Theme {
    /// Look up a theme; unknown ids are `None`
    pub fn get(id: u8) -> Option<&'static Theme> {
        THEMES.get(id as usize)
    }

    /// Raw index of a theme-local tile
    pub fn tile(&self, l: u8) -> TileIndex {
        self.base + l
    }

    /// Theme-local index of a raw tile, if it belongs to this theme
    pub fn local(&self, tile: TileIndex) -> Option<u8> {
        tile.checked_sub(self.base).filter(|&l| l < THEME_STRIDE)
    }

    pub fn sky(&self, sky: Sky) -> TileIndex {
        self.tile(sky.local())
    }

    pub fn attrs(&self, tile: TileIndex) -> TileAttrs {
        self.local(tile)
            .map(|l| ATTRS[l as usize])
            .unwrap_or_default()
    }

    pub fn category(&self, tile: TileIndex) -> TileCategory {
        self.local(tile)
            .map(category_of_local)
            .unwrap_or(TileCategory::Sky)
    }

    pub fn is_solid(&self, tile: TileIndex) -> bool {
        self.attrs(tile).contains(TileAttrs::SOLID)
    }

    pub fn is_one_way(&self, tile: TileIndex) -> bool {
        self.attrs(tile).contains(TileAttrs::ONE_WAY)
    }

    pub fn is_ladder(&self, tile: TileIndex) -> bool {
        self.attrs(tile).contains(TileAttrs::LADDER)
    }

    pub fn is_fire(&self, tile: TileIndex) -> bool {
        self.attrs(tile).contains(TileAttrs::FIRE)
    }

    pub fn is_treasure(&self, tile: TileIndex) -> bool {
        self.attrs(tile).contains(TileAttrs::TREASURE)
    }

    /// Apply an overlay map to a tile; `None` means "leave as is"
    pub fn overlay(&self, tile: TileIndex, map: &OverlayMap) -> Option<TileIndex> {
        map[self.category(tile) as usize].map(|l| self.tile(l))
    }

    /// Sky variant underneath a sky or treasure tile
    pub fn sky_variant(&self, tile: TileIndex) -> Option<Sky> {
        let l = self.local(tile)?;
        let offset = match l {
            2..=7 => l - local::SKY,
            8..=13 => l - local::TREASURE,
            _ => return None,
        };
        Sky::ALL.get(offset as usize).copied()
    }

    /// The treasure drawn over a sky tile
    pub fn treasure_over(&self, tile: TileIndex) -> Option<TileIndex> {
        match self.category(tile) {
            TileCategory::Sky => {
                let sky = self.sky_variant(tile).unwrap_or(Sky::Open);
                Some(self.tile(local::TREASURE + sky as u8))
            }
            _ => None,
        }
    }

    /// The sky left behind when a treasure is taken
    pub fn treasure_removed(&self, tile: TileIndex) -> Option<TileIndex> {
        if !self.is_treasure(tile) {
            return None;
        }
        self.sky_variant(tile).map(|sky| self.sky(sky))
    }

    /// Next animation frame of a fire tile
    pub fn next_fire_frame(&self, tile: TileIndex) -> Option<TileIndex> {
        let l = self.local(tile)?;
        let frame = l.checked_sub(local::FIRE).filter(|&f| f < local::FIRE_FRAMES)?;
        Some(self.tile(local::FIRE + (frame + 1) % local::FIRE_FRAMES))
    }
}
