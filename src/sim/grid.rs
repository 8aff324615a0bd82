//! Live tile grid
//!
//! The grid starts as a pure function of the solidity bitmap, then the
//! level's overlays are stamped on top in a fixed order: treasures,
//! one-way strips, ladders, fire. At runtime only two things change it:
//! collected treasure and the fire animation.

use serde::{Deserialize, Serialize};

use super::tiles::{
    FIRE_MAP, LADDER_MIDDLE_MAP, LADDER_TOP_MAP, ONE_WAY_MAP, OverlayMap, Sky, Theme, TileIndex,
    local,
};
use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::level::{LadderSpan, Level, SolidityBitmap, Span};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    cells: Vec<TileIndex>,
}

fn index(x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 || x as usize >= GRID_WIDTH || y as usize >= GRID_HEIGHT {
        return None;
    }
    Some(y as usize * GRID_WIDTH + x as usize)
}

fn ordered(a: u8, b: u8) -> (i32, i32) {
    (a.min(b) as i32, a.max(b) as i32)
}

impl TileGrid {
    /// Base tiles derived from solidity alone
    pub fn render_base(bitmap: &SolidityBitmap, theme: &Theme) -> Self {
        let mut cells = vec![0; GRID_WIDTH * GRID_HEIGHT];
        let last_row = GRID_HEIGHT as i32 - 1;
        for y in 0..GRID_HEIGHT as i32 {
            for x in 0..GRID_WIDTH as i32 {
                let solid = |dx: i32, dy: i32| bitmap.is_solid(x + dx, y + dy);
                let tile = if solid(0, 0) {
                    if y == 0 || solid(0, -1) {
                        theme.tile(local::UNDERGROUND)
                    } else {
                        theme.tile(local::ABOVEGROUND)
                    }
                } else if y == last_row {
                    theme.sky(Sky::Full)
                } else {
                    let below = solid(0, 1);
                    // Off-grid diagonals take the value of the cell below
                    let left = if x == 0 { below } else { solid(-1, 1) };
                    let right = if x == GRID_WIDTH as i32 - 1 { below } else { solid(1, 1) };
                    theme.sky(Sky::pick(below, left, right))
                };
                cells[y as usize * GRID_WIDTH + x as usize] = tile;
            }
        }
        Self { cells }
    }

    /// Render a level and stamp its overlays; returns the grid and the
    /// number of treasures that actually landed
    pub fn build(level: &Level, theme: &Theme) -> (Self, u16) {
        let mut grid = Self::render_base(&level.bitmap, theme);
        let placed = grid.place_treasures(theme, &level.treasures);
        grid.place_one_ways(theme, &level.one_ways);
        grid.place_ladders(theme, &level.ladders);
        grid.place_fires(theme, &level.fires);
        (grid, placed)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<TileIndex> {
        index(x, y).map(|i| self.cells[i])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: TileIndex) {
        if let Some(i) = index(x, y) {
            self.cells[i] = tile;
        }
    }

    fn apply(&mut self, theme: &Theme, x: i32, y: i32, map: &OverlayMap) {
        if let Some(tile) = self.get(x, y).and_then(|t| theme.overlay(t, map)) {
            self.set(x, y, tile);
        }
    }

    /// Treasure only lands on sky; returns how many did
    pub fn place_treasures(&mut self, theme: &Theme, treasures: &[(u8, u8)]) -> u16 {
        let mut placed = 0;
        for &(x, y) in treasures {
            let (x, y) = (x as i32, y as i32);
            if let Some(tile) = self.get(x, y).and_then(|t| theme.treasure_over(t)) {
                self.set(x, y, tile);
                placed += 1;
            } else {
                log::debug!("Treasure at ({}, {}) not placed", x, y);
            }
        }
        placed
    }

    pub fn place_one_ways(&mut self, theme: &Theme, spans: &[Span]) {
        for span in spans {
            let (x1, x2) = ordered(span.x1, span.x2);
            for x in x1..=x2 {
                let y = span.row as i32;
                // One-way over an existing ladder keeps the ladder
                match self.get(x, y) {
                    Some(t) if theme.is_ladder(t) => {
                        self.set(x, y, theme.tile(local::ONE_WAY_LADDER))
                    }
                    _ => self.apply(theme, x, y, &ONE_WAY_MAP),
                }
            }
        }
    }

    pub fn place_ladders(&mut self, theme: &Theme, ladders: &[LadderSpan]) {
        for ladder in ladders {
            let (y1, y2) = ordered(ladder.y1, ladder.y2);
            let x = ladder.column as i32;
            for y in y1..=y2 {
                let map = if y == y1 {
                    &LADDER_TOP_MAP
                } else {
                    &LADDER_MIDDLE_MAP
                };
                self.apply(theme, x, y, map);
            }
        }
    }

    /// Fire frames are staggered by column
    pub fn place_fires(&mut self, theme: &Theme, spans: &[Span]) {
        for span in spans {
            let (x1, x2) = ordered(span.x1, span.x2);
            let y = span.row as i32;
            for x in x1..=x2 {
                if let Some(base) = self.get(x, y).and_then(|t| theme.overlay(t, &FIRE_MAP)) {
                    let frame = (x as u8) % local::FIRE_FRAMES;
                    self.set(x, y, base + frame);
                }
            }
        }
    }

    /// Restore the sky under a treasure; false if there was none
    pub fn remove_treasure(&mut self, theme: &Theme, x: i32, y: i32) -> bool {
        match self.get(x, y).and_then(|t| theme.treasure_removed(t)) {
            Some(sky) => {
                self.set(x, y, sky);
                true
            }
            None => false,
        }
    }

    /// Advance every fire tile by one frame
    pub fn animate_fire(&mut self, theme: &Theme) {
        for cell in &mut self.cells {
            if let Some(next) = theme.next_fire_frame(*cell) {
                *cell = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tiles::TileCategory;

    fn theme() -> &'static Theme {
        Theme::get(1).unwrap()
    }

    fn local_at(grid: &TileGrid, x: i32, y: i32) -> u8 {
        theme().local(grid.get(x, y).unwrap()).unwrap()
    }

    #[test]
    fn test_floor_strip() {
        let mut bitmap = SolidityBitmap::empty();
        for x in 0..GRID_WIDTH {
            bitmap.set(x, 20, true);
        }
        let grid = TileGrid::render_base(&bitmap, theme());

        for x in 0..GRID_WIDTH as i32 {
            assert_eq!(local_at(&grid, x, 20), local::ABOVEGROUND);
            assert_eq!(local_at(&grid, x, 19), Sky::Interior.local());
            assert_eq!(local_at(&grid, x, 18), Sky::Open.local());
            assert_eq!(local_at(&grid, x, GRID_HEIGHT as i32 - 1), Sky::Full.local());
        }
    }

    #[test]
    fn test_solid_column_and_row_zero() {
        let mut bitmap = SolidityBitmap::empty();
        for y in 0..4 {
            bitmap.set(5, y, true);
        }
        let grid = TileGrid::render_base(&bitmap, theme());
        assert_eq!(local_at(&grid, 5, 0), local::UNDERGROUND);
        assert_eq!(local_at(&grid, 5, 3), local::UNDERGROUND);
    }

    #[test]
    fn test_sky_variants_around_a_ledge() {
        let mut bitmap = SolidityBitmap::empty();
        bitmap.set(10, 10, true);
        bitmap.set(11, 10, true);
        let grid = TileGrid::render_base(&bitmap, theme());
        assert_eq!(local_at(&grid, 10, 9), Sky::ClearLeft.local());
        assert_eq!(local_at(&grid, 11, 9), Sky::ClearRight.local());
        assert_eq!(local_at(&grid, 12, 9), Sky::Open.local());

        let mut lone = SolidityBitmap::empty();
        lone.set(3, 5, true);
        let grid = TileGrid::render_base(&lone, theme());
        assert_eq!(local_at(&grid, 3, 4), Sky::Island.local());
    }

    #[test]
    fn test_edge_diagonal_mirrors_below() {
        let mut bitmap = SolidityBitmap::empty();
        bitmap.set(0, 10, true);
        bitmap.set(1, 10, true);
        let grid = TileGrid::render_base(&bitmap, theme());
        assert_eq!(local_at(&grid, 0, 9), Sky::Interior.local());
    }

    #[test]
    fn test_overlays() {
        let t = theme();
        let mut level = Level::blank(t.id);
        for x in 0..GRID_WIDTH {
            level.bitmap.set(x, 20, true);
        }
        level.treasures = vec![(3, 19), (4, 20), (40, 2)];
        level.one_ways = vec![Span { row: 15, x1: 9, x2: 6 }];
        level.ladders = vec![LadderSpan { column: 7, y1: 15, y2: 20 }];
        level.fires = vec![Span { row: 19, x1: 12, x2: 14 }];

        let (grid, placed) = TileGrid::build(&level, t);
        // Only the sky treasure lands
        assert_eq!(placed, 1);
        assert_eq!(t.category(grid.get(3, 19).unwrap()), TileCategory::Treasure);
        assert_eq!(local_at(&grid, 4, 20), local::ABOVEGROUND);

        // Reversed span is normalised
        assert_eq!(local_at(&grid, 6, 15), local::ONE_WAY);
        assert_eq!(local_at(&grid, 9, 15), local::ONE_WAY);
        // Ladder top meets the one-way, the rest climbs into the floor
        assert_eq!(local_at(&grid, 7, 15), local::ONE_WAY_LADDER);
        assert_eq!(local_at(&grid, 7, 16), local::LADDER);
        assert_eq!(local_at(&grid, 7, 20), local::LADDER_ABOVEGROUND);

        assert_eq!(local_at(&grid, 12, 19), local::FIRE);
        assert_eq!(local_at(&grid, 13, 19), local::FIRE + 1);
        assert_eq!(local_at(&grid, 14, 19), local::FIRE + 2);
    }

    #[test]
    fn test_ladder_top_in_open_sky() {
        let t = theme();
        let mut level = Level::blank(t.id);
        level.ladders = vec![LadderSpan { column: 4, y1: 12, y2: 10 }];
        let (grid, _) = TileGrid::build(&level, t);
        assert_eq!(local_at(&grid, 4, 10), local::LADDER_TOP);
        assert_eq!(local_at(&grid, 4, 11), local::LADDER);
        assert_eq!(local_at(&grid, 4, 12), local::LADDER);
    }

    #[test]
    fn test_remove_treasure() {
        let t = theme();
        let mut level = Level::blank(t.id);
        level.treasures = vec![(2, 2)];
        let (mut grid, _) = TileGrid::build(&level, t);
        let before = TileGrid::render_base(&level.bitmap, t);

        assert!(grid.remove_treasure(t, 2, 2));
        assert_eq!(grid, before);
        assert!(!grid.remove_treasure(t, 2, 2));
        assert!(!grid.remove_treasure(t, -1, 2));
    }

    #[test]
    fn test_animate_fire() {
        let t = theme();
        let mut level = Level::blank(t.id);
        level.fires = vec![Span { row: 5, x1: 0, x2: 0 }];
        let (mut grid, _) = TileGrid::build(&level, t);
        grid.animate_fire(t);
        assert_eq!(local_at(&grid, 0, 5), local::FIRE + 1);
        grid.animate_fire(t);
        grid.animate_fire(t);
        assert_eq!(local_at(&grid, 0, 5), local::FIRE);
        // Scenery untouched
        assert_eq!(local_at(&grid, 1, 5), Sky::Open.local());
    }
}
