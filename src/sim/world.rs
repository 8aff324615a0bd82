//! Per-level world context
//!
//! Everything that lives exactly as long as one level: the immutable
//! descriptor, the live tile grid and the level clocks. Physics and AI
//! receive it explicitly instead of reaching for globals.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::fixed::{Fp, TileSpan, tile_to_fp};
use super::grid::TileGrid;
use super::tiles::{THEMES, Theme, TileAttrs};
use crate::consts::{MAX_PLAYERS, TILE_FP, WORLD_FPS};
use crate::level::{Level, LevelError};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub level: Level,
    pub theme_id: u8,
    pub grid: TileGrid,
    pub treasures_left: u16,
    /// Remaining time bonus in seconds
    pub time_left: u16,
    /// Frames since the level started
    pub frame: u32,
    /// Tile a player must reach once the treasure is gone
    pub exit: Option<(i32, i32)>,
}

impl World {
    pub fn new(level: Level) -> Result<Self, LevelError> {
        let theme = Theme::get(level.theme).ok_or(LevelError::UnknownTheme {
            index: level.index,
            theme: level.theme,
        })?;
        let (grid, placed) = TileGrid::build(&level, theme);
        let exit = level
            .players
            .iter()
            .take(MAX_PLAYERS)
            .find(|p| p.on_grid())
            .map(|p| (p.x as i32, p.y as i32));

        log::info!(
            "Level {} ready: theme '{}', {} treasures, {}s bonus",
            level.index,
            theme.name,
            placed,
            level.time_bonus
        );
        Ok(Self {
            theme_id: level.theme,
            time_left: level.time_bonus,
            level,
            grid,
            treasures_left: placed,
            frame: 0,
            exit,
        })
    }

    pub fn theme(&self) -> &'static Theme {
        Theme::get(self.theme_id).unwrap_or(&THEMES[0])
    }

    /// Attributes of a cell; off-grid cells have none
    pub fn attrs(&self, tx: i32, ty: i32) -> TileAttrs {
        self.grid
            .get(tx, ty)
            .map(|t| self.theme().attrs(t))
            .unwrap_or_default()
    }

    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        self.attrs(tx, ty).contains(TileAttrs::SOLID)
    }

    pub fn is_ladder(&self, tx: i32, ty: i32) -> bool {
        self.attrs(tx, ty).contains(TileAttrs::LADDER)
    }

    /// Whether a cell holds up an entity whose bottom was at `prev_bottom`
    /// last frame. One-way tiles only count from above and not while
    /// dropping through.
    pub fn is_floor(&self, tx: i32, ty: i32, prev_bottom: Fp, down: bool) -> bool {
        let attrs = self.attrs(tx, ty);
        attrs.contains(TileAttrs::SOLID)
            || (attrs.contains(TileAttrs::ONE_WAY) && !down && prev_bottom <= tile_to_fp(ty))
    }

    /// Union of the attributes under a one-tile box
    pub fn touching(&self, pos: IVec2) -> TileAttrs {
        TileSpan::of(pos.x, pos.y)
            .cells()
            .fold(TileAttrs::empty(), |acc, (tx, ty)| acc | self.attrs(tx, ty))
    }

    /// Column of the first ladder cell under a one-tile box
    pub fn ladder_column(&self, pos: IVec2) -> Option<i32> {
        TileSpan::of(pos.x, pos.y)
            .cells()
            .find(|&(tx, ty)| self.is_ladder(tx, ty))
            .map(|(tx, _)| tx)
    }

    /// Take the first treasure under a one-tile box
    pub fn collect_treasure(&mut self, pos: IVec2) -> Option<(i32, i32)> {
        let theme = self.theme();
        let cell = TileSpan::of(pos.x, pos.y)
            .cells()
            .find(|&(tx, ty)| self.attrs(tx, ty).contains(TileAttrs::TREASURE))?;
        if !self.grid.remove_treasure(theme, cell.0, cell.1) {
            return None;
        }
        self.treasures_left = self.treasures_left.saturating_sub(1);
        Some(cell)
    }

    /// Whether a one-tile box overlaps the exit; with no exit every
    /// position counts
    pub fn at_exit(&self, pos: IVec2) -> bool {
        match self.exit {
            None => true,
            Some((ex, ey)) => {
                let (x, y) = (tile_to_fp(ex), tile_to_fp(ey));
                (pos.x - x).abs() < TILE_FP && (pos.y - y).abs() < TILE_FP
            }
        }
    }

    /// Advance the level clocks: fire animation and time bonus
    pub fn advance_clock(&mut self, tuning: &Tuning) {
        self.frame += 1;
        let period = tuning.fire_frame_period.max(1) as u32;
        if self.frame % period == 0 {
            let theme = self.theme();
            self.grid.animate_fire(theme);
        }
        if self.frame % WORLD_FPS as u32 == 0 {
            self.time_left = self.time_left.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tiles::local;

    fn world(rows: &[&str]) -> World {
        World::new(Level::from_ascii(0, rows)).unwrap()
    }

    #[test]
    fn test_off_grid_has_no_attributes() {
        let w = world(&["##########"]);
        assert!(w.is_solid(0, 0));
        assert!(w.attrs(-1, 0).is_empty());
        assert!(w.attrs(0, 100).is_empty());
    }

    #[test]
    fn test_one_way_floor_depends_on_previous_bottom() {
        let w = world(&["", "", "====="]);
        let top = tile_to_fp(2);
        assert!(w.is_floor(1, 2, top, false));
        assert!(w.is_floor(1, 2, top - 1, false));
        assert!(!w.is_floor(1, 2, top + 1, false));
        assert!(!w.is_floor(1, 2, top, true));
    }

    #[test]
    fn test_collect_treasure_counts_down() {
        let mut w = world(&["", ".$$", "####"]);
        assert_eq!(w.treasures_left, 2);

        let pos = IVec2::new(tile_to_fp(1) + 4, tile_to_fp(1));
        assert_eq!(w.collect_treasure(pos), Some((1, 1)));
        assert_eq!(w.collect_treasure(pos), Some((2, 1)));
        assert_eq!(w.collect_treasure(pos), None);
        assert_eq!(w.treasures_left, 0);
        assert!(!w.touching(pos).contains(TileAttrs::TREASURE));
    }

    #[test]
    fn test_exit_is_first_player_spawn() {
        let w = world(&["", "...P", "####"]);
        assert_eq!(w.exit, Some((3, 1)));
        assert!(w.at_exit(IVec2::new(tile_to_fp(3) + 8, tile_to_fp(1))));
        assert!(!w.at_exit(IVec2::new(tile_to_fp(4), tile_to_fp(1))));

        let open = world(&["####"]);
        assert!(open.at_exit(IVec2::ZERO));
    }

    #[test]
    fn test_ladder_column() {
        let w = world(&["", "..H", "..H", "##h#"]);
        assert_eq!(w.ladder_column(IVec2::new(tile_to_fp(2) - 4, tile_to_fp(1))), Some(2));
        assert_eq!(w.ladder_column(IVec2::new(tile_to_fp(0), tile_to_fp(1))), None);
        assert_eq!(w.theme().local(w.grid.get(2, 3).unwrap()), Some(local::LADDER_ABOVEGROUND));
    }

    #[test]
    fn test_clock() {
        let mut w = world(&["", "^", "#"]);
        w.time_left = 2;
        let tuning = Tuning::default();
        for _ in 0..WORLD_FPS {
            w.advance_clock(&tuning);
        }
        assert_eq!(w.time_left, 1);
        assert!(w.attrs(0, 1).contains(TileAttrs::FIRE));
    }
}
