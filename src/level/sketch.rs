//! ASCII level sketches
//!
//! A compact way to author levels in code for the built-in pack and tests.
//!
//! | char | meaning                         |
//! |------|---------------------------------|
//! | `#`  | solid                           |
//! | `$`  | treasure                        |
//! | `=`  | one-way platform                |
//! | `H`  | ladder                          |
//! | `h`  | ladder cut into solid ground    |
//! | `^`  | fire                            |
//! | `P`  | player 1 spawn                  |
//! | `Q`  | player 2 spawn                  |
//!
//! Anything else is empty sky. Missing rows and columns are empty too.

use crate::consts::{GRID_HEIGHT, GRID_WIDTH, MAX_MONSTERS};
use crate::sim::catalog::{input_id, render_id, update_id};

use super::{LadderSpan, Level, Span, SpawnFlags, SpawnParams};

impl SpawnParams {
    /// Default player: interacting, visible, respawning
    pub fn player() -> Self {
        Self {
            flags: SpawnFlags::INTERACTS | SpawnFlags::VISIBLE | SpawnFlags::AUTORESPAWN,
            speed: 60,
            impulse: 600,
            input: input_id::PLAYER,
            update: update_id::PHYSICS,
            render: render_id::PLAYER,
            x: Self::ABSENT,
            y: Self::ABSENT,
        }
    }

    /// A visible, interacting monster with the given behaviour ids
    pub fn monster(input: u8, update: u8, render: u8) -> Self {
        Self {
            flags: SpawnFlags::INTERACTS | SpawnFlags::VISIBLE,
            speed: 30,
            impulse: 0,
            input,
            update,
            render,
            x: Self::ABSENT,
            y: Self::ABSENT,
        }
    }

    pub fn at(mut self, x: u8, y: u8) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_impulse(mut self, impulse: u16) -> Self {
        self.impulse = impulse;
        self
    }

    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_flags(mut self, flags: SpawnFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Collapse consecutive indices into inclusive runs
fn runs(indices: impl IntoIterator<Item = usize>) -> Vec<(usize, usize)> {
    let mut out: Vec<(usize, usize)> = Vec::new();
    for i in indices {
        match out.last_mut() {
            Some((_, end)) if *end + 1 == i => *end = i,
            _ => out.push((i, i)),
        }
    }
    out
}

impl Level {
    /// Build a level from an ASCII sketch
    pub fn from_ascii(theme: u8, rows: &[&str]) -> Self {
        let mut level = Level::blank(theme);
        let mut cells = [[b'.'; GRID_WIDTH]; GRID_HEIGHT];
        for (y, row) in rows.iter().take(GRID_HEIGHT).enumerate() {
            for (x, ch) in row.bytes().take(GRID_WIDTH).enumerate() {
                cells[y][x] = ch;
            }
        }

        for (y, row) in cells.iter().enumerate() {
            for (x, &ch) in row.iter().enumerate() {
                match ch {
                    b'#' | b'h' => level.bitmap.set(x, y, true),
                    b'$' => level.treasures.push((x as u8, y as u8)),
                    b'P' => level.players[0] = SpawnParams::player().at(x as u8, y as u8),
                    b'Q' => level.players[1] = SpawnParams::player().at(x as u8, y as u8),
                    _ => {}
                }
            }

            let strip = |wanted: u8| runs((0..GRID_WIDTH).filter(|&x| row[x] == wanted));
            for (x1, x2) in strip(b'=') {
                level.one_ways.push(Span {
                    row: y as u8,
                    x1: x1 as u8,
                    x2: x2 as u8,
                });
            }
            for (x1, x2) in strip(b'^') {
                level.fires.push(Span {
                    row: y as u8,
                    x1: x1 as u8,
                    x2: x2 as u8,
                });
            }
        }

        for x in 0..GRID_WIDTH {
            let ladder = (0..GRID_HEIGHT).filter(|&y| matches!(cells[y][x], b'H' | b'h'));
            for (y1, y2) in runs(ladder) {
                level.ladders.push(LadderSpan {
                    column: x as u8,
                    y1: y1 as u8,
                    y2: y2 as u8,
                });
            }
        }

        level
    }

    /// Place a monster in the first free monster slot
    pub fn with_monster(mut self, params: SpawnParams) -> Self {
        match self.monsters.iter_mut().find(|m| !m.on_grid()) {
            Some(slot) => *slot = params,
            None => log::warn!("All {} monster slots are taken", MAX_MONSTERS),
        }
        self
    }

    pub fn with_time_bonus(mut self, seconds: u16) -> Self {
        self.time_bonus = seconds;
        self
    }
}
