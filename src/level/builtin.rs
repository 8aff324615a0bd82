//! Built-in level pack
//!
//! Four single-screen levels, one per theme, authored as ASCII sketches
//! and packed into the same table format a cartridge would carry.

use crate::sim::catalog::{input_id, render_id, update_id};

use super::{Level, LevelError, SpawnFlags, SpawnParams, encode_table};

/// Pack two tile coordinates into a flyer's impulse field
fn bounds(a: u8, b: u8) -> u16 {
    u16::from_le_bytes([a, b])
}

fn walker(x: u8, y: u8) -> SpawnParams {
    SpawnParams::monster(input_id::WALK, update_id::PHYSICS, render_id::WALKER).at(x, y)
}

fn ledge_walker(x: u8, y: u8) -> SpawnParams {
    SpawnParams::monster(input_id::WALK_LEDGE, update_id::PHYSICS, render_id::WALKER).at(x, y)
}

fn hopper(x: u8, y: u8) -> SpawnParams {
    SpawnParams::monster(input_id::HOP_LEDGE, update_id::PHYSICS, render_id::HOPPER)
        .at(x, y)
        .with_impulse(420)
}

fn flyer(input: u8, x: u8, y: u8, impulse: u16) -> SpawnParams {
    SpawnParams::monster(input, update_id::FLYING, render_id::FLYER)
        .at(x, y)
        .with_impulse(impulse)
}

fn meadow() -> Level {
    Level::from_ascii(
        0,
        &[
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
            "...$....................$....",
            "..====H==.........==H=====...",
            "......H.............H........",
            "......H.....$...$...H........",
            "......H...#########.H........",
            "......H.............H........",
            "......H.............H........",
            "......H.............H........",
            "......H.............H........",
            ".P....H......$......H...$....",
            "##############################",
        ],
    )
    .with_time_bonus(90)
    .with_monster(ledge_walker(14, 20))
    .with_monster(walker(18, 26))
    .with_monster(flyer(input_id::FLY_VERTICAL, 27, 12, bounds(12, 24)).with_speed(20))
}

fn cavern() -> Level {
    Level::from_ascii(
        1,
        &[
            "##############################",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#............................#",
            "#..$......................$..#",
            "#=====H..............H=======#",
            "#.....H..............H.......#",
            "#.....H.....$..$.....H.......#",
            "#.....H...##########.H.......#",
            "#.....H..............H.......#",
            "#.....H..............H.......#",
            "#.....H......^^^.....H.......#",
            "#..$..H....########..H...$...#",
            "#=====H..............H=======#",
            "#.....H..............H.......#",
            "#.....H..............H.......#",
            "#.....H..............H.......#",
            "#.....H..............H.......#",
            "#.....H..............H.......#",
            "#.....H..............H.......#",
            "#P....H.....$....$...H.......#",
            "##############################",
        ],
    )
    .with_time_bonus(120)
    .with_monster(hopper(14, 13))
    .with_monster(walker(10, 26))
    .with_monster(flyer(input_id::FLY_HORIZONTAL, 4, 7, bounds(2, 26)))
    .with_monster(flyer(input_id::UNDULATE, 12, 22, 0x0306))
}

fn castle() -> Level {
    Level::from_ascii(
        2,
        &[
            "",
            "",
            "",
            "",
            "",
            "",
            "...$.....................$...",
            "########H.........H##########",
            "........H.........H..........",
            "........H...$.$...H..........",
            "........H..=====..H..........",
            "........H.........H..........",
            "..$.....H.........H.....$....",
            "....#h####^^^^^^####h#.......",
            ".....H..............H........",
            ".....H..............H........",
            ".....H.......$......H........",
            ".....H......####....H........",
            ".....H..............H........",
            ".....H..............H........",
            ".....H..............H........",
            ".....H..............H........",
            ".....H..............H........",
            ".....H..............H........",
            ".....H..............H........",
            ".....H..............H........",
            ".P...H..............H...$.....",
            "##############################",
        ],
    )
    .with_time_bonus(150)
    .with_monster(ledge_walker(6, 12))
    .with_monster(ledge_walker(22, 6))
    .with_monster(walker(20, 26))
    .with_monster(flyer(input_id::CIRCLE, 24, 18, 0x0025))
    .with_monster(flyer(input_id::FLY_VERTICAL, 27, 8, bounds(8, 24)))
}

fn night() -> Level {
    let guard = walker(14, 26).with_flags(SpawnFlags::INVINCIBLE);
    Level::from_ascii(
        3,
        &[
            "",
            "",
            "",
            "..$........................$.",
            ".=====H.............H======..",
            "......H.............H........",
            "......H....$...$....H........",
            "......H...=======...H........",
            "......H.............H........",
            "......H.............H........",
            "..$...H......$......H....$...",
            "=======H=.........=H========.",
            ".......H...........H.........",
            ".......H....^^^^...H.........",
            ".......H..########.H.........",
            ".......H...........H.........",
            ".......H...........H.........",
            "...$...H...........H...$.....",
            "..=====H===.....===H=====....",
            ".......H...........H.........",
            ".......H...........H.........",
            ".......H...........H.........",
            ".......H...........H.........",
            ".......H...........H.........",
            ".......H...........H.........",
            ".......H...........H.........",
            ".P.....H.....$.....H.....Q...",
            "##############################",
        ],
    )
    .with_time_bonus(180)
    .with_monster(guard)
    .with_monster(hopper(5, 17))
    .with_monster(flyer(input_id::ERRATIC, 14, 20, 0x0018))
    .with_monster(flyer(input_id::UNDULATE, 3, 8, 0x0204))
    .with_monster(ledge_walker(24, 10))
}

/// The built-in levels in play order
pub fn levels() -> Vec<Level> {
    vec![meadow(), cavern(), castle(), night()]
}

/// The built-in levels packed into a level table
pub fn table_bytes() -> Result<Vec<u8>, LevelError> {
    encode_table(&levels())
}
