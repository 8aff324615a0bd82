//! Four-cell tile collision
//!
//! A one-tile box touches at most four cells: its own, the one to the
//! right, the one below and the diagonal. Both resolution passes sample
//! the same four cells, test the axis-aligned neighbour before the
//! diagonal, and resolve by snapping to a tile boundary.

use super::fixed::{TileSpan, tile_to_fp};
use super::state::Entity;
use super::world::World;
use crate::consts::TILE_FP;

/// Solidity of the four cells a box can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cells {
    pub cell: bool,
    pub right: bool,
    pub below: bool,
    pub diag: bool,
}

impl Cells {
    pub fn sample(span: &TileSpan, mut test: impl FnMut(i32, i32) -> bool) -> Self {
        Self {
            cell: test(span.tx, span.ty),
            right: test(span.tx + 1, span.ty),
            below: test(span.tx, span.ty + 1),
            diag: test(span.tx + 1, span.ty + 1),
        }
    }
}

/// Which tiles stop vertical movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Floors {
    /// Solid tiles plus one-way tiles approached from above
    OneWayAware,
    /// Solid tiles only
    SolidOnly,
}

/// Push the box out of walls after horizontal movement
pub fn resolve_horizontal(e: &mut Entity, world: &World) {
    let span = TileSpan::of(e.pos.x, e.pos.y);
    let c = Cells::sample(&span, |x, y| world.is_solid(x, y));

    if e.vel.x > 0 {
        if (c.right && !c.cell) || (span.ny && c.diag && !c.below) {
            e.pos.x = tile_to_fp(span.tx);
            e.vel.x = 0;
        }
    } else if e.vel.x < 0 && ((c.cell && !c.right) || (span.ny && c.below && !c.diag)) {
        e.pos.x = tile_to_fp(span.tx + 1);
        e.vel.x = 0;
    }
}

/// Land on floors or bump ceilings after vertical movement. Sampling uses
/// the x position rounded to a whole pixel, so a box less than half a
/// pixel past a column boundary counts as aligned with it: over a one-tile
/// gap it drops in rather than catching on the far edge. Returns true when
/// the box landed.
pub fn resolve_vertical(e: &mut Entity, world: &World, floors: Floors) -> bool {
    let span = TileSpan::of_rounded_x(e.pos.x, e.pos.y);

    if e.vel.y > 0 {
        let prev_bottom = e.prev_bottom();
        let down = e.down;
        let c = Cells::sample(&span, |x, y| match floors {
            Floors::OneWayAware => world.is_floor(x, y, prev_bottom, down),
            Floors::SolidOnly => world.is_solid(x, y),
        });
        if (c.below && !c.cell) || (span.nx && c.diag && !c.right) {
            e.pos.y = tile_to_fp(span.ty);
            e.vel.y = 0;
            e.jumping = false;
            e.falling = false;
            e.frames_falling = 0;
            return true;
        }
    } else if e.vel.y < 0 {
        let c = Cells::sample(&span, |x, y| world.is_solid(x, y));
        if (c.cell && !c.below) || (span.nx && c.right && !c.diag) {
            e.pos.y = tile_to_fp(span.ty + 1);
            e.vel.y = 0;
        }
    }
    false
}

/// Whether the box is standing on something right now
pub fn is_supported(e: &Entity, world: &World) -> bool {
    let span = TileSpan::of_rounded_x(e.pos.x, e.pos.y);
    if span.ny {
        return false;
    }
    let bottom = e.pos.y + TILE_FP;
    let floor = |x| world.is_floor(x, span.ty + 1, bottom, e.down);
    floor(span.tx) || (span.nx && floor(span.tx + 1))
}

/// Whether two one-tile boxes overlap
pub fn boxes_overlap(a: glam::IVec2, b: glam::IVec2) -> bool {
    (a.x - b.x).abs() < TILE_FP && (a.y - b.y).abs() < TILE_FP
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::level::{Level, SpawnParams};
    use crate::tuning::Tuning;

    fn setup(rows: &[&str]) -> (World, Entity) {
        let world = World::new(Level::from_ascii(0, rows)).unwrap();
        let e = Entity::spawn(0, &SpawnParams::player().at(0, 0), &Tuning::default());
        (world, e)
    }

    fn place(e: &mut Entity, x: i32, y: i32, vel: IVec2) {
        e.pos = IVec2::new(x, y);
        e.prev = e.pos - vel / crate::consts::WORLD_FPS;
        e.vel = vel;
    }

    #[test]
    fn test_wall_on_the_right_stops_box() {
        let (world, mut e) = setup(&["", "....#"]);
        place(&mut e, tile_to_fp(3) + 3, tile_to_fp(1), IVec2::new(200, 0));
        resolve_horizontal(&mut e, &world);
        assert_eq!(e.pos.x, tile_to_fp(3));
        assert_eq!(e.vel.x, 0);
    }

    #[test]
    fn test_wall_on_the_left_stops_box() {
        let (world, mut e) = setup(&["", "..#"]);
        place(&mut e, tile_to_fp(3) - 2, tile_to_fp(1), IVec2::new(-200, 0));
        resolve_horizontal(&mut e, &world);
        assert_eq!(e.pos.x, tile_to_fp(3));
        assert_eq!(e.vel.x, 0);
    }

    #[test]
    fn test_diagonal_wall_only_when_overlapping_rows() {
        let (world, mut e) = setup(&["", "", "....#"]);
        // Aligned row: the block below-right is not in the way
        place(&mut e, tile_to_fp(3) + 3, tile_to_fp(1), IVec2::new(200, 0));
        resolve_horizontal(&mut e, &world);
        assert_eq!(e.vel.x, 200);

        place(&mut e, tile_to_fp(3) + 3, tile_to_fp(1) + 5, IVec2::new(200, 0));
        resolve_horizontal(&mut e, &world);
        assert_eq!(e.pos.x, tile_to_fp(3));
    }

    #[test]
    fn test_landing_snaps_to_tile_top() {
        let (world, mut e) = setup(&["", "", "####"]);
        place(&mut e, tile_to_fp(1), tile_to_fp(1) + 7, IVec2::new(0, 300));
        e.falling = true;
        e.jumping = true;
        assert!(resolve_vertical(&mut e, &world, Floors::OneWayAware));
        assert_eq!(e.pos.y, tile_to_fp(1));
        assert_eq!(e.vel.y, 0);
        assert!(!e.falling && !e.jumping);
        assert!(is_supported(&e, &world));
    }

    #[test]
    fn test_ceiling() {
        let (world, mut e) = setup(&["", "##", ""]);
        place(&mut e, tile_to_fp(0), tile_to_fp(2) - 6, IVec2::new(0, -300));
        assert!(!resolve_vertical(&mut e, &world, Floors::OneWayAware));
        assert_eq!(e.pos.y, tile_to_fp(2));
        assert_eq!(e.vel.y, 0);
    }

    #[test]
    fn test_one_way_from_below_is_ignored() {
        let (world, mut e) = setup(&["", "==", ""]);
        place(&mut e, tile_to_fp(0), tile_to_fp(2) - 6, IVec2::new(0, -300));
        resolve_vertical(&mut e, &world, Floors::OneWayAware);
        assert_eq!(e.vel.y, -300);
    }

    #[test]
    fn test_solid_only_passes_one_way() {
        let (world, mut e) = setup(&["", "", "=="]);
        place(&mut e, tile_to_fp(0), tile_to_fp(1) + 3, IVec2::new(0, 100));
        e.prev.y = tile_to_fp(1);
        assert!(!resolve_vertical(&mut e, &world, Floors::SolidOnly));
        assert!(resolve_vertical(&mut e, &world, Floors::OneWayAware));
    }

    #[test]
    fn test_rounded_x_drops_box_into_gap() {
        // Gap of exactly one tile at column 1
        let (world, mut e) = setup(&["", "", "#.#"]);
        place(&mut e, tile_to_fp(1) + 1, tile_to_fp(1) + 4, IVec2::new(0, 100));
        // Quarter-pixel overlap into column 2 is rounded away
        assert!(!resolve_vertical(&mut e, &world, Floors::OneWayAware));

        // Half a pixel or more still catches the edge
        place(&mut e, tile_to_fp(1) + 2, tile_to_fp(1) + 4, IVec2::new(0, 100));
        assert!(resolve_vertical(&mut e, &world, Floors::OneWayAware));
        assert_eq!(e.pos.y, tile_to_fp(1));
    }

    #[test]
    fn test_overlap() {
        assert!(boxes_overlap(IVec2::ZERO, IVec2::new(TILE_FP - 1, 0)));
        assert!(!boxes_overlap(IVec2::ZERO, IVec2::new(TILE_FP, 0)));
    }
}
