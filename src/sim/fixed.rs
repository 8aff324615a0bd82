//! Fixed-point coordinates and tile addressing
//!
//! Positions are `i32` quarter pixels. Every conversion here is integer
//! only; division truncates toward zero exactly like the simulation
//! expects, so results are bit-identical on every platform.

use crate::consts::{FP_ONE, FP_SHIFT, TILE_FP, TILE_SIZE};

/// A fixed-point scalar (quarter pixels, or quarter pixels per second)
pub type Fp = i32;

/// Whole pixels to fixed point
#[inline]
pub const fn to_fp(pixels: i32) -> Fp {
    pixels << FP_SHIFT
}

/// Fixed point to whole pixels, rounding toward negative infinity
#[inline]
pub const fn to_pixel(v: Fp) -> i32 {
    v >> FP_SHIFT
}

/// Fixed point to the nearest whole pixel
#[inline]
pub const fn round_pixel(v: Fp) -> i32 {
    (v + FP_ONE / 2) >> FP_SHIFT
}

/// Tile column/row containing a coordinate
#[inline]
pub const fn pixel_to_tile(v: Fp) -> i32 {
    to_pixel(v).div_euclid(TILE_SIZE)
}

/// Top-left coordinate of a tile column/row
#[inline]
pub const fn tile_to_fp(tile: i32) -> Fp {
    tile * TILE_FP
}

/// Whether a one-tile box at `x` also covers the next column
#[inline]
pub const fn has_right_overlap(x: Fp) -> bool {
    x.rem_euclid(TILE_FP) != 0
}

/// Whether a one-tile box at `y` also covers the next row
#[inline]
pub const fn has_bottom_overlap(y: Fp) -> bool {
    y.rem_euclid(TILE_FP) != 0
}

/// Tile cell of a coordinate pair plus its overlap flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    pub tx: i32,
    pub ty: i32,
    pub nx: bool,
    pub ny: bool,
}

impl TileSpan {
    pub fn of(x: Fp, y: Fp) -> Self {
        Self {
            tx: pixel_to_tile(x),
            ty: pixel_to_tile(y),
            nx: has_right_overlap(x),
            ny: has_bottom_overlap(y),
        }
    }

    /// Same as [`TileSpan::of`] but with `x` rounded to a whole pixel first
    pub fn of_rounded_x(x: Fp, y: Fp) -> Self {
        Self::of(to_fp(round_pixel(x)), y)
    }

    /// Every cell the box touches, row-major
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let (tx, ty) = (self.tx, self.ty);
        let cols = if self.nx { 2 } else { 1 };
        let rows = if self.ny { 2 } else { 1 };
        (0..rows).flat_map(move |dy| (0..cols).map(move |dx| (tx + dx, ty + dy)))
    }
}

/// 64-step sine table scaled to ±127, one full period
pub const SINE: [i8; 64] = [
    0, 12, 25, 37, 49, 60, 71, 81, 90, 98, 106, 112, 117, 122, 125, 126, //
    127, 126, 125, 122, 117, 112, 106, 98, 90, 81, 71, 60, 49, 37, 25, 12, //
    0, -12, -25, -37, -49, -60, -71, -81, -90, -98, -106, -112, -117, -122, -125, -126, //
    -127, -126, -125, -122, -117, -112, -106, -98, -90, -81, -71, -60, -49, -37, -25, -12,
];

/// Scale `amplitude` by the sine of a 64-step phase
#[inline]
pub fn sine(phase: u8, amplitude: Fp) -> Fp {
    amplitude * SINE[(phase & 63) as usize] as i32 / 127
}

/// Scale `amplitude` by the cosine of a 64-step phase
#[inline]
pub fn cosine(phase: u8, amplitude: Fp) -> Fp {
    sine(phase.wrapping_add(16), amplitude)
}
