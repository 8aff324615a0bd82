//! Input drivers
//!
//! Each driver only sets intents (walkers) or velocity (flyers); the
//! integrators do the moving. Driver phase state lives inside the
//! [`InputDriver`] variant itself.

use glam::IVec2;

use super::catalog::InputDriver;
use super::fixed::{Fp, TileSpan, cosine, sine, tile_to_fp, to_fp, to_pixel};
use super::physics::{MAX_X, MAX_Y};
use super::state::Entity;
use super::world::World;
use crate::consts::{SCREEN_WIDTH, TILE_FP, TILE_SIZE, WORLD_FPS};
use crate::input::{Buttons, InputSnapshot};
use crate::tuning::Tuning;

/// Run an entity's input driver for this frame
pub fn drive(e: &mut Entity, world: &World, snapshot: &InputSnapshot, tuning: &Tuning) {
    let mut driver = std::mem::take(&mut e.input);
    match &mut driver {
        InputDriver::None => {}
        InputDriver::Player => player(e, snapshot),
        InputDriver::Walk { hop, ledge, timer } => {
            walk(e, world, *ledge);
            if *hop {
                *timer = timer.wrapping_add(1);
                e.jump = *timer % tuning.hop_period.max(1) == 0;
            }
        }
        InputDriver::FlyVertical { top, bottom } => fly_vertical(e, *top, *bottom),
        InputDriver::FlyHorizontal { left, right } => fly_horizontal(e, *left, *right),
        InputDriver::Undulate {
            amplitude,
            rate,
            phase,
        } => {
            *phase = phase.wrapping_add(*rate);
            undulate(e, to_fp(*amplitude as i32), *phase);
        }
        InputDriver::Erratic {
            amplitude,
            phase,
            seed,
        } => {
            *seed = seed.wrapping_mul(25173).wrapping_add(13849);
            *phase = phase.wrapping_add(1 + (*seed >> 15) as u8);
            erratic(e, to_fp(*amplitude as i32), *phase);
        }
        InputDriver::Circle {
            radius,
            speed,
            phase,
        } => {
            *phase = phase.wrapping_add(*speed);
            circle(e, *radius, *phase);
        }
    }
    e.input = driver;
}

/// Copy a player slot's buttons into intents
pub fn player(e: &mut Entity, snapshot: &InputSnapshot) {
    let slot = e.tag as usize;
    let held = snapshot.held(slot);
    e.left = held.contains(Buttons::LEFT);
    e.right = held.contains(Buttons::RIGHT);
    e.up = held.contains(Buttons::UP);
    e.down = held.contains(Buttons::DOWN);
    e.turbo = held.contains(Buttons::B);
    e.jump = snapshot.pressed(slot).contains(Buttons::A);
    e.jump_released = !held.contains(Buttons::A);
}

/// Column of the first pixel past the box in the facing direction, or
/// `None` when that pixel is off screen
fn lead_column(e: &Entity) -> Option<i32> {
    let px = to_pixel(e.pos.x);
    let lead = if e.facing_left { px - 1 } else { px + TILE_SIZE };
    (0..SCREEN_WIDTH).contains(&lead).then(|| lead.div_euclid(TILE_SIZE))
}

/// Whether a wall, or with `ledge` a drop, is directly ahead
pub fn blocked_ahead(e: &Entity, world: &World, ledge: bool) -> bool {
    let Some(col) = lead_column(e) else {
        return true;
    };
    let span = TileSpan::of(e.pos.x, e.pos.y);
    if world.is_solid(col, span.ty) || (span.ny && world.is_solid(col, span.ty + 1)) {
        return true;
    }
    let grounded = !span.ny && !e.jumping && !e.falling;
    ledge && grounded && !world.is_floor(col, span.ty + 1, e.pos.y + TILE_FP, false)
}

/// Patrol, turning round at walls (and drops when `ledge` is set)
pub fn walk(e: &mut Entity, world: &World, ledge: bool) {
    if blocked_ahead(e, world, ledge) {
        e.facing_left = !e.facing_left;
    }
    e.left = e.facing_left;
    e.right = !e.facing_left;
    e.up = false;
    e.down = false;
    e.jump = false;
    e.jump_released = false;
}

/// Head for the far bound once a bound is reached
fn bounce(pos: Fp, low: Fp, high: Fp, vel: Fp, speed: Fp) -> Fp {
    if pos <= low {
        speed
    } else if pos >= high {
        -speed
    } else if vel == 0 {
        speed
    } else {
        vel
    }
}

pub fn fly_vertical(e: &mut Entity, top: u8, bottom: u8) {
    let top = tile_to_fp(top as i32).min(MAX_Y);
    let bottom = tile_to_fp(bottom as i32).min(MAX_Y);
    let speed = e.maxdx.max(1);
    e.vel.x = 0;
    e.vel.y = bounce(e.pos.y, top, bottom, e.vel.y, speed);
}

pub fn fly_horizontal(e: &mut Entity, left: u8, right: u8) {
    let left = tile_to_fp(left as i32).min(MAX_X);
    let right = tile_to_fp(right as i32).min(MAX_X);
    let speed = e.maxdx.max(1);
    e.vel.y = 0;
    e.vel.x = bounce(e.pos.x, left, right, e.vel.x, speed);
}

/// Velocity that lands exactly on `target` after one frame
fn seek(e: &mut Entity, target: IVec2) {
    let target = target.clamp(IVec2::ZERO, IVec2::new(MAX_X, MAX_Y));
    e.vel = (target - e.pos) * WORLD_FPS;
}

/// Sweep across the screen while bobbing around the spawn row
pub fn undulate(e: &mut Entity, amplitude: Fp, phase: u8) {
    if (e.facing_left && e.pos.x <= 0) || (!e.facing_left && e.pos.x >= MAX_X) {
        e.facing_left = !e.facing_left;
    }
    let dx = if e.facing_left { -e.maxdx } else { e.maxdx };
    let target_y = e.spawn.y + sine(phase, amplitude);
    e.vel = IVec2::new(dx, ((target_y - e.pos.y) * WORLD_FPS).clamp(-e.maxdx * 4, e.maxdx * 4));
}

/// Jittery figure around the spawn point
pub fn erratic(e: &mut Entity, amplitude: Fp, phase: u8) {
    let offset = IVec2::new(
        sine(phase.wrapping_mul(3), amplitude),
        cosine(phase.wrapping_mul(2), amplitude),
    );
    seek(e, e.spawn + offset);
}

/// Orbit the spawn point
pub fn circle(e: &mut Entity, radius: Fp, phase: u8) {
    let offset = IVec2::new(cosine(phase, radius), sine(phase, radius));
    seek(e, e.spawn + offset);
}
