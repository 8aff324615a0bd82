//! Entity integrators
//!
//! One function per [`Integrator`] variant. Velocities are fixed-point
//! units per second; every frame adds `v / WORLD_FPS` with truncating
//! integer division.

use glam::IVec2;

use super::catalog::{Integrator, Renderer};
use super::collision::{Floors, is_supported, resolve_horizontal, resolve_vertical};
use super::fixed::tile_to_fp;
use super::state::Entity;
use super::world::World;
use crate::consts::{SCREEN_HEIGHT_FP, SCREEN_WIDTH_FP, TILE_FP, WORLD_FPS};
use crate::tuning::Tuning;

/// Lowest y a box can occupy while still fully on screen
pub const MAX_Y: i32 = SCREEN_HEIGHT_FP - TILE_FP;
/// Rightmost x a box can occupy while still fully on screen
pub const MAX_X: i32 = SCREEN_WIDTH_FP - TILE_FP;

/// What happened during one integration step
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// A jump started this frame
    pub jumped: bool,
    /// The entity dropped off the bottom of the screen and died
    pub fell_out: bool,
}

/// Advance an entity's body by one frame
pub fn step(e: &mut Entity, world: &World, tuning: &Tuning) -> StepReport {
    match e.update {
        Integrator::None => StepReport::default(),
        Integrator::Physics => physics(e, world, tuning),
        Integrator::Flying => {
            flying(e);
            StepReport::default()
        }
        Integrator::Ladder => ladder(e, world, tuning),
        Integrator::Dying => {
            dying(e, tuning);
            StepReport::default()
        }
    }
}

/// Left/right intents, friction, speed cap and screen clamp
pub fn integrate_horizontal(e: &mut Entity, tuning: &Tuning) {
    let was_left = e.vel.x < 0;
    let was_right = e.vel.x > 0;
    let accel = e.maxdx * tuning.accel_factor;
    let friction = e.maxdx * tuning.friction_factor;

    let mut ddx = 0;
    if e.left {
        ddx -= accel;
    } else if was_left {
        ddx += friction;
    }
    if e.right {
        ddx += accel;
    } else if was_right {
        ddx -= friction;
    }

    let cap = if e.turbo {
        e.maxdx + tuning.turbo_bonus
    } else {
        e.maxdx
    };
    e.vel.x = (e.vel.x + ddx / WORLD_FPS).clamp(-cap, cap);

    // Friction must stop the box, not push it the other way
    if (was_left && e.vel.x > 0) || (was_right && e.vel.x < 0) {
        e.vel.x = 0;
    }

    e.pos.x += e.vel.x / WORLD_FPS;
    if e.pos.x < 0 || e.pos.x > MAX_X {
        e.pos.x = e.pos.x.clamp(0, MAX_X);
        e.vel.x = 0;
    }

    if e.left && !e.right {
        e.facing_left = true;
    } else if e.right && !e.left {
        e.facing_left = false;
    }
}

/// One-shot impulses, jump cut and gravity
fn apply_vertical_forces(e: &mut Entity, tuning: &Tuning) -> bool {
    let mut jumped = false;
    if e.monster_hop {
        e.monster_hop = false;
        e.vel.y = -(e.impulse / 2);
        e.jumping = true;
        e.falling = false;
    } else if e.jump && !e.jumping && e.frames_falling < tuning.grace_frames && e.impulse > 0 {
        e.vel.y = -e.impulse;
        e.jumping = true;
        e.falling = false;
        jumped = true;
    }

    if e.jumping && e.jump_released && e.vel.y < -tuning.jump_cut {
        e.vel.y = -tuning.jump_cut;
    }

    e.vel.y = (e.vel.y + tuning.gravity / WORLD_FPS).min(tuning.max_fall);
    jumped
}

/// The full platformer integrator
pub fn physics(e: &mut Entity, world: &World, tuning: &Tuning) -> StepReport {
    let mut report = StepReport::default();

    integrate_horizontal(e, tuning);
    resolve_horizontal(e, world);

    report.jumped = apply_vertical_forces(e, tuning);

    e.pos.y += e.vel.y / WORLD_FPS;
    if e.pos.y < 0 {
        e.pos.y = 0;
        e.vel.y = e.vel.y.max(0);
    }
    let mut on_screen_floor = false;
    if e.pos.y > MAX_Y {
        if !e.invincible {
            e.kill(tuning);
            report.fell_out = true;
            return report;
        }
        e.pos.y = MAX_Y;
        e.vel.y = 0;
        e.jumping = false;
        on_screen_floor = true;
    }

    resolve_vertical(e, world, Floors::OneWayAware);

    let supported = on_screen_floor || is_supported(e, world);
    e.falling = !e.jumping && !supported;
    if e.falling {
        e.frames_falling = e.frames_falling.saturating_add(1).min(tuning.grace_frames);
    } else if supported {
        e.frames_falling = 0;
    }

    try_join_ladder(e, world);
    report
}

/// Grab a ladder one sub-pixel above or below when exactly one of up or
/// down is held
fn try_join_ladder(e: &mut Entity, world: &World) {
    let probe = match (e.up, e.down) {
        (true, false) => e.pos - IVec2::Y,
        (false, true) => e.pos + IVec2::Y,
        _ => return,
    };
    let Some(column) = world.ladder_column(probe) else {
        return;
    };

    e.update = Integrator::Ladder;
    e.pos.x = tile_to_fp(column);
    e.vel = IVec2::ZERO;
    e.anim = 0;
    e.jumping = false;
    e.falling = false;
    e.frames_falling = 0;
}

/// Climbing: intent-driven movement against solid tiles only
pub fn ladder(e: &mut Entity, world: &World, tuning: &Tuning) -> StepReport {
    if e.jump && !e.up && !e.down {
        e.update = Integrator::Physics;
        e.frames_falling = 0;
        e.jumping = false;
        e.vel = IVec2::ZERO;
        // Grounded as far as the jump gate is concerned
        return physics(e, world, tuning);
    }

    let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) * tuning.climb_speed;
    e.vel = IVec2::new(axis(e.left, e.right), axis(e.up, e.down));
    e.pos += e.vel / WORLD_FPS;
    e.pos = e.pos.clamp(IVec2::ZERO, IVec2::new(MAX_X, MAX_Y));

    if e.left && !e.right {
        e.facing_left = true;
    } else if e.right && !e.left {
        e.facing_left = false;
    }

    resolve_horizontal(e, world);
    resolve_vertical(e, world, Floors::SolidOnly);

    if world.ladder_column(e.pos).is_none() {
        e.update = Integrator::Physics;
        e.vel.y = 0;
    }
    StepReport::default()
}

/// Free flight; AI drivers set the velocity, this only integrates and
/// keeps the box on screen
pub fn flying(e: &mut Entity) {
    e.pos += e.vel / WORLD_FPS;
    let clamped = e.pos.clamp(IVec2::ZERO, IVec2::new(MAX_X, MAX_Y));
    if clamped.x != e.pos.x {
        e.vel.x = 0;
    }
    if clamped.y != e.pos.y {
        e.vel.y = 0;
    }
    e.pos = clamped;
    if e.vel.x < 0 {
        e.facing_left = true;
    } else if e.vel.x > 0 {
        e.facing_left = false;
    }
}

/// Death arc: gravity only, hidden once it leaves the screen
pub fn dying(e: &mut Entity, tuning: &Tuning) {
    e.vel.y = (e.vel.y + tuning.gravity / WORLD_FPS).min(tuning.max_fall);
    e.pos.y += e.vel.y / WORLD_FPS;
    if e.pos.y > SCREEN_HEIGHT_FP {
        e.visible = false;
        if matches!(e.render, Renderer::None) {
            e.update = Integrator::None;
        }
    }
}
