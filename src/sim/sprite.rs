//! Render stage: animation counters and sprite selection
//!
//! The simulation never draws. It hands the presentation layer a rounded
//! pixel position, a sprite tile index and a flip flag per visible entity.

use serde::{Deserialize, Serialize};

use super::catalog::{Integrator, Renderer};
use super::fixed::round_pixel;
use super::state::Entity;

/// First sprite tile of each renderer's frame block
pub mod sprite_base {
    pub const PLAYER: u8 = 0;
    pub const WALKER: u8 = 8;
    pub const HOPPER: u8 = 12;
    pub const FLYER: u8 = 16;
    pub const DYING: u8 = 24;
}

/// What the presentation layer draws for one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    pub x: i32,
    pub y: i32,
    pub tile: u8,
    /// Mirror horizontally (entity faces left)
    pub flip: bool,
}

/// Advance animation state. A finished death animation leaves the
/// renderer at `None`, which is what respawning waits for.
pub fn advance(e: &mut Entity) {
    let step = if e.turbo { 2 } else { 1 };
    e.anim = e.anim.wrapping_add(step);

    if let Renderer::Dying { frames_left } = &mut e.render {
        *frames_left = frames_left.saturating_sub(1);
        if *frames_left == 0 {
            e.render = Renderer::None;
            e.visible = false;
        }
    }
}

fn player_frame(e: &Entity) -> u8 {
    let cycle = |frames: u16, period: u16| (e.anim / period % frames) as u8;
    if e.update == Integrator::Ladder {
        // Only animate while actually climbing
        let frame = if e.vel == glam::IVec2::ZERO { 0 } else { cycle(2, 6) };
        4 + frame
    } else if e.jumping || e.falling {
        3
    } else if e.vel.x != 0 {
        cycle(3, 4)
    } else {
        0
    }
}

/// Sprite for an entity, if it is drawn at all
pub fn sprite(e: &Entity) -> Option<Sprite> {
    if !e.visible {
        return None;
    }
    let tile = match e.render {
        Renderer::None => return None,
        Renderer::Player => sprite_base::PLAYER + player_frame(e),
        Renderer::Walker => sprite_base::WALKER + (e.anim / 8 % 2) as u8,
        Renderer::Hopper => {
            sprite_base::HOPPER + if e.jumping || e.falling { 2 } else { (e.anim / 8 % 2) as u8 }
        }
        Renderer::Flyer => sprite_base::FLYER + (e.anim / 4 % 2) as u8,
        Renderer::Dying { .. } => sprite_base::DYING + (e.anim / 4 % 2) as u8,
    };
    Some(Sprite {
        x: round_pixel(e.pos.x),
        y: round_pixel(e.pos.y),
        tile,
        flip: e.facing_left,
    })
}
