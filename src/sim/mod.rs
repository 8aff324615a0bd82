//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep and integer fixed-point math only
//! - Seeded or position-derived pseudo-randomness only
//! - Stable iteration order (by entity slot)
//! - No rendering or platform dependencies

pub mod ai;
pub mod catalog;
pub mod collision;
pub mod fixed;
pub mod grid;
pub mod physics;
pub mod sprite;
pub mod state;
pub mod tick;
pub mod tiles;
pub mod world;

pub use catalog::{InputDriver, Integrator, Renderer};
pub use fixed::{Fp, TileSpan};
pub use grid::TileGrid;
pub use sprite::{Sprite, sprite};
pub use state::{Entity, GameEvent, GamePhase, GameState};
pub use tick::tick;
pub use tiles::{THEMES, Theme, TileAttrs, TileCategory, TileIndex};
pub use world::World;
