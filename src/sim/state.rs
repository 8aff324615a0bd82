//! Game state and entity types
//!
//! All state that must be persisted for determinism lives here.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::catalog::{InputDriver, Integrator, Renderer};
use super::fixed::{Fp, tile_to_fp};
use super::world::World;
use crate::consts::{MAX_ENTITIES, MAX_PLAYERS};
use crate::level::{LevelError, LevelTable, SpawnFlags, SpawnParams};
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No level loaded
    Title,
    /// Active gameplay
    Playing,
    /// Treasure gone and exit reached, waiting to load the next level
    LevelComplete,
    /// Every player is out of lives
    GameOver,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelLoaded { index: usize },
    LoadFailed { index: usize },
    TreasureCollected { slot: usize, x: i32, y: i32 },
    Stomp { player: usize, monster: usize },
    Died { slot: usize },
    Respawned { slot: usize },
    LevelComplete { index: usize, bonus: u16 },
    GameOver,
}

/// A player or monster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Slot index: players first, then monsters
    pub tag: u8,
    pub pos: IVec2,
    pub vel: IVec2,
    /// Position at the start of the current frame
    pub prev: IVec2,
    pub spawn: IVec2,
    /// Horizontal speed cap (fp units/s)
    pub maxdx: Fp,
    /// Jump impulse (fp units/s); zero for drivers that never jump
    pub impulse: Fp,

    // Intents
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub turbo: bool,
    pub jump_released: bool,

    // Contact state
    pub jumping: bool,
    pub falling: bool,
    pub monster_hop: bool,
    pub frames_falling: u8,
    pub facing_left: bool,

    pub dead: bool,
    pub invincible: bool,
    pub interacts: bool,
    pub autorespawn: bool,
    pub visible: bool,

    pub anim: u16,

    pub input: InputDriver,
    pub update: Integrator,
    pub render: Renderer,
    /// What this slot was spawned from, for respawning
    pub params: SpawnParams,
}

impl Entity {
    /// An empty slot that never moves, draws or collides
    pub fn disabled(tag: u8) -> Self {
        Self {
            tag,
            pos: IVec2::ZERO,
            vel: IVec2::ZERO,
            prev: IVec2::ZERO,
            spawn: IVec2::ZERO,
            maxdx: 0,
            impulse: 0,
            left: false,
            right: false,
            up: false,
            down: false,
            jump: false,
            turbo: false,
            jump_released: true,
            jumping: false,
            falling: false,
            monster_hop: false,
            frames_falling: 0,
            facing_left: false,
            dead: false,
            invincible: false,
            interacts: false,
            autorespawn: false,
            visible: false,
            anim: 0,
            input: InputDriver::None,
            update: Integrator::None,
            render: Renderer::None,
            params: SpawnParams::absent(),
        }
    }

    /// Build an entity from its spawn record. Off-grid spawns give a
    /// disabled slot.
    pub fn spawn(tag: u8, params: &SpawnParams, tuning: &Tuning) -> Self {
        if !params.on_grid() {
            return Self::disabled(tag);
        }

        let input = InputDriver::from_catalog(params.input, params.impulse, tag, params.x, params.y);
        let pos = IVec2::new(tile_to_fp(params.x as i32), tile_to_fp(params.y as i32));
        let flags = params.flags;
        Self {
            pos,
            prev: pos,
            spawn: pos,
            maxdx: params.speed as i32 * tuning.speed_scale,
            impulse: if input.uses_jump_impulse() {
                params.impulse as i32
            } else {
                0
            },
            facing_left: flags.contains(SpawnFlags::FACE_LEFT),
            invincible: flags.contains(SpawnFlags::INVINCIBLE),
            interacts: flags.contains(SpawnFlags::INTERACTS),
            autorespawn: flags.contains(SpawnFlags::AUTORESPAWN),
            visible: flags.contains(SpawnFlags::VISIBLE),
            input,
            update: Integrator::from_id(params.update),
            render: Renderer::from_id(params.render),
            params: *params,
            ..Self::disabled(tag)
        }
    }

    pub fn is_player(&self) -> bool {
        (self.tag as usize) < MAX_PLAYERS
    }

    /// Whether the slot holds anything at all
    pub fn enabled(&self) -> bool {
        self.params.on_grid()
    }

    /// Whether the entity takes part in combat and environment checks
    pub fn active(&self) -> bool {
        self.interacts && !self.dead
    }

    pub fn clear_intents(&mut self) {
        self.left = false;
        self.right = false;
        self.up = false;
        self.down = false;
        self.jump = false;
        self.turbo = false;
        self.jump_released = true;
    }

    /// Start the death sequence: a little hop, then off the bottom
    pub fn kill(&mut self, tuning: &Tuning) {
        self.dead = true;
        self.interacts = false;
        self.clear_intents();
        self.jumping = false;
        self.falling = false;
        self.monster_hop = false;
        self.input = InputDriver::None;
        self.update = Integrator::Dying;
        self.render = Renderer::Dying {
            frames_left: tuning.death_frames,
        };
        self.vel = IVec2::new(0, -tuning.death_hop);
        self.anim = 0;
    }

    /// Bottom edge of the box last frame
    pub fn prev_bottom(&self) -> Fp {
        self.prev.y + crate::consts::TILE_FP
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub tuning: Tuning,
    pub score: u32,
    /// Player respawns left
    pub lives: u8,
    /// Index of the current (or last attempted) level
    pub level_index: usize,
    /// Present only while a level is loaded
    pub world: Option<World>,
    pub entities: [Entity; MAX_ENTITIES],
    /// Frames left on the level-complete pause
    pub phase_timer: u16,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the caller last drained them
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            phase: GamePhase::Title,
            lives: tuning.lives,
            tuning,
            score: 0,
            level_index: 0,
            world: None,
            entities: std::array::from_fn(|tag| Entity::disabled(tag as u8)),
            phase_timer: 0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Begin a fresh game at `index`
    pub fn start(&mut self, table: &LevelTable, index: usize) -> bool {
        self.score = 0;
        self.lives = self.tuning.lives;
        self.load_level(table, index)
    }

    /// Load a level and spawn its entities. On failure the game drops back
    /// to the title screen with no world. A level nobody can play (no
    /// player spawn on the grid) counts as a failure.
    pub fn load_level(&mut self, table: &LevelTable, index: usize) -> bool {
        self.level_index = index;
        self.phase_timer = 0;
        let world = table
            .load(index)
            .and_then(|level| {
                if level.players.iter().any(SpawnParams::on_grid) {
                    Ok(level)
                } else {
                    Err(LevelError::NoPlayers { index })
                }
            })
            .and_then(World::new);
        match world {
            Ok(world) => {
                for (tag, entity) in self.entities.iter_mut().enumerate() {
                    let params = world.level.spawn(tag).copied().unwrap_or_else(SpawnParams::absent);
                    *entity = Entity::spawn(tag as u8, &params, &self.tuning);
                }
                self.world = Some(world);
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::LevelLoaded { index });
                true
            }
            Err(err) => {
                log::warn!("Cannot load level {}: {}", index, err);
                self.world = None;
                self.entities = std::array::from_fn(|tag| Entity::disabled(tag as u8));
                self.phase = GamePhase::Title;
                self.events.push(GameEvent::LoadFailed { index });
                false
            }
        }
    }

    /// Take the events raised so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn players(&self) -> &[Entity] {
        &self.entities[..MAX_PLAYERS]
    }

    pub fn monsters(&self) -> &[Entity] {
        &self.entities[MAX_PLAYERS..]
    }
}
