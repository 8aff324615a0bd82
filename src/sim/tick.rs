//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is
//! one frame at `WORLD_FPS`. Within a playing frame the phases always run
//! in this order, each over every entity in slot order (players first,
//! then monsters):
//!
//! 1. level clocks (fire animation, time bonus)
//! 2. input drivers
//! 3. integrators (`prev` is captured just before each one runs)
//! 4. player-versus-monster combat
//! 5. environment (treasure pickup, fire)
//! 6. level-complete detection
//! 7. render stage (animation, death countdown)
//! 8. respawn
//! 9. game-over check

use super::ai;
use super::catalog::Renderer;
use super::collision::boxes_overlap;
use super::physics;
use super::sprite;
use super::state::{Entity, GameEvent, GamePhase, GameState};
use super::tiles::TileAttrs;
use super::world::World;
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::MAX_PLAYERS;
use crate::input::InputSnapshot;
use crate::level::LevelTable;
use crate::tuning::Tuning;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, table: &LevelTable, input: &InputSnapshot, audio: &mut dyn AudioSink) {
    state.time_ticks += 1;
    match state.phase {
        GamePhase::Title | GamePhase::GameOver => {}
        GamePhase::LevelComplete => {
            state.phase_timer = state.phase_timer.saturating_sub(1);
            if state.phase_timer == 0 {
                next_level(state, table);
            }
        }
        GamePhase::Playing => play_frame(state, input, audio),
    }
}

/// Load the level after the current one, or return to the title screen
/// after the last
fn next_level(state: &mut GameState, table: &LevelTable) {
    let next = state.level_index + 1;
    if next >= table.count() {
        log::info!("Final level cleared with score {}", state.score);
        state.world = None;
        state.phase = GamePhase::Title;
        return;
    }
    log::info!("Advancing to level {}", next);
    state.load_level(table, next);
}

fn on_death(slot: usize, e: &Entity, events: &mut Vec<GameEvent>, audio: &mut dyn AudioSink) {
    log::debug!("Entity {} died at {:?}", slot, e.pos);
    events.push(GameEvent::Died { slot });
    audio.play(if e.is_player() {
        SoundEffect::PlayerDeath
    } else {
        SoundEffect::MonsterDeath
    });
}

fn play_frame(state: &mut GameState, input: &InputSnapshot, audio: &mut dyn AudioSink) {
    let GameState {
        phase,
        tuning,
        score,
        lives,
        level_index,
        world,
        entities,
        phase_timer,
        events,
        ..
    } = state;

    let Some(world) = world.as_mut() else {
        log::warn!("No level loaded while playing, returning to title");
        *phase = GamePhase::Title;
        return;
    };

    world.advance_clock(tuning);

    for e in entities.iter_mut() {
        ai::drive(e, world, input, tuning);
    }

    for (slot, e) in entities.iter_mut().enumerate() {
        e.prev = e.pos;
        let report = physics::step(e, world, tuning);
        if report.jumped {
            audio.play(SoundEffect::Jump);
        }
        if report.fell_out {
            on_death(slot, e, events, audio);
        }
    }

    combat(entities.as_mut_slice(), tuning, score, events, audio);
    environment(entities.as_mut_slice(), world, tuning, score, events, audio);

    let exit_reached = entities[..MAX_PLAYERS]
        .iter()
        .any(|p| p.active() && world.at_exit(p.pos));
    if world.treasures_left == 0 && exit_reached {
        let bonus = world.time_left;
        *score = score.saturating_add(bonus as u32);
        *phase = GamePhase::LevelComplete;
        *phase_timer = tuning.level_complete_frames.max(1);
        log::info!("Level {} complete, time bonus {}", level_index, bonus);
        events.push(GameEvent::LevelComplete {
            index: *level_index,
            bonus,
        });
        audio.play(SoundEffect::LevelComplete);
    }

    for e in entities.iter_mut() {
        sprite::advance(e);
    }

    for (slot, e) in entities.iter_mut().enumerate() {
        if !(e.dead && e.autorespawn && e.render == Renderer::None) {
            continue;
        }
        if e.is_player() {
            if *lives == 0 {
                continue;
            }
            *lives -= 1;
        }
        let params = e.params;
        *e = Entity::spawn(slot as u8, &params, tuning);
        log::debug!("Entity {} respawned", slot);
        events.push(GameEvent::Respawned { slot });
    }

    // Levels without a player spawn never load, so this is never vacuous
    let game_over = *phase == GamePhase::Playing
        && entities[..MAX_PLAYERS]
            .iter()
            .filter(|p| p.enabled())
            .all(|p| p.dead && p.render == Renderer::None);
    if game_over {
        log::info!("Game over with score {}", score);
        *phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver);
    }
}

/// Player-versus-monster contact. A player whose bottom was at or above
/// the monster's top last frame stomps it; any other contact kills the
/// player.
fn combat(
    entities: &mut [Entity],
    tuning: &Tuning,
    score: &mut u32,
    events: &mut Vec<GameEvent>,
    audio: &mut dyn AudioSink,
) {
    let (players, monsters) = entities.split_at_mut(MAX_PLAYERS);
    for (p_slot, p) in players.iter_mut().enumerate() {
        for (i, m) in monsters.iter_mut().enumerate() {
            let m_slot = MAX_PLAYERS + i;
            if !p.active() || !m.active() || !boxes_overlap(p.pos, m.pos) {
                continue;
            }

            if p.prev_bottom() <= m.prev.y {
                p.monster_hop = true;
                audio.play(SoundEffect::Stomp);
                if !m.invincible {
                    m.kill(tuning);
                    *score = score.saturating_add(tuning.stomp_points);
                    events.push(GameEvent::Stomp {
                        player: p_slot,
                        monster: m_slot,
                    });
                    on_death(m_slot, m, events, audio);
                }
            } else if !p.invincible {
                p.kill(tuning);
                on_death(p_slot, p, events, audio);
            }
        }
    }
}

/// Treasure pickup for players and fire for everyone
fn environment(
    entities: &mut [Entity],
    world: &mut World,
    tuning: &Tuning,
    score: &mut u32,
    events: &mut Vec<GameEvent>,
    audio: &mut dyn AudioSink,
) {
    for (slot, e) in entities.iter_mut().enumerate() {
        if !e.active() {
            continue;
        }

        if e.is_player() {
            while let Some((x, y)) = world.collect_treasure(e.pos) {
                *score = score.saturating_add(tuning.treasure_points);
                audio.play(SoundEffect::Treasure);
                events.push(GameEvent::TreasureCollected { slot, x, y });
                log::debug!("Treasure at ({}, {}), {} left", x, y, world.treasures_left);
            }
        }

        if !e.invincible && world.touching(e.pos).contains(TileAttrs::FIRE) {
            e.kill(tuning);
            on_death(slot, e, events, audio);
        }
    }
}
